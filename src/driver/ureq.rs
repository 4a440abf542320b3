//! Simple blocking backend, built on `ureq`. Batches run one scoped thread per entry.

use crate::driver::{check_status, elapsed, settle, Batch, Driver, WireCall};
use crate::errors::HttpError;
use crate::net::{Method, Request, Response};
use crate::options::Options;
use std::sync::Arc;
use std::time::Instant;
use ureq::tls::TlsConfig;
use ureq::{Agent, RequestBuilder};

pub const NAME: &str = "Ureq";

#[derive(Debug, Clone, Default)]
pub struct UreqDriver;

impl UreqDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for UreqDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn request(&self, request: Arc<Request>) -> Result<Response, HttpError> {
        let start = Instant::now();
        let call = WireCall::prepare(&request, NAME);
        let agent = build_agent(&call.options);

        log::debug!("Driver[{}]: {} {}", NAME, call.method, call.uri);

        let body = call.payload.clone().into_bytes();
        let uri = call.uri.as_str();
        let result = match request.method() {
            Method::Get | Method::Head | Method::Delete => {
                let builder = match request.method() {
                    Method::Head => agent.head(uri),
                    Method::Delete => agent.delete(uri),
                    _ => agent.get(uri),
                };
                let builder = decorate(builder, &call);
                match body {
                    Some(body) => builder.force_send_body().send(&body[..]),
                    None => builder.call(),
                }
            }
            Method::Put | Method::Post | Method::Patch => {
                let builder = match request.method() {
                    Method::Put => agent.put(uri),
                    Method::Patch => agent.patch(uri),
                    _ => agent.post(uri),
                };
                let builder = decorate(builder, &call);
                match body {
                    Some(body) => builder.send(&body[..]),
                    None => builder.send_empty(),
                }
            }
        };

        let mut res = result.map_err(HttpError::transport)?;
        let code = res.status().as_u16();
        let headers = res.headers().clone();
        // Lift ureq's default 10 MB cap; reqwest reads bodies without one
        let bytes = res
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(HttpError::transport)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        check_status(&call.options, code, &body)?;

        Ok(Response::new()
            .with_code(code)
            .with_header_map(&headers)
            .with_body(body)
            .with_time(elapsed(start))
            .with_request(request))
    }

    fn multi_request(&self, requests: &Batch<Arc<Request>>) -> Result<Batch<Response>, HttpError> {
        let responses = std::thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|(name, request)| {
                    let handle = scope.spawn(move || self.request(request.clone()));
                    (name, request, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, request, handle)| {
                    let outcome = match handle.join() {
                        Ok(outcome) => outcome,
                        Err(panic) => std::panic::resume_unwind(panic),
                    };
                    (name.clone(), settle(name, request, outcome))
                })
                .collect()
        });

        Ok(responses)
    }
}

fn build_agent(options: &Options) -> Agent {
    // 0 disables following
    let max_redirects = if options.allow_redirects() {
        options.max_redirects()
    } else {
        0
    };

    let config = Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(options.timeout_duration())
        .timeout_connect(options.timeout_duration())
        .max_redirects(max_redirects)
        .tls_config(
            TlsConfig::builder()
                .disable_verification(!options.verify())
                .build(),
        )
        .build();

    Agent::new_with_config(config)
}

fn decorate<B>(mut builder: RequestBuilder<B>, call: &WireCall) -> RequestBuilder<B> {
    for (name, value) in &call.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(authorization) = &call.authorization {
        builder = builder.header("Authorization", authorization.as_str());
    }
    builder
}
