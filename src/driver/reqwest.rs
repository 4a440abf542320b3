//! Primary backend, built on `reqwest`.
//!
//! Each call builds its own client since timeout, TLS verification and redirect policy are
//! per-request options. No client outlives its call, so connections are not pooled or reused
//! across requests, not even between the entries of one batch.
//!
//! The async work runs on a current-thread tokio runtime created for the call; when the caller
//! already sits inside a tokio runtime, that work moves to a scoped helper thread so the caller's
//! runtime is never blocked from within.

use crate::driver::{check_status, elapsed, settle, Batch, Driver, WireCall};
use crate::errors::HttpError;
use crate::net::{Request, Response};
use crate::options::Options;
use futures::future::join_all;
use reqwest::redirect::Policy;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub const NAME: &str = "Reqwest";

#[derive(Debug, Clone, Default)]
pub struct ReqwestDriver;

impl ReqwestDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for ReqwestDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn request(&self, request: Arc<Request>) -> Result<Response, HttpError> {
        block_on(execute(request))
    }

    fn multi_request(&self, requests: &Batch<Arc<Request>>) -> Result<Batch<Response>, HttpError> {
        let entries: Vec<(String, Arc<Request>)> = requests
            .iter()
            .map(|(name, request)| (name.clone(), request.clone()))
            .collect();

        block_on(async move {
            let calls = entries.iter().map(|(_, request)| execute(request.clone()));
            let outcomes = join_all(calls).await;

            Ok(entries
                .iter()
                .zip(outcomes)
                .map(|((name, request), outcome)| (name.clone(), settle(name, request, outcome)))
                .collect())
        })
    }
}

async fn execute(request: Arc<Request>) -> Result<Response, HttpError> {
    let start = Instant::now();
    let call = WireCall::prepare(&request, NAME);
    let client = build_client(&call.options)?;

    log::debug!("Driver[{}]: {} {}", NAME, call.method, call.uri);

    let mut builder = client.request(call.method.clone(), &call.uri);
    for (name, value) in &call.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(authorization) = &call.authorization {
        builder = builder.header("Authorization", authorization.as_str());
    }
    if let Some(body) = call.payload.into_bytes() {
        builder = builder.body(body);
    }

    let res = builder.send().await.map_err(HttpError::transport)?;
    let code = res.status().as_u16();
    let headers = res.headers().clone();

    // Not streamed
    let bytes = res.bytes().await.map_err(HttpError::transport)?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    check_status(&call.options, code, &body)?;

    Ok(Response::new()
        .with_code(code)
        .with_header_map(&headers)
        .with_body(body)
        .with_time(elapsed(start))
        .with_request(request))
}

fn build_client(options: &Options) -> Result<reqwest::Client, HttpError> {
    // 0 disables following
    let redirects = if options.allow_redirects() && options.max_redirects() > 0 {
        Policy::limited(options.max_redirects() as usize)
    } else {
        Policy::none()
    };

    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(!options.verify())
        .redirect(redirects);
    if let Some(timeout) = options.timeout_duration() {
        builder = builder.timeout(timeout).connect_timeout(timeout);
    }

    builder.build().map_err(HttpError::transport)
}

/// Drives `future` to completion on a fresh current-thread runtime.
fn block_on<F, T>(future: F) -> Result<T, HttpError>
where
    F: Future<Output = Result<T, HttpError>> + Send,
    T: Send,
{
    let run = move || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(HttpError::transport)?
            .block_on(future)
    };

    if tokio::runtime::Handle::try_current().is_err() {
        return run();
    }

    std::thread::scope(|scope| match scope.spawn(run).join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    })
}
