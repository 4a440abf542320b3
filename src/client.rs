//! The client façade.
//!
//! [`HttpClient`] owns the default [`Options`], builds a [`Request`] per call, resolves the
//! configured driver and normalizes the outcome:
//!
//! - caller misuse (unknown method, unknown driver) is always returned as `Err`;
//! - any other failure is published as an `exception` event, then returned as `Err` when the
//!   `exceptions` option is on, or turned into a degraded [`Response`] (error code, no headers,
//!   error message as body) when it is off.
//!
//! Calls block the current thread. Batches block until every entry has a response.

use crate::driver::{driver_for_name, elapsed, Batch, Driver};
use crate::errors::HttpError;
use crate::events::{HttpEvent, Listeners};
use crate::net::{Request, RequestSpec, Response};
use crate::options::{into_map, Options};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct HttpClient {
    options: Options,
    listeners: Listeners,
    last_request: Option<Arc<Request>>,
    last_response: Option<Response>,
}

impl HttpClient {
    pub fn new(options: impl Into<Options>) -> Self {
        Self {
            options: options.into(),
            ..Default::default()
        }
    }

    /// Client-level defaults applied to every call.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Registers a listener for lifecycle events. Listeners run in registration order.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&HttpEvent<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener);
    }

    /// Resolves the driver named by the client options.
    pub fn driver(&self) -> Result<Box<dyn Driver>, HttpError> {
        driver_for_name(&self.options.driver())
    }

    /// Performs one call. Accepts a url, a `(url, args, method, options)` tuple prefix or a
    /// [`RequestSpec`]. Call options override the client defaults key by key.
    pub fn request(&mut self, spec: impl Into<RequestSpec>) -> Result<Response, HttpError> {
        let request = Arc::new(spec.into().build(&self.options)?);
        let driver = driver_for_name(&request.options().driver())?;
        self.last_request = Some(request.clone());

        log::debug!(
            "Client[{}]: {} {}",
            driver.name(),
            request.method(),
            request.uri()
        );

        let start = Instant::now();
        self.listeners
            .publish(HttpEvent::RequestBefore { request: &request });

        let mut response = match driver.request(request.clone()) {
            Ok(response) => {
                self.listeners.publish(HttpEvent::RequestAfter {
                    response: &response,
                    request: &request,
                });
                response
            }
            Err(e) => self.recover(e, &request)?,
        };

        if response.time().is_none() {
            response.set_time(elapsed(start));
        }

        self.last_response = Some(response.clone());
        Ok(response)
    }

    /// Performs a batch of calls concurrently. Every key of `batch` is present in the result.
    pub fn multi_request<K, S>(
        &mut self,
        batch: impl IntoIterator<Item = (K, S)>,
    ) -> Result<Batch<Response>, HttpError>
    where
        K: Into<String>,
        S: Into<RequestSpec>,
    {
        self.multi_request_with(batch, Value::Null)
    }

    /// Like [`HttpClient::multi_request`], with options shared by the whole batch. Precedence is
    /// client defaults, then `options`, then each entry's own options.
    ///
    /// The whole batch runs on one driver, taken from the client defaults merged with `options`.
    /// A `driver` set in an entry's own options stays on that entry's request but does not pick
    /// the driver.
    pub fn multi_request_with<K, S>(
        &mut self,
        batch: impl IntoIterator<Item = (K, S)>,
        options: impl Into<Value>,
    ) -> Result<Batch<Response>, HttpError>
    where
        K: Into<String>,
        S: Into<RequestSpec>,
    {
        let defaults = self.options.merge(&into_map(options.into()));

        let mut requests: Batch<Arc<Request>> = Batch::new();
        for (name, spec) in batch {
            let request = spec.into().build(&defaults)?;
            requests.insert(name.into(), Arc::new(request));
        }

        let driver = driver_for_name(&defaults.driver())?;
        log::debug!(
            "Client[{}]: batch of {} request(s)",
            driver.name(),
            requests.len()
        );

        let start = Instant::now();
        self.listeners
            .publish(HttpEvent::MultiRequestBefore { requests: &requests });

        let mut responses = match driver.multi_request(&requests) {
            Ok(responses) => responses,
            Err(e) => {
                self.listeners.publish(HttpEvent::Exception { error: &e });
                return Err(e);
            }
        };

        let total = elapsed(start);
        for (name, request) in &requests {
            let response = responses.entry(name.clone()).or_insert_with(|| {
                log::warn!("Client[{}]: no response for batch entry '{}'", driver.name(), name);
                let missing = HttpError::Transport {
                    message: format!("No response for '{}'", name),
                    code: 0,
                    source: None,
                };
                Response::from_error(&missing, Some(request.clone()))
            });
            if response.time().is_none() {
                response.set_time(total);
            }
        }
        responses.retain(|name, _| requests.contains_key(name));

        self.listeners.publish(HttpEvent::MultiRequestAfter {
            responses: &responses,
            requests: &requests,
        });

        Ok(responses)
    }

    /// Request of the most recent single call, even if that call failed.
    pub fn last_request(&self) -> Option<&Arc<Request>> {
        self.last_request.as_ref()
    }

    /// Response of the most recent single call that produced one.
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Applies the failure policy to a failed driver call.
    fn recover(&self, error: HttpError, request: &Arc<Request>) -> Result<Response, HttpError> {
        self.listeners.publish(HttpEvent::Exception { error: &error });

        if error.is_misuse() || request.options().exceptions() {
            return Err(error);
        }

        log::warn!(
            "Client[{}]: degraded response ({}): {}",
            request.uri(),
            error.code(),
            error
        );
        Ok(Response::from_error(&error, Some(request.clone())))
    }
}
