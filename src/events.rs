//! Client lifecycle events.
//!
//! [`HttpClient`](crate::HttpClient) publishes an [`HttpEvent`] at fixed points of each call:
//!
//! - [`HttpEvent::RequestBefore`] / [`HttpEvent::RequestAfter`] around a single request
//! - [`HttpEvent::MultiRequestBefore`] / [`HttpEvent::MultiRequestAfter`] around a batch
//! - [`HttpEvent::Exception`] when a call fails, before the failure is returned or degraded
//!
//! Listeners run synchronously on the calling thread, in registration order. A listener returning
//! an error does not stop the call or the remaining listeners; the error is logged.

use crate::driver::Batch;
use crate::errors::HttpError;
use crate::net::{Request, Response};
use std::fmt::{Debug, Display};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub enum HttpEvent<'a> {
    /// A request is about to be handed to the driver
    RequestBefore { request: &'a Arc<Request> },
    /// The driver produced a response
    RequestAfter {
        response: &'a Response,
        request: &'a Arc<Request>,
    },
    /// A batch is about to be handed to the driver
    MultiRequestBefore { requests: &'a Batch<Arc<Request>> },
    /// The driver produced a response for every batch entry
    MultiRequestAfter {
        responses: &'a Batch<Response>,
        requests: &'a Batch<Arc<Request>>,
    },
    /// A call failed
    Exception { error: &'a HttpError },
}

impl HttpEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            HttpEvent::RequestBefore { .. } => "request.before",
            HttpEvent::RequestAfter { .. } => "request.after",
            HttpEvent::MultiRequestBefore { .. } => "multi-request.before",
            HttpEvent::MultiRequestAfter { .. } => "multi-request.after",
            HttpEvent::Exception { .. } => "exception",
        }
    }
}

impl Display for HttpEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub type Listener = Box<dyn Fn(&HttpEvent<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Ordered set of listeners.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
}

impl Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl Listeners {
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&HttpEvent<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn publish(&self, event: HttpEvent<'_>) {
        for (idx, listener) in self.listeners.iter().enumerate() {
            // A failing listener only affects itself
            if let Err(e) = listener(&event) {
                log::warn!("Events[{}]: listener #{} failed: {:#}", event.name(), idx, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn names() {
        let request = Arc::new(Request::new("http://x/"));
        let response = Response::new();
        let batch = Batch::new();
        let responses = Batch::new();
        let error = HttpError::DriverNotFound("x".into());

        let events = [
            HttpEvent::RequestBefore { request: &request },
            HttpEvent::RequestAfter {
                response: &response,
                request: &request,
            },
            HttpEvent::MultiRequestBefore { requests: &batch },
            HttpEvent::MultiRequestAfter {
                responses: &responses,
                requests: &batch,
            },
            HttpEvent::Exception { error: &error },
        ];
        let names: Vec<_> = events.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "request.before",
                "request.after",
                "multi-request.before",
                "multi-request.after",
                "exception"
            ]
        );
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            listeners.subscribe(move |event| {
                seen.lock().unwrap().push(format!("{tag}:{}", event.name()));
                Ok(())
            });
        }

        let request = Arc::new(Request::new("http://x/"));
        listeners.publish(HttpEvent::RequestBefore { request: &request });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "first:request.before",
                "second:request.before",
                "third:request.before"
            ]
        );
    }

    #[test]
    fn failing_listener_does_not_stop_the_rest() {
        let calls = Arc::new(Mutex::new(0));
        let mut listeners = Listeners::default();
        listeners.subscribe(|_| Err(anyhow::anyhow!("boom")));
        {
            let calls = calls.clone();
            listeners.subscribe(move |_| {
                *calls.lock().unwrap() += 1;
                Ok(())
            });
        }

        let error = HttpError::InvalidMethod("FOO".into());
        listeners.publish(HttpEvent::Exception { error: &error });
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(listeners.len(), 2);
    }
}
