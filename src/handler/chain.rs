use std::sync::Arc;

use crate::handler::request::Request;
use crate::handler::response::Response;

/// Widget generation capability.
pub trait Handler: Send + Sync {
    fn handle(&self, resp: &mut dyn Response, req: &Request);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn Response, &Request) + Send + Sync,
{
    fn handle(&self, resp: &mut dyn Response, req: &Request) {
        self(resp, req)
    }
}

pub type SharedHandler = Arc<dyn Handler>;

/// Wraps a handler in another handler.
pub type Middleware = Arc<dyn Fn(SharedHandler) -> SharedHandler + Send + Sync>;

/// Compose `middlewares` around `endpoint`.
///
/// `middlewares[0]` is outermost: it sees the call first, then `middlewares[1]`, and so on down
/// to the endpoint.
pub fn chain(middlewares: &[Middleware], endpoint: SharedHandler) -> SharedHandler {
    middlewares
        .iter()
        .rev()
        .fold(endpoint, |next, wrap| wrap(next))
}

pub fn handler_fn<F>(f: F) -> SharedHandler
where
    F: Fn(&mut dyn Response, &Request) + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handler that ignores its input and writes a fixed status.
pub fn error_handler(status: u16, message: impl Into<String>) -> SharedHandler {
    let message = message.into();
    handler_fn(move |resp, _req| resp.write(status, &message))
}

#[cfg(test)]
#[path = "../../tests/unit/handler/chain.rs"]
mod tests;
