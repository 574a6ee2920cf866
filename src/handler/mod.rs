//! Widget handler contract: request, response, middleware composition and the type registry.

pub mod chain;
pub mod middleware;
pub mod registry;
pub mod request;
pub mod response;

pub use chain::{Handler, Middleware, SharedHandler, chain, error_handler, handler_fn, middleware};
pub use registry::{HandlerRegistry, Registration};
pub use request::{FrameProperties, PatchProperties, Request, SearchFn};
pub use response::{BAD_REQUEST, INTERNAL, OK, Response, WidgetResponse};
