//! A small embeddable HTTP router.
//!
//! Routes are matched by a prefix tree per method supporting static segments, `:name`
//! parameters and `*name` tail wildcards. Handlers and middleware share a single
//! [`Handler`] signature and are chained through [`Context::next`]; route groups scope
//! middleware to a path prefix.

mod body;
mod context;
mod engine;
mod error;
mod group;
mod handler;
mod request;
mod server;

pub mod middleware;
pub mod router;

pub use body::ResponseBody;
pub use context::Context;
pub use engine::Engine;
pub use engine::RouteHook;
pub use error::HandlerError;
pub use futures::future::BoxFuture;
pub use group::GroupId;
pub use group::RouterGroup;
pub use handler::handler_fn;
pub use handler::FnHandler;
pub use handler::Handler;
pub use handler::HandlerResult;
pub use request::PathParams;
pub use router::PatternError;
pub use router::Router;
pub use server::Server;
pub use server::DEFAULT_MAX_BODY_SIZE;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
