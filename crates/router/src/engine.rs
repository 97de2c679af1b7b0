//! The composition root tying the router and the route groups together.
//!
//! An [`Engine`] is built once before serving: routes and middleware are registered
//! through its root group or through child groups. Afterwards it is only read, so it
//! can be shared by every connection task behind an `Arc`.
//!
//! # Examples
//!
//! ```no_run
//! use http::StatusCode;
//! use micro_router::{handler_fn, Engine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::with_defaults();
//!     engine.get("/", handler_fn(|ctx| {
//!         Box::pin(async move {
//!             ctx.html(StatusCode::OK, "<h1>Hello</h1>");
//!             Ok(())
//!         })
//!     }))?;
//!
//!     let mut v1 = engine.group("/v1");
//!     v1.get("/hello/:name", handler_fn(|ctx| {
//!         Box::pin(async move {
//!             let name = ctx.param("name").unwrap_or_default().to_owned();
//!             ctx.string(StatusCode::OK, format!("hello {name}\n"));
//!             Ok(())
//!         })
//!     }))?;
//!
//!     engine.run("127.0.0.1:8080").await?;
//!     Ok(())
//! }
//! ```

use crate::body::ResponseBody;
use crate::group::{method_route, GroupEntry, GroupId, RouterGroup};
use crate::handler::Handler;
use crate::middleware::{Logger, Recovery};
use crate::router::{PatternError, Router};
use crate::server::{Server, ServerBuildError};
use crate::Context;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use std::fmt;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tracing::{error, info};

/// Callback invoked after every successful route registration
pub type RouteHook = Box<dyn Fn(&Method, &str) + Send + Sync>;

pub struct Engine {
    router: Router,
    groups: Vec<GroupEntry>,
    route_hook: Option<RouteHook>,
}

impl Engine {
    /// Creates an engine without middleware
    pub fn new() -> Self {
        Self { router: Router::new(), groups: vec![GroupEntry::new(String::new(), None)], route_hook: None }
    }

    /// Creates an engine with [`Recovery`] and [`Logger`] installed on the root group and
    /// route registrations logged
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine
            .on_route(|method, pattern| info!(method = %method, pattern, "route registered"))
            .use_middleware(Recovery::new())
            .use_middleware(Logger);
        engine
    }

    /// Installs the callback observing route registrations, replacing the previous one
    pub fn on_route<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Method, &str) + Send + Sync + 'static,
    {
        self.route_hook = Some(Box::new(hook));
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The root group, its prefix is empty
    pub fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup::new(self, GroupId::ROOT)
    }

    /// Reopens a previously created group
    pub fn group_mut(&mut self, id: GroupId) -> Option<RouterGroup<'_>> {
        if id.0 >= self.groups.len() {
            return None;
        }
        Some(RouterGroup::new(self, id))
    }

    /// Creates a child group of the root group
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let id = self.create_group(GroupId::ROOT, prefix);
        RouterGroup::new(self, id)
    }

    /// Appends a middleware to the root group, it applies to every request
    pub fn use_middleware<H: Handler + 'static>(&mut self, middleware: H) -> &mut Self {
        self.root().use_middleware(middleware);
        self
    }

    pub fn add_route<H: Handler + 'static>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, PatternError> {
        self.root().add_route(method, pattern, handler)?;
        Ok(self)
    }

    method_route!(get, GET);
    method_route!(post, POST);
    method_route!(put, PUT);
    method_route!(delete, DELETE);
    method_route!(patch, PATCH);
    method_route!(head, HEAD);
    method_route!(options, OPTIONS);

    pub(crate) fn group_entry(&self, id: GroupId) -> &GroupEntry {
        &self.groups[id.0]
    }

    pub(crate) fn group_entry_mut(&mut self, id: GroupId) -> &mut GroupEntry {
        &mut self.groups[id.0]
    }

    pub(crate) fn create_group(&mut self, parent: GroupId, prefix: &str) -> GroupId {
        let prefix = format!("{}{}", self.group_entry(parent).prefix, prefix);
        self.groups.push(GroupEntry::new(prefix, Some(parent)));
        GroupId(self.groups.len() - 1)
    }

    pub(crate) fn register(&mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) -> Result<(), PatternError> {
        self.router.add_route(method.clone(), pattern, handler)?;
        if let Some(hook) = &self.route_hook {
            hook(&method, pattern);
        }
        Ok(())
    }

    /// Middleware of every group whose prefix is a prefix of `path`, in group creation order
    fn middlewares_for(&self, path: &str) -> Vec<Arc<dyn Handler>> {
        self.groups
            .iter()
            .filter(|group| path.starts_with(group.prefix.as_str()))
            .flat_map(|group| group.middlewares.iter().map(Arc::clone))
            .collect()
    }

    /// Runs the handler chain for one request and returns the response it wrote.
    ///
    /// An error escaping the chain is logged and answered with a `500`.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<ResponseBody> {
        let mut ctx = Context::new(request, Vec::new());
        let middlewares = self.middlewares_for(ctx.path());
        ctx.extend_handlers(middlewares);

        if let Err(e) = self.router.handle(&mut ctx).await {
            error!(cause = %e, method = %ctx.method(), path = ctx.path(), "handler chain failed");
            ctx.reset_response();
            ctx.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }

        ctx.into_response()
    }

    /// Serves this engine on `address` until the process stops
    pub async fn run<A: ToSocketAddrs>(self, address: A) -> Result<(), ServerBuildError> {
        Server::builder().engine(self).address(address).build()?.start().await;
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("router", &self.router)
            .field("groups", &self.groups.iter().map(|group| group.prefix.as_str()).collect::<Vec<_>>())
            .field("route_hook", &self.route_hook.is_some())
            .finish()
    }
}
