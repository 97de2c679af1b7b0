//! Method aware route registration and resolution.
//!
//! Every HTTP method owns its own prefix tree. The tree only tells which pattern matched a
//! path; handlers are looked up separately by the exact key `"{method}-{pattern}"`.
//!
//! # Examples
//!
//! ```
//! use http::Method;
//! use micro_router::router::Router;
//! use micro_router::handler_fn;
//! use std::sync::Arc;
//!
//! let mut router = Router::new();
//! let doc = handler_fn(|_ctx| Box::pin(async move { Ok(()) }));
//! router.add_route(Method::GET, "/p/:lang/doc", Arc::new(doc)).unwrap();
//!
//! let (node, params) = router.get_route(&Method::GET, "/p/go/doc").unwrap();
//! assert_eq!(node.pattern(), "/p/:lang/doc");
//! assert_eq!(params.get("lang"), Some("go"));
//! ```

pub mod node;
pub mod pattern;

pub use node::Node;
pub use pattern::{parse_pattern, validate_pattern, PatternError};

use crate::handler::{Handler, HandlerResult};
use crate::{Context, PathParams};
use async_trait::async_trait;
use http::{Method, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::error;

pub struct Router {
    roots: HashMap<Method, Node>,
    handlers: HashMap<String, Arc<dyn Handler>>,
    not_found: Arc<dyn Handler>,
}

#[inline]
fn handler_key(method: &Method, pattern: &str) -> String {
    format!("{method}-{pattern}")
}

impl Router {
    pub fn new() -> Self {
        Self { roots: HashMap::new(), handlers: HashMap::new(), not_found: Arc::new(NotFound) }
    }

    /// Registers `handler` for `method` and the absolute `pattern`.
    ///
    /// Registering an identical `(method, pattern)` again replaces the handler and leaves
    /// the tree as it is. Malformed or conflicting patterns are rejected and nothing is
    /// registered.
    pub fn add_route(&mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) -> Result<(), PatternError> {
        let parts = validate_pattern(pattern)?;
        let key = handler_key(&method, pattern);

        self.roots.entry(method).or_insert_with(Node::root).insert(pattern, &parts, 0)?;
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Finds the node matching `path` under `method`, together with the bound parameters.
    ///
    /// Returns `None` when the method has no routes or no pattern matches.
    pub fn get_route(&self, method: &Method, path: &str) -> Option<(&Node, PathParams)> {
        let search_parts = parse_pattern(path);
        let root = self.roots.get(method)?;
        let node = root.search(&search_parts, 0)?;

        let mut params = PathParams::empty();
        for (index, part) in parse_pattern(node.pattern()).into_iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if let Some(value) = search_parts.get(index) {
                    params.insert(name, *value);
                }
            } else if let Some(name) = part.strip_prefix('*') {
                if !name.is_empty() {
                    params.insert(name, search_parts.get(index..).unwrap_or_default().join("/"));
                }
                break;
            }
        }

        Some((node, params))
    }

    /// The handler registered for the exact `pattern`
    pub fn handler(&self, method: &Method, pattern: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(&handler_key(method, pattern))
    }

    /// Resolves the context's request, appends the route handler (or the not found
    /// handler) to its chain and runs the chain.
    pub async fn handle(&self, ctx: &mut Context) -> HandlerResult {
        let handler = match self.get_route(ctx.method(), ctx.path()) {
            Some((node, params)) => {
                let handler = self.handler(ctx.method(), node.pattern()).map(Arc::clone);
                if handler.is_none() {
                    error!(method = %ctx.method(), pattern = node.pattern(), "matched route has no handler");
                }
                ctx.set_params(params);
                handler.unwrap_or_else(|| Arc::clone(&self.not_found))
            }
            None => Arc::clone(&self.not_found),
        };

        ctx.push_handler(handler);
        ctx.next().await
    }

    /// Every registered `(method, pattern)`, methods sorted by name, patterns in tree order
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut methods = self.roots.keys().collect::<Vec<_>>();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let mut routes = Vec::new();
        for method in methods {
            let mut nodes = Vec::new();
            self.roots[method].travel(&mut nodes);
            routes.extend(nodes.into_iter().map(|node| (method.clone(), node.pattern().to_owned())));
        }
        routes
    }

    /// Size of the tree for `method`, `0` when the method has no routes
    pub fn node_count(&self, method: &Method) -> usize {
        self.roots.get(method).map_or(0, Node::count)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("roots", &self.roots).field("handlers", &self.handlers.len()).finish()
    }
}

/// Produces the 404 response for requests no route matches
struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        let message = format!("404 NOT FOUND: {}\n", ctx.path());
        ctx.string(StatusCode::NOT_FOUND, message);
        Ok(())
    }
}
