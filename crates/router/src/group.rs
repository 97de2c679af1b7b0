//! Prefix scoped route groups.
//!
//! A group owns an absolute path prefix and an ordered list of middleware. Groups are
//! stored in a flat registry inside the [`Engine`]; a [`RouterGroup`] is only a handle
//! to one entry of that registry. Middleware are not copied into child groups: for each
//! request the engine collects the middleware of every group whose prefix is a prefix
//! of the request path.

use crate::engine::Engine;
use crate::handler::Handler;
use crate::router::PatternError;
use http::Method;
use std::fmt;
use std::sync::Arc;

/// Identifies a group inside its engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    /// The root group, its prefix is empty so it applies to every request
    pub const ROOT: GroupId = GroupId(0);
}

pub(crate) struct GroupEntry {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<Arc<dyn Handler>>,
    pub(crate) parent: Option<GroupId>,
}

impl GroupEntry {
    pub(crate) fn new(prefix: String, parent: Option<GroupId>) -> Self {
        Self { prefix, middlewares: Vec::new(), parent }
    }
}

macro_rules! method_route {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Registers `handler` for HTTP ", stringify!($upper_case_method), " requests matching `pattern`.")]
        pub fn $method<H: Handler + 'static>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
            self.add_route(Method::$upper_case_method, pattern, handler)
        }
    };
}

pub(crate) use method_route;

/// A handle to one group of an [`Engine`].
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    id: GroupId,
}

impl<'e> RouterGroup<'e> {
    pub(crate) fn new(engine: &'e mut Engine, id: GroupId) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// The absolute prefix of this group
    pub fn prefix(&self) -> &str {
        &self.engine.group_entry(self.id).prefix
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.engine.group_entry(self.id).parent
    }

    /// Creates a child group whose prefix is this group's prefix followed by `prefix`
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let id = self.engine.create_group(self.id, prefix);
        RouterGroup::new(self.engine, id)
    }

    /// Appends a middleware to this group
    pub fn use_middleware<H: Handler + 'static>(&mut self, middleware: H) -> &mut Self {
        self.use_shared(Arc::new(middleware))
    }

    /// Appends a middleware that may also be used by other groups
    pub fn use_shared(&mut self, middleware: Arc<dyn Handler>) -> &mut Self {
        self.engine.group_entry_mut(self.id).middlewares.push(middleware);
        self
    }

    /// Registers `handler` for `method` and this group's prefix followed by `pattern`
    pub fn add_route<H: Handler + 'static>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, PatternError> {
        let pattern = format!("{}{}", self.prefix(), pattern);
        self.engine.register(method, &pattern, Arc::new(handler))?;
        Ok(self)
    }

    method_route!(get, GET);
    method_route!(post, POST);
    method_route!(put, PUT);
    method_route!(delete, DELETE);
    method_route!(patch, PATCH);
    method_route!(head, HEAD);
    method_route!(options, OPTIONS);
}

impl fmt::Debug for RouterGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.engine.group_entry(self.id);
        f.debug_struct("RouterGroup")
            .field("id", &self.id)
            .field("prefix", &entry.prefix)
            .field("middlewares", &entry.middlewares.len())
            .field("parent", &entry.parent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::group::GroupId;
    use crate::handler::handler_fn;
    use crate::{Engine, PatternError};
    use http::Method;

    fn noop() -> impl crate::Handler {
        handler_fn(|_ctx| Box::pin(async move { Ok(()) }))
    }

    #[test]
    fn test_nested_prefixes() {
        let mut engine = Engine::new();
        let mut api = engine.group("/api");
        assert_eq!(api.prefix(), "/api");
        assert_eq!(api.parent(), Some(GroupId::ROOT));

        let api_id = api.id();
        let v1 = api.group("/v1");
        assert_eq!(v1.prefix(), "/api/v1");
        assert_eq!(v1.parent(), Some(api_id));
    }

    #[test]
    fn test_routes_get_group_prefix() {
        let mut engine = Engine::new();
        {
            let mut v1 = engine.group("/v1");
            v1.get("/", noop()).unwrap().get("/hello/:name", noop()).unwrap();
            v1.group("/admin").post("/users", noop()).unwrap();
        }

        let routes = engine.router().routes();
        assert!(routes.contains(&(Method::GET, "/v1/".to_owned())));
        assert!(routes.contains(&(Method::GET, "/v1/hello/:name".to_owned())));
        assert!(routes.contains(&(Method::POST, "/v1/admin/users".to_owned())));
        assert!(engine.router().get_route(&Method::GET, "/v1").is_some());
    }

    #[test]
    fn test_invalid_pattern_in_group() {
        let mut engine = Engine::new();
        let mut assets = engine.group("/assets");
        assert!(matches!(assets.get("/*path/extra", noop()), Err(PatternError::WildcardNotLast { .. })));
    }

    #[test]
    fn test_reopen_group() {
        let mut engine = Engine::new();
        let api = engine.group("/api").id();
        engine.group("/other");

        let mut reopened = engine.group_mut(api).unwrap();
        assert_eq!(reopened.prefix(), "/api");
        reopened.put("/items/:id", noop()).unwrap();

        assert!(engine.router().get_route(&Method::PUT, "/api/items/3").is_some());
        assert!(engine.group_mut(GroupId(42)).is_none());
    }
}
