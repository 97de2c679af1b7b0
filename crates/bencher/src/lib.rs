/// A routing table together with the request paths looked up against it
#[derive(Debug, Copy, Clone)]
pub struct RouteCase {
    name: &'static str,
    group: RouteGroup,
    routes: &'static [&'static str],
    paths: &'static [&'static str],
}

impl RouteCase {
    pub const fn new(
        name: &'static str,
        group: RouteGroup,
        routes: &'static [&'static str],
        paths: &'static [&'static str],
    ) -> Self {
        Self { name, group, routes, paths }
    }

    pub const fn small(name: &'static str, routes: &'static [&'static str], paths: &'static [&'static str]) -> Self {
        Self::new(name, RouteGroup::Small, routes, paths)
    }

    pub const fn large(name: &'static str, routes: &'static [&'static str], paths: &'static [&'static str]) -> Self {
        Self::new(name, RouteGroup::Large, routes, paths)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> RouteGroup {
        self.group
    }

    pub fn routes(&self) -> &'static [&'static str] {
        self.routes
    }

    pub fn paths(&self) -> &'static [&'static str] {
        self.paths
    }
}

#[derive(Clone, Copy, Debug)]
pub enum RouteGroup {
    Small,
    Large,
}

pub static BLOG_ROUTES: &[&str] = &[
    "/",
    "/posts",
    "/posts/:id",
    "/posts/:id/comments",
    "/users/:name",
    "/login",
    "/assets/*filepath",
];

pub static BLOG_PATHS: &[&str] = &["/", "/posts/42", "/posts/42/comments", "/users/alice", "/assets/css/site.css", "/missing"];

// literal siblings are registered before the parameter sharing their position
pub static API_ROUTES: &[&str] = &[
    "/authorizations",
    "/authorizations/:id",
    "/applications/:client_id/tokens/:access_token",
    "/events",
    "/repos/:owner/:repo/events",
    "/networks/:owner/:repo/events",
    "/orgs/:org/events",
    "/users/:user/received_events",
    "/users/:user/received_events/public",
    "/users/:user/events",
    "/users/:user/events/public",
    "/users/:user/events/orgs/:org",
    "/feeds",
    "/notifications",
    "/repos/:owner/:repo/notifications",
    "/notifications/threads/:id",
    "/notifications/threads/:id/subscription",
    "/repos/:owner/:repo/stargazers",
    "/users/:user/starred",
    "/user/starred",
    "/user/starred/:owner/:repo",
    "/repos/:owner/:repo/subscribers",
    "/users/:user/subscriptions",
    "/user/subscriptions",
    "/repos/:owner/:repo/subscription",
    "/users/:user/gists",
    "/gists",
    "/gists/:id",
    "/gists/:id/star",
    "/repos/:owner/:repo/git/blobs/:sha",
    "/repos/:owner/:repo/git/commits/:sha",
    "/repos/:owner/:repo/git/refs",
    "/repos/:owner/:repo/git/tags/:sha",
    "/repos/:owner/:repo/git/trees/:sha",
    "/issues",
    "/user/issues",
    "/orgs/:org/issues",
    "/repos/:owner/:repo/issues",
    "/repos/:owner/:repo/issues/:number",
    "/repos/:owner/:repo/assignees",
    "/repos/:owner/:repo/assignees/:assignee",
    "/repos/:owner/:repo/issues/:number/comments",
    "/repos/:owner/:repo/issues/:number/events",
    "/repos/:owner/:repo/labels",
    "/repos/:owner/:repo/labels/:name",
    "/repos/:owner/:repo/milestones",
    "/repos/:owner/:repo/milestones/:number",
    "/emojis",
    "/gitignore/templates",
    "/gitignore/templates/:name",
    "/meta",
    "/rate_limit",
    "/users/:user/orgs",
    "/user/orgs",
    "/orgs/:org",
    "/orgs/:org/members",
    "/orgs/:org/members/:user",
    "/orgs/:org/teams",
    "/teams/:id",
    "/teams/:id/members",
    "/repos/:owner/:repo/pulls",
    "/repos/:owner/:repo/pulls/:number",
    "/repos/:owner/:repo/pulls/:number/commits",
    "/repos/:owner/:repo/pulls/:number/files",
    "/user/repos",
    "/users/:user/repos",
    "/orgs/:org/repos",
    "/repositories",
    "/repos/:owner/:repo",
    "/repos/:owner/:repo/contributors",
    "/repos/:owner/:repo/languages",
    "/repos/:owner/:repo/tags",
    "/repos/:owner/:repo/branches",
    "/repos/:owner/:repo/branches/:branch",
    "/repos/:owner/:repo/contents/*path",
    "/search/repositories",
    "/search/code",
    "/search/issues",
    "/search/users",
    "/user",
    "/users",
    "/user/emails",
    "/user/followers",
    "/users/:user/following/:target_user",
];

pub static API_PATHS: &[&str] = &[
    "/authorizations/12",
    "/repos/rust-lang/rust/events",
    "/users/alice/events/orgs/foldright",
    "/notifications/threads/7/subscription",
    "/repos/rust-lang/rust/git/trees/9fceb02",
    "/repos/rust-lang/rust/issues/100/comments",
    "/gitignore/templates/Rust",
    "/repos/rust-lang/rust/pulls/4242/files",
    "/repos/rust-lang/rust/contents/src/lib.rs",
    "/search/code",
    "/users/alice/following/bob",
    "/repos/rust-lang/rust/unknown",
];

pub fn create_route_cases() -> Vec<RouteCase> {
    vec![RouteCase::small("blog", BLOG_ROUTES, BLOG_PATHS), RouteCase::large("api", API_ROUTES, API_PATHS)]
}
