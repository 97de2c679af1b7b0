//! Prefix tree used to match request paths against registered route patterns.
//!
//! Every node stands for one path segment. Only the node where a registered pattern
//! ends carries that pattern, nodes that were merely passed through keep it empty.

use super::pattern::PatternError;

#[derive(Debug, Default, Clone)]
pub struct Node {
    /// full route pattern, only set on the node that terminates a registered route
    pattern: String,
    /// the segment this node represents, e.g. `users`, `:id`, `*filepath`
    part: String,
    children: Vec<Node>,
    /// `part` starts with `:` or `*`
    is_wild: bool,
}

impl Node {
    /// Creates an empty root node
    pub fn root() -> Self {
        Self::default()
    }

    fn with_part(part: &str) -> Self {
        Self { part: part.to_owned(), is_wild: part.starts_with(':') || part.starts_with('*'), ..Self::default() }
    }

    /// The registered pattern ending at this node, empty for pass-through nodes
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn is_wild(&self) -> bool {
        self.is_wild
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// First child that can take `part` during insertion.
    ///
    /// A wildcard child accepts any segment, so a level never grows a second wildcard branch.
    fn match_child(&self, part: &str) -> Option<usize> {
        self.children.iter().position(|child| child.part == part || child.is_wild)
    }

    /// Registers `pattern`, whose segments are `parts`, below this node starting at `height`.
    ///
    /// Registering the same pattern twice is allowed and leaves the tree unchanged. A pattern
    /// that would end on another pattern's node, or whose segment would be absorbed by a
    /// wildcard child spelled differently, is rejected before the tree is touched.
    pub fn insert(&mut self, pattern: &str, parts: &[&str], height: usize) -> Result<(), PatternError> {
        self.check_conflict(pattern, parts, height)?;
        self.insert_unchecked(pattern, parts, height);
        Ok(())
    }

    fn check_conflict(&self, pattern: &str, parts: &[&str], height: usize) -> Result<(), PatternError> {
        let Some(part) = parts.get(height) else {
            if self.pattern.is_empty() || self.pattern == pattern {
                return Ok(());
            }
            return Err(PatternError::conflict(pattern, &self.pattern));
        };

        match self.match_child(part) {
            Some(index) => {
                let child = &self.children[index];
                if child.is_wild && child.part != *part {
                    return Err(PatternError::conflict(pattern, &child.part));
                }
                child.check_conflict(pattern, parts, height + 1)
            }
            // a fresh branch can't collide with anything
            None => Ok(()),
        }
    }

    fn insert_unchecked(&mut self, pattern: &str, parts: &[&str], height: usize) {
        let Some(part) = parts.get(height) else {
            self.pattern = pattern.to_owned();
            return;
        };

        let index = match self.match_child(part) {
            Some(index) => index,
            None => {
                self.children.push(Node::with_part(part));
                self.children.len() - 1
            }
        };
        self.children[index].insert_unchecked(pattern, parts, height + 1);
    }

    /// Finds the node whose pattern matches the request segments `parts`.
    ///
    /// All candidate children are tried in insertion order: a branch that matches a
    /// segment may still fail deeper down while a sibling succeeds.
    pub fn search(&self, parts: &[&str], height: usize) -> Option<&Node> {
        if parts.len() == height || self.part.starts_with('*') {
            if self.pattern.is_empty() {
                return None;
            }
            return Some(self);
        }

        let part = parts[height];
        self.children
            .iter()
            .filter(|child| child.part == part || child.is_wild)
            .find_map(|child| child.search(parts, height + 1))
    }

    /// Collects every node in this subtree that terminates a registered pattern
    pub fn travel<'a>(&'a self, list: &mut Vec<&'a Node>) {
        if !self.pattern.is_empty() {
            list.push(self);
        }
        for child in &self.children {
            child.travel(list);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use crate::router::pattern::{parse_pattern, PatternError};

    fn insert(root: &mut Node, pattern: &str) -> Result<(), PatternError> {
        root.insert(pattern, &parse_pattern(pattern), 0)
    }

    fn search<'a>(root: &'a Node, path: &str) -> Option<&'a str> {
        root.search(&parse_pattern(path), 0).map(Node::pattern)
    }

    fn build(patterns: &[&str]) -> Node {
        let mut root = Node::root();
        for pattern in patterns {
            insert(&mut root, pattern).unwrap();
        }
        root
    }

    #[test]
    fn test_insert_shares_prefixes() {
        let root = build(&["/p/:lang/doc", "/p/:lang/intro", "/hello"]);

        // root, p, :lang, doc, intro, hello
        assert_eq!(root.count(), 6);
        assert_eq!(root.children().len(), 2);

        let lang = &root.children()[0].children()[0];
        assert_eq!(lang.part(), ":lang");
        assert!(lang.is_wild());
        assert_eq!(lang.pattern(), "");
        assert_eq!(lang.children()[0].pattern(), "/p/:lang/doc");
    }

    #[test]
    fn test_root_pattern_terminates_at_root() {
        let root = build(&["/"]);
        assert_eq!(root.count(), 1);
        assert_eq!(root.pattern(), "/");
        assert_eq!(search(&root, "/"), Some("/"));
    }

    #[test]
    fn test_search_static_and_param() {
        let root = build(&["/", "/hello", "/hello/:name", "/assets/*filepath"]);

        assert_eq!(search(&root, "/hello"), Some("/hello"));
        assert_eq!(search(&root, "/hello/alice"), Some("/hello/:name"));
        assert_eq!(search(&root, "/assets/css/a.css"), Some("/assets/*filepath"));
        assert_eq!(search(&root, "/hello/alice/more"), None);
    }

    #[test]
    fn test_pass_through_node_is_not_an_endpoint() {
        let root = build(&["/p/:lang/doc"]);
        assert_eq!(search(&root, "/p"), None);
        assert_eq!(search(&root, "/p/go"), None);
        assert_eq!(search(&root, "/p/go/doc"), Some("/p/:lang/doc"));
    }

    #[test]
    fn test_wildcard_needs_at_least_one_segment() {
        let root = build(&["/static/*filepath"]);
        assert_eq!(search(&root, "/static"), None);
        assert_eq!(search(&root, "/static/a"), Some("/static/*filepath"));
    }

    #[test]
    fn test_literal_registered_first_is_preferred() {
        let root = build(&["/users/new", "/users/:id"]);
        assert_eq!(search(&root, "/users/new"), Some("/users/new"));
        assert_eq!(search(&root, "/users/42"), Some("/users/:id"));
    }

    #[test]
    fn test_search_backtracks_to_later_sibling() {
        let root = build(&["/a/b/c", "/a/:x/d"]);
        assert_eq!(search(&root, "/a/b/c"), Some("/a/b/c"));
        assert_eq!(search(&root, "/a/b/d"), Some("/a/:x/d"));
        assert_eq!(search(&root, "/a/z/c"), None);
    }

    #[test]
    fn test_reinsert_same_pattern_keeps_shape() {
        let mut root = build(&["/p/:lang/doc"]);
        let count = root.count();
        insert(&mut root, "/p/:lang/doc").unwrap();
        assert_eq!(root.count(), count);
    }

    #[test]
    fn test_conflicts_are_rejected_without_touching_the_tree() {
        let mut root = build(&["/users/:id", "/static/*filepath"]);
        let count = root.count();

        assert_eq!(
            insert(&mut root, "/users/new"),
            Err(PatternError::Conflict { pattern: "/users/new".into(), existing: ":id".into() })
        );
        assert!(insert(&mut root, "/users/:name").is_err());
        assert!(insert(&mut root, "/users/:uid/posts").is_err());
        assert!(insert(&mut root, "/static/js").is_err());
        assert_eq!(root.count(), count);

        // same segments spelled differently end on the same node
        assert_eq!(
            insert(&mut root, "/users//:id"),
            Err(PatternError::Conflict { pattern: "/users//:id".into(), existing: "/users/:id".into() })
        );
    }

    #[test]
    fn test_travel_lists_endpoints() {
        let root = build(&["/", "/a/b", "/a/:x/d"]);
        let mut list = Vec::new();
        root.travel(&mut list);
        let patterns = list.into_iter().map(Node::pattern).collect::<Vec<_>>();
        assert_eq!(patterns, vec!["/", "/a/b", "/a/:x/d"]);
    }
}
