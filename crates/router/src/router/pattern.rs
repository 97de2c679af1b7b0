//! Route pattern parsing and registration-time validation.
//!
//! A pattern is a `/` separated list of segments:
//! - `users` matches the literal text only
//! - `:id` matches exactly one segment and binds it to `id`
//! - `*filepath` matches every remaining segment and binds them, joined by `/`, to `filepath`
//!
//! A `*` segment must be the last one. A bare `*` matches the tail without binding it.

use std::collections::HashSet;
use thiserror::Error;

/// Errors reported when a route pattern is registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern '{pattern}' has a parameter segment without a name")]
    EmptyParamName { pattern: String },

    #[error("pattern '{pattern}': wildcard segment '{segment}' must be the last segment")]
    WildcardNotLast { pattern: String, segment: String },

    #[error("pattern '{pattern}' binds parameter '{name}' more than once")]
    DuplicateParamName { pattern: String, name: String },

    #[error("pattern '{pattern}' conflicts with registered route segment '{existing}'")]
    Conflict { pattern: String, existing: String },
}

impl PatternError {
    pub(crate) fn conflict(pattern: &str, existing: &str) -> Self {
        Self::Conflict { pattern: pattern.to_owned(), existing: existing.to_owned() }
    }
}

/// Splits a pattern or request path into its non-empty segments.
///
/// Collection stops right after the first segment starting with `*`, that segment
/// swallows everything behind it.
pub fn parse_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for part in pattern.split('/').filter(|part| !part.is_empty()) {
        parts.push(part);
        if part.starts_with('*') {
            break;
        }
    }
    parts
}

/// Validates a route pattern and returns its segments.
pub fn validate_pattern(pattern: &str) -> Result<Vec<&str>, PatternError> {
    let all_parts = pattern.split('/').filter(|part| !part.is_empty()).collect::<Vec<_>>();
    let mut names = HashSet::new();

    for (index, part) in all_parts.iter().enumerate() {
        if let Some(name) = part.strip_prefix(':') {
            if name.is_empty() {
                return Err(PatternError::EmptyParamName { pattern: pattern.to_owned() });
            }
            if !names.insert(name) {
                return Err(PatternError::DuplicateParamName { pattern: pattern.to_owned(), name: name.to_owned() });
            }
        } else if let Some(name) = part.strip_prefix('*') {
            if index + 1 != all_parts.len() {
                return Err(PatternError::WildcardNotLast { pattern: pattern.to_owned(), segment: (*part).to_owned() });
            }
            if !name.is_empty() && !names.insert(name) {
                return Err(PatternError::DuplicateParamName { pattern: pattern.to_owned(), name: name.to_owned() });
            }
        }
    }

    Ok(all_parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern() {
        assert_eq!(parse_pattern("/"), Vec::<&str>::new());
        assert_eq!(parse_pattern(""), Vec::<&str>::new());
        assert_eq!(parse_pattern("/p/:lang/doc"), vec!["p", ":lang", "doc"]);
        assert_eq!(parse_pattern("//p///doc/"), vec!["p", "doc"]);
    }

    #[test]
    fn test_parse_pattern_stops_at_wildcard() {
        assert_eq!(parse_pattern("/static/*filepath"), vec!["static", "*filepath"]);
        assert_eq!(parse_pattern("/static/*/css/a.css"), vec!["static", "*"]);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert_eq!(validate_pattern("/static/*filepath").unwrap(), vec!["static", "*filepath"]);
        assert_eq!(validate_pattern("/assets/*").unwrap(), vec!["assets", "*"]);
        assert_eq!(validate_pattern("/a/:x/b/:y").unwrap(), vec!["a", ":x", "b", ":y"]);
    }

    #[test]
    fn test_validate_rejects_inner_wildcard() {
        let error = validate_pattern("/static/*filepath/more").unwrap_err();
        assert_eq!(
            error,
            PatternError::WildcardNotLast { pattern: "/static/*filepath/more".into(), segment: "*filepath".into() }
        );
    }

    #[test]
    fn test_validate_rejects_empty_param_name() {
        assert_eq!(validate_pattern("/a/:").unwrap_err(), PatternError::EmptyParamName { pattern: "/a/:".into() });
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        assert!(matches!(
            validate_pattern("/a/:id/b/:id"),
            Err(PatternError::DuplicateParamName { name, .. }) if name == "id"
        ));
        assert!(matches!(
            validate_pattern("/a/:rest/*rest"),
            Err(PatternError::DuplicateParamName { name, .. }) if name == "rest"
        ));
    }
}
