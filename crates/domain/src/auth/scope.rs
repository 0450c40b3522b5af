//! Scope set helpers.
//!
//! A session satisfies a request when the requested scopes are a subset of
//! the granted ones. When a new session has to be requested, the ask is the
//! union of what the current session already holds, what is being requested
//! now, and the configured defaults, so scopes never shrink.

use std::collections::BTreeSet;

use super::session::Session;

/// Ordered set of scope identifiers.
pub type ScopeSet = BTreeSet<String>;

/// Builds a scope set from anything string-like.
pub fn scope_set<I, S>(scopes: I) -> ScopeSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    scopes.into_iter().map(Into::into).collect()
}

/// Returns true if `existing` covers every scope in `required`.
///
/// Vacuously true when nothing is required.
#[must_use]
pub fn satisfies(existing: &ScopeSet, required: &ScopeSet) -> bool {
    required.is_subset(existing)
}

/// Returns true if a session exists and covers `required`.
#[must_use]
pub fn session_has_scopes(session: Option<&Session>, required: &ScopeSet) -> bool {
    session.is_some_and(|session| satisfies(session.scopes(), required))
}

/// Scopes to ask for when the current session is not good enough.
#[must_use]
pub fn extend(existing: Option<&Session>, requested: &ScopeSet, defaults: &ScopeSet) -> ScopeSet {
    let mut scopes = existing.map(|s| s.scopes().clone()).unwrap_or_default();
    scopes.extend(requested.iter().cloned());
    scopes.extend(defaults.iter().cloned());
    scopes
}

/// Splits a scope string on whitespace and commas.
#[must_use]
pub fn normalize_scopes(scope: &str) -> ScopeSet {
    scope
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Joins scopes with single spaces, in set order.
#[must_use]
pub fn join_scopes(scopes: &ScopeSet) -> String {
    scopes.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::{ProfileInfo, ProviderInfo};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn session_with(scopes: &[&str]) -> Session {
        Session {
            provider_info: ProviderInfo {
                access_token: "token".to_string(),
                id_token: None,
                scopes: scope_set(scopes.iter().copied()),
                expires_at: Utc::now(),
            },
            identity: None,
            profile: ProfileInfo::default(),
        }
    }

    #[test]
    fn test_subset_satisfies() {
        let granted = scope_set(["a", "b", "c"]);
        assert!(satisfies(&granted, &scope_set(["a", "c"])));
        assert!(satisfies(&granted, &granted));
        assert!(!satisfies(&granted, &scope_set(["a", "d"])));
    }

    #[test]
    fn test_empty_requirement_is_always_satisfied() {
        assert!(satisfies(&ScopeSet::new(), &ScopeSet::new()));
        assert!(satisfies(&scope_set(["a"]), &ScopeSet::new()));
    }

    #[test]
    fn test_session_has_scopes_requires_session() {
        assert!(!session_has_scopes(None, &ScopeSet::new()));
        let session = session_with(&["read"]);
        assert!(session_has_scopes(Some(&session), &scope_set(["read"])));
        assert!(!session_has_scopes(Some(&session), &scope_set(["write"])));
    }

    #[test]
    fn test_extend_never_shrinks() {
        let session = session_with(&["a", "b"]);
        let extended = extend(Some(&session), &scope_set(["c"]), &scope_set(["openid"]));
        assert_eq!(extended, scope_set(["a", "b", "c", "openid"]));

        let without_session = extend(None, &scope_set(["read"]), &scope_set(["openid"]));
        assert_eq!(without_session, scope_set(["openid", "read"]));
    }

    #[test]
    fn test_normalize_scopes_splits_on_space_and_comma() {
        assert_eq!(
            normalize_scopes("read:user, repo  openid,,"),
            scope_set(["openid", "read:user", "repo"])
        );
        assert!(normalize_scopes("  ").is_empty());
    }

    #[test]
    fn test_join_scopes() {
        assert_eq!(join_scopes(&scope_set(["b", "a"])), "a b");
        assert_eq!(join_scopes(&ScopeSet::new()), "");
    }
}
