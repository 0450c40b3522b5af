//! Common types shared across persistence models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Current schema version of persisted sessions.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A set of strings persisted as `{"kind": "set", "values": [...]}`.
///
/// JSON has no set type; the tag lets a reader tell a set apart from an
/// ordinary list and rebuild it exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaggedRepr", into = "TaggedRepr")]
pub struct TaggedSet(pub BTreeSet<String>);

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SetKind {
    Set,
}

#[derive(Serialize, Deserialize)]
struct TaggedRepr {
    kind: SetKind,
    values: Vec<String>,
}

impl From<TaggedRepr> for TaggedSet {
    fn from(repr: TaggedRepr) -> Self {
        Self(repr.values.into_iter().collect())
    }
}

impl From<TaggedSet> for TaggedRepr {
    fn from(set: TaggedSet) -> Self {
        Self {
            kind: SetKind::Set,
            values: set.0.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tagged_set_encoding() {
        let set = TaggedSet(["b", "a"].into_iter().map(String::from).collect());
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value, json!({ "kind": "set", "values": ["a", "b"] }));
    }

    #[test]
    fn test_plain_list_is_not_a_tagged_set() {
        let result: Result<TaggedSet, _> = serde_json::from_value(json!(["a", "b"]));
        assert!(result.is_err());

        let wrong_kind: Result<TaggedSet, _> =
            serde_json::from_value(json!({ "kind": "list", "values": ["a"] }));
        assert!(wrong_kind.is_err());
    }
}
