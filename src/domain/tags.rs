//! Tags and reserved tag namespaces
//!
//! Tracking servers send tags (and params) as `[{"key": .., "value": ..}]`
//! lists. Inside the crate they are sorted maps so every manifest written
//! from them is deterministic.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Sorted tag map (key -> value)
pub type TagMap = BTreeMap<String, String>;

/// Namespace root for lineage tags injected by this tool
pub const LINEAGE_PREFIX: &str = "mlflow_exim";

/// Namespace of tracking-server system tags
pub const SYSTEM_PREFIX: &str = "mlflow.";

/// Source run tags carried over as lineage when present
pub const WORKSPACE_RUN_TAGS: [&str; 4] = [
    "mlflow.databricks.workspaceURL",
    "mlflow.databricks.webappURL",
    "mlflow.databricks.workspaceID",
    "mlflow.user",
];

/// A single key/value tag as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key
    pub key: String,

    /// Tag value
    #[serde(default)]
    pub value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Build a lineage tag key under the reserved namespace
///
/// ```
/// use mlmigrate::domain::tags::lineage_key;
///
/// assert_eq!(lineage_key("src_version.name"), "mlflow_exim.src_version.name");
/// ```
pub fn lineage_key(suffix: &str) -> String {
    format!("{LINEAGE_PREFIX}.{suffix}")
}

/// Whether a key belongs to the lineage namespace
pub fn is_lineage_key(key: &str) -> bool {
    key.strip_prefix(LINEAGE_PREFIX)
        .map(|rest| rest.starts_with('.') || rest.starts_with('_'))
        .unwrap_or(false)
}

/// Whether a key is a tracking-server system tag
pub fn is_system_key(key: &str) -> bool {
    key.starts_with(SYSTEM_PREFIX)
}

/// Replace every `.` in tag keys with `_`
///
/// Catalog-style registries reject `.` in model version tag keys. Values are
/// left untouched. Keys that collide after sanitizing keep the value of the
/// key that sorts last; the overwritten key is logged.
pub fn sanitize_keys(tags: TagMap) -> TagMap {
    let mut sanitized = TagMap::new();
    for (key, value) in tags {
        let new_key = key.replace('.', "_");
        if let Some(dropped) = sanitized.insert(new_key.clone(), value) {
            tracing::warn!(
                key = %key,
                sanitized_key = %new_key,
                dropped_value = %dropped,
                "Tag key collides with another key after sanitizing, earlier value overwritten"
            );
        }
    }
    sanitized
}

/// Convert a tag map to the wire list form
pub fn to_tag_list(tags: &TagMap) -> Vec<Tag> {
    tags.iter().map(|(k, v)| Tag::new(k.clone(), v.clone())).collect()
}

/// Deserialize either a `[{key, value}]` list, a plain map, or null into a
/// sorted map
pub fn deserialize_tag_map<'de, D>(deserializer: D) -> Result<TagMap, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<Tag>),
        Map(TagMap),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::List(list)) => list.into_iter().map(|t| (t.key, t.value)).collect(),
        Some(Repr::Map(map)) => map,
        None => TagMap::new(),
    })
}
