//! Provenance tags for copied model versions

use super::capabilities::RegistryCapabilities;
use crate::domain::tags::{lineage_key, sanitize_keys, TagMap, WORKSPACE_RUN_TAGS};
use crate::domain::{ModelVersion, Run};

/// Where a copied version came from and where it went
#[derive(Debug, Clone, Copy)]
pub struct LineageContext<'a> {
    pub src_version: &'a ModelVersion,
    /// The run the source version was created from
    pub src_run: Option<&'a Run>,
    pub src_tracking_uri: &'a str,
    pub dst_tracking_uri: &'a str,
}

/// Lineage tags for a copy, keyed under the `mlflow_exim.` namespace
pub fn lineage_tags(ctx: &LineageContext<'_>) -> TagMap {
    let mut tags = TagMap::new();
    let version = ctx.src_version;

    tags.insert(lineage_key("src_version.name"), version.name.to_string());
    tags.insert(lineage_key("src_version.version"), version.version.to_string());
    tags.insert(
        lineage_key("src_version.run_id"),
        version
            .run_id
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_default(),
    );
    tags.insert(
        lineage_key("src_client.tracking_uri"),
        ctx.src_tracking_uri.to_string(),
    );
    tags.insert(
        lineage_key("dst_client.tracking_uri"),
        ctx.dst_tracking_uri.to_string(),
    );

    if let Some(run) = ctx.src_run {
        for key in WORKSPACE_RUN_TAGS {
            if let Some(value) = run.tag(key) {
                tags.insert(lineage_key(&format!("src_run.{key}")), value.to_string());
            }
        }
    }

    tags
}

/// Tags for the destination version
///
/// Source tags pass through unchanged; lineage tags are layered on top when
/// requested. Catalog-style destinations get every `.` in a key replaced
/// after injection.
pub fn destination_tags(
    ctx: &LineageContext<'_>,
    copy_lineage_tags: bool,
    dst_caps: RegistryCapabilities,
) -> TagMap {
    let mut tags = ctx.src_version.tags.clone();
    if copy_lineage_tags {
        tags.extend(lineage_tags(ctx));
    }

    if dst_caps.tag_key_sanitization_required() {
        sanitize_keys(tags)
    } else {
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelName;

    fn version() -> ModelVersion {
        serde_json::from_value(serde_json::json!({
            "name": "wine",
            "version": "3",
            "source": "s",
            "run_id": "abc",
            "tags": [{"key": "team.owner", "value": "ml"}]
        }))
        .unwrap()
    }

    fn run() -> Run {
        serde_json::from_value(serde_json::json!({
            "info": {"run_id": "abc", "experiment_id": "1"},
            "data": {"tags": [
                {"key": "mlflow.user", "value": "me@example.com"},
                {"key": "mlflow.databricks.workspaceID", "value": "42"},
                {"key": "other", "value": "x"}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn test_lineage_tags() {
        let v = version();
        let r = run();
        let ctx = LineageContext {
            src_version: &v,
            src_run: Some(&r),
            src_tracking_uri: "https://src",
            dst_tracking_uri: "https://dst",
        };

        let tags = lineage_tags(&ctx);
        assert_eq!(tags["mlflow_exim.src_version.name"], "wine");
        assert_eq!(tags["mlflow_exim.src_version.version"], "3");
        assert_eq!(tags["mlflow_exim.src_version.run_id"], "abc");
        assert_eq!(tags["mlflow_exim.src_client.tracking_uri"], "https://src");
        assert_eq!(tags["mlflow_exim.dst_client.tracking_uri"], "https://dst");
        assert_eq!(tags["mlflow_exim.src_run.mlflow.user"], "me@example.com");
        assert_eq!(tags["mlflow_exim.src_run.mlflow.databricks.workspaceID"], "42");
        assert!(!tags.contains_key("mlflow_exim.src_run.mlflow.databricks.webappURL"));
        assert!(!tags.keys().any(|k| k.ends_with("other")));
    }

    #[test]
    fn test_destination_tags_without_lineage() {
        let v = version();
        let ctx = LineageContext {
            src_version: &v,
            src_run: None,
            src_tracking_uri: "a",
            dst_tracking_uri: "b",
        };
        let classic = RegistryCapabilities::for_model(&ModelName::new("wine").unwrap());

        let tags = destination_tags(&ctx, false, classic);
        assert_eq!(tags, v.tags);
    }

    #[test]
    fn test_destination_tags_catalog_sanitized() {
        let v = version();
        let r = run();
        let ctx = LineageContext {
            src_version: &v,
            src_run: Some(&r),
            src_tracking_uri: "a",
            dst_tracking_uri: "b",
        };
        let catalog = RegistryCapabilities::for_model(&ModelName::new("main.ml.wine").unwrap());

        let tags = destination_tags(&ctx, true, catalog);
        assert!(tags.keys().all(|k| !k.contains('.')));
        assert_eq!(tags["team_owner"], "ml");
        assert_eq!(tags["mlflow_exim_src_run_mlflow_user"], "me@example.com");
    }
}
