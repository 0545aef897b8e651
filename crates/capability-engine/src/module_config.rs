use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    path::Path,
};

use anyhow::Result;
use serde::Deserialize;

use crate::admission_request::GroupVersionKind;

/// Process-wide module configuration, read once at startup and passed by
/// reference into every processing invocation. Never mutated while
/// requests are in flight.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Stable module identifier, used as the middle segment of the
    /// execution annotations stamped on mutated objects.
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub always_ignore: IgnoreRules,

    /// When set, the first failing callback rejects the whole request
    /// instead of downgrading to a warning.
    #[serde(default)]
    pub reject_on_error: bool,
}

/// Global ignores. These override binding-level matches so cluster
/// operators keep a hard opt-out that capabilities cannot undo.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreRules {
    /// GVK entries; an empty group or version wildcards that dimension.
    #[serde(default)]
    pub kinds: Vec<GroupVersionKind>,

    #[serde(default)]
    pub namespaces: BTreeSet<String>,

    /// Label matchers. A request is ignored when any matcher has all of
    /// its key/value pairs present on the object's metadata labels.
    #[serde(default)]
    pub labels: Vec<BTreeMap<String, String>>,
}

impl IgnoreRules {
    pub fn ignores_kind(&self, kind: &GroupVersionKind) -> bool {
        self.kinds.iter().any(|entry| {
            entry.kind == kind.kind
                && (entry.group.is_empty() || entry.group == kind.group)
                && (entry.version.is_empty() || entry.version == kind.version)
        })
    }

    pub fn ignores_namespace(&self, namespace: &str) -> bool {
        !namespace.is_empty() && self.namespaces.contains(namespace)
    }
}

/// Reads the module configuration file. The key names follow the wire
/// casing of the admission types.
pub fn read_module_config_file(path: &Path) -> Result<ModuleConfig> {
    let config_file = File::open(path)?;
    let config: ModuleConfig = serde_yaml::from_reader(&config_file)?;
    Ok(config)
}
