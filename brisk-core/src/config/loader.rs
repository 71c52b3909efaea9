use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

pub(crate) type Values = HashMap<String, ConfigValue>;

/// Merge a YAML file into `values`. A missing file is not an error.
pub(crate) fn merge_yaml_file(path: &Path, values: &mut Values) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    merge_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

pub(crate) fn merge_yaml_str(content: &str, values: &mut Values) -> Result<(), ConfigError> {
    let tree: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten("", &tree, values);
    Ok(())
}

/// Flatten nested mappings into dot-separated keys (`server.addr`).
///
/// Sequences are stored whole under their key.
fn flatten(prefix: &str, node: &serde_yaml::Value, out: &mut Values) {
    match node {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(&key, v, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
        }
        _ => {}
    }
}

/// `SERVER_BODY_LIMIT` -> `server.body.limit`; both spellings are checked on lookup.
pub(crate) fn env_key(name: &str) -> String {
    name.to_lowercase().replace('_', ".")
}
