//! Minimal JSON path lookups for assertions: `errors[0].field`,
//! `items.len()`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
    /// `len()`: element count of an array or object, byte length of a string.
    Len,
}

impl PathStep {
    /// Split a path into steps. Panics on malformed indices: paths are
    /// written by test authors.
    pub fn parse(path: &str) -> Vec<PathStep> {
        let mut steps = Vec::new();
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            if segment == "len()" {
                steps.push(PathStep::Len);
                continue;
            }
            let (key, mut indices) = match segment.find('[') {
                Some(at) => segment.split_at(at),
                None => (segment, ""),
            };
            if !key.is_empty() {
                steps.push(PathStep::Key(key.to_string()));
            }
            while let Some(rest) = indices.strip_prefix('[') {
                let Some(close) = rest.find(']') else {
                    panic!("unclosed `[` in JSON path {path:?}");
                };
                let index = rest[..close]
                    .parse()
                    .unwrap_or_else(|_| panic!("bad index in JSON path {path:?}"));
                steps.push(PathStep::Index(index));
                indices = &rest[close + 1..];
            }
        }
        steps
    }
}

/// Follow `path` from `root`. Missing keys and indices give `Value::Null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root.clone();
    for step in PathStep::parse(path) {
        current = match step {
            PathStep::Key(key) => current.get(&key).cloned().unwrap_or(Value::Null),
            PathStep::Index(index) => current.get(index).cloned().unwrap_or(Value::Null),
            PathStep::Len => match &current {
                Value::Array(items) => Value::from(items.len()),
                Value::Object(map) => Value::from(map.len()),
                Value::String(s) => Value::from(s.len()),
                other => panic!("len() of a non-collection in {path:?}: {other}"),
            },
        };
    }
    current
}
