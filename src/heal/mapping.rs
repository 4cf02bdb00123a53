use std::path::Path;

use serde_json::{Map, Value};

use crate::error::HealError;

/// JSON layout of a mapping file, kept so a rewrite writes back what it read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingShape {
    /// `{"btnEnviar": "#botaoEnviar", ...}`
    Object,
    /// `[{"nome": "btnEnviar", "selector": "#botaoEnviar"}, ...]`
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorEntry {
    pub logical_name: String,
    pub selector: String,
    /// Any other keys of a list item, written back untouched
    pub extra: Map<String, Value>,
}

impl SelectorEntry {
    pub fn new(logical_name: &str, selector: &str) -> Self {
        Self {
            logical_name: logical_name.to_string(),
            selector: selector.to_string(),
            extra: Map::new(),
        }
    }
}

/// Logical name -> selector, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalMapping {
    pub shape: MappingShape,
    pub entries: Vec<SelectorEntry>,
}

impl LogicalMapping {
    pub fn new(shape: MappingShape) -> Self {
        Self {
            shape,
            entries: Vec::new(),
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            shape: MappingShape::Object,
            entries: pairs.iter().map(|(n, s)| SelectorEntry::new(n, s)).collect(),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, HealError> {
        match value {
            Value::Object(map) => {
                let entries = map
                    .into_iter()
                    .map(|(name, selector)| match selector {
                        Value::String(s) => Ok(SelectorEntry::new(&name, &s)),
                        other => Err(HealError::MappingShape(format!(
                            "selector for '{name}' is {other}, expected a string"
                        ))),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Self {
                    shape: MappingShape::Object,
                    entries,
                })
            }
            Value::Array(items) => {
                let entries = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| list_entry(i, item))
                    .collect::<Result<_, _>>()?;
                Ok(Self {
                    shape: MappingShape::List,
                    entries,
                })
            }
            other => Err(HealError::MappingShape(format!(
                "expected an object or an array at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn to_value(&self) -> Value {
        match self.shape {
            MappingShape::Object => Value::Object(
                self.entries
                    .iter()
                    .map(|e| (e.logical_name.clone(), Value::String(e.selector.clone())))
                    .collect(),
            ),
            MappingShape::List => Value::Array(
                self.entries
                    .iter()
                    .map(|e| {
                        let mut item = Map::new();
                        item.insert("nome".into(), Value::String(e.logical_name.clone()));
                        item.insert("selector".into(), Value::String(e.selector.clone()));
                        for (k, v) in &e.extra {
                            item.insert(k.clone(), v.clone());
                        }
                        Value::Object(item)
                    })
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, logical_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.logical_name == logical_name)
            .map(|e| e.selector.as_str())
    }

    /// Overwrite an existing entry, or append a new one.
    pub fn set(&mut self, logical_name: &str, selector: &str) {
        match self.entries.iter_mut().find(|e| e.logical_name == logical_name) {
            Some(entry) => entry.selector = selector.to_string(),
            None => self.entries.push(SelectorEntry::new(logical_name, selector)),
        }
    }

    /// Drop every entry with this name. Returns whether anything was removed.
    pub fn remove(&mut self, logical_name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.logical_name != logical_name);
        self.entries.len() != before
    }

    pub fn load(path: &Path) -> Result<Self, HealError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => HealError::MappingNotFound(path.to_path_buf()),
            _ => HealError::MappingRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let value: Value = serde_json::from_str(&raw).map_err(|e| HealError::MappingParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_value(value)
    }

    pub fn save(&self, path: &Path) -> Result<(), HealError> {
        let json = serde_json::to_string_pretty(&self.to_value())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn list_entry(index: usize, item: Value) -> Result<SelectorEntry, HealError> {
    let Value::Object(mut fields) = item else {
        return Err(HealError::MappingShape(format!(
            "item {index} is {}, expected an object with 'nome' and 'selector'",
            json_kind(&item)
        )));
    };

    let mut take = |key: &str| match fields.remove(key) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(HealError::MappingShape(format!(
            "item {index} has no string '{key}'"
        ))),
    };
    let logical_name = take("nome")?;
    let selector = take("selector")?;

    Ok(SelectorEntry {
        logical_name,
        selector,
        extra: fields,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_shape_keeps_key_order() {
        let mapping = LogicalMapping::from_value(json!({"zeta": "#z", "alpha": "#a"})).unwrap();
        assert_eq!(mapping.shape, MappingShape::Object);
        let names: Vec<_> = mapping.entries.iter().map(|e| e.logical_name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(mapping.to_value().to_string(), r##"{"zeta":"#z","alpha":"#a"}"##);
    }

    #[test]
    fn list_shape_keeps_extra_fields() {
        let raw = json!([{"nome": "btn", "selector": "#b", "descricao": "send"}]);
        let mapping = LogicalMapping::from_value(raw.clone()).unwrap();
        assert_eq!(mapping.shape, MappingShape::List);
        assert_eq!(mapping.get("btn"), Some("#b"));
        assert_eq!(mapping.to_value(), raw);
    }

    #[test]
    fn rejects_scalars_and_bad_items() {
        assert!(matches!(
            LogicalMapping::from_value(json!(3)),
            Err(HealError::MappingShape(_))
        ));
        assert!(matches!(
            LogicalMapping::from_value(json!([{"nome": "x"}])),
            Err(HealError::MappingShape(_))
        ));
        assert!(matches!(
            LogicalMapping::from_value(json!({"x": 1})),
            Err(HealError::MappingShape(_))
        ));
    }

    #[test]
    fn set_and_remove() {
        let mut mapping = LogicalMapping::from_pairs(&[("a", "#a")]);
        mapping.set("a", "#a2");
        mapping.set("b", "#b");
        assert_eq!(mapping.get("a"), Some("#a2"));
        assert_eq!(mapping.len(), 2);
        assert!(mapping.remove("a"));
        assert!(!mapping.remove("a"));
    }
}
