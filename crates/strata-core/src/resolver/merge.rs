//! Deep merge of decoded values

use crate::types::Value;

/// Merge `overlay` on top of `base`
///
/// Two mappings merge key by key, recursing where both sides hold a mapping.
/// Any other pairing is won outright by `overlay`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => {
                        let old = std::mem::take(existing);
                        *existing = deep_merge(old, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Left fold of `values` with [`deep_merge`], lowest precedence first
///
/// Top-level nulls (e.g. an empty YAML file) contribute nothing. Returns
/// `None` when nothing contributed.
pub fn merge_all(values: impl IntoIterator<Item = Value>) -> Option<Value> {
    values
        .into_iter()
        .filter(|value| !value.is_null())
        .fold(None, |acc, value| match acc {
            None => Some(value),
            Some(acc) => Some(deep_merge(acc, value)),
        })
}
