use serde_json::Value;

/// Recursively merges `patch` into `base`.
///
/// Objects are merged key by key; any other value in `patch` (including
/// arrays and `null`) replaces what `base` holds at that position.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, patch_value),
                    None => {
                        base_map.insert(key, patch_value);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}
