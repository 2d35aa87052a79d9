use indexmap::IndexMap;

/// Keys a node carries beyond the keywords the model declares.
///
/// Deserialized with `#[serde(flatten)]`, so this holds every unrecognised key;
/// [`vendor`] narrows it to `x-*` entries.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Only the `x-*` vendor extensions, in document order.
pub fn vendor(extensions: &Extensions) -> Extensions {
    extensions
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Whether any of `keys` is present with a truthy value (`true`, or any non-bool value).
pub fn flagged(extensions: &Extensions, keys: &[String]) -> bool {
    keys.iter().any(|key| match extensions.get(key) {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Null) | None => false,
        Some(_) => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vendor_filters_non_extension_keys() {
        let mut ext = Extensions::new();
        ext.insert("minimum".to_string(), json!(0));
        ext.insert("x-internal".to_string(), json!(true));
        let v = vendor(&ext);
        assert_eq!(v.len(), 1);
        assert!(v.contains_key("x-internal"));
    }

    #[test]
    fn flagged_respects_false() {
        let mut ext = Extensions::new();
        ext.insert("x-open-enum".to_string(), json!(false));
        assert!(!flagged(&ext, &["x-open-enum".to_string()]));
        ext.insert("x-extensible-enum".to_string(), json!(["extra"]));
        assert!(flagged(
            &ext,
            &["x-open-enum".to_string(), "x-extensible-enum".to_string()]
        ));
    }
}
