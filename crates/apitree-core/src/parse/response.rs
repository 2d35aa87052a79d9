use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::extensions::Extensions;
use super::media_type::MediaType;

/// A response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(flatten, default, skip_serializing_if = "IndexMap::is_empty")]
    pub extensions: Extensions,
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

/// The responses object: status code keys plus `x-*` extensions side by side.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Responses {
    pub entries: IndexMap<String, ResponseOrRef>,
    pub extensions: Extensions,
}

impl Responses {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.extensions.is_empty()
    }
}

impl<'de> Deserialize<'de> for Responses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut responses = Responses::default();
        for (key, value) in raw {
            if key.starts_with("x-") {
                responses.extensions.insert(key, value);
                continue;
            }
            let response = serde_json::from_value(value).map_err(|e| {
                serde::de::Error::custom(format!("invalid response '{key}': {e}"))
            })?;
            responses.entries.insert(key, response);
        }
        Ok(responses)
    }
}

impl Serialize for Responses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len() + self.extensions.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_extensions_from_status_codes() {
        let yaml = r#"
"200":
  description: ok
x-rate-limited: true
default:
  description: error
"#;
        let responses: Responses = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            responses.entries.keys().collect::<Vec<_>>(),
            vec!["200", "default"]
        );
        assert!(responses.extensions.contains_key("x-rate-limited"));
    }
}
