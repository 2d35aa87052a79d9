use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ParseError;

/// Resolution settings, loaded by the driver from `.apitree.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IrConfig {
    pub naming: NamingConfig,
    pub enums: EnumConfig,
    pub routes: RouteConfig,
}

impl IrConfig {
    /// Parse a config document. Missing sections and keys take their defaults.
    pub fn from_yaml(input: &str) -> Result<Self, ParseError> {
        Ok(serde_yaml_ng::from_str(input)?)
    }
}

/// How identifiers are rendered and disambiguated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub convention: Casing,
    /// Identifiers that must not be emitted verbatim; they get a `_` suffix.
    pub reserved_words: Vec<String>,
    /// Fail instead of falling back to numeric suffixes.
    pub strict: bool,
    /// Highest numeric suffix tried before giving up.
    pub max_suffix: u32,
    pub operation_naming: NamingStrategy,
    /// Map from resolved operation name (operationId or route-derived) to custom alias.
    pub aliases: IndexMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            convention: Casing::Pascal,
            reserved_words: Vec::new(),
            strict: false,
            max_suffix: 999,
            operation_naming: NamingStrategy::UseOperationId,
            aliases: IndexMap::new(),
        }
    }
}

/// Case convention for rendered identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    #[default]
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
}

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnumConfig {
    /// Vendor extensions that mark an enum as open to unknown values.
    pub open_extensions: Vec<String>,
}

impl Default for EnumConfig {
    fn default() -> Self {
        Self {
            open_extensions: vec!["x-extensible-enum".to_string(), "x-open-enum".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Overrides `info.title` as the name of the tree root.
    pub root_name: Option<String>,
    /// Deepest group level the hierarchy builder descends to.
    pub max_depth: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            root_name: None,
            max_depth: 32,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apitree.yaml";

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apitree configuration
naming:
  convention: pascal          # pascal | camel | snake | screaming_snake
  reserved_words: []          # e.g. [type, object, class]
  strict: false               # error instead of numeric suffixes on name collisions
  max_suffix: 999
  operation_naming: use_operation_id  # use_operation_id | use_route_based
  aliases: {}
    # createChatCompletion: chat

enums:
  open_extensions: [x-extensible-enum, x-open-enum]

routes:
  # root_name: OpenAPI
  max_depth: 32
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IrConfig::default();
        assert_eq!(config.naming.convention, Casing::Pascal);
        assert_eq!(config.naming.operation_naming, NamingStrategy::UseOperationId);
        assert!(config.naming.aliases.is_empty());
        assert!(!config.naming.strict);
        assert_eq!(config.routes.max_depth, 32);
        assert_eq!(config.enums.open_extensions.len(), 2);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
naming:
  convention: snake
  reserved_words: [type, self]
  strict: true
  operation_naming: use_route_based
  aliases:
    createChatCompletion: chat
enums:
  open_extensions: [x-oai-expandable]
routes:
  root_name: OpenAI
  max_depth: 4
"#;
        let config = IrConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.naming.convention, Casing::Snake);
        assert_eq!(config.naming.reserved_words, vec!["type", "self"]);
        assert!(config.naming.strict);
        assert_eq!(config.naming.operation_naming, NamingStrategy::UseRouteBased);
        assert_eq!(config.naming.aliases["createChatCompletion"], "chat");
        assert_eq!(config.enums.open_extensions, vec!["x-oai-expandable"]);
        assert_eq!(config.routes.root_name.as_deref(), Some("OpenAI"));
        assert_eq!(config.routes.max_depth, 4);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = IrConfig::from_yaml("naming:\n  strict: true\n").unwrap();
        assert!(config.naming.strict);
        // Defaults applied
        assert_eq!(config.naming.max_suffix, 999);
        assert_eq!(config.routes.max_depth, 32);
    }

    #[test]
    fn default_content_parses_to_defaults() {
        let config = IrConfig::from_yaml(default_config_content()).unwrap();
        assert_eq!(config.naming.convention, Casing::Pascal);
        assert!(config.routes.root_name.is_none());
    }
}
