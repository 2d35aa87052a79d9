use crate::error::ResolveError;

/// Component sections a `$ref` can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Schemas,
    Parameters,
    RequestBodies,
    Responses,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Schemas => "schemas",
            Section::Parameters => "parameters",
            Section::RequestBodies => "requestBodies",
            Section::Responses => "responses",
        }
    }

    /// The JSON pointer of a component in this section.
    pub fn pointer(&self, name: &str) -> String {
        format!("#/components/{}/{}", self.as_str(), name)
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
///
/// `at` is the location of the referencing node, used for error reporting.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected: Section,
    at: &str,
) -> Result<&'a str, ResolveError> {
    let invalid = || ResolveError::InvalidRefFormat {
        reference: ref_path.to_string(),
        at: at.to_string(),
    };
    let stripped = ref_path.strip_prefix("#/components/").ok_or_else(invalid)?;
    let (section, name) = stripped.split_once('/').ok_or_else(invalid)?;
    if section != expected.as_str() || name.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok(name)
}

/// Escape one JSON pointer token (`~` then `/`).
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
