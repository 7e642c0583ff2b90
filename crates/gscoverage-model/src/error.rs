//! Schema errors raised while building or validating descriptors.

/// A malformed or incomplete coverage descriptor.
///
/// `path` names the offending field using dotted/indexed notation, for
/// example `metadata[1].key` or `dimensions[0].range`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema error at `{path}`: {reason}")]
pub struct SchemaError {
    /// Path of the offending field.
    pub path: String,
    /// What is wrong with it.
    pub reason: String,
}

impl SchemaError {
    /// Create a new schema error for the given field path.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a "missing required field" error.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, "required field is missing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_name_field_path_in_message() {
        let err = SchemaError::missing("metadata[1].key");
        assert_eq!(
            err.to_string(),
            "schema error at `metadata[1].key`: required field is missing"
        );
    }
}
