use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Clone, PartialEq, Eq, Hash)]
/// Postmark server API token.
///
/// [`ServerToken::new`] keeps the value verbatim; a missing or wrong token is
/// reported by the API itself. Use [`ServerToken::parse`] to reject blank
/// values up front (e.g. when reading configuration).
pub struct ServerToken(String);

impl ServerToken {
    /// HTTP header carrying the token (`X-Postmark-Server-Token`).
    pub const HEADER: &'static str = "X-Postmark-Server-Token";

    /// Wrap a token without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Create a token and validate that it is non-empty after trimming.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::HEADER });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerToken(***)")
    }
}

impl From<String> for ServerToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ServerToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_value_verbatim() {
        assert_eq!(ServerToken::new(" key ").as_str(), " key ");
        assert_eq!(ServerToken::new("").as_str(), "");
    }

    #[test]
    fn parse_trims_and_rejects_blank() {
        assert_eq!(ServerToken::parse("  key ").unwrap().as_str(), "key");
        assert!(matches!(
            ServerToken::parse("   "),
            Err(ValidationError::Empty {
                field: ServerToken::HEADER
            })
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let token = ServerToken::new("super-secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
    }
}
