use thiserror::Error;

/// Top-level error type for the Courier workspace.
///
/// Subsystem crates define their own error types and convert into
/// `CourierError` where they cross into the binary or the API layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for CourierError {
    fn from(err: toml::de::Error) -> Self {
        CourierError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CourierError {
    fn from(err: toml::ser::Error) -> Self {
        CourierError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Courier operations.
pub type Result<T> = std::result::Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(CourierError, &str)> = vec![
            (
                CourierError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                CourierError::Extraction("backend down".to_string()),
                "Extraction error: backend down",
            ),
            (
                CourierError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                CourierError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: CourierError = io_err.into();
        match &err {
            CourierError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected Io variant"),
        }
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: CourierError = toml_err.into();
        assert!(matches!(err, CourierError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CourierError = json_err.into();
        assert!(matches!(err, CourierError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_result_alias_propagates() {
        fn inner() -> Result<()> {
            Err(CourierError::Api("nope".into()))
        }
        fn outer() -> Result<u8> {
            inner()?;
            Ok(1)
        }
        assert!(outer().is_err());
    }
}
