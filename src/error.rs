//! Error types for socketio-codec
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Failures raised while converting between raw events and typed values.
///
/// `NotApplicable` is a routing signal: composed decoders and encoders
/// recover from it by trying the next candidate. Every other variant is
/// final once a codec has been chosen.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec does not handle this event or value
    #[error("No codec applicable to {0}")]
    NotApplicable(String),

    /// A required argument slot is empty
    #[error("Event '{event}' is missing argument {index}")]
    MissingArgument { event: String, index: usize },

    /// A JSON argument was expected but the slot holds a binary blob
    #[error("Event '{event}' argument {index} is binary, expected JSON")]
    BinaryArgument { event: String, index: usize },

    /// A binary argument was expected but the slot holds a JSON value
    #[error("Event '{event}' argument {index} is JSON, expected binary")]
    JsonArgument { event: String, index: usize },

    /// A zipped decoder was not defined at an event the primary decoder accepted
    #[error("Zipped decoder does not handle event '{0}' accepted by its primary decoder")]
    ZipPreconditionViolated(String),

    /// The event must carry an ack callback but none was attached
    #[error("Event '{0}' expected an ack callback but none was present")]
    AckExpectedButAbsent(String),

    /// JSON value could not be converted to or from the target type
    #[error("JSON conversion error: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns true for the routing signal that composition falls through on.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, CodecError::NotApplicable(_))
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_applicable_error() {
        let err = CodecError::NotApplicable("event 'typing'".to_string());
        assert_eq!(err.to_string(), "No codec applicable to event 'typing'");
        assert!(err.is_not_applicable());
    }

    #[test]
    fn test_missing_argument_error() {
        let err = CodecError::MissingArgument {
            event: "chat message".to_string(),
            index: 0,
        };
        assert_eq!(err.to_string(), "Event 'chat message' is missing argument 0");
        assert!(!err.is_not_applicable());
    }

    #[test]
    fn test_argument_kind_errors() {
        let err = CodecError::BinaryArgument {
            event: "upload".to_string(),
            index: 1,
        };
        assert_eq!(err.to_string(), "Event 'upload' argument 1 is binary, expected JSON");

        let err = CodecError::JsonArgument {
            event: "upload".to_string(),
            index: 0,
        };
        assert_eq!(err.to_string(), "Event 'upload' argument 0 is JSON, expected binary");
    }

    #[test]
    fn test_ack_expected_error() {
        let err = CodecError::AckExpectedButAbsent("join".to_string());
        assert_eq!(
            err.to_string(),
            "Event 'join' expected an ack callback but none was present"
        );
    }

    #[test]
    fn test_zip_precondition_error() {
        let err = CodecError::ZipPreconditionViolated("greet".to_string());
        assert_eq!(
            err.to_string(),
            "Zipped decoder does not handle event 'greet' accepted by its primary decoder"
        );
        assert!(!err.is_not_applicable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: CodecError = json_err.into();
        assert!(matches!(err, CodecError::Conversion(_)));
        assert!(err.to_string().starts_with("JSON conversion error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(CodecError::AckExpectedButAbsent("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
