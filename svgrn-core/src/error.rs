use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

/// Marker that starts every failed conversion string.
pub const SENTINEL: &str = "// svgrn-error:";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Sanitizer failed: {0}")]
    Sanitize(String),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("no root <svg> element")]
    MissingRoot,

    #[error("found {count} top-level elements, expected a single <svg> root")]
    MultipleRoots { count: usize },

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    MaxNestingDepthExceeded { max_depth: usize },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Unknown flavor '{0}'. Expected one of: generic, themed")]
    UnknownFlavor(String),

    #[error("Invalid flavor configuration: {0}")]
    Config(String),
}

impl ConvertError {
    /// Pipeline stage the error belongs to, as reported in sentinel strings.
    pub fn stage(&self) -> &'static str {
        match self {
            ConvertError::Sanitize(_) => "sanitize",
            ConvertError::Parse { .. }
            | ConvertError::MissingRoot
            | ConvertError::MultipleRoots { .. }
            | ConvertError::MaxNestingDepthExceeded { .. } => "parse",
            ConvertError::UnsupportedInput(_) => "input",
            ConvertError::UnknownFlavor(_) | ConvertError::Config(_) => "config",
        }
    }

    /// Render the error as a failure string: `// svgrn-error: <stage>: <reason>`.
    pub fn to_sentinel(&self) -> String {
        format!("{} {}: {}", SENTINEL, self.stage(), self)
    }
}

impl From<roxmltree::Error> for ConvertError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        let text = err.to_string();
        // roxmltree appends " at row:col"; the position is carried separately.
        let message = match text.rsplit_once(" at ") {
            Some((head, tail))
                if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit() || c == ':') =>
            {
                head.to_string()
            }
            _ => text,
        };
        ConvertError::Parse {
            line: pos.row as usize,
            column: pos.col as usize,
            message,
        }
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_carries_stage_and_reason() {
        let s = ConvertError::MissingRoot.to_sentinel();
        assert_eq!(s, "// svgrn-error: parse: no root <svg> element");
    }

    #[test]
    fn test_input_errors_use_input_stage() {
        let err = ConvertError::UnsupportedInput("input is empty".to_string());
        assert_eq!(err.stage(), "input");
        assert!(err.to_sentinel().starts_with(SENTINEL));
    }

    #[test]
    fn test_xml_error_keeps_position() {
        let err = match roxmltree::Document::parse("<svg><g></svg>") {
            Err(e) => e,
            Ok(_) => panic!("mismatched tags must not parse"),
        };
        match ConvertError::from(err) {
            ConvertError::Parse { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(!message.ends_with(|c: char| c.is_ascii_digit()));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }
}
