use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::CliError;

    #[test]
    fn invalid_arguments_exit_with_usage_code() {
        let error = CliError::invalid("bad width");
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "invalid argument: bad width");
    }

    #[test]
    fn missing_path_names_the_path() {
        let error = CliError::MissingPath {
            path: PathBuf::from("site/index.html"),
        };
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().contains("site/index.html"));
    }
}
