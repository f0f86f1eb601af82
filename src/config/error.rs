//! Errors raised while loading `pages-merge.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read options file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid options file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid option {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(
            PathBuf::from("pages-merge.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read options file `pages-merge.toml`");
    }

    #[test]
    fn test_toml_error_carries_parser_detail() {
        let toml_err = toml::from_str::<toml::Table>("dirs = [").unwrap_err();
        let detail = toml_err.to_string();

        let err = ConfigError::from(toml_err);
        assert!(err.to_string().starts_with("invalid options file: "));
        assert!(err.to_string().contains(&detail));
    }

    #[test]
    fn test_validation_message() {
        let err = ConfigError::Validation("[dirs] must not be empty".into());
        assert_eq!(err.to_string(), "invalid option [dirs] must not be empty");
    }
}
