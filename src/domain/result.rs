//! Crate-wide `Result` alias

use super::errors::MigrateError;

/// Result of any fallible mlmigrate operation
///
/// ```
/// use mlmigrate::domain::{MigrateError, Result};
///
/// fn parse_version(raw: &str) -> Result<u64> {
///     raw.parse()
///         .map_err(|_| MigrateError::Validation(format!("not a version: {raw}")))
/// }
///
/// assert_eq!(parse_version("3").unwrap(), 3);
/// assert!(parse_version("three").is_err());
/// ```
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn read_manifest(path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    #[test]
    fn test_io_errors_convert_with_question_mark() {
        let err = read_manifest("/definitely/not/here/experiment.json").unwrap_err();
        assert!(matches!(err, MigrateError::Io(_)));
    }
}
