//! Result type alias for tabledump

use super::errors::DumpError;

/// Result type alias for tabledump operations
///
/// # Examples
///
/// ```
/// use tabledump::domain::result::Result;
/// use tabledump::domain::errors::DumpError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DumpError::Format("unknown format".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DumpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(DumpError::Interrupted);
        assert!(result.is_err());
    }
}
