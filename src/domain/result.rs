//! Result type alias for Carebase
//!
//! This module provides a convenient Result type alias that uses
//! CarebaseError as the error type.

use super::errors::CarebaseError;

/// Result type alias for Carebase operations
///
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use carebase::domain::result::Result;
/// use carebase::domain::errors::CarebaseError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CarebaseError::NotFound("patient"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CarebaseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CarebaseError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(CarebaseError::NotFound("patient"));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
