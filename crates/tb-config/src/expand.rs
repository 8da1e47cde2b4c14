//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Strings without a `${` sequence are returned unchanged. An unset variable
/// without a default is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value.as_deref() {
        *value = Some(expand_env(v, field)?);
    }
    Ok(())
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("TB_TEST_BOOK_TITLE", "Manual");
        }
        let result = expand_env("The ${TB_TEST_BOOK_TITLE}", "book.title").unwrap();
        assert_eq!(result, "The Manual");
        unsafe {
            std::env::remove_var("TB_TEST_BOOK_TITLE");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("TB_TEST_UNSET_DIR");
        }
        let result = expand_env("${TB_TEST_UNSET_DIR:-tiddlers}", "source.path").unwrap();
        assert_eq!(result, "tiddlers");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("TB_TEST_MISSING");
        }
        let err = expand_env("${TB_TEST_MISSING}", "book.subtitle").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("TB_TEST_MISSING"));
        assert!(msg.contains("book.subtitle"));
    }

    #[test]
    fn test_without_braces_untouched() {
        let result = expand_env("costs $5 or $HOME", "book.title").unwrap();
        assert_eq!(result, "costs $5 or $HOME");
    }

    #[test]
    fn test_expand_opt_none() {
        let mut value = None;
        expand_opt(&mut value, "images.dir").unwrap();
        assert_eq!(value, None);
    }
}
