//! Settings validation
//!
//! Range checks come from the `Validate` derive on the settings contracts;
//! the first failing field is reported.

use contracts::{AppSettings, ContractError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate merged settings
///
/// Returns the first encountered error, or Ok(()).
pub fn validate(settings: &AppSettings) -> Result<(), ContractError> {
    if let Err(errors) = settings.validate() {
        let (field, message) = first_error("", &errors);
        return Err(ContractError::config_validation(field, message));
    }
    Ok(())
}

/// Walk nested validation errors down to the first leaf
fn first_error(prefix: &str, errors: &ValidationErrors) -> (String, String) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(error) = field_errors.first() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", error.code));
                    return (path, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => return first_error(&path, nested),
            ValidationErrorsKind::List(items) => {
                if let Some((_, nested)) = items.iter().next() {
                    return first_error(&path, nested);
                }
            }
        }
    }

    (prefix.to_string(), "invalid value".to_string())
}
