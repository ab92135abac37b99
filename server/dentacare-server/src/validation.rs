//! Request validation trait and helper macros shared by the handlers

use crate::error::ApiError;

/// Implemented by every create/update request body
pub trait RequestValidation {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Return a validation error unless `$predicate` holds
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Non-empty after trimming
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Character count within `[$min, $max]`
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Basic shape check: one `@` with a dotted domain
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        $crate::validate_field!(
            $field,
            $crate::validation::looks_like_email(&$field),
            $message
        );
    };
}

#[macro_export]
macro_rules! validate_range {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($field, *$field >= $min && *$field <= $max, $message);
    };
}

pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// At least seven digits once punctuation is stripped
pub fn looks_like_phone(value: &str) -> bool {
    value.chars().filter(char::is_ascii_digit).count() >= 7
}
