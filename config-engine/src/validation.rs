// Post-load validation hook for configuration types
use crate::error::Result;

/// Implemented by configuration structs that have cross-field rules
pub trait ConfigValidator {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
