//! Tri-state optional text field
//!
//! Patient `gender`, `contact` and `address` distinguish "never set" from
//! "explicitly cleared". The browser client predates this type and still
//! speaks the legacy wire encoding:
//!
//! | Wire                | Variant        |
//! |---------------------|----------------|
//! | `"-__-"`            | `Unset`        |
//! | `""` / `null`       | `Cleared`      |
//! | any other string    | `Value(s)`     |
//!
//! The same encoding is used for the TEXT columns in PostgreSQL.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};

/// Legacy marker for a field that was never filled in
pub const UNSET_MARKER: &str = "-__-";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Unset,
    Cleared,
    Value(String),
}

impl FieldState {
    /// Decode the wire/storage representation
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            None => FieldState::Cleared,
            Some(UNSET_MARKER) => FieldState::Unset,
            Some(s) if s.trim().is_empty() => FieldState::Cleared,
            Some(s) => FieldState::Value(s.trim().to_string()),
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            FieldState::Unset => UNSET_MARKER.to_string(),
            FieldState::Cleared => String::new(),
            FieldState::Value(v) => v.clone(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            FieldState::Value(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn has_value(&self) -> bool {
        matches!(self, FieldState::Value(_))
    }
}

impl Serialize for FieldState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for FieldState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(FieldState::from_wire(raw.as_deref()))
    }
}

/// Patch helper: a present key (even `null`) yields `Some`, an absent key
/// falls back to `#[serde(default)]`
pub fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<FieldState>, D::Error>
where
    D: Deserializer<'de>,
{
    FieldState::deserialize(deserializer).map(Some)
}

impl Type<Postgres> for FieldState {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for FieldState {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <String as Encode<'q, Postgres>>::encode_by_ref(&self.to_wire(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for FieldState {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <String as Decode<'r, Postgres>>::decode(value)?;
        Ok(FieldState::from_wire(Some(&raw)))
    }
}
