//! Identifier newtypes and small enums shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing identifier types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unrecognized extra-hours classification.
    #[error("invalid extra kind: {value}")]
    UnknownExtraKind { value: String },
}

/// A validated worker identifier.
///
/// Worker IDs are opaque non-empty strings ("chat_id" in the domain).
/// The engine never interprets them beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkerId(String);

impl WorkerId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::Empty { field: "worker ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WorkerId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkerId> for String {
    fn from(id: WorkerId) -> Self {
        id.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WorkerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generates an integer ID newtype with common trait implementations.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_int_id!(
    /// Identifier of a construction site ("obra").
    ///
    /// Opaque to this crate; assigned by whatever system manages sites.
    SiteId
);

define_int_id!(
    /// Identifier of a site sub-task ("partida").
    TaskId
);

define_int_id!(
    /// Persistence-assigned identifier of a stored time entry.
    ///
    /// Absent on entries that have not been created yet.
    EntryId
);

/// Classification of overtime hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraKind {
    /// Overtime spent on the company's own work.
    Internal,
    /// Overtime billed to an external party.
    External,
}

impl ExtraKind {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExtraKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" | "interno" => Ok(Self::Internal),
            "external" | "externo" => Ok(Self::External),
            _ => Err(TypeError::UnknownExtraKind {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_rejects_empty() {
        assert!(WorkerId::new("").is_err());
        assert!(WorkerId::new("w-001").is_ok());
    }

    #[test]
    fn worker_id_serde_roundtrip() {
        let id = WorkerId::new("w-123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"w-123\"");
        let parsed: WorkerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn worker_id_serde_rejects_empty() {
        let result: Result<WorkerId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn int_ids_expose_raw_value() {
        assert_eq!(SiteId::new(7).value(), 7);
        assert_eq!(TaskId::from(42).value(), 42);
        assert_eq!(EntryId::new(9).to_string(), "9");
    }

    #[test]
    fn int_id_serde_is_transparent() {
        let id = TaskId::new(13);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "13");
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn extra_kind_from_str() {
        assert_eq!("internal".parse::<ExtraKind>().unwrap(), ExtraKind::Internal);
        assert_eq!("external".parse::<ExtraKind>().unwrap(), ExtraKind::External);
        assert!("overtime".parse::<ExtraKind>().is_err());
    }

    #[test]
    fn extra_kind_accepts_domain_spelling() {
        assert_eq!("interno".parse::<ExtraKind>().unwrap(), ExtraKind::Internal);
        assert_eq!("externo".parse::<ExtraKind>().unwrap(), ExtraKind::External);
    }

    #[test]
    fn extra_kind_serde_roundtrip() {
        let json = serde_json::to_string(&ExtraKind::Internal).unwrap();
        assert_eq!(json, "\"internal\"");
        let parsed: ExtraKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ExtraKind::Internal);
    }
}
