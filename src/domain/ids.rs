//! Domain identifier types with validation
//!
//! Newtype wrappers for tracking-server identifiers. Each type keeps IDs from
//! being mixed up and validates the format on construction.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, rejecting empty or blank strings
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Experiment identifier
    ///
    /// ```
    /// use mlmigrate::domain::ids::ExperimentId;
    ///
    /// let id = ExperimentId::new("4072937019901104").unwrap();
    /// assert_eq!(id.as_str(), "4072937019901104");
    /// ```
    ExperimentId,
    "Experiment ID"
);

string_id!(
    /// Run identifier (a 32-character hex UUID on most servers)
    RunId,
    "Run ID"
);

/// Registered model name
///
/// A three-part dotted name (`catalog.schema.model`) identifies a model in a
/// catalog-style registry, which has different tag and stage rules than a
/// classic flat-named registry.
///
/// ```
/// use mlmigrate::domain::ids::ModelName;
///
/// let uc = ModelName::new("main.ml.churn").unwrap();
/// assert!(uc.is_catalog_qualified());
///
/// let classic = ModelName::new("churn").unwrap();
/// assert!(!classic.is_catalog_qualified());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Creates a new model name
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the model name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name has the three-part catalog form
    pub fn is_catalog_qualified(&self) -> bool {
        let parts: Vec<&str> = self.0.split('.').collect();
        parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ModelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Model version number
///
/// Tracking servers transport versions as strings; this type accepts either
/// a string or a number and always serializes back to a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionNumber(u64);

impl VersionNumber {
    /// Creates a version number, rejecting zero
    pub fn new(version: u64) -> Result<Self, String> {
        if version == 0 {
            return Err("Model version must be >= 1".to_string());
        }
        Ok(Self(version))
    }

    /// Returns the numeric value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VersionNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("Invalid model version '{s}': {e}"))?;
        Self::new(n)
    }
}

impl Serialize for VersionNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = VersionNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a model version as a string or positive integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                VersionNumber::new(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                let v = u64::try_from(v).map_err(E::custom)?;
                VersionNumber::new(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}
