//! Validated table and column names.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern compiles"));

/// A table or column name that matches `^[A-Za-z0-9_]+$`.
///
/// [`Identifier::new`] is the only way to obtain one, so any `Identifier`
/// can be written into SQL text without escaping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validates `name` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `name` is empty or contains any
    /// character outside `[A-Za-z0-9_]`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if IDENTIFIER.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(Error::Validation(name))
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Identifier {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::new(name).map_err(serde::de::Error::custom)
    }
}

/// Validates every name in `names`, keeping their order.
///
/// # Errors
///
/// Returns [`Error::Validation`] for the first invalid name.
pub fn identifiers<I, S>(names: I) -> Result<Vec<Identifier>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Identifier::new).collect()
}
