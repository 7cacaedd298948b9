//! Entry names

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a store entry.
///
/// Names are strings. Numeric identifiers are accepted and normalized to their
/// decimal form, so `Name::from(7)` and `Name::from("7")` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name(name.to_string())
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Name(name)
    }
}

impl From<&String> for Name {
    fn from(name: &String) -> Self {
        Name(name.clone())
    }
}

impl From<&Name> for Name {
    fn from(name: &Name) -> Self {
        name.clone()
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Name {
                fn from(id: $ty) -> Self {
                    Name(id.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Names coming from dynamically typed input must be strings or numbers.
impl TryFrom<&serde_json::Value> for Name {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Name(s.clone())),
            serde_json::Value::Number(n) => Ok(Name(n.to_string())),
            other => Err(Error::InvalidArgument(format!(
                "name of a store entry should be a string or a number, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<serde_json::Value> for Name {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Name::try_from(&value)
    }
}
