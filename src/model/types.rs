use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityError;

/// Opaque subject identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub String);

impl ExternalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExternalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UUID-shaped key computed from an [`ExternalId`].
///
/// Always 36 lowercase characters in the 8-4-4-4-12 layout. Equality is
/// byte equality of the rendered string, which is what the profile store
/// compares against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivedId(String);

impl DerivedId {
    pub(crate) fn from_rendered(rendered: String) -> Self {
        debug_assert_eq!(rendered.len(), 36);
        Self(rendered)
    }

    /// Accepts any canonical lowercase hyphenated UUID string.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let uuid = Uuid::parse_str(text).map_err(|_| IdentityError::Malformed(text.to_string()))?;
        let canonical = uuid.hyphenated().to_string();
        if canonical != text {
            return Err(IdentityError::Malformed(text.to_string()));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_uuid(&self) -> Uuid {
        // Construction guarantees 32 hex digits in canonical layout.
        Uuid::parse_str(&self.0).unwrap_or_else(|_| Uuid::nil())
    }
}

impl From<Uuid> for DerivedId {
    fn from(value: Uuid) -> Self {
        Self(value.hyphenated().to_string())
    }
}

impl From<DerivedId> for String {
    fn from(value: DerivedId) -> Self {
        value.0
    }
}

impl TryFrom<String> for DerivedId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl FromStr for DerivedId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DerivedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for DerivedId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DerivedId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Forward/backward checksum splice minted by the web front end.
    #[default]
    Legacy,
    /// Name-based UUIDv5 under a fixed namespace.
    V5,
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Scheme::Legacy),
            "v5" => Ok(Scheme::V5),
            other => Err(format!("unknown scheme '{other}', expected legacy or v5")),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Legacy => f.write_str("legacy"),
            Scheme::V5 => f.write_str("v5"),
        }
    }
}

/// Which integer sequence the checksums read from the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharEncoding {
    /// UTF-16 code units; a supplementary-plane character counts as two.
    #[default]
    Utf16,
    /// Unicode scalar values.
    Scalar,
}

impl FromStr for CharEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf16" | "utf-16" => Ok(CharEncoding::Utf16),
            "scalar" | "codepoint" => Ok(CharEncoding::Scalar),
            other => Err(format!("unknown encoding '{other}', expected utf16 or scalar")),
        }
    }
}

impl fmt::Display for CharEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharEncoding::Utf16 => f.write_str("utf16"),
            CharEncoding::Scalar => f.write_str("scalar"),
        }
    }
}

/// One row of the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub external_id: Option<ExternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub external_id: ExternalId,
    pub from: String,
    pub to: DerivedId,
    pub scheme: Scheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPatch {
    #[serde(flatten)]
    pub patch: Patch,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_lowercase_only() {
        assert!(DerivedId::parse("39bd513b-2b82-48a5-813b-513bd8a50000").is_ok());
        assert!(DerivedId::parse("39BD513B-2B82-48A5-813B-513BD8A50000").is_err());
        assert!(DerivedId::parse("39bd513b2b8248a5813b513bd8a50000").is_err());
        assert_eq!(
            DerivedId::parse("kiosk-terminal"),
            Err(IdentityError::Malformed("kiosk-terminal".to_string()))
        );
    }

    #[test]
    fn profile_row_serializes_without_empty_optionals() {
        let row = ProfileRow {
            id: "x".to_string(),
            external_id: None,
            email: None,
            role: None,
        };
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":"x","external_id":null}"#
        );
    }

    #[test]
    fn scheme_and_encoding_parse_case_insensitively() {
        assert_eq!("V5".parse::<Scheme>(), Ok(Scheme::V5));
        assert_eq!("UTF-16".parse::<CharEncoding>(), Ok(CharEncoding::Utf16));
        assert!("md5".parse::<Scheme>().is_err());
    }
}
