use once_cell::sync::Lazy;
use regex::Regex;
use uuid::{uuid, Uuid};

use crate::error::IdentityError;
use crate::model::{CharEncoding, DerivedId, Scheme};
use crate::util::checksum::{forward_backward, render_checksum};
use crate::util::layout::{legacy_layout, GroupLayout};

/// Namespace for [`Scheme::V5`] identifiers.
pub const DEFAULT_NAMESPACE: Uuid = uuid!("6f1c3a52-0d7e-4b8a-9c2e-5a7d1e4b9f30");

static LEGACY_LAYOUT: Lazy<GroupLayout> = Lazy::new(legacy_layout);

static LEGACY_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-8[0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("legacy shape pattern is valid")
});

/// Derive the database key for an identity-provider subject.
///
/// Pure and deterministic: the same text yields the same 36-character
/// string on every platform. Input is read as UTF-16 code units, matching
/// identifiers minted by the web front end.
///
/// # Collision risk
/// The result carries two 32-bit checksums folded by absolute value, so
/// at most 63 bits of the 128 are informative. Each half alone hits a
/// birthday collision around 2^16 inputs; see [`crate::index::birthday_bound`].
pub fn derive_identifier(input: &str) -> DerivedId {
    derive_legacy(input, CharEncoding::Utf16)
}

/// Like [`derive_identifier`], but for boundaries where the identity may be
/// absent. `None` is an error rather than an alias for `""`.
pub fn derive_identifier_checked(input: Option<&str>) -> Result<DerivedId, IdentityError> {
    input.map(derive_identifier).ok_or(IdentityError::MissingInput)
}

pub fn derive_legacy(input: &str, encoding: CharEncoding) -> DerivedId {
    let (forward, backward) = forward_backward(input, encoding);
    let rendered = LEGACY_LAYOUT.render(&render_checksum(forward), &render_checksum(backward));
    DerivedId::from_rendered(rendered)
}

pub fn derive_v5(namespace: &Uuid, input: &str) -> DerivedId {
    DerivedId::from(Uuid::new_v5(namespace, input.as_bytes()))
}

/// True when `text` has the `XXXXXXXX-XXXX-4XXX-8XXX-XXXXXXXXXXXX` layout
/// produced by [`derive_identifier`].
pub fn is_legacy_shaped(text: &str) -> bool {
    LEGACY_SHAPE.is_match(text)
}

/// Derivation settings bundled for callers that read them from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapper {
    pub scheme: Scheme,
    pub encoding: CharEncoding,
    pub namespace: Uuid,
}

impl Default for Mapper {
    fn default() -> Self {
        Self {
            scheme: Scheme::Legacy,
            encoding: CharEncoding::Utf16,
            namespace: DEFAULT_NAMESPACE,
        }
    }
}

impl Mapper {
    pub fn with_scheme(self, scheme: Scheme) -> Self {
        Self { scheme, ..self }
    }

    pub fn derive(&self, input: &str) -> DerivedId {
        match self.scheme {
            Scheme::Legacy => derive_legacy(input, self.encoding),
            Scheme::V5 => derive_v5(&self.namespace, input),
        }
    }

    pub fn derive_checked(&self, input: Option<&str>) -> Result<DerivedId, IdentityError> {
        input.map(|i| self.derive(i)).ok_or(IdentityError::MissingInput)
    }
}
