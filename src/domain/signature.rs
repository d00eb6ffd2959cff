//! Keyed message authentication over ordered `name=value` fields.
//!
//! The canonical signing string is every signed name, in declared order, rendered as
//! `name=value` and joined with a single comma. The MAC is HMAC-SHA256 over that string,
//! base64-encoded with the standard alphabet.

use crate::domain::fields::{FieldSet, SIGNATURE};
use crate::error::{GatewayError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Shared secret for one merchant profile in one mode. Wiped from memory on drop.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Builds the canonical signing string for `signed_names` over `fields`.
///
/// A signed name with no entry in `fields` is an error; an entry with an empty value is not.
pub fn canonical_string<S: AsRef<str>>(fields: &FieldSet, signed_names: &[S]) -> Result<String> {
    let mut segments = Vec::with_capacity(signed_names.len());
    for name in signed_names {
        let name = name.as_ref();
        let value = fields
            .get(name)
            .ok_or_else(|| GatewayError::MissingField(name.to_string()))?;
        segments.push(format!("{name}={value}"));
    }
    Ok(segments.join(","))
}

/// Signs `signed_names` over `fields` with `key`.
pub fn sign<S: AsRef<str>>(fields: &FieldSet, signed_names: &[S], key: &[u8]) -> Result<String> {
    let data = canonical_string(fields, signed_names)?;
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| GatewayError::InternalError("HMAC key rejected".into()))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Recomputes the signature and compares it against `claimed` in constant time.
///
/// Any failure to recompute (such as a missing signed field) counts as a mismatch.
pub fn verify<S: AsRef<str>>(
    fields: &FieldSet,
    signed_names: &[S],
    key: &[u8],
    claimed: &str,
) -> bool {
    match sign(fields, signed_names, key) {
        Ok(expected) => expected.as_bytes().ct_eq(claimed.as_bytes()).into(),
        Err(_) => false,
    }
}

/// Signer bound to the secret key of the active mode.
#[derive(Debug, Clone)]
pub struct Signer {
    key: SecretKey,
}

impl Signer {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    pub fn sign<S: AsRef<str>>(&self, fields: &FieldSet, signed_names: &[S]) -> Result<String> {
        sign(fields, signed_names, self.key.as_bytes())
    }

    pub fn verify<S: AsRef<str>>(
        &self,
        fields: &FieldSet,
        signed_names: &[S],
        claimed: &str,
    ) -> bool {
        verify(fields, signed_names, self.key.as_bytes(), claimed)
    }

    /// Signs `fields` over the names listed in its own `signed_field_names` entry.
    pub fn sign_declared(&self, fields: &FieldSet) -> Result<String> {
        let names = fields.declared_signed_names().ok_or_else(|| {
            GatewayError::MissingField(crate::domain::fields::SIGNED_FIELD_NAMES.to_string())
        })?;
        self.sign(fields, &names)
    }

    /// Checks the `signature` entry of `fields` against its own `signed_field_names`.
    pub fn verify_declared(&self, fields: &FieldSet) -> bool {
        let (Some(names), Some(claimed)) = (fields.declared_signed_names(), fields.get(SIGNATURE))
        else {
            return false;
        };
        self.verify(fields, &names, claimed)
    }

    /// Like [`Signer::verify_declared`], but also requires every name in `required` to be part
    /// of the declared list. A valid signature over some other selection of fields is rejected.
    pub fn verify_covering(&self, fields: &FieldSet, required: &[&str]) -> Result<()> {
        if !self.verify_declared(fields) {
            return Err(GatewayError::SignatureInvalid);
        }
        match required.iter().find(|name| !fields.is_signed(name)) {
            Some(name) => {
                debug!(field = *name, "Field is not covered by the signature");
                Err(GatewayError::SignatureInvalid)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields::SIGNED_FIELD_NAMES;

    fn scenario_fields() -> FieldSet {
        [("a", "1"), ("b", "2"), ("c", "")].into_iter().collect()
    }

    #[test]
    fn test_canonical_string_scenario() {
        let data = canonical_string(&scenario_fields(), &["a", "b"]).unwrap();
        assert_eq!(data, "a=1,b=2");
    }

    #[test]
    fn test_sign_scenario_matches_reference() {
        let signature = sign(&scenario_fields(), &["a", "b"], b"k").unwrap();
        assert_eq!(signature, "OfYPzupaleeViWGZBKAhDNoSY4gL3w9k5Fr4Ko1vmX8=");
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = Signer::new(SecretKey::new("k"));
        let first = signer.sign(&scenario_fields(), &["a", "b"]).unwrap();
        let second = signer.sign(&scenario_fields(), &["a", "b"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_value_signs_as_empty() {
        let data = canonical_string(&scenario_fields(), &["a", "c"]).unwrap();
        assert_eq!(data, "a=1,c=");
    }

    #[test]
    fn test_duplicate_names_are_preserved() {
        let data = canonical_string(&scenario_fields(), &["b", "a", "b"]).unwrap();
        assert_eq!(data, "b=2,a=1,b=2");
    }

    #[test]
    fn test_missing_signed_field_fails() {
        let result = sign(&scenario_fields(), &["a", "d"], b"k");
        assert!(matches!(result, Err(GatewayError::MissingField(name)) if name == "d"));
    }

    #[test]
    fn test_unsigned_field_does_not_change_signature() {
        let mut fields = scenario_fields();
        let before = sign(&fields, &["a", "b"], b"k").unwrap();
        fields.set("c", "changed");
        let after = sign(&fields, &["a", "b"], b"k").unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_verify_detects_tampered_value() {
        let mut fields = scenario_fields();
        let signature = sign(&fields, &["a", "b"], b"k").unwrap();
        assert!(verify(&fields, &["a", "b"], b"k", &signature));

        fields.set("b", "3");
        assert!(!verify(&fields, &["a", "b"], b"k", &signature));
    }

    #[test]
    fn test_verify_rejects_wrong_key_and_garbage() {
        let fields = scenario_fields();
        let signature = sign(&fields, &["a", "b"], b"k").unwrap();
        assert!(!verify(&fields, &["a", "b"], b"other", &signature));
        assert!(!verify(&fields, &["a", "b"], b"k", "short"));
        assert!(!verify(&fields, &["a", "b"], b"k", ""));
    }

    #[test]
    fn test_verify_returns_false_on_missing_field() {
        let fields = scenario_fields();
        assert!(!verify(&fields, &["a", "missing"], b"k", "anything"));
    }

    #[test]
    fn test_declared_names_cover_their_own_list() {
        let signer = Signer::new(SecretKey::new("k"));
        let mut fields: FieldSet = [
            ("a", "1"),
            ("b", "2"),
            (SIGNED_FIELD_NAMES, "signed_field_names,a,b"),
        ]
        .into_iter()
        .collect();
        let signature = signer.sign_declared(&fields).unwrap();
        fields.set(SIGNATURE, signature);
        assert!(signer.verify_declared(&fields));

        // Dropping `b` from the trust boundary must break the signature.
        fields.set(SIGNED_FIELD_NAMES, "signed_field_names,a");
        assert!(!signer.verify_declared(&fields));

        // So must reordering it.
        fields.set(SIGNED_FIELD_NAMES, "signed_field_names,b,a");
        assert!(!signer.verify_declared(&fields));
    }

    #[test]
    fn test_verify_covering_requires_signed_names() {
        let signer = Signer::new(SecretKey::new("k"));
        let mut fields: FieldSet = [
            ("a", "1"),
            ("b", "2"),
            (SIGNED_FIELD_NAMES, "signed_field_names,a"),
        ]
        .into_iter()
        .collect();
        let signature = signer.sign_declared(&fields).unwrap();
        fields.set(SIGNATURE, signature);

        assert!(signer.verify_declared(&fields));
        assert!(signer.verify_covering(&fields, &["a"]).is_ok());
        assert!(matches!(
            signer.verify_covering(&fields, &["a", "b"]),
            Err(GatewayError::SignatureInvalid)
        ));

        fields.set("a", "tampered");
        assert!(matches!(
            signer.verify_covering(&fields, &["a"]),
            Err(GatewayError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_verify_declared_without_signature_is_false() {
        let signer = Signer::new(SecretKey::new("k"));
        let fields: FieldSet = [("a", "1"), (SIGNED_FIELD_NAMES, "signed_field_names,a")]
            .into_iter()
            .collect();
        assert!(!signer.verify_declared(&fields));
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let key = SecretKey::new("super-secret");
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
