use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use smokesignal_core::errors::AuthFailure;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Clone, Debug)]
enum KeyState {
    Missing,
    Malformed,
    Ready(VerifyingKey),
}

/// Admits or rejects inbound interactions by their detached Ed25519 signature over
/// `timestamp || body`. The body is never parsed here.
#[derive(Clone, Debug)]
pub struct RequestAuthenticator {
    key: KeyState,
}

impl RequestAuthenticator {
    pub fn new(public_key: Option<&str>) -> Self {
        let key = match public_key.map(str::trim).filter(|key| !key.is_empty()) {
            None => KeyState::Missing,
            Some(hex_key) => parse_public_key(hex_key).map_or(KeyState::Malformed, KeyState::Ready),
        };
        Self { key }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.key, KeyState::Ready(_))
    }

    pub fn authenticate(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<(), AuthFailure> {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return Err(AuthFailure::MissingHeaders);
        };

        let key = match &self.key {
            KeyState::Missing => return Err(AuthFailure::MissingPublicKey),
            KeyState::Malformed => return Err(AuthFailure::MalformedPublicKey),
            KeyState::Ready(key) => key,
        };

        let signature = parse_signature(signature).ok_or(AuthFailure::MalformedSignature)?;

        let mut message = Vec::with_capacity(timestamp.len() + raw_body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(raw_body);

        key.verify_strict(&message, &signature).map_err(|_| AuthFailure::BadSignature)
    }
}

/// Boolean form of [`RequestAuthenticator::authenticate`] for one-off checks.
pub fn authenticate(raw_body: &[u8], signature: &str, timestamp: &str, public_key: &str) -> bool {
    RequestAuthenticator::new(Some(public_key))
        .authenticate(raw_body, Some(signature), Some(timestamp))
        .is_ok()
}

fn parse_public_key(hex_key: &str) -> Option<VerifyingKey> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = hex::decode(hex_key).ok()?.try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

fn parse_signature(hex_signature: &str) -> Option<Signature> {
    let bytes: [u8; SIGNATURE_LENGTH] = hex::decode(hex_signature.trim()).ok()?.try_into().ok()?;
    Some(Signature::from_bytes(&bytes))
}
