//! Token claims and the encode/decode seam.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Identity data carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the caller.
    pub username: String,
    /// Whether the caller has admin rights.
    #[serde(default)]
    pub admin: bool,
}

impl Claims {
    /// Creates a claims payload.
    pub fn new(username: impl Into<String>, admin: bool) -> Self {
        Self {
            username: username.into(),
            admin,
        }
    }
}

/// Token encode/decode capability.
///
/// `decode` distinguishes two failure channels: `Ok(None)` means the token
/// carried no usable payload, while `Err` means the decoder itself raised.
/// The pipeline treats the two differently, so implementations must not
/// collapse one into the other.
pub trait TokenCodec: Send + Sync {
    /// Decodes a token into its claims payload, if it has one.
    fn decode(&self, token: &str) -> Result<Option<Claims>, AuthError>;

    /// Encodes a claims payload into a signed token.
    fn encode(&self, claims: &Claims) -> Result<String, AuthError>;
}

/// JWT codec signing and verifying with a shared HS256 secret.
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    /// Creates a codec from the shared secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry only username/admin; no registered claims to check.
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenCodec for JwtCodec {
    fn decode(&self, token: &str) -> Result<Option<Claims>, AuthError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(Some(data.claims)),
            // A token that does not parse as a JWT has no payload; anything
            // else (bad signature, claim validation) is a raised error.
            Err(e) => match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => Ok(None),
                _ => Err(AuthError::Token(e)),
            },
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding_key)
            .map_err(AuthError::Token)
    }
}
