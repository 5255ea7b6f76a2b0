//! Service-account OAuth for the Earth Engine REST API.
//!
//! A self-signed RS256 JWT is exchanged for a short-lived bearer token,
//! which is cached until shortly before it expires.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::Mutex;
use reqwest::Client;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::imagery::config::ServiceCredentials;
use crate::imagery::service::{ErrorContext, ImageryError, ImageryResult};

/// OAuth scope granting Earth Engine access.
pub const EARTHENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Assertion lifetime accepted by the token endpoint.
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(account: &str, audience: &str, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: account.to_string(),
            scope: EARTHENGINE_SCOPE.to_string(),
            aud: audience.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_after: DateTime<Utc>,
}

/// Signs assertions with the service account key and caches access tokens.
pub struct TokenSource {
    client: Client,
    credentials: ServiceCredentials,
    token_uri: String,
    key: SigningKey<Sha256>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    /// Parse the credentials' PKCS#8 key.
    ///
    /// # Errors
    /// `ImageryError::Authentication` if the key is not a valid RSA PEM.
    pub fn new(
        client: Client,
        credentials: ServiceCredentials,
        token_uri: impl Into<String>,
    ) -> ImageryResult<Self> {
        let pem = credentials.private_key_pem();
        let private_key = RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| {
            ImageryError::Authentication {
                message: format!("invalid service account key: {}", e),
                context: ErrorContext::new("load_credentials")
                    .with_entity("account")
                    .with_entity_id(&credentials.account),
            }
        })?;

        Ok(Self {
            client,
            credentials,
            token_uri: token_uri.into(),
            key: SigningKey::<Sha256>::new(private_key),
            cached: Mutex::new(None),
        })
    }

    pub fn account(&self) -> &str {
        &self.credentials.account
    }

    /// Signed `header.claims.signature` JWT for the token endpoint.
    pub fn signed_assertion(&self, now: DateTime<Utc>) -> ImageryResult<String> {
        let header = serde_json::json!({ "alg": "RS256", "typ": "JWT" });
        let claims = Claims::new(&self.credentials.account, &self.token_uri, now);
        let claims = serde_json::to_vec(&claims)
            .map_err(|e| ImageryError::internal(format!("failed to encode claims: {}", e)))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let signature = self.key.sign(signing_input.as_bytes());
        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    /// A valid bearer token, exchanging a new assertion when the cached one
    /// is missing or about to expire.
    pub async fn access_token(&self) -> ImageryResult<String> {
        let now = Utc::now();
        if let Some(token) = self.cached.lock().as_ref() {
            if token.refresh_after > now {
                return Ok(token.access_token.clone());
            }
        }

        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| ImageryError::from(e).with_operation("access_token"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageryError::Authentication {
                message: format!("token exchange failed with status {}", status),
                context: ErrorContext::new("access_token")
                    .with_entity("account")
                    .with_entity_id(&self.credentials.account)
                    .with_details(body),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ImageryError::malformed(format!("failed to parse token response: {}", e))
                .with_operation("access_token")
        })?;
        debug!(
            "obtained access token for {} valid for {}s",
            self.credentials.account, token.expires_in
        );

        let refresh_after = now + Duration::seconds(token.expires_in - REFRESH_MARGIN_SECS);
        *self.cached.lock() = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_after,
        });
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;

    const TEST_KEY: &str = include_str!("../../../../tests/fixtures/test_service_key.pem");
    const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

    fn credentials(key: &str) -> ServiceCredentials {
        ServiceCredentials::new("dashboard@ndvi-demo.iam.gserviceaccount.com", key)
    }

    #[test]
    fn test_claims() {
        let now = Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap();
        let claims = Claims::new("a@b.iam.gserviceaccount.com", TOKEN_URI, now);
        assert_eq!(claims.scope, EARTHENGINE_SCOPE);
        assert_eq!(claims.aud, TOKEN_URI);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_invalid_key_is_authentication_error() {
        let err = TokenSource::new(Client::new(), credentials("not a key"), TOKEN_URI)
            .err()
            .unwrap();
        assert!(matches!(err, ImageryError::Authentication { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("load_credentials"));
    }

    #[test]
    fn test_signed_assertion_verifies() {
        let source = TokenSource::new(Client::new(), credentials(TEST_KEY), TOKEN_URI).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap();
        let jwt = source.signed_assertion(now).unwrap();

        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "RS256");
        let claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims.iss, "dashboard@ndvi-demo.iam.gserviceaccount.com");
        assert_eq!(claims.iat, now.timestamp());

        let public = RsaPrivateKey::from_pkcs8_pem(TEST_KEY).unwrap().to_public_key();
        let verifier = VerifyingKey::<Sha256>::new(public);
        let signature = Signature::try_from(URL_SAFE_NO_PAD.decode(parts[2]).unwrap().as_slice()).unwrap();
        let message = format!("{}.{}", parts[0], parts[1]);
        assert!(verifier.verify(message.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn test_escaped_newlines_in_key_are_accepted() {
        let escaped = TEST_KEY.trim_end().replace('\n', "\\n");
        assert!(TokenSource::new(Client::new(), credentials(&escaped), TOKEN_URI).is_ok());
    }
}
