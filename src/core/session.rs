//! Session tokens and the standalone demo login. Sessions are HS256
//! JWTs carried in an HttpOnly cookie (or an Authorization bearer
//! header for API clients) and verified on every request.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SESSION_COOKIE: &str = "cockpit_session";
pub const CSRF_COOKIE: &str = "cockpit_csrf";
pub const SESSION_TTL_SECS: i64 = 8 * 60 * 60;

const DEMO_USERNAME: &str = "demo";
// sha256("cockpit-demo")
const DEMO_PASSWORD_HASH: &str =
    "481c18e434ace53e41a34907843e66d01314af272c502ba44e75c21ba69d9de5";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session expired")]
    Expired,
    #[error("invalid session token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub tenant: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Per-process random secret for deployments without JWT_SECRET.
    /// Sessions then only survive as long as the process.
    pub fn random() -> Self {
        let secret: [u8; 32] = rand::random();
        Self::new(&secret)
    }

    pub fn issue(
        &self,
        subject: &str,
        role: &str,
        tenant: &str,
    ) -> Result<String, SessionError> {
        self.issue_with_ttl(subject, role, tenant, SESSION_TTL_SECS)
    }

    pub fn issue_with_ttl(
        &self,
        subject: &str,
        role: &str,
        tenant: &str,
        ttl_secs: i64,
    ) -> Result<String, SessionError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            role: role.to_string(),
            tenant: tenant.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| SessionError::Invalid(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e.to_string()),
            })
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The fixed standalone-mode credential pair.
pub fn verify_demo_credentials(username: &str, password: &str) -> bool {
    username == DEMO_USERNAME && sha256_hex(password) == DEMO_PASSWORD_HASH
}

pub fn generate_csrf_token() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
