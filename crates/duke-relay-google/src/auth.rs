//! Service account credentials and access tokens

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuthError;

/// Environment variable naming a service account key file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// OAuth scope for full Drive access
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// OAuth scope for Sheets access
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Where a service account key comes from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// A key file on disk
    Path(PathBuf),
    /// An already parsed key document
    Document(Value),
}

impl CredentialSource {
    /// Pick a credential source: explicit path, then explicit document, then
    /// the path named by [`CREDENTIALS_ENV`].
    pub fn resolve(path: Option<&Path>, document: Option<&Value>) -> Result<Self, AuthError> {
        if let Some(path) = path {
            return Ok(CredentialSource::Path(path.to_path_buf()));
        }
        if let Some(document) = document {
            return Ok(CredentialSource::Document(document.clone()));
        }
        match std::env::var_os(CREDENTIALS_ENV) {
            Some(path) if !path.is_empty() => Ok(CredentialSource::Path(PathBuf::from(path))),
            _ => Err(AuthError::MissingCredentials),
        }
    }

    /// Read and parse the key
    pub fn load(&self) -> Result<ServiceAccountKey, AuthError> {
        match self {
            CredentialSource::Path(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| AuthError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(serde_json::from_str(&text)?)
            }
            CredentialSource::Document(document) => Ok(ServiceAccountKey::deserialize(document)?),
        }
    }
}

/// The parts of a service account key document this crate uses
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Exchanges signed service account assertions for bearer tokens
///
/// The key is parsed once at construction; the current token is cached until
/// shortly before it expires.
pub struct ServiceAccountAuth {
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    scope: String,
    encoding_key: EncodingKey,
    http: reqwest::blocking::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: &ServiceAccountKey, scope: &str) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            key_id: key.private_key_id.clone(),
            scope: scope.to_string(),
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Resolve, load and prepare credentials in one step
    pub fn from_source(source: &CredentialSource, scope: &str) -> Result<Self, AuthError> {
        Self::new(&source.load()?, scope)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// A valid access token, exchanging a new assertion when needed
    pub fn token(&self) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| AuthError::TokenExchange("token cache poisoned".into()))?;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.exchange(now)?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    fn assertion(&self, now: i64) -> Result<String, AuthError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let claims = Claims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: &self.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    fn exchange(&self, now: i64) -> Result<CachedToken, AuthError> {
        let assertion = self.assertion(now)?;
        tracing::debug!("Requesting access token for {}", self.client_email);

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AuthError::TokenExchange(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json()?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        })
    }
}
