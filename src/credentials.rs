use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub const BOOKS_SCOPE: &str = "https://www.googleapis.com/auth/books";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Google service account key file (the JSON downloaded from the cloud console).
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub client_email: String,
    pub private_key: String,
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("kind", &self.kind)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read credential file: {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse credential file: {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let key: Self = serde_json::from_str(raw).context("deserialize service account key")?;
        if let Some(kind) = key.kind.as_deref()
            && kind != "service_account"
        {
            anyhow::bail!("credential type must be \"service_account\", got {kind:?}");
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Signs the RS256 JWT assertion exchanged for an access token.
pub fn sign_assertion(
    key: &ServiceAccountKey,
    scope: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<String> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: scope.to_owned(),
        aud: key.token_uri.clone(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("load service account private key")?;
    jsonwebtoken::encode(&header, &claims, &encoding_key).context("sign jwt assertion")
}

/// Bearer credential presented on every search request.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            secret: secret.into(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

pub fn fetch_access_token(
    client: &reqwest::blocking::Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> anyhow::Result<AccessToken> {
    let assertion = sign_assertion(key, scope, chrono::Utc::now())?;
    let endpoint = key.token_uri.as_str();

    let response = client
        .post(endpoint)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .with_context(|| format!("POST {endpoint}"))?;

    let status = response.status();
    let raw = response.text().context("read token response body")?;
    if !status.is_success() {
        let message = parse_error_message(&raw).unwrap_or(raw);
        anyhow::bail!("token request failed ({status}): {message}");
    }

    let token: TokenResponse = serde_json::from_str(&raw).context("parse token response")?;
    if token.access_token.is_empty() {
        anyhow::bail!("token response has empty access_token");
    }

    tracing::debug!(
        client_email = %key.client_email,
        expires_in = ?token.expires_in,
        "acquired access token"
    );
    Ok(AccessToken::new(
        token.access_token,
        token.expires_in.map(Duration::from_secs),
    ))
}

fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let error = value.get("error")?.as_str()?;
    match value.get("error_description").and_then(|v| v.as_str()) {
        Some(description) => Some(format!("{error}: {description}")),
        None => Some(error.to_owned()),
    }
}
