// security/src/lib.rs

//! The access-control gate: password hashing with Argon2 and JWT token
//! pairs. A login hands out a short-lived access token plus a longer-lived
//! refresh token; only access tokens authenticate requests.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default access-token lifetime, seconds.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
/// Default refresh-token lifetime, seconds.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Discriminates the two tokens of a pair inside their claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims for JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (username)
    pub uid: i64,    // Account id
    pub iat: u64,    // Issued at
    pub exp: u64,    // Expiration time
    pub kind: TokenKind,
}

/// The credential pair issued on registration and login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Custom authentication errors.
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    TokenExpired,
    InvalidToken(String),
    WrongTokenKind,
    PasswordHash(String),
    Jwt(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::WrongTokenKind => write!(f, "Token is not valid for this use"),
            AuthError::PasswordHash(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::Jwt(msg) => write!(f, "JWT error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Hashes a password using Argon2, producing a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(format!("failed to hash password: {}", e)))
}

/// Verifies a password against a stored Argon2 hash. A mismatch is
/// `Ok(false)`; `Err` means the stored hash itself is unusable.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AuthError> {
    let password_hash = PasswordHash::new(hashed_password)
        .map_err(|e| AuthError::PasswordHash(format!("failed to parse password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &password_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHash(format!(
            "failed to verify password: {}",
            e
        ))),
    }
}

/// Issues a fresh access/refresh pair for an account.
pub fn issue_token_pair(
    uid: i64,
    username: &str,
    secret: &[u8],
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: issue_token(uid, username, secret, TokenKind::Access, access_ttl_secs)?,
        refresh: issue_token(uid, username, secret, TokenKind::Refresh, refresh_ttl_secs)?,
    })
}

fn issue_token(
    uid: i64,
    username: &str,
    secret: &[u8],
    kind: TokenKind,
    ttl_secs: i64,
) -> Result<String, AuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthError::Jwt(format!("system time error: {}", e)))?
        .as_secs();

    let claims = Claims {
        sub: username.to_string(),
        uid,
        iat: now,
        exp: (now as i64 + ttl_secs).max(0) as u64,
        kind,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Jwt(format!("failed to encode JWT: {}", e)))
}

/// Decodes and validates a token, requiring the expected kind. Expiry is
/// enforced by the decoder; a refresh token presented where an access token
/// is required fails with `WrongTokenKind`.
pub fn validate_token(token: &str, secret: &[u8], expected: TokenKind) -> Result<Claims, AuthError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    })?;

    if decoded.claims.kind != expected {
        return Err(AuthError::WrongTokenKind);
    }
    Ok(decoded.claims)
}
