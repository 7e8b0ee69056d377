use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use fernet::Fernet;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::metrics_consts::OVERRIDE_COOKIE_REJECTED_COUNTER;

pub const OVERRIDES_COOKIE_NAME: &str = "vercel-flag-overrides";

/// Manually chosen flag values, keyed by flag key.
pub type FlagOverrides = Map<String, Value>;

#[derive(Error, Debug)]
pub enum OverrideError {
    #[error("override cookie could not be decrypted")]
    Decryption,
    #[error("override cookie does not hold a JSON object: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("decrypted override cookie is not an object")]
    NotAnObject,
}

/// Encrypts and decrypts the override cookie.
///
/// The Fernet key is the SHA-256 digest of the flags secret, so changing the
/// secret invalidates every override cookie in circulation.
#[derive(Clone)]
pub struct OverrideCipher {
    fernet: Arc<Fernet>,
}

impl OverrideCipher {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = URL_SAFE.encode(digest);
        let fernet = Fernet::new(&key).expect("sha256 digest is a valid fernet key");
        OverrideCipher {
            fernet: Arc::new(fernet),
        }
    }

    pub fn encrypt(&self, overrides: &FlagOverrides) -> Result<String, serde_json::Error> {
        let serialized = serde_json::to_vec(overrides)?;
        Ok(self.fernet.encrypt(&serialized))
    }

    pub fn decrypt(&self, token: &str) -> Result<FlagOverrides, OverrideError> {
        let decrypted = self
            .fernet
            .decrypt(token)
            .map_err(|_| OverrideError::Decryption)?;
        match serde_json::from_slice::<Value>(&decrypted)? {
            Value::Object(map) => Ok(map),
            _ => Err(OverrideError::NotAnObject),
        }
    }

    /// Overrides carried by the request. A missing or unreadable cookie means
    /// no overrides.
    pub fn read(&self, jar: &CookieJar) -> FlagOverrides {
        let Some(cookie) = jar.get(OVERRIDES_COOKIE_NAME) else {
            return FlagOverrides::new();
        };

        match self.decrypt(cookie.value()) {
            Ok(overrides) => overrides,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unreadable override cookie");
                metrics::counter!(OVERRIDE_COOKIE_REJECTED_COUNTER).increment(1);
                FlagOverrides::new()
            }
        }
    }
}

/// Shallow merge: keys in `update` replace the same keys in `current`.
pub fn merge_overrides(mut current: FlagOverrides, update: FlagOverrides) -> FlagOverrides {
    for (key, value) in update {
        current.insert(key, value);
    }
    current
}

/// The cookie written after an override update. Readable by client script so
/// the toolbar can reflect it.
pub fn override_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OVERRIDES_COOKIE_NAME, value))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .http_only(false)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((OVERRIDES_COOKIE_NAME, "")).path("/").build();
    cookie.make_removal();
    cookie
}
