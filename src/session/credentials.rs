//! Credential resolution.
//!
//! The engine only ever receives an already-resolved password; the chain
//! here is the priority order across the places one can live.

use std::env;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Environment variable consulted when no password is configured.
pub const PASSWORD_ENV: &str = "IMAP_DEDUP_PASSWORD";

/// Resolved login material handed to the session.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    /// Admin account for SASL PLAIN proxy authentication, if any.
    pub authuser: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("authuser", &self.authuser)
            .finish()
    }
}

/// Resolve credentials from the configured sources.
///
/// Priority order: keyring (when requested), explicit password, the
/// `IMAP_DEDUP_PASSWORD` environment variable, interactive prompt.
pub fn resolve_credentials(auth: &AuthConfig, server_host: &str) -> Result<Credentials> {
    let user = auth
        .user
        .clone()
        .ok_or_else(|| Error::MissingConfig("auth.user".to_string()))?;

    let password = if let Some(service) = keyring_service(auth, server_host) {
        lookup_keyring(&service, &user)?
    } else if let Some(password) = &auth.password {
        password.clone()
    } else if let Ok(password) = env::var(PASSWORD_ENV) {
        password
    } else {
        prompt_password(&user, server_host)?
    };

    if password.is_empty() {
        return Err(Error::Credentials(format!(
            "empty password for {}",
            user
        )));
    }

    Ok(Credentials {
        user,
        password,
        authuser: auth.authuser.clone(),
    })
}

/// The keyring service to query, if keyring lookup was requested. An empty
/// configured value means "use the server host name".
fn keyring_service(auth: &AuthConfig, server_host: &str) -> Option<String> {
    let service = auth.keyring.as_ref()?;
    if service.is_empty() {
        Some(server_host.to_string())
    } else {
        Some(service.clone())
    }
}

fn lookup_keyring(service: &str, user: &str) -> Result<String> {
    tracing::debug!("keyring lookup: service={:?} user={:?}", service, user);
    let entry = keyring::Entry::new(service, user)?;
    Ok(entry.get_password()?)
}

fn prompt_password(user: &str, server_host: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("Password for {}@{}: ", user, server_host))?;
    Ok(password)
}
