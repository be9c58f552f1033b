//! API credential loading
//!
//! Credentials come from the process environment, which `main` may first
//! populate from a `.env` file. They are held in memory only.

use std::fmt;

use crate::error::CliError;

pub const API_KEY_VAR: &str = "DEXCLI_API_KEY";
pub const API_SECRET_VAR: &str = "DEXCLI_API_SECRET";

/// API key and secret for signed exchange requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read credentials through `lookup`, reporting every missing variable.
    ///
    /// Empty or whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = read(API_KEY_VAR);
        let api_secret = read(API_SECRET_VAR);

        match (api_key, api_secret) {
            (Some(api_key), Some(api_secret)) => Ok(Self { api_key, api_secret }),
            (key, secret) => {
                let mut vars = Vec::new();
                if key.is_none() {
                    vars.push(API_KEY_VAR);
                }
                if secret.is_none() {
                    vars.push(API_SECRET_VAR);
                }
                Err(CliError::MissingCredentials { vars })
            }
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_both_present() {
        let creds = Credentials::from_lookup(lookup(&[
            (API_KEY_VAR, "key123"),
            (API_SECRET_VAR, " secret456 "),
        ]))
        .unwrap();
        assert_eq!(creds.api_key(), "key123");
        assert_eq!(creds.api_secret(), "secret456");
    }

    #[test]
    fn test_both_missing() {
        let err = Credentials::from_lookup(lookup(&[])).unwrap_err();
        match err {
            CliError::MissingCredentials { vars } => {
                assert_eq!(vars, vec![API_KEY_VAR, API_SECRET_VAR]);
            }
            other => panic!("Expected MissingCredentials, got {other:?}"),
        }
    }

    #[test]
    fn test_secret_missing() {
        let err = Credentials::from_lookup(lookup(&[(API_KEY_VAR, "key123")])).unwrap_err();
        assert!(matches!(err, CliError::MissingCredentials { ref vars } if vars == &vec![API_SECRET_VAR]));
        assert!(err.to_string().contains(API_SECRET_VAR));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            (API_KEY_VAR, "   "),
            (API_SECRET_VAR, "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, CliError::MissingCredentials { ref vars } if vars == &vec![API_KEY_VAR]));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("visible-key", "hidden-secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("visible-key"));
        assert!(!debug.contains("hidden-secret"));
    }
}
