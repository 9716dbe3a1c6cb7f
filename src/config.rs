use std::fmt;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Generation API credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty value, which counts as "not configured".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<ApiKey>,
    pub api_base: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup(API_KEY_ENV).and_then(ApiKey::new),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup_reads_api_key() {
        let config = Config::from_lookup(|name| {
            (name == API_KEY_ENV).then(|| "secret-key".to_string())
        });
        assert_eq!(config.api_key.as_ref().map(ApiKey::expose), Some("secret-key"));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_empty_api_key_is_missing() {
        let config = Config::from_lookup(|_| Some(String::new()));
        assert!(config.api_key.is_none());

        let config = Config::from_lookup(|_| None);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret").unwrap();
        let printed = format!("{:?}", Config { api_key: Some(key), ..Config::default() });
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("ApiKey(***)"));
    }
}
