use crate::capacity::{CapacityParseError, TableCapacity};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_GATEWAY_URL: &str = "https://script.google.com/macros/s/AKfycbwnfxdaWlJ7gD0PEX7JNzn7OMvV6H9AVqQBEIe6BsudItekBVN6BBlt0LtjeKusg9VL/exec";

/// Optional landing page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub feedback: bool,
    pub gallery: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            feedback: true,
            gallery: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub gateway_url: String,
    pub capacity: TableCapacity,
    /// Empty means admin login is refused outright.
    pub admin_passwords: Vec<String>,
    pub features: Features,
}

impl Config {
    pub fn from_env() -> Result<Self, CapacityParseError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CapacityParseError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));
        let gateway_url = lookup("GATEWAY_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        let capacity = match lookup("TABLE_CAPACITIES") {
            Some(value) => value.parse()?,
            None => TableCapacity::default(),
        };
        let admin_passwords = lookup("ADMIN_PASSWORDS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|password| !password.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let features = Features {
            feedback: flag(lookup("FEATURE_FEEDBACK"), true),
            gallery: flag(lookup("FEATURE_GALLERY"), true),
        };

        Ok(Self {
            port,
            data_path,
            gateway_url,
            capacity,
            admin_passwords,
            features,
        })
    }

    pub fn accepts_admin_password(&self, candidate: &str) -> bool {
        self.admin_passwords.iter().any(|password| password == candidate)
    }
}

fn flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, CapacityParseError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_deployment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.capacity, TableCapacity::default());
        assert_eq!(config.features, Features::default());
        assert!(!config.accepts_admin_password(""));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("TABLE_CAPACITIES", "it=3"),
            ("ADMIN_PASSWORDS", "alpha, beta"),
            ("FEATURE_GALLERY", "off"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.capacity.limit("it"), Some(3));
        assert_eq!(config.capacity.limit("japanese"), None);
        assert!(config.accepts_admin_password("beta"));
        assert!(!config.features.gallery);
        assert!(config.features.feedback);
    }

    #[test]
    fn malformed_capacity_is_an_error() {
        assert!(config_from(&[("TABLE_CAPACITIES", "it:5")]).is_err());
    }
}
