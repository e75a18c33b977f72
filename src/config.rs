use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration: detection rule tables plus server settings.
///
/// Every field has a compiled-in default, so a config file only needs to
/// override the pieces it cares about.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub detection: DetectionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub database_path: String,
    /// Requests with content shorter than this are rejected before analysis.
    pub min_content_length: usize,
    /// Analyses scoring at or above this are persisted to the record store.
    pub persist_threshold: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8088".to_string(),
            database_path: "phishguard.db".to_string(),
            min_content_length: 5,
            persist_threshold: 20,
        }
    }
}

/// Rule tables and scoring weights for the detector.
///
/// Lists are evaluated in declaration order; first-match-wins checks
/// (typosquatting) depend on that order being stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub weights: ScoringWeights,
    pub suspicious_tlds: Vec<String>,
    pub url_shorteners: Vec<String>,
    pub brands: Vec<String>,
    pub url_keywords: Vec<String>,
    pub urgency_keywords: Vec<String>,
    pub credential_keywords: Vec<String>,
    pub authority_keywords: Vec<String>,
    pub threat_keywords: Vec<String>,
    pub reward_keywords: Vec<String>,
    pub greeting_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub ip_address: u32,
    pub suspicious_tld: u32,
    pub typosquatting: u32,
    pub excessive_subdomains: u32,
    pub suspicious_keywords: u32,
    pub url_obfuscation: u32,
    pub insecure_protocol: u32,
    pub invalid_url: u32,
    pub urgency_per_match: u32,
    pub credential_request: u32,
    pub authority_impersonation: u32,
    pub threatening_language: u32,
    pub too_good_to_be_true: u32,
    pub suspicious_links: u32,
    pub generic_greeting: u32,
    /// Scores at or above this are reported as phishing.
    pub phishing_threshold: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ip_address: 25,
            suspicious_tld: 15,
            typosquatting: 30,
            excessive_subdomains: 10,
            suspicious_keywords: 15,
            url_obfuscation: 25,
            insecure_protocol: 10,
            invalid_url: 20,
            urgency_per_match: 10,
            credential_request: 25,
            authority_impersonation: 20,
            threatening_language: 20,
            too_good_to_be_true: 15,
            suspicious_links: 15,
            generic_greeting: 5,
            phishing_threshold: 40,
        }
    }
}

fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            suspicious_tlds: string_list(&[
                ".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".work",
            ]),
            url_shorteners: string_list(&[
                "bit.ly",
                "tinyurl.com",
                "goo.gl",
                "t.co",
                "ow.ly",
                "is.gd",
                "buff.ly",
                "cutt.ly",
            ]),
            brands: string_list(&[
                "paypal",
                "google",
                "amazon",
                "microsoft",
                "apple",
                "netflix",
            ]),
            url_keywords: string_list(&[
                "login", "verify", "account", "secure", "update", "confirm", "banking",
                "password",
            ]),
            urgency_keywords: string_list(&[
                "urgent",
                "immediately",
                "act now",
                "right away",
                "expires today",
                "limited time",
                "within 24 hours",
                "final notice",
                "last chance",
                "time sensitive",
                "don't delay",
                "as soon as possible",
            ]),
            credential_keywords: string_list(&[
                "password",
                "social security",
                "credit card",
                "bank account",
                "pin number",
                "verify your identity",
                "confirm your account",
                "update payment",
                "billing information",
            ]),
            authority_keywords: string_list(&[
                "irs",
                "fbi",
                "police",
                "government",
                "tax authority",
                "your bank",
                "paypal",
                "amazon",
                "microsoft support",
                "apple support",
                "google security",
            ]),
            threat_keywords: string_list(&[
                "suspended",
                "locked",
                "closed",
                "terminated",
                "legal action",
                "lawsuit",
                "arrest",
                "penalty",
                "unauthorized",
                "permanently deleted",
            ]),
            reward_keywords: string_list(&[
                "congratulations",
                "winner",
                "you have won",
                "you've won",
                "prize",
                "lottery",
                "free gift",
                "claim your reward",
                "million dollar",
                "exclusive offer",
            ]),
            greeting_keywords: string_list(&[
                "dear customer",
                "dear user",
                "dear member",
                "kindly",
                "do the needful",
                "revert back",
            ]),
        }
    }
}

impl AnalyzerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AnalyzerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("Config file {path} not found, using built-in defaults");
            Ok(Self::default())
        }
    }

    pub fn generate_default(path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(&Self::default())?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {path}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_cover_all_checks() {
        let w = ScoringWeights::default();
        assert_eq!(w.typosquatting, 30);
        assert_eq!(w.phishing_threshold, 40);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: AnalyzerConfig =
            serde_yaml::from_str("server:\n  listen: \"0.0.0.0:9000\"\n").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.server.min_content_length, 5);
        assert_eq!(config.detection.suspicious_tlds.len(), 8);
    }

    #[test]
    fn default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&AnalyzerConfig::default()).unwrap();
        let parsed: AnalyzerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed.detection.brands,
            AnalyzerConfig::default().detection.brands
        );
    }
}
