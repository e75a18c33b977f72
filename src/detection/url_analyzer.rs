use super::{Indicator, IndicatorType, Severity};
use crate::config::DetectionConfig;
use regex::Regex;
use url::Url;

/// URL-focused indicator extraction. Checks run in a fixed order and the
/// accumulated score is additive; an unparsable input short-circuits into a
/// single "Invalid URL" indicator instead.
pub struct UrlAnalyzer {
    config: DetectionConfig,
    ipv4_host: Regex,
}

impl UrlAnalyzer {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            ipv4_host: Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap(),
        }
    }

    pub fn analyze(&self, raw: &str) -> (u32, Vec<Indicator>) {
        let weights = &self.config.weights;

        let parsed = match Url::parse(raw) {
            Ok(url) => url,
            Err(_) => {
                let indicator = Indicator::new(
                    IndicatorType::InvalidUrl,
                    Severity::High,
                    "Input could not be parsed as a valid URL",
                );
                return (weights.invalid_url, vec![indicator]);
            }
        };

        let mut score = 0;
        let mut indicators = Vec::new();
        let host = parsed.host_str().unwrap_or("").to_lowercase();

        if self.ipv4_host.is_match(&host) {
            score += weights.ip_address;
            indicators.push(
                Indicator::new(
                    IndicatorType::IpAddress,
                    Severity::High,
                    "URL points at a raw IP address instead of a domain name",
                )
                .with_evidence(host.clone()),
            );
        }

        if let Some(tld) = self
            .config
            .suspicious_tlds
            .iter()
            .find(|tld| host.ends_with(tld.as_str()))
        {
            score += weights.suspicious_tld;
            indicators.push(
                Indicator::new(
                    IndicatorType::SuspiciousTld,
                    Severity::Medium,
                    "Domain uses a top-level domain with a high abuse rate",
                )
                .with_evidence(tld.clone()),
            );
        }

        // First brand with a matching lookalike variant wins; at most one
        // typosquatting indicator per analysis.
        if let Some(brand) = self.find_typosquatted_brand(&host) {
            score += weights.typosquatting;
            indicators.push(
                Indicator::new(
                    IndicatorType::Typosquatting,
                    Severity::High,
                    &format!("Hostname imitates the {brand} brand"),
                )
                .with_evidence(host.clone()),
            );
        }

        let labels = host.split('.').count();
        if labels > 4 {
            score += weights.excessive_subdomains;
            indicators.push(
                Indicator::new(
                    IndicatorType::ExcessiveSubdomains,
                    Severity::Medium,
                    "Hostname hides behind an unusually deep subdomain chain",
                )
                .with_evidence(format!("{labels} labels")),
            );
        }

        // Keyword scan covers the path and query; host-based signals are
        // handled by the dedicated checks above.
        let mut path_query = parsed.path().to_lowercase();
        if let Some(query) = parsed.query() {
            path_query.push('?');
            path_query.push_str(&query.to_lowercase());
        }
        let matched_keywords: Vec<&str> = self
            .config
            .url_keywords
            .iter()
            .filter(|kw| path_query.contains(kw.as_str()))
            .map(String::as_str)
            .collect();
        if matched_keywords.len() >= 2 {
            score += weights.suspicious_keywords;
            indicators.push(
                Indicator::new(
                    IndicatorType::SuspiciousKeywords,
                    Severity::Medium,
                    "URL path stacks multiple credential-bait keywords",
                )
                .with_evidence(matched_keywords.join(", ")),
            );
        }

        if raw.contains('@') {
            score += weights.url_obfuscation;
            indicators.push(Indicator::new(
                IndicatorType::UrlObfuscation,
                Severity::High,
                "URL embeds an @ sign, which can disguise the real destination",
            ));
        }

        if parsed.scheme() == "http" && !matched_keywords.is_empty() {
            score += weights.insecure_protocol;
            indicators.push(
                Indicator::new(
                    IndicatorType::InsecureProtocol,
                    Severity::Medium,
                    "Unencrypted HTTP on a page soliciting sensitive data",
                )
                .with_evidence("http".to_string()),
            );
        }

        (score, indicators)
    }

    fn find_typosquatted_brand(&self, host: &str) -> Option<&str> {
        for brand in &self.config.brands {
            if host.ends_with(&format!("{brand}.com")) {
                continue;
            }
            // Substitution variants that collapse back to the brand itself
            // (no 'l' or 'o' to swap) are skipped.
            let variants = [
                brand.replace('l', "1"),
                brand.replace('o', "0"),
                format!("{brand}-"),
                format!("{brand}secure"),
                format!("secure{brand}"),
            ];
            let hit = variants
                .iter()
                .any(|variant| variant.as_str() != brand && host.contains(variant.as_str()));
            if hit {
                return Some(brand);
            }
        }
        None
    }
}
