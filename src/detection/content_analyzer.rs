use super::{Indicator, IndicatorType, Severity};
use crate::config::DetectionConfig;
use regex::Regex;

/// Email/message body analysis. Every check runs against the lowercased text
/// and contributes additively, so adding trigger phrases can only raise the
/// score, never lower it.
pub struct ContentAnalyzer {
    config: DetectionConfig,
    link_pattern: Regex,
    ipv4_link: Regex,
}

impl ContentAnalyzer {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            link_pattern: Regex::new(r#"https?://[^\s<>"']+"#).unwrap(),
            ipv4_link: Regex::new(r"^https?://\d{1,3}(\.\d{1,3}){3}").unwrap(),
        }
    }

    pub fn analyze(&self, input: &str) -> (u32, Vec<Indicator>) {
        let weights = &self.config.weights;
        let text = input.to_lowercase();
        let mut score = 0;
        let mut indicators = Vec::new();

        let urgency = self.matches(&text, &self.config.urgency_keywords);
        if !urgency.is_empty() {
            let severity = if urgency.len() > 2 {
                Severity::High
            } else {
                Severity::Medium
            };
            score += urgency.len() as u32 * weights.urgency_per_match;
            indicators.push(
                Indicator::new(
                    IndicatorType::UrgencyTactics,
                    severity,
                    "Pressure language designed to rush a decision",
                )
                .with_evidence(join_first(&urgency, 3)),
            );
        }

        let credentials = self.matches(&text, &self.config.credential_keywords);
        if !credentials.is_empty() {
            score += weights.credential_request;
            indicators.push(
                Indicator::new(
                    IndicatorType::CredentialRequest,
                    Severity::High,
                    "Asks for credentials or sensitive personal data",
                )
                .with_evidence(join_first(&credentials, 2)),
            );
        }

        let authority = self.matches(&text, &self.config.authority_keywords);
        if !authority.is_empty() {
            score += weights.authority_impersonation;
            indicators.push(
                Indicator::new(
                    IndicatorType::AuthorityImpersonation,
                    Severity::High,
                    "Claims to speak for a government body or well-known company",
                )
                .with_evidence(join_first(&authority, 1)),
            );
        }

        let threats = self.matches(&text, &self.config.threat_keywords);
        if !threats.is_empty() {
            score += weights.threatening_language;
            indicators.push(
                Indicator::new(
                    IndicatorType::ThreateningLanguage,
                    Severity::High,
                    "Threatens negative consequences to force compliance",
                )
                .with_evidence(join_first(&threats, 2)),
            );
        }

        let rewards = self.matches(&text, &self.config.reward_keywords);
        if !rewards.is_empty() {
            score += weights.too_good_to_be_true;
            indicators.push(
                Indicator::new(
                    IndicatorType::TooGoodToBeTrue,
                    Severity::Medium,
                    "Promises an unrealistic reward or windfall",
                )
                .with_evidence(join_first(&rewards, 1)),
            );
        }

        let suspicious_links = self.count_suspicious_links(&text);
        if suspicious_links > 0 {
            score += weights.suspicious_links;
            indicators.push(
                Indicator::new(
                    IndicatorType::SuspiciousLinks,
                    Severity::Medium,
                    "Links route through shorteners or low-reputation hosts",
                )
                .with_evidence(format!("{suspicious_links} suspicious link(s)")),
            );
        }

        let greetings = self.matches(&text, &self.config.greeting_keywords);
        if !greetings.is_empty() {
            score += weights.generic_greeting;
            indicators.push(
                Indicator::new(
                    IndicatorType::GenericGreeting,
                    Severity::Low,
                    "Impersonal greeting or phrasing typical of bulk phishing",
                )
                .with_evidence(join_first(&greetings, 1)),
            );
        }

        (score, indicators)
    }

    fn matches<'a>(&self, text: &str, keywords: &'a [String]) -> Vec<&'a str> {
        keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()))
            .map(String::as_str)
            .collect()
    }

    fn count_suspicious_links(&self, text: &str) -> usize {
        self.link_pattern
            .find_iter(text)
            .filter(|link| self.is_suspicious_link(link.as_str()))
            .count()
    }

    fn is_suspicious_link(&self, link: &str) -> bool {
        if self
            .config
            .url_shorteners
            .iter()
            .any(|shortener| link.contains(shortener.as_str()))
        {
            return true;
        }
        let host = link
            .split("://")
            .nth(1)
            .unwrap_or("")
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("");
        if self
            .config
            .suspicious_tlds
            .iter()
            .any(|tld| host.ends_with(tld.as_str()))
        {
            return true;
        }
        self.ipv4_link.is_match(link)
    }
}

fn join_first(matches: &[&str], limit: usize) -> String {
    matches
        .iter()
        .take(limit)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}
