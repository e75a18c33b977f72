pub mod content_analyzer;
pub mod url_analyzer;

use crate::config::DetectionConfig;
use content_analyzer::ContentAnalyzer;
use serde::{Deserialize, Serialize};
use url_analyzer::UrlAnalyzer;

/// Severity of a single detected signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// What kind of content the detector believes it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Url,
    Email,
    Message,
}

impl ContentCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ContentCategory::Url => "url",
            ContentCategory::Email => "email",
            ContentCategory::Message => "message",
        }
    }
}

/// Closed set of indicator types. The reasoner matches on these, so keeping
/// them as an enum rules out label drift between the two stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorType {
    #[serde(rename = "IP Address")]
    IpAddress,
    #[serde(rename = "Suspicious TLD")]
    SuspiciousTld,
    #[serde(rename = "Typosquatting")]
    Typosquatting,
    #[serde(rename = "Excessive Subdomains")]
    ExcessiveSubdomains,
    #[serde(rename = "Suspicious Keywords")]
    SuspiciousKeywords,
    #[serde(rename = "URL Obfuscation")]
    UrlObfuscation,
    #[serde(rename = "Insecure Protocol")]
    InsecureProtocol,
    #[serde(rename = "Invalid URL")]
    InvalidUrl,
    #[serde(rename = "Urgency Tactics")]
    UrgencyTactics,
    #[serde(rename = "Credential Request")]
    CredentialRequest,
    #[serde(rename = "Authority Impersonation")]
    AuthorityImpersonation,
    #[serde(rename = "Threatening Language")]
    ThreateningLanguage,
    #[serde(rename = "Too Good to Be True")]
    TooGoodToBeTrue,
    #[serde(rename = "Suspicious Links")]
    SuspiciousLinks,
    #[serde(rename = "Generic Greeting")]
    GenericGreeting,
}

impl IndicatorType {
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorType::IpAddress => "IP Address",
            IndicatorType::SuspiciousTld => "Suspicious TLD",
            IndicatorType::Typosquatting => "Typosquatting",
            IndicatorType::ExcessiveSubdomains => "Excessive Subdomains",
            IndicatorType::SuspiciousKeywords => "Suspicious Keywords",
            IndicatorType::UrlObfuscation => "URL Obfuscation",
            IndicatorType::InsecureProtocol => "Insecure Protocol",
            IndicatorType::InvalidUrl => "Invalid URL",
            IndicatorType::UrgencyTactics => "Urgency Tactics",
            IndicatorType::CredentialRequest => "Credential Request",
            IndicatorType::AuthorityImpersonation => "Authority Impersonation",
            IndicatorType::ThreateningLanguage => "Threatening Language",
            IndicatorType::TooGoodToBeTrue => "Too Good to Be True",
            IndicatorType::SuspiciousLinks => "Suspicious Links",
            IndicatorType::GenericGreeting => "Generic Greeting",
        }
    }
}

/// One detected signal. Immutable once produced; the order in which the
/// analyzers append indicators is preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "type")]
    pub kind: IndicatorType,
    pub severity: Severity,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl Indicator {
    pub fn new(kind: IndicatorType, severity: Severity, description: &str) -> Self {
        Self {
            kind,
            severity,
            description: description.to_string(),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: String) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_phishing: bool,
    pub threat_score: u32,
    pub indicators: Vec<Indicator>,
    pub category: ContentCategory,
}

/// Stage one of the pipeline: extracts weighted indicators from raw text and
/// produces a bounded threat score. Pure and total; malformed input is
/// reported as an indicator, never as an error.
pub struct Detector {
    config: DetectionConfig,
    url_analyzer: UrlAnalyzer,
    content_analyzer: ContentAnalyzer,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl Detector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            url_analyzer: UrlAnalyzer::new(config.clone()),
            content_analyzer: ContentAnalyzer::new(config.clone()),
            config,
        }
    }

    pub fn analyze(&self, input: &str, declared: Option<ContentCategory>) -> DetectionResult {
        let input = input.trim();
        let category = declared.unwrap_or_else(|| Self::detect_category(input));

        let (raw_score, indicators) = match category {
            ContentCategory::Url => self.url_analyzer.analyze(input),
            ContentCategory::Email | ContentCategory::Message => {
                self.content_analyzer.analyze(input)
            }
        };

        let threat_score = raw_score.min(100);
        DetectionResult {
            is_phishing: threat_score >= self.config.weights.phishing_threshold,
            threat_score,
            indicators,
            category,
        }
    }

    /// Crude category sniffing, used only when no category was declared.
    /// Known limitation: an email without a `subject:` line is treated as a
    /// plain message, which only affects labeling, not scoring.
    pub fn detect_category(input: &str) -> ContentCategory {
        let lower = input.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ContentCategory::Url
        } else if lower.contains('@') && lower.contains("subject:") {
            ContentCategory::Email
        } else {
            ContentCategory::Message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_detection_prefers_url_scheme() {
        assert_eq!(
            Detector::detect_category("https://example.com"),
            ContentCategory::Url
        );
        assert_eq!(
            Detector::detect_category("HTTP://EXAMPLE.COM"),
            ContentCategory::Url
        );
    }

    #[test]
    fn category_detection_requires_both_email_markers() {
        assert_eq!(
            Detector::detect_category("From: a@b.com\nSubject: hello"),
            ContentCategory::Email
        );
        // An @ alone is not enough
        assert_eq!(
            Detector::detect_category("ping me at a@b.com"),
            ContentCategory::Message
        );
    }

    #[test]
    fn declared_category_overrides_detection() {
        let detector = Detector::default();
        let result = detector.analyze("https://example.com", Some(ContentCategory::Message));
        assert_eq!(result.category, ContentCategory::Message);
    }

    #[test]
    fn score_is_always_bounded() {
        let detector = Detector::default();
        let loaded = "urgent act now immediately final notice last chance limited time \
                      password credit card bank account irs your bank suspended locked \
                      congratulations winner prize http://bit.ly/x dear customer kindly";
        let result = detector.analyze(loaded, None);
        assert!(result.threat_score <= 100);
        assert!(result.is_phishing);
    }

    #[test]
    fn phishing_flag_tracks_threshold() {
        let detector = Detector::default();
        for input in ["hello there", "urgent: verify your identity now"] {
            let result = detector.analyze(input, None);
            assert_eq!(result.is_phishing, result.threat_score >= 40);
        }
    }
}
