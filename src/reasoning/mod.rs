use crate::detection::{DetectionResult, IndicatorType, Severity};
use serde::{Deserialize, Serialize};

/// One hypothesis about what the attacker is after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent: String,
    pub confidence: u32,
    pub reasoning: String,
}

/// A psychological lever the content appears to pull on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityAnalysis {
    pub trigger: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningResult {
    pub attacker_intent: Vec<IntentAnalysis>,
    pub vulnerabilities: Vec<VulnerabilityAnalysis>,
    pub confidence: u32,
    pub attack_type: String,
}

struct IntentRule {
    intent: &'static str,
    confidence: u32,
    attack_type: &'static str,
    trigger_types: &'static [IndicatorType],
    evidence_terms: &'static [&'static str],
    reasoning: &'static str,
}

// Evaluated in declaration order; the first rule that fires also names the
// overall attack type.
const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: "Credential Theft",
        confidence: 85,
        attack_type: "Phishing - Credential Harvesting",
        trigger_types: &[IndicatorType::CredentialRequest, IndicatorType::Typosquatting],
        evidence_terms: &[],
        reasoning: "The content attempts to trick the recipient into revealing \
                    login credentials or sensitive personal data.",
    },
    IntentRule {
        intent: "Financial Fraud",
        confidence: 80,
        attack_type: "Financial Phishing",
        trigger_types: &[IndicatorType::TooGoodToBeTrue],
        evidence_terms: &["bank", "payment", "credit card"],
        reasoning: "The content targets financial information or baits the \
                    recipient with a monetary reward.",
    },
    IntentRule {
        intent: "Malware Distribution",
        confidence: 70,
        attack_type: "Malware Delivery",
        trigger_types: &[IndicatorType::SuspiciousLinks, IndicatorType::UrlObfuscation],
        evidence_terms: &[],
        reasoning: "Links in the content likely lead to malicious downloads or \
                    exploit pages.",
    },
    IntentRule {
        intent: "Data Harvesting",
        confidence: 75,
        attack_type: "Spear Phishing",
        trigger_types: &[IndicatorType::AuthorityImpersonation],
        evidence_terms: &["verify", "update"],
        reasoning: "The content impersonates a trusted party to collect \
                    personal information.",
    },
    IntentRule {
        intent: "Account Takeover",
        confidence: 78,
        attack_type: "Account Compromise Attack",
        trigger_types: &[IndicatorType::ThreateningLanguage],
        evidence_terms: &["suspended", "locked"],
        reasoning: "The content pressures the recipient into actions that hand \
                    over control of an account.",
    },
];

struct VulnerabilityRule {
    trigger: &'static str,
    severity: Severity,
    trigger_types: &'static [IndicatorType],
    evidence_terms: &'static [&'static str],
    description: &'static str,
}

const VULNERABILITY_RULES: &[VulnerabilityRule] = &[
    VulnerabilityRule {
        trigger: "Fear & Anxiety",
        severity: Severity::High,
        trigger_types: &[
            IndicatorType::ThreateningLanguage,
            IndicatorType::UrgencyTactics,
        ],
        evidence_terms: &[],
        description: "Threats and deadlines trigger a stress response that \
                      short-circuits careful judgment",
    },
    VulnerabilityRule {
        trigger: "Authority Bias",
        severity: Severity::High,
        trigger_types: &[IndicatorType::AuthorityImpersonation],
        evidence_terms: &[],
        description: "People tend to comply with requests that appear to come \
                      from institutions they trust",
    },
    VulnerabilityRule {
        trigger: "Urgency & Time Pressure",
        severity: Severity::Medium,
        trigger_types: &[IndicatorType::UrgencyTactics],
        evidence_terms: &[],
        description: "Artificial deadlines push victims to act before verifying",
    },
    VulnerabilityRule {
        trigger: "Greed & Reward Seeking",
        severity: Severity::Medium,
        trigger_types: &[IndicatorType::TooGoodToBeTrue],
        evidence_terms: &[],
        description: "The promise of an easy reward lowers natural skepticism",
    },
    VulnerabilityRule {
        trigger: "Curiosity",
        severity: Severity::Low,
        trigger_types: &[IndicatorType::SuspiciousLinks],
        evidence_terms: &[],
        description: "Unexplained links invite clicks just to see where they lead",
    },
    VulnerabilityRule {
        trigger: "Helpfulness & Compliance",
        severity: Severity::Low,
        trigger_types: &[IndicatorType::GenericGreeting],
        evidence_terms: &["kindly"],
        description: "Polite, deferential phrasing exploits the instinct to be \
                      cooperative",
    },
];

/// Stage two of the pipeline: maps detected indicators to attacker-intent
/// hypotheses and exploited psychological vulnerabilities. Always returns at
/// least one intent.
#[derive(Default)]
pub struct Reasoner;

impl Reasoner {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_intent(&self, detection: &DetectionResult) -> ReasoningResult {
        let types: Vec<IndicatorType> = detection.indicators.iter().map(|i| i.kind).collect();
        let evidence_blob = detection
            .indicators
            .iter()
            .filter_map(|i| i.evidence.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut attacker_intent = Vec::new();
        let mut attack_type: Option<&'static str> = None;

        for rule in INTENT_RULES {
            let type_hit = rule.trigger_types.iter().any(|t| types.contains(t));
            let evidence_hit = rule
                .evidence_terms
                .iter()
                .any(|term| evidence_blob.contains(term));
            if type_hit || evidence_hit {
                attacker_intent.push(IntentAnalysis {
                    intent: rule.intent.to_string(),
                    confidence: rule.confidence,
                    reasoning: rule.reasoning.to_string(),
                });
                attack_type.get_or_insert(rule.attack_type);
            }
        }

        if attacker_intent.is_empty() {
            attacker_intent.push(IntentAnalysis {
                intent: "Reconnaissance".to_string(),
                confidence: 50,
                reasoning: "No specific attack pattern matched; the content may \
                            be probing for a response or gathering information."
                    .to_string(),
            });
            attack_type = Some("Suspicious Activity");
        }

        let vulnerabilities = VULNERABILITY_RULES
            .iter()
            .filter(|rule| {
                rule.trigger_types.iter().any(|t| types.contains(t))
                    || rule
                        .evidence_terms
                        .iter()
                        .any(|term| evidence_blob.contains(term))
            })
            .map(|rule| VulnerabilityAnalysis {
                trigger: rule.trigger.to_string(),
                description: rule.description.to_string(),
                severity: rule.severity,
            })
            .collect();

        ReasoningResult {
            attacker_intent,
            vulnerabilities,
            confidence: Self::overall_confidence(detection),
            attack_type: attack_type.unwrap_or("Unknown").to_string(),
        }
    }

    fn overall_confidence(detection: &DetectionResult) -> u32 {
        let high = detection
            .indicators
            .iter()
            .filter(|i| i.severity == Severity::High)
            .count() as u32;
        let medium = detection
            .indicators
            .iter()
            .filter(|i| i.severity == Severity::Medium)
            .count() as u32;
        (50 + 15 * high + 8 * medium).min(95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{ContentCategory, Detector, Indicator};

    fn detection_with(indicators: Vec<Indicator>) -> DetectionResult {
        let threat_score = 50;
        DetectionResult {
            is_phishing: true,
            threat_score,
            indicators,
            category: ContentCategory::Message,
        }
    }

    #[test]
    fn benign_input_falls_back_to_reconnaissance() {
        let detector = Detector::default();
        let detection = detector.analyze("Hi, just checking in about lunch tomorrow.", None);
        let reasoning = Reasoner::new().analyze_intent(&detection);

        assert_eq!(reasoning.attacker_intent.len(), 1);
        assert_eq!(reasoning.attacker_intent[0].intent, "Reconnaissance");
        assert_eq!(reasoning.attacker_intent[0].confidence, 50);
        assert_eq!(reasoning.attack_type, "Suspicious Activity");
        assert_eq!(reasoning.confidence, 50);
    }

    #[test]
    fn credential_request_names_the_attack_type() {
        let detection = detection_with(vec![Indicator::new(
            IndicatorType::CredentialRequest,
            Severity::High,
            "asks for a password",
        )]);
        let reasoning = Reasoner::new().analyze_intent(&detection);
        assert_eq!(reasoning.attack_type, "Phishing - Credential Harvesting");
        assert_eq!(reasoning.attacker_intent[0].intent, "Credential Theft");
        assert_eq!(reasoning.attacker_intent[0].confidence, 85);
    }

    #[test]
    fn first_matching_rule_wins_attack_type() {
        // Both the credential and link rules fire; the table order decides.
        let detection = detection_with(vec![
            Indicator::new(IndicatorType::SuspiciousLinks, Severity::Medium, "links"),
            Indicator::new(IndicatorType::CredentialRequest, Severity::High, "creds"),
        ]);
        let reasoning = Reasoner::new().analyze_intent(&detection);
        assert_eq!(reasoning.attack_type, "Phishing - Credential Harvesting");
        assert!(reasoning.attacker_intent.len() >= 2);
    }

    #[test]
    fn evidence_terms_trigger_intents_without_matching_types() {
        let detection = detection_with(vec![Indicator::new(
            IndicatorType::UrgencyTactics,
            Severity::Medium,
            "urgent wording",
        )
        .with_evidence("your account has been suspended".to_string())]);
        let reasoning = Reasoner::new().analyze_intent(&detection);
        let intents: Vec<&str> = reasoning
            .attacker_intent
            .iter()
            .map(|i| i.intent.as_str())
            .collect();
        assert!(intents.contains(&"Account Takeover"));
    }

    #[test]
    fn vulnerability_rules_follow_indicator_types() {
        let detection = detection_with(vec![
            Indicator::new(IndicatorType::UrgencyTactics, Severity::Medium, "urgency"),
            Indicator::new(
                IndicatorType::AuthorityImpersonation,
                Severity::High,
                "authority",
            ),
        ]);
        let reasoning = Reasoner::new().analyze_intent(&detection);
        let triggers: Vec<&str> = reasoning
            .vulnerabilities
            .iter()
            .map(|v| v.trigger.as_str())
            .collect();
        assert_eq!(
            triggers,
            vec!["Fear & Anxiety", "Authority Bias", "Urgency & Time Pressure"]
        );
    }

    #[test]
    fn kindly_in_evidence_marks_compliance() {
        let detection = detection_with(vec![Indicator::new(
            IndicatorType::UrgencyTactics,
            Severity::Medium,
            "urgency",
        )
        .with_evidence("kindly act now".to_string())]);
        let reasoning = Reasoner::new().analyze_intent(&detection);
        assert!(reasoning
            .vulnerabilities
            .iter()
            .any(|v| v.trigger == "Helpfulness & Compliance"));
    }

    #[test]
    fn confidence_is_capped_at_95() {
        let indicators = (0..5)
            .map(|_| Indicator::new(IndicatorType::CredentialRequest, Severity::High, "x"))
            .collect();
        let reasoning = Reasoner::new().analyze_intent(&detection_with(indicators));
        assert_eq!(reasoning.confidence, 95);
    }

    #[test]
    fn confidence_counts_high_and_medium_indicators() {
        let detection = detection_with(vec![
            Indicator::new(IndicatorType::CredentialRequest, Severity::High, "x"),
            Indicator::new(IndicatorType::SuspiciousLinks, Severity::Medium, "y"),
            Indicator::new(IndicatorType::GenericGreeting, Severity::Low, "z"),
        ]);
        let reasoning = Reasoner::new().analyze_intent(&detection);
        // 50 + 15 + 8; low severity contributes nothing
        assert_eq!(reasoning.confidence, 73);
    }
}
