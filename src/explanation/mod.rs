use crate::detection::{DetectionResult, Indicator, Severity};
use crate::reasoning::ReasoningResult;
use serde::{Deserialize, Serialize};

/// Presentation tier derived from the threat score. Deliberately independent
/// of the detector's boolean phishing cut at 40: a Low-tier result can still
/// be reported as not phishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Safe,
}

impl RiskLevel {
    /// Inclusive lower bounds, evaluated top-down.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => RiskLevel::Critical,
            s if s >= 60 => RiskLevel::High,
            s if s >= 40 => RiskLevel::Medium,
            s if s >= 20 => RiskLevel::Low,
            _ => RiskLevel::Safe,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::Safe => "Safe",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalDetail {
    pub category: String,
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub risk_level: RiskLevel,
    pub detailed_analysis: Vec<String>,
    pub recommendations: Vec<String>,
    pub technical_details: Vec<TechnicalDetail>,
}

/// Stage three of the pipeline: renders detection and reasoning output into a
/// human-readable explanation. Deterministic given its inputs; recommendation
/// blocks are appended in a fixed order and never deduplicated.
#[derive(Default)]
pub struct Explainer;

impl Explainer {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_explanation(
        &self,
        detection: &DetectionResult,
        reasoning: &ReasoningResult,
    ) -> Explanation {
        let risk_level = RiskLevel::from_score(detection.threat_score);
        Explanation {
            summary: self.build_summary(detection, reasoning, risk_level),
            risk_level,
            detailed_analysis: self.build_detailed_analysis(detection, reasoning),
            recommendations: self.build_recommendations(reasoning, risk_level),
            technical_details: self.build_technical_details(detection, reasoning),
        }
    }

    fn build_summary(
        &self,
        detection: &DetectionResult,
        reasoning: &ReasoningResult,
        risk_level: RiskLevel,
    ) -> String {
        if risk_level == RiskLevel::Safe {
            return "No significant threat indicators were found in this content. It appears \
                    to be safe, but always stay cautious with unsolicited messages."
                .to_string();
        }
        let count = detection.indicators.len();
        let plural = if count == 1 { "" } else { "s" };
        let primary_intent = reasoning
            .attacker_intent
            .first()
            .map(|i| i.intent.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "This content is rated {} risk and matches the profile of {}. The analysis \
             surfaced {} threat indicator{}, and the most likely attacker goal is {}.",
            risk_level.label(),
            reasoning.attack_type,
            count,
            plural,
            primary_intent
        )
    }

    fn build_detailed_analysis(
        &self,
        detection: &DetectionResult,
        reasoning: &ReasoningResult,
    ) -> Vec<String> {
        let mut analysis = Vec::new();
        let count = detection.indicators.len();
        let plural = if count == 1 { "" } else { "s" };
        analysis.push(format!(
            "Threat analysis produced a score of {}/100 from {} indicator{}.",
            detection.threat_score, count, plural
        ));

        if let Some(first) = reasoning.attacker_intent.first() {
            let listed = reasoning
                .attacker_intent
                .iter()
                .map(|i| format!("{} ({}% confidence)", i.intent, i.confidence))
                .collect::<Vec<_>>()
                .join(", ");
            analysis.push(format!(
                "Possible attacker intents: {}. {}",
                listed, first.reasoning
            ));
        }

        if !reasoning.vulnerabilities.is_empty() {
            let listed = reasoning
                .vulnerabilities
                .iter()
                .map(|v| format!("{} - {}", v.trigger, v.description))
                .collect::<Vec<_>>()
                .join("; ");
            analysis.push(format!("Psychological levers at play: {listed}."));
        }

        for (severity, name) in [
            (Severity::High, "High"),
            (Severity::Medium, "Medium"),
            (Severity::Low, "Low"),
        ] {
            let bucket: Vec<&str> = detection
                .indicators
                .iter()
                .filter(|i| i.severity == severity)
                .map(|i| i.kind.label())
                .collect();
            if !bucket.is_empty() {
                analysis.push(format!("{} severity indicators: {}.", name, bucket.join(", ")));
            }
        }

        analysis
    }

    fn build_recommendations(
        &self,
        reasoning: &ReasoningResult,
        risk_level: RiskLevel,
    ) -> Vec<String> {
        let mut recommendations: Vec<String> = Vec::new();
        let push_all = |items: &[&str], recs: &mut Vec<String>| {
            recs.extend(items.iter().map(|s| s.to_string()));
        };

        match risk_level {
            RiskLevel::Critical | RiskLevel::High => push_all(
                &[
                    "Do not click any links or download attachments from this content",
                    "Do not provide any personal, financial, or login information",
                    "Report this content to your IT security team or email provider",
                    "Delete this message immediately",
                ],
                &mut recommendations,
            ),
            RiskLevel::Medium => push_all(
                &[
                    "Exercise caution when interacting with this content",
                    "Verify the sender through an independent channel before responding",
                    "Do not share sensitive information until the sender's identity is confirmed",
                ],
                &mut recommendations,
            ),
            RiskLevel::Low => push_all(
                &[
                    "Stay alert and watch for additional warning signs",
                    "Verify any requests through official channels",
                ],
                &mut recommendations,
            ),
            RiskLevel::Safe => {}
        }

        let has_intent =
            |name: &str| reasoning.attacker_intent.iter().any(|i| i.intent == name);
        if has_intent("Credential Theft") {
            push_all(
                &[
                    "Never enter credentials on pages reached from this content",
                    "Enable two-factor authentication on your accounts",
                ],
                &mut recommendations,
            );
        }
        if has_intent("Financial Fraud") {
            push_all(
                &[
                    "Contact your bank directly using the number on your card",
                    "Monitor your financial statements for unauthorized activity",
                ],
                &mut recommendations,
            );
        }

        let has_vulnerability =
            |name: &str| reasoning.vulnerabilities.iter().any(|v| v.trigger == name);
        if has_vulnerability("Fear & Anxiety") {
            recommendations.push(
                "Do not let threats or time pressure rush your decisions - legitimate \
                 organizations do not operate this way"
                    .to_string(),
            );
        }
        if has_vulnerability("Authority Bias") {
            recommendations.push(
                "Verify claims of authority independently through the organization's \
                 official website or phone number"
                    .to_string(),
            );
        }

        if risk_level != RiskLevel::Safe {
            recommendations.push(
                "Stay informed about common phishing techniques to better protect \
                 yourself in the future"
                    .to_string(),
            );
        }

        recommendations
    }

    fn build_technical_details(
        &self,
        detection: &DetectionResult,
        reasoning: &ReasoningResult,
    ) -> Vec<TechnicalDetail> {
        let mut details = Vec::new();

        for (severity, name) in [
            (Severity::High, "High Severity Indicators"),
            (Severity::Medium, "Medium Severity Indicators"),
            (Severity::Low, "Low Severity Indicators"),
        ] {
            let findings: Vec<String> = detection
                .indicators
                .iter()
                .filter(|i| i.severity == severity)
                .map(format_indicator)
                .collect();
            if !findings.is_empty() {
                details.push(TechnicalDetail {
                    category: name.to_string(),
                    findings,
                });
            }
        }

        if !reasoning.attacker_intent.is_empty() {
            details.push(TechnicalDetail {
                category: "Attacker Intent Analysis".to_string(),
                findings: reasoning
                    .attacker_intent
                    .iter()
                    .map(|i| format!("{} ({}% confidence): {}", i.intent, i.confidence, i.reasoning))
                    .collect(),
            });
        }

        if !reasoning.vulnerabilities.is_empty() {
            details.push(TechnicalDetail {
                category: "Exploited Vulnerabilities".to_string(),
                findings: reasoning
                    .vulnerabilities
                    .iter()
                    .map(|v| {
                        format!(
                            "{} [{} severity]: {}",
                            v.trigger,
                            v.severity.label(),
                            v.description
                        )
                    })
                    .collect(),
            });
        }

        details.push(TechnicalDetail {
            category: "Attack Classification".to_string(),
            findings: vec![
                format!("Attack type: {}", reasoning.attack_type),
                format!("Content category: {}", detection.category.label()),
                format!("Overall confidence: {}%", reasoning.confidence),
                format!("Phishing detected: {}", detection.is_phishing),
            ],
        });

        details
    }
}

fn format_indicator(indicator: &Indicator) -> String {
    match &indicator.evidence {
        Some(evidence) => format!(
            "{}: {} ({})",
            indicator.kind.label(),
            indicator.description,
            evidence
        ),
        None => format!("{}: {}", indicator.kind.label(), indicator.description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{ContentCategory, Indicator, IndicatorType};
    use crate::reasoning::Reasoner;

    fn detection(score: u32, indicators: Vec<Indicator>) -> DetectionResult {
        DetectionResult {
            is_phishing: score >= 40,
            threat_score: score,
            indicators,
            category: ContentCategory::Message,
        }
    }

    fn explain(score: u32, indicators: Vec<Indicator>) -> Explanation {
        let det = detection(score, indicators);
        let reasoning = Reasoner::new().analyze_intent(&det);
        Explainer::new().generate_explanation(&det, &reasoning)
    }

    #[test]
    fn risk_tier_boundaries_are_inclusive() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(59), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(79), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
    }

    #[test]
    fn low_tier_can_still_be_not_phishing() {
        let explanation = explain(
            25,
            vec![Indicator::new(
                IndicatorType::SuspiciousLinks,
                Severity::Medium,
                "links",
            )],
        );
        assert_eq!(explanation.risk_level, RiskLevel::Low);
        // The 40-point phishing cut is separate from the tier boundaries.
    }

    #[test]
    fn safe_summary_is_reassuring() {
        let explanation = explain(0, vec![]);
        assert!(explanation.summary.contains("safe"));
        assert_eq!(explanation.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn summary_pluralizes_indicator_count() {
        let one = explain(
            45,
            vec![Indicator::new(
                IndicatorType::CredentialRequest,
                Severity::High,
                "creds",
            )],
        );
        assert!(one.summary.contains("1 threat indicator,"));

        let two = explain(
            45,
            vec![
                Indicator::new(IndicatorType::CredentialRequest, Severity::High, "creds"),
                Indicator::new(IndicatorType::SuspiciousLinks, Severity::Medium, "links"),
            ],
        );
        assert!(two.summary.contains("2 threat indicators,"));
    }

    #[test]
    fn detailed_analysis_always_opens_with_the_score() {
        let explanation = explain(0, vec![]);
        assert!(explanation.detailed_analysis[0].contains("0/100"));
    }

    #[test]
    fn severity_buckets_appear_high_to_low() {
        let explanation = explain(
            60,
            vec![
                Indicator::new(IndicatorType::GenericGreeting, Severity::Low, "greeting"),
                Indicator::new(IndicatorType::CredentialRequest, Severity::High, "creds"),
            ],
        );
        let high_pos = explanation
            .detailed_analysis
            .iter()
            .position(|s| s.starts_with("High severity"))
            .unwrap();
        let low_pos = explanation
            .detailed_analysis
            .iter()
            .position(|s| s.starts_with("Low severity"))
            .unwrap();
        assert!(high_pos < low_pos);
    }

    #[test]
    fn critical_and_high_share_the_same_block() {
        let high = explain(
            65,
            vec![Indicator::new(
                IndicatorType::CredentialRequest,
                Severity::High,
                "creds",
            )],
        );
        assert!(high
            .recommendations
            .iter()
            .any(|r| r.contains("Delete this message immediately")));
    }

    #[test]
    fn credential_theft_adds_the_2fa_recommendation() {
        let explanation = explain(
            45,
            vec![Indicator::new(
                IndicatorType::CredentialRequest,
                Severity::High,
                "creds",
            )],
        );
        assert!(explanation
            .recommendations
            .iter()
            .any(|r| r.contains("two-factor authentication")));
    }

    #[test]
    fn recommendations_end_with_education_line_unless_safe() {
        let flagged = explain(
            25,
            vec![Indicator::new(
                IndicatorType::SuspiciousLinks,
                Severity::Medium,
                "links",
            )],
        );
        assert!(flagged
            .recommendations
            .last()
            .unwrap()
            .contains("Stay informed"));

        let safe = explain(0, vec![]);
        assert!(!safe
            .recommendations
            .iter()
            .any(|r| r.contains("Stay informed")));
    }

    #[test]
    fn technical_details_include_evidence_parenthetical() {
        let explanation = explain(
            45,
            vec![Indicator::new(
                IndicatorType::CredentialRequest,
                Severity::High,
                "asks for data",
            )
            .with_evidence("password".to_string())],
        );
        let high = &explanation.technical_details[0];
        assert_eq!(high.category, "High Severity Indicators");
        assert!(high.findings[0].ends_with("(password)"));
    }

    #[test]
    fn attack_classification_is_always_present_with_four_findings() {
        for score in [0, 45, 90] {
            let explanation = explain(score, vec![]);
            let classification = explanation
                .technical_details
                .iter()
                .find(|d| d.category == "Attack Classification")
                .unwrap();
            assert_eq!(classification.findings.len(), 4);
        }
    }
}
