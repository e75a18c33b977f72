use crate::config::DetectionConfig;
use crate::detection::{ContentCategory, DetectionResult, Detector};
use crate::explanation::{Explainer, Explanation};
use crate::reasoning::{Reasoner, ReasoningResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Combined output of one analysis run. Everything except the timestamp is a
/// pure function of the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub detection: DetectionResult,
    pub reasoning: ReasoningResult,
    pub explanation: Explanation,
    pub timestamp: DateTime<Utc>,
}

/// The three-stage analysis pipeline: detect indicators, infer intent, render
/// an explanation. Stateless and side-effect free; safe to share across
/// concurrent workers.
pub struct Pipeline {
    detector: Detector,
    reasoner: Reasoner,
    explainer: Explainer,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            detector: Detector::new(config),
            reasoner: Reasoner::new(),
            explainer: Explainer::new(),
        }
    }

    pub fn analyze(&self, content: &str, declared: Option<ContentCategory>) -> AnalysisReport {
        let detection = self.detector.analyze(content, declared);
        let reasoning = self.reasoner.analyze_intent(&detection);
        let explanation = self.explainer.generate_explanation(&detection, &reasoning);
        log::debug!(
            "Analyzed {} content: score {} ({} indicators), attack type {}",
            detection.category.label(),
            detection.threat_score,
            detection.indicators.len(),
            reasoning.attack_type
        );
        AnalysisReport {
            detection,
            reasoning,
            explanation,
            timestamp: Utc::now(),
        }
    }
}
