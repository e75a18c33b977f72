pub mod config;
pub mod detection;
pub mod explanation;
pub mod pipeline;
pub mod reasoning;
pub mod server;
pub mod store;

pub use config::{AnalyzerConfig, DetectionConfig, ScoringWeights};
pub use detection::{
    ContentCategory, DetectionResult, Detector, Indicator, IndicatorType, Severity,
};
pub use explanation::{Explainer, Explanation, RiskLevel, TechnicalDetail};
pub use pipeline::{AnalysisReport, Pipeline};
pub use reasoning::{IntentAnalysis, Reasoner, ReasoningResult, VulnerabilityAnalysis};
pub use store::{RecordStore, StoreStats, StoredAnalysis};
