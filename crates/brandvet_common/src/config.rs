//! Engine configuration.
//!
//! Loads settings from a TOML file or uses defaults. Every tuning knob the
//! operator may touch lives here: per-tier timeouts, the global deadline,
//! trust weights, classification thresholds, service endpoints, and the
//! evidence cache capacity. Nothing in the engine hardcodes these values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::evidence::TierKind;

/// Default config file path.
pub const CONFIG_PATH: &str = "/etc/brandvet/config.toml";

/// Per-tier and global deadlines, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Vector index lookup - fast structured call.
    #[serde(default = "default_vector_timeout")]
    pub vector_secs: u64,

    /// Web search round trip.
    #[serde(default = "default_web_search_timeout")]
    pub web_search_secs: u64,

    /// LLM summarization - slowest text path.
    #[serde(default = "default_ai_summary_timeout")]
    pub ai_summary_secs: u64,

    /// Vision classifier - slowest call overall.
    #[serde(default = "default_vision_timeout")]
    pub vision_secs: u64,

    /// Knowledge-graph lookup - fast structured call.
    #[serde(default = "default_knowledge_graph_timeout")]
    pub knowledge_graph_secs: u64,

    /// Embedding calls for the fallback tier.
    #[serde(default = "default_embedding_timeout")]
    pub embedding_secs: u64,

    /// Whole-request deadline. Must exceed every tier timeout.
    #[serde(default = "default_global_deadline")]
    pub global_deadline_secs: u64,
}

fn default_vector_timeout() -> u64 {
    4
}

fn default_web_search_timeout() -> u64 {
    6
}

fn default_ai_summary_timeout() -> u64 {
    10
}

fn default_vision_timeout() -> u64 {
    12
}

fn default_knowledge_graph_timeout() -> u64 {
    4
}

fn default_embedding_timeout() -> u64 {
    4
}

fn default_global_deadline() -> u64 {
    20
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            vector_secs: default_vector_timeout(),
            web_search_secs: default_web_search_timeout(),
            ai_summary_secs: default_ai_summary_timeout(),
            vision_secs: default_vision_timeout(),
            knowledge_graph_secs: default_knowledge_graph_timeout(),
            embedding_secs: default_embedding_timeout(),
            global_deadline_secs: default_global_deadline(),
        }
    }
}

impl TimeoutConfig {
    pub fn for_tier(&self, kind: TierKind) -> Duration {
        let secs = match kind {
            TierKind::VectorSimilarity => self.vector_secs,
            TierKind::WebSearch => self.web_search_secs,
            TierKind::AiSummary => self.ai_summary_secs,
            TierKind::VisionLogo => self.vision_secs,
            TierKind::KnowledgeGraph => self.knowledge_graph_secs,
            TierKind::EmbeddingFallback => self.embedding_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn global_deadline(&self) -> Duration {
        Duration::from_secs(self.global_deadline_secs)
    }
}

/// Fixed trust weights per evidence type.
///
/// Structured lookups and logo matches are the most reliable signals in
/// isolation; free-text web search is the least.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustWeights {
    #[serde(default = "default_knowledge_graph_weight")]
    pub knowledge_graph: f64,

    #[serde(default = "default_vision_weight")]
    pub vision_logo: f64,

    #[serde(default = "default_vector_weight")]
    pub vector_similarity: f64,

    #[serde(default = "default_ai_summary_weight")]
    pub ai_summary: f64,

    #[serde(default = "default_embedding_weight")]
    pub embedding_fallback: f64,

    #[serde(default = "default_web_search_weight")]
    pub web_search: f64,
}

fn default_knowledge_graph_weight() -> f64 {
    1.0
}

fn default_vision_weight() -> f64 {
    0.95
}

fn default_vector_weight() -> f64 {
    0.85
}

fn default_ai_summary_weight() -> f64 {
    0.80
}

fn default_embedding_weight() -> f64 {
    0.70
}

fn default_web_search_weight() -> f64 {
    0.60
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            knowledge_graph: default_knowledge_graph_weight(),
            vision_logo: default_vision_weight(),
            vector_similarity: default_vector_weight(),
            ai_summary: default_ai_summary_weight(),
            embedding_fallback: default_embedding_weight(),
            web_search: default_web_search_weight(),
        }
    }
}

impl TrustWeights {
    pub fn for_tier(&self, kind: TierKind) -> f64 {
        match kind {
            TierKind::VectorSimilarity => self.vector_similarity,
            TierKind::WebSearch => self.web_search,
            TierKind::AiSummary => self.ai_summary,
            TierKind::VisionLogo => self.vision_logo,
            TierKind::KnowledgeGraph => self.knowledge_graph,
            TierKind::EmbeddingFallback => self.embedding_fallback,
        }
    }
}

/// Thresholds for aggregation and pattern classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Aggregate confidence at or above which corroborated evidence
    /// validates the label.
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,

    /// Aggregate confidence below which unagreed evidence is unusable.
    #[serde(default = "default_low_confidence")]
    pub low_confidence: f64,

    /// A single tier's confidence at or above which its stance counts as
    /// a strong signal.
    #[serde(default = "default_strong_signal")]
    pub strong_signal: f64,

    /// Near-equal confidence band for the trust-weight tie-break.
    #[serde(default = "default_label_epsilon")]
    pub label_epsilon: f64,

    /// Trust weight at or above which a tier counts as high-trust.
    #[serde(default = "default_high_trust_cutoff")]
    pub high_trust_cutoff: f64,

    /// Weight multiplier for a tier corroborated by a higher-trust tier.
    #[serde(default = "default_agreement_bonus")]
    pub agreement_bonus: f64,
}

fn default_high_confidence() -> f64 {
    0.80
}

fn default_low_confidence() -> f64 {
    0.30
}

fn default_strong_signal() -> f64 {
    0.80
}

fn default_label_epsilon() -> f64 {
    0.05
}

fn default_high_trust_cutoff() -> f64 {
    0.90
}

fn default_agreement_bonus() -> f64 {
    1.25
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high_confidence: default_high_confidence(),
            low_confidence: default_low_confidence(),
            strong_signal: default_strong_signal(),
            label_epsilon: default_label_epsilon(),
            high_trust_cutoff: default_high_trust_cutoff(),
            agreement_bonus: default_agreement_bonus(),
        }
    }
}

/// Endpoints and credentials for the external evidence services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_vector_endpoint")]
    pub vector_endpoint: String,

    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// API key for the search service, when it requires one.
    #[serde(default)]
    pub search_api_key: Option<String>,

    /// Ollama-compatible generate endpoint for the AI summarizer.
    #[serde(default = "default_llm_endpoint")]
    pub llm_endpoint: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_vision_endpoint")]
    pub vision_endpoint: String,

    #[serde(default)]
    pub vision_api_key: Option<String>,

    #[serde(default = "default_kgraph_endpoint")]
    pub knowledge_graph_endpoint: String,

    /// Ollama-compatible embeddings endpoint for the fallback tier.
    #[serde(default = "default_embedding_endpoint")]
    pub embedding_endpoint: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_vector_endpoint() -> String {
    "http://127.0.0.1:6333".to_string()
}

fn default_search_endpoint() -> String {
    "http://127.0.0.1:8088".to_string()
}

fn default_llm_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:7b-instruct".to_string()
}

fn default_vision_endpoint() -> String {
    "http://127.0.0.1:8089".to_string()
}

fn default_kgraph_endpoint() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_embedding_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            vector_endpoint: default_vector_endpoint(),
            search_endpoint: default_search_endpoint(),
            search_api_key: None,
            llm_endpoint: default_llm_endpoint(),
            llm_model: default_llm_model(),
            vision_endpoint: default_vision_endpoint(),
            vision_api_key: None,
            knowledge_graph_endpoint: default_kgraph_endpoint(),
            embedding_endpoint: default_embedding_endpoint(),
            embedding_model: default_embedding_model(),
        }
    }
}

/// Evidence cache sizing. Capacity 0 disables the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub weights: TrustWeights,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub services: ServiceConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist. A present-but-broken file is an error: a
    /// silently ignored typo in trust weights would change verdicts.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {:?}: {}", path, e)))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| EngineError::Config(format!("cannot parse {:?}: {}", path, e)))?;

        config.validate()?;
        info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<(), EngineError> {
        for kind in TierKind::ALL {
            let weight = self.weights.for_tier(kind);
            if !(0.0..=1.0).contains(&weight) {
                return Err(EngineError::Config(format!(
                    "trust weight for {} is {}, expected [0,1]",
                    kind, weight
                )));
            }

            let timeout = self.timeouts.for_tier(kind);
            if timeout.is_zero() {
                return Err(EngineError::Config(format!(
                    "timeout for {} is zero",
                    kind
                )));
            }
            if timeout >= self.timeouts.global_deadline() {
                return Err(EngineError::Config(format!(
                    "timeout for {} ({}s) must be below the global deadline ({}s)",
                    kind,
                    timeout.as_secs(),
                    self.timeouts.global_deadline_secs
                )));
            }
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("high_confidence", t.high_confidence),
            ("low_confidence", t.low_confidence),
            ("strong_signal", t.strong_signal),
            ("label_epsilon", t.label_epsilon),
            ("high_trust_cutoff", t.high_trust_cutoff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Config(format!(
                    "threshold {} is {}, expected [0,1]",
                    name, value
                )));
            }
        }
        if t.low_confidence >= t.high_confidence {
            return Err(EngineError::Config(format!(
                "low_confidence ({}) must be below high_confidence ({})",
                t.low_confidence, t.high_confidence
            )));
        }
        if t.agreement_bonus < 1.0 {
            return Err(EngineError::Config(format!(
                "agreement_bonus ({}) must be at least 1.0",
                t.agreement_bonus
            )));
        }

        Ok(())
    }
}
