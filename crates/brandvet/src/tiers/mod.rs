//! Production tier adapters, one per external evidence source.

pub mod ai_summary;
pub mod embedding_fallback;
pub mod knowledge_graph;
pub mod vector_similarity;
pub mod vision;
pub mod web_search;

pub use ai_summary::AiSummaryTier;
pub use embedding_fallback::EmbeddingFallbackTier;
pub use knowledge_graph::KnowledgeGraphTier;
pub use vector_similarity::VectorSimilarityTier;
pub use vision::VisionLogoTier;
pub use web_search::WebSearchTier;
