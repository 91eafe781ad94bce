use std::sync::Arc;

use kartochki_core::{
    ChunkerConfig, ConceptExtractor, CostEstimator, GeminiCostEstimator, LlmConceptExtractor,
    LlmSummarizer, ModelClient, Summarizer, TranscriptSource, YtDlpTranscriptSource,
};

use crate::config::Config;

/// Shared application state: every external collaborator behind a trait
/// object so tests can swap in fakes.
pub struct AppState {
    pub source: Arc<dyn TranscriptSource>,
    pub extractor: Arc<dyn ConceptExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub estimator: Arc<dyn CostEstimator>,
    pub chunker: ChunkerConfig,
    pub default_group_count: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let client = ModelClient::new(config.provider.clone());
        Self {
            source: Arc::new(YtDlpTranscriptSource::new()),
            extractor: Arc::new(LlmConceptExtractor::new(client.clone())),
            summarizer: Arc::new(LlmSummarizer::new(client)),
            estimator: Arc::new(GeminiCostEstimator::default()),
            chunker: config.chunker.clone(),
            default_group_count: config.default_group_count,
        }
    }
}
