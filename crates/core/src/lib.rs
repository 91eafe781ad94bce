//! Kartochki Core Library
//!
//! Core functionality for fetching video transcripts, chunking them, and
//! generating AI-powered summaries and key-concept flashcards.

pub mod batcher;
pub mod chunker;
pub mod cost;
pub mod error;
pub mod extractor;
pub mod provider;
pub mod source;
pub mod summary;
pub mod types;

// Re-export commonly used items at crate root
pub use batcher::{Group, extract_concepts, partition};
pub use chunker::{ChunkerConfig, split_transcript};
pub use cost::{CostEstimator, GeminiCostEstimator, total_billable_units};
pub use error::{KartochkiError, Result};
pub use extractor::{ConceptExtractor, LlmConceptExtractor, parse_concept_map};
pub use provider::{ModelClient, Provider, ProviderConfig};
pub use source::{TranscriptSource, YtDlpTranscriptSource};
pub use summary::{LlmSummarizer, Summarizer, generate_document_summary};
pub use types::{Chunk, ConceptBatch, ConceptMap, Transcript, TranscriptSegment};
