use async_trait::async_trait;
use tracing::info;

use crate::error::{KartochkiError, Result};
use crate::provider::ModelClient;
use crate::types::Chunk;

static CHUNK_SUMMARY_PROMPT: &str =
    "Write a concise summary of the text the user provides. Respond with the summary only.";

static COMBINE_SUMMARIES_PROMPT: &str = "The user provides several partial summaries of one \
document, in order. Distill them into a single final summary of the whole document. Respond \
with the summary only.";

/// Produces free-text summaries. Tests substitute a fake.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one piece of document text.
    async fn summarize_chunk(&self, text: &str) -> Result<String>;

    /// Collapse ordered partial summaries into one final summary.
    async fn combine_summaries(&self, partials: &[String]) -> Result<String>;
}

/// Production summarizer backed by a chat-completions provider.
pub struct LlmSummarizer {
    client: ModelClient,
}

impl LlmSummarizer {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize_chunk(&self, text: &str) -> Result<String> {
        self.client.chat(CHUNK_SUMMARY_PROMPT, text).await
    }

    async fn combine_summaries(&self, partials: &[String]) -> Result<String> {
        self.client
            .chat(COMBINE_SUMMARIES_PROMPT, &partials.join("\n\n"))
            .await
    }
}

/// Generates a document summary over the ordered chunks.
///
/// A single chunk is summarized directly; multiple chunks go through
/// map-reduce: each chunk is summarized on its own, then the partial
/// summaries are collapsed into one. Chunks are processed sequentially and
/// any failure aborts the whole operation.
pub async fn generate_document_summary(
    chunks: &[Chunk],
    summarizer: &dyn Summarizer,
) -> Result<String> {
    match chunks {
        [] => Err(KartochkiError::invalid_argument("no chunks to summarize")),
        [only] => summarizer.summarize_chunk(&only.content).await,
        many => {
            info!(chunks = many.len(), "summarizing chunks for map-reduce");

            let mut partials = Vec::with_capacity(many.len());
            for chunk in many {
                partials.push(summarizer.summarize_chunk(&chunk.content).await?);
            }
            summarizer.combine_summaries(&partials).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeSummarizer {
        chunk_calls: AtomicUsize,
        combine_calls: AtomicUsize,
    }

    impl FakeSummarizer {
        fn new() -> Self {
            Self {
                chunk_calls: AtomicUsize::new(0),
                combine_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize_chunk(&self, text: &str) -> Result<String> {
            self.chunk_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("summary({text})"))
        }

        async fn combine_summaries(&self, partials: &[String]) -> Result<String> {
            self.combine_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("combined({})", partials.join("|")))
        }
    }

    fn chunk(content: &str, position: usize) -> Chunk {
        Chunk {
            content: content.to_string(),
            position,
        }
    }

    #[tokio::test]
    async fn single_chunk_is_summarized_directly() {
        let summarizer = FakeSummarizer::new();
        let chunks = vec![chunk("only one", 0)];

        let summary = generate_document_summary(&chunks, &summarizer)
            .await
            .unwrap();

        assert_eq!(summary, "summary(only one)");
        assert_eq!(summarizer.chunk_calls.load(Ordering::SeqCst), 1);
        assert_eq!(summarizer.combine_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn multiple_chunks_go_through_map_reduce() {
        let summarizer = FakeSummarizer::new();
        let chunks = vec![chunk("a", 0), chunk("b", 1), chunk("c", 2)];

        let summary = generate_document_summary(&chunks, &summarizer)
            .await
            .unwrap();

        assert_eq!(summary, "combined(summary(a)|summary(b)|summary(c))");
        assert_eq!(summarizer.chunk_calls.load(Ordering::SeqCst), 3);
        assert_eq!(summarizer.combine_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_chunks_is_an_invalid_argument() {
        let summarizer = FakeSummarizer::new();
        let err = generate_document_summary(&[], &summarizer).await.unwrap_err();
        assert!(matches!(err, KartochkiError::InvalidArgument { .. }));
    }
}
