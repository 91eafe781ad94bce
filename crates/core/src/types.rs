use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Full transcript of a video, as returned by a [`TranscriptSource`].
///
/// Metadata lives on the transcript itself rather than being repeated on
/// every segment.
///
/// [`TranscriptSource`]: crate::source::TranscriptSource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub title: String,
    pub author: String,
    pub duration_seconds: f64,
    pub segments: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start offset of the segment in seconds.
    pub start: f64,
    pub content: String,
}

impl Transcript {
    /// Joins all segment texts into one document, in segment order.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|seg| seg.content.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One fixed-size fragment of transcript text, produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    /// Sequential index of the chunk within the document, starting at 0.
    pub position: usize,
}

/// Concept name mapped to its definition, unique names per map.
pub type ConceptMap = BTreeMap<String, String>;

/// One [`ConceptMap`] per group, in group order.
pub type ConceptBatch = Vec<ConceptMap>;
