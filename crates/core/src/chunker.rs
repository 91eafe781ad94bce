use crate::types::{Chunk, Transcript};

/// Fixed-size chunking parameters.
///
/// # Panics
///
/// [`ChunkerConfig::new`] panics if `chunk_size == 0` or
/// `overlap >= chunk_size`.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be > 0");
        assert!(overlap < chunk_size, "overlap must be < chunk size");
        Self {
            chunk_size,
            overlap,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        // Same splitter parameters the service has always used.
        Self::new(1000, 0)
    }
}

/// Splits a transcript into fixed-size chunks with optional overlap.
///
/// Pure function of its inputs: segment texts are joined in order and the
/// result is cut into windows of `chunk_size` bytes, stepped by
/// `chunk_size - overlap`, clamped to `char` boundaries. The final chunk may
/// be shorter. An empty transcript produces no chunks.
pub fn split_transcript(transcript: &Transcript, config: &ChunkerConfig) -> Vec<Chunk> {
    let text = transcript.full_text();
    if text.is_empty() {
        return Vec::new();
    }

    let step = config.step();
    let mut chunks = Vec::with_capacity(text.len() / step + 1);
    let mut start = 0;
    let mut position = 0;

    while start < text.len() {
        let mut end = (start + config.chunk_size).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        chunks.push(Chunk {
            content: text[start..end].to_string(),
            position,
        });
        position += 1;

        if end == text.len() {
            break;
        }

        let mut next = start + step;
        while !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    chunks
}
