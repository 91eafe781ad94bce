//! Group batching: partitions ordered chunks into contiguous groups and
//! drives concept extraction over them, one group at a time.

use tracing::{info, warn};

use crate::error::{KartochkiError, Result};
use crate::extractor::ConceptExtractor;
use crate::types::{Chunk, ConceptBatch};

// Advisory pricing used for the per-group cost log lines.
const INPUT_COST_PER_1K_CHARS: f64 = 0.000125;
const OUTPUT_COST_PER_1K_CHARS: f64 = 0.000375;

/// Contiguous run of chunks merged into one extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    chunks: Vec<Chunk>,
}

impl Group {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenates all chunk contents, with no separator.
    pub fn content(&self) -> String {
        self.chunks
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect()
    }
}

/// Partitions `chunks` into at most `group_count` contiguous groups,
/// preserving order.
///
/// Each group holds `ceil(N / group_count)` chunks; the final group takes
/// whatever remains and may be smaller, never empty. Concatenating the
/// groups in order reconstructs the input exactly.
///
/// Fails with `InvalidArgument` when `group_count` is zero or exceeds the
/// number of chunks.
pub fn partition(chunks: Vec<Chunk>, group_count: usize) -> Result<Vec<Group>> {
    if group_count == 0 {
        return Err(KartochkiError::invalid_argument(
            "group count must be at least 1",
        ));
    }
    if group_count > chunks.len() {
        return Err(KartochkiError::invalid_argument(format!(
            "group count {} is larger than the number of chunks {}",
            group_count,
            chunks.len()
        )));
    }

    let chunks_per_group = chunks.len().div_ceil(group_count);

    let mut groups = Vec::with_capacity(group_count);
    let mut rest = chunks;
    while !rest.is_empty() {
        let tail = rest.split_off(chunks_per_group.min(rest.len()));
        groups.push(Group { chunks: rest });
        rest = tail;
    }

    Ok(groups)
}

/// Runs the concept extractor over every group, in order, and collects one
/// concept map per group.
///
/// Groups are processed strictly sequentially; a failure on any group aborts
/// the whole batch and no partial result is returned. Per-group character
/// counts and dollar costs are logged for accounting only and never affect
/// the returned value.
pub async fn extract_concepts(
    groups: &[Group],
    extractor: &dyn ConceptExtractor,
) -> Result<ConceptBatch> {
    let mut batch = Vec::with_capacity(groups.len());
    let mut batch_cost = 0.0;

    info!(groups = groups.len(), "finding key concepts");

    for (index, group) in groups.iter().enumerate() {
        let group_content = group.content();
        let input_chars = group_content.len();

        let concepts = extractor.extract(&group_content).await?;

        let output_chars: usize = concepts
            .iter()
            .map(|(name, definition)| name.len() + definition.len())
            .sum();
        let input_cost = (input_chars as f64 / 1000.0) * INPUT_COST_PER_1K_CHARS;
        let output_cost = (output_chars as f64 / 1000.0) * OUTPUT_COST_PER_1K_CHARS;
        batch_cost += input_cost + output_cost;

        info!(
            group = index,
            chunks = group.len(),
            concepts = concepts.len(),
            input_chars,
            output_chars,
            group_cost = input_cost + output_cost,
            "group processed"
        );
        if concepts.is_empty() {
            warn!(group = index, "model returned no concepts for group");
        }

        batch.push(concepts);
    }

    info!(total_cost = batch_cost, "concept extraction complete");

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::ConceptMap;

    fn chunks_of(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|position| Chunk {
                content: format!("chunk-{position} "),
                position,
            })
            .collect()
    }

    fn group_sizes(groups: &[Group]) -> Vec<usize> {
        groups.iter().map(Group::len).collect()
    }

    #[test]
    fn partition_one_group_per_chunk() {
        let groups = partition(chunks_of(10), 10).unwrap();
        assert_eq!(group_sizes(&groups), vec![1; 10]);
    }

    #[test]
    fn partition_remainder_lands_in_final_group() {
        // 10 chunks into 3 groups: ceil(10 / 3) = 4 per group.
        let groups = partition(chunks_of(10), 3).unwrap();
        assert_eq!(group_sizes(&groups), vec![4, 4, 2]);
    }

    #[test]
    fn partition_exact_division_produces_no_empty_group() {
        let groups = partition(chunks_of(10), 5).unwrap();
        assert_eq!(group_sizes(&groups), vec![2, 2, 2, 2, 2]);
        assert!(groups.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn partition_reconstructs_input_in_order() {
        let chunks = chunks_of(13);
        let groups = partition(chunks.clone(), 4).unwrap();

        let rebuilt: Vec<Chunk> = groups
            .iter()
            .flat_map(|g| g.chunks().iter().cloned())
            .collect();
        assert_eq!(rebuilt, chunks);
    }

    #[test]
    fn partition_single_group_takes_everything() {
        let groups = partition(chunks_of(7), 1).unwrap();
        assert_eq!(group_sizes(&groups), vec![7]);
    }

    #[test]
    fn partition_rejects_group_count_above_chunk_count() {
        let err = partition(chunks_of(5), 10).unwrap_err();
        assert!(matches!(err, KartochkiError::InvalidArgument { .. }));
    }

    #[test]
    fn partition_rejects_zero_group_count() {
        let err = partition(chunks_of(5), 0).unwrap_err();
        assert!(matches!(err, KartochkiError::InvalidArgument { .. }));
    }

    /// Records the texts it was asked about; fails on a chosen call index.
    struct FakeExtractor {
        seen: Mutex<Vec<String>>,
        fail_at: Option<usize>,
    }

    impl FakeExtractor {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(call: usize) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail_at: Some(call),
            }
        }
    }

    #[async_trait]
    impl ConceptExtractor for FakeExtractor {
        async fn extract(&self, text: &str) -> Result<ConceptMap> {
            let mut seen = self.seen.lock().unwrap();
            if self.fail_at == Some(seen.len()) {
                return Err(KartochkiError::ExtractionParse {
                    reason: "not json".to_string(),
                });
            }
            seen.push(text.to_string());

            let mut concepts = ConceptMap::new();
            concepts.insert(format!("concept-{}", seen.len() - 1), text.to_string());
            Ok(concepts)
        }
    }

    #[tokio::test]
    async fn extract_concepts_yields_one_map_per_group_in_order() {
        let groups = partition(chunks_of(10), 3).unwrap();
        let extractor = FakeExtractor::new();

        let batch = extract_concepts(&groups, &extractor).await.unwrap();

        assert_eq!(batch.len(), 3);
        for (index, concepts) in batch.iter().enumerate() {
            let definition = concepts.get(&format!("concept-{index}")).unwrap();
            assert_eq!(definition, &groups[index].content());
        }
    }

    #[tokio::test]
    async fn extract_concepts_sends_concatenated_group_content() {
        let groups = partition(chunks_of(4), 2).unwrap();
        let extractor = FakeExtractor::new();

        extract_concepts(&groups, &extractor).await.unwrap();

        let seen = extractor.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &["chunk-0 chunk-1 ", "chunk-2 chunk-3 "]);
    }

    #[tokio::test]
    async fn extractor_failure_aborts_the_whole_batch() {
        let groups = partition(chunks_of(9), 3).unwrap();
        let extractor = FakeExtractor::failing_at(1);

        let err = extract_concepts(&groups, &extractor).await.unwrap_err();

        assert!(matches!(err, KartochkiError::ExtractionParse { .. }));
        // The first group had already been processed but its result is not
        // exposed anywhere.
        assert_eq!(extractor.seen.lock().unwrap().len(), 1);
    }
}
