use async_trait::async_trait;

use crate::error::{KartochkiError, Result};
use crate::provider::ModelClient;
use crate::types::ConceptMap;

static CONCEPT_EXTRACTION_PROMPT: &str = r#"Find and define key concepts or terms found in the text the user provides.

Respond with ONLY a JSON object, without any backticks or markdown fences,
mapping each concept name to its definition:
{"concept": "definition", "concept": "definition", ...}

Rules:
- Every value must be a plain string definition
- No nested objects or arrays
- Output nothing except the JSON object"#;

/// Turns free text into a concept-name → definition map by prompting a
/// generative model. Tests substitute a fake.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<ConceptMap>;
}

/// Production extractor backed by a chat-completions provider.
pub struct LlmConceptExtractor {
    client: ModelClient,
}

impl LlmConceptExtractor {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConceptExtractor for LlmConceptExtractor {
    async fn extract(&self, text: &str) -> Result<ConceptMap> {
        let reply = self.client.chat(CONCEPT_EXTRACTION_PROMPT, text).await?;
        parse_concept_map(&reply)
    }
}

/// Parses model output into a [`ConceptMap`].
///
/// The output must be a flat JSON object whose values are all strings.
/// Anything else, including valid JSON of another shape, fails with
/// `ExtractionParse`; malformed output is surfaced, never repaired.
pub fn parse_concept_map(raw: &str) -> Result<ConceptMap> {
    let value: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|err| KartochkiError::ExtractionParse {
            reason: format!("invalid JSON: {err}"),
        })?;

    let object = value
        .as_object()
        .ok_or_else(|| KartochkiError::ExtractionParse {
            reason: "expected a JSON object of concept to definition".to_string(),
        })?;

    let mut concepts = ConceptMap::new();
    for (name, definition) in object {
        let definition =
            definition
                .as_str()
                .ok_or_else(|| KartochkiError::ExtractionParse {
                    reason: format!("definition of '{name}' is not a string"),
                })?;
        concepts.insert(name.clone(), definition.to_string());
    }

    Ok(concepts)
}
