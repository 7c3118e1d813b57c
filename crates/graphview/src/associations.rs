//! Building a map from the word-association service's generational results.
//!
//! Only the response model lives here; fetching it is the host's business.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GraphError;
use crate::generation::{FALLBACK_COLOR, generation_color};
use crate::graph::MindMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationWord {
    pub word: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub generation_number: u32,
    pub parent_word: String,
    #[serde(default)]
    pub results: Vec<AssociationWord>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationalResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub generation: Option<u32>,
    #[serde(default)]
    pub generations: Vec<GenerationResult>,
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl GenerationalResponse {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Turn an error status into a [`GraphError::Association`].
    pub fn check(&self) -> Result<(), GraphError> {
        match self.status {
            ResponseStatus::Success => Ok(()),
            ResponseStatus::Error => {
                let mut message = self
                    .message
                    .clone()
                    .or_else(|| self.error_code.clone())
                    .unwrap_or_else(|| "unknown error".to_string());
                if let Some(details) = &self.details {
                    message.push_str(": ");
                    message.push_str(details);
                }
                Err(GraphError::Association {
                    code: self.error_code.clone(),
                    message,
                })
            }
        }
    }
}

impl MindMap {
    /// Grow the map from a generational association response.
    ///
    /// The keyword becomes an untagged root node unless a node with that label
    /// exists. Each result word hangs off the node labelled with its
    /// `parent_word` (the root when there is none), placed on a ring around it
    /// and tagged with its generation. Labels already on the map are skipped.
    /// Returns the number of nodes added.
    pub fn populate_from_associations<R: Rng + ?Sized>(
        &mut self,
        response: &GenerationalResponse,
        rng: &mut R,
    ) -> Result<usize, GraphError> {
        response.check()?;
        let keyword = response
            .keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GraphError::Association {
                code: None,
                message: "response carries no keyword".to_string(),
            })?;

        let mut added = 0;
        let root = match self.find_by_label(keyword) {
            Some(node) => node.id.clone(),
            None => {
                let placement = self
                    .config()
                    .free_position(self.viewport(), self.nodes(), rng);
                let id = self.add_node(keyword, placement.position);
                self.set_node_color(&id, Some(FALLBACK_COLOR.to_string()))?;
                added += 1;
                id
            }
        };

        let mut generations: Vec<&GenerationResult> = response.generations.iter().collect();
        generations.sort_by_key(|g| g.generation_number);

        for generation in generations {
            let parent = self
                .find_by_label(&generation.parent_word)
                .map(|n| n.id.clone())
                .unwrap_or_else(|| root.clone());
            let color = generation_color(generation.generation_number);

            for result in &generation.results {
                if self.find_by_label(&result.word).is_some() {
                    debug!(word = %result.word, "word already on the map");
                    continue;
                }
                let (child, _) = self.add_child_node(&parent, result.word.as_str(), rng)?;
                self.set_node_generation(&child, Some(generation.generation_number))?;
                self.set_node_color(&child, Some(color.to_string()))?;
                added += 1;
            }
        }

        info!(keyword, added, "populated from associations");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_carries_message_and_details() {
        let response = GenerationalResponse::from_json(
            r#"{"status":"error","error_code":"MODEL_NOT_LOADED","message":"model loading","details":"retry later"}"#,
        )
        .unwrap();
        match response.check() {
            Err(GraphError::Association { code, message }) => {
                assert_eq!(code.as_deref(), Some("MODEL_NOT_LOADED"));
                assert_eq!(message, "model loading: retry later");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            GenerationalResponse::from_json("{\"status\":\"maybe\"}"),
            Err(GraphError::MalformedResponse(_))
        ));
    }
}
