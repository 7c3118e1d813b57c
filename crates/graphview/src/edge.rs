use mindmap_layout::{HandleId, HandlePair, LayoutEdge};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub handles: HandlePair,
}

impl MindMapEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, handles: HandlePair) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            handles,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

pub fn edge_id(source: &str, target: &str) -> String {
    format!("e{source}-{target}")
}

impl LayoutEdge for MindMapEdge {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn handles(&self) -> HandlePair {
        self.handles
    }

    fn set_handles(&mut self, handles: HandlePair) {
        self.handles = handles;
    }
}

/// Edge as it arrives from a loaded document or a raw connection gesture,
/// before its handle ids are validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl RawEdge {
    pub fn handles(&self) -> HandlePair {
        HandlePair::new(
            HandleId::normalize(self.source_handle.as_deref()),
            HandleId::normalize(self.target_handle.as_deref()),
        )
    }

    pub fn into_edge(self) -> MindMapEdge {
        let handles = self.handles();
        let id = self
            .id
            .unwrap_or_else(|| edge_id(&self.source, &self.target));
        MindMapEdge {
            id,
            source: self.source,
            target: self.target,
            handles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_handles_are_normalized_per_side() {
        let raw = RawEdge {
            source: "1".into(),
            target: "2".into(),
            source_handle: Some("source-bottom".into()),
            target_handle: Some("nowhere".into()),
            ..Default::default()
        };
        let edge = raw.into_edge();
        assert_eq!(edge.id, "e1-2");
        assert_eq!(edge.handles, HandlePair::new(HandleId::Bottom, HandleId::Right));
    }

    #[test]
    fn edge_serializes_flat_handle_fields() {
        let edge = MindMapEdge::new("1", "2", HandlePair::default());
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["sourceHandle"], "right");
        assert_eq!(json["targetHandle"], "left");
        assert_eq!(json["id"], "e1-2");
    }
}
