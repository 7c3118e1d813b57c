use mindmap_layout::{LayoutNode, Position, Size};
use serde::{Deserialize, Serialize};

/// User content carried by a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Distance from the keyword a node was generated from. Only used for
    /// colouring and filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u32>,
    // Set on nodes added during this session so the renderer can animate them
    #[serde(default)]
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: String,
    pub position: Position,
    /// Rendered size; `None` until the renderer has measured the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    pub data: NodeData,
}

impl MindMapNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            size: None,
            data: NodeData {
                label: label.into(),
                ..Default::default()
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    pub fn generation(&self) -> Option<u32> {
        self.data.generation
    }

    /// Estimate the rendered size of a node from its label, for renderers that
    /// cannot measure text.
    pub fn estimate_size(label: &str) -> Size {
        let base_width = 150.0;
        let line_height = 40.0;
        let char_width = 7.2;
        let padding = 24.0;

        let chars = label.chars().count() as f64;
        Size::new((chars * char_width + padding).max(base_width), line_height)
    }
}

impl LayoutNode for MindMapNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn size(&self) -> Option<Size> {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_keep_the_base_width() {
        assert_eq!(MindMapNode::estimate_size("idea"), Size::new(150.0, 40.0));
    }

    #[test]
    fn long_labels_grow_the_node() {
        let size = MindMapNode::estimate_size(&"x".repeat(30));
        assert!((size.width - 240.0).abs() < 1e-9);
    }

    #[test]
    fn deserializes_renderer_payload() {
        let node: MindMapNode = serde_json::from_str(
            r##"{"id":"1","position":{"x":10,"y":-4.5},"data":{"label":"root","color":"#ff6b6b"}}"##,
        )
        .unwrap();
        assert_eq!(node.position, Position::new(10.0, -4.5));
        assert_eq!(node.size, None);
        assert_eq!(node.data.color.as_deref(), Some("#ff6b6b"));
        assert!(!node.data.is_new);
    }
}
