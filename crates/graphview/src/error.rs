use mindmap_layout::LayoutError;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("unknown edge: {0}")]
    UnknownEdge(String),
    #[error("cannot connect node {0} to itself")]
    SelfLoop(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("association service error: {message}")]
    Association {
        code: Option<String>,
        message: String,
    },
    #[error("malformed association response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}
