use thiserror::Error;

/// Contract violations hit while laying out a model that skipped validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("flow {flow} references node {node}, which has no bounds")]
    MissingBounds { flow: String, node: String },
}
