//! Error types for layout, the frame pipeline, and reconciliation.

use std::fmt;

use crate::render::RenderId;
use crate::widgets::Key;

/// A contract violation attributed to one render node.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("protocol violation at {node:?}: {message}")]
    ProtocolViolation { node: RenderId, message: String },
    #[error("{node:?} requires {required} as an ancestor")]
    MissingAncestor {
        node: RenderId,
        required: &'static str,
    },
    #[error("{node:?} was read before it completed layout")]
    NotLaidOut { node: RenderId },
    #[error("{node:?} was laid out twice in one pass")]
    LaidOutTwice { node: RenderId },
}

impl LayoutError {
    pub(crate) fn violation(node: RenderId, message: impl Into<String>) -> Self {
        LayoutError::ProtocolViolation {
            node,
            message: message.into(),
        }
    }

    pub fn node(&self) -> RenderId {
        match self {
            LayoutError::ProtocolViolation { node, .. }
            | LayoutError::MissingAncestor { node, .. }
            | LayoutError::NotLaidOut { node }
            | LayoutError::LaidOutTwice { node } => *node,
        }
    }
}

/// A recorded layout error plus the debug names of the failing node's
/// ancestors, root first.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub error: LayoutError,
    pub chain: Vec<&'static str>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {})", self.error, self.chain.join(" > "))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("layout failed with {} error(s); first: {}", .0.len(), first(.0))]
    Layout(Vec<Diagnostic>),
    #[error("pipeline has no root render object")]
    NoRoot,
}

fn first(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("duplicate key {key:?} among the children of {parent}")]
    DuplicateKey { parent: &'static str, key: Key },
    #[error("root widget {0} produced no render object")]
    EmptyRoot(&'static str),
    #[error("root render object {0} must use the box protocol")]
    RootProtocol(&'static str),
}

/// Everything that can abort one frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
