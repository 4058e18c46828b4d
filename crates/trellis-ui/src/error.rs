use std::fmt;

use crate::tree::FragmentId;

/// Usage errors raised while building a fragment tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The fragment was destroyed or never existed.
    Missing { id: FragmentId },
    /// `else_when`/`otherwise` without an open conditional as the parent's
    /// last child.
    MissingIf { parent: FragmentId },
    /// The operation needs a fragment owning an element host node.
    NotAnElement { id: FragmentId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Missing { id } => write!(f, "fragment {id} missing"),
            TreeError::MissingIf { parent } => {
                write!(f, "fragment {parent} has no open conditional to extend")
            }
            TreeError::NotAnElement { id } => write!(f, "fragment {id} does not own an element"),
        }
    }
}

impl std::error::Error for TreeError {}
