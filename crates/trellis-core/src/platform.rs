//! Host platform seams.
//!
//! The [`Host`] trait supplies the element primitives a fragment tree
//! renders into. The [`Executor`] trait decides when a host mutation is
//! applied: immediately, or queued and flushed later by the embedder.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle of one host node.
pub type HostNodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Missing { id: HostNodeId },
    NotAnElement { id: HostNodeId },
    Detached { id: HostNodeId },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Missing { id } => write!(f, "host node {id} missing"),
            HostError::NotAnElement { id } => write!(f, "host node {id} is not an element"),
            HostError::Detached { id } => write!(f, "host node {id} has no parent"),
        }
    }
}

impl std::error::Error for HostError {}

/// Element primitives of a rendering backend.
pub trait Host {
    fn create_element(&mut self, tag: &str) -> HostNodeId;

    fn create_text(&mut self, text: &str) -> HostNodeId;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError>;

    /// Insert `child` into the parent of `reference`, right before it.
    fn insert_before(&mut self, child: HostNodeId, reference: HostNodeId)
        -> Result<(), HostError>;

    /// Remove `node` from its parent, keeping it alive for reattachment.
    fn detach(&mut self, node: HostNodeId) -> Result<(), HostError>;

    /// Detach and release `node` together with its subtree.
    fn discard(&mut self, node: HostNodeId) -> Result<(), HostError>;

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError>;

    fn set_attribute(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError>;

    fn set_class(&mut self, node: HostNodeId, class: &str, enabled: bool)
        -> Result<(), HostError>;

    fn set_style(
        &mut self,
        node: HostNodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), HostError>;
}

pub type SharedHost = Rc<RefCell<dyn Host>>;

/// One deferred host mutation.
pub type HostCommand = Box<dyn FnOnce(&mut dyn Host) -> Result<(), HostError> + 'static>;

/// Strategy deciding when host mutations run.
pub trait Executor {
    fn execute(&self, host: &SharedHost, command: HostCommand);
}

/// Applies every command as soon as it is issued.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateExecutor;

impl Executor for ImmediateExecutor {
    fn execute(&self, host: &SharedHost, command: HostCommand) {
        let result = {
            let mut host = host.borrow_mut();
            command(&mut *host)
        };
        if let Err(err) = result {
            log::error!("host command failed: {err}");
        }
    }
}
