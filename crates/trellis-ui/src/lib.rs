//! Fragment tree for Trellis: host-node placement, bindings, conditionals,
//! keyed views and components.

mod binding;
mod component;
mod error;
mod fragment;
mod insertion;
mod keyed;
mod switch;
mod tree;

pub use component::Component;
pub use error::TreeError;
pub use fragment::{Fragment, TagOptions, WeakFragment};
pub use keyed::{KeyedSource, KeyedView};
pub use switch::{CaseBuilder, SwitchedNode};
pub use tree::{FragmentId, Tree};

pub mod prelude {
    pub use crate::{Component, Fragment, TagOptions, Tree, TreeError};
    pub use trellis_core::prelude::*;
}
