#![doc = r"Reactive cells, collection models and ownership scopes for Trellis."]

pub mod cell;
pub mod collections;
pub mod expression;
pub mod fault;
pub mod listener;
pub mod memory_host;
pub mod mirror;
pub mod model;
pub mod platform;
pub mod reference;
pub mod scope;

pub use cell::{handler, Destroy, Handler, ReactiveCell, WritableCell};
pub use expression::{Expression, Recompute, Sources};
pub use fault::{report_fault, reset_error_reporter, set_error_reporter, HandlerFault};
pub use listener::{Listener, ListenerHandler};
pub use memory_host::{HostNodeKind, MemoryHost};
pub use mirror::{Mirror, Pointer, Source};
pub use model::{ArrayKey, ArrayModel, ItemId, MapModel, ObjectModel, SetModel};
pub use platform::{
    Executor, Host, HostCommand, HostError, HostNodeId, ImmediateExecutor, SharedHost,
};
pub use reference::Reference;
pub use scope::Scope;

pub mod prelude {
    pub use crate::cell::{handler, Destroy, ReactiveCell, WritableCell};
    pub use crate::expression::Expression;
    pub use crate::mirror::{Mirror, Pointer, Source};
    pub use crate::model::{ArrayModel, MapModel, ObjectModel, SetModel};
    pub use crate::reference::Reference;
    pub use crate::scope::Scope;
}
