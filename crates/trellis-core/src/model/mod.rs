//! Collection wrappers that emit [`Listener`](crate::Listener) events.
//!
//! Every mutating call first changes the underlying collection and then
//! emits remove/add events describing the net effect. Replacing a value is a
//! remove of the old value followed by an add of the new one; moves are
//! expressed the same way.

mod array;
mod map;
mod object;
mod set;

pub use array::{ArrayKey, ArrayModel, ItemId};
pub use map::MapModel;
pub use object::ObjectModel;
pub use set::SetModel;
