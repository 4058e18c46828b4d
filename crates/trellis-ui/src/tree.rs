//! Fragment arena.
//!
//! Fragments live in a slot vector owned by [`Tree`]. Parent and sibling
//! links are plain [`FragmentId`]s; ownership flows only through each
//! fragment's ordered child set, so destroying a fragment cascades to its
//! subtree. A destroyed fragment's slot goes back on a free list; ids carry a
//! generation so a handle to the old occupant never resolves to the new one.

use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use trellis_core::{
    Destroy, Executor, Host, HostError, HostNodeId, ImmediateExecutor, Scope, SharedHost,
};

use crate::error::TreeError;
use crate::fragment::Fragment;
use crate::insertion::{self, Position};
use crate::switch::SwitchedNode;

/// Generational index of a fragment in its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId {
    index: u32,
    generation: u32,
}

impl FragmentId {
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

struct Slot {
    generation: u32,
    data: Option<FragmentData>,
}

/// Slot vector with a free list of emptied slots.
#[derive(Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Arena {
    pub(crate) fn get(&self, id: FragmentId) -> Option<&FragmentData> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.data.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: FragmentId) -> Option<&mut FragmentData> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.data.as_mut()
    }

    fn alloc(&mut self, data: FragmentData) -> FragmentId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return FragmentId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("fragment arena exhausted"));
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        FragmentId {
            index,
            generation: 0,
        }
    }

    /// Empty the slot of `id` and bump its generation.
    fn release(&mut self, id: FragmentId) -> Option<FragmentData> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let data = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(data)
    }

    fn len(&self) -> usize {
        self.live
    }

    /// Slots allocated so far, live or free.
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Host node exclusively owned by a rendering fragment.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HostSlot {
    pub(crate) node: HostNodeId,
    pub(crate) mounted: bool,
    /// Supplied by the embedder (mount container); never discarded.
    pub(crate) borrowed: bool,
    /// Element that can hold children, as opposed to a text node.
    pub(crate) container: bool,
}

impl HostSlot {
    pub(crate) fn element(node: HostNodeId) -> Self {
        Self {
            node,
            mounted: true,
            borrowed: false,
            container: true,
        }
    }

    pub(crate) fn text(node: HostNodeId) -> Self {
        Self {
            node,
            mounted: true,
            borrowed: false,
            container: false,
        }
    }
}

pub(crate) enum NodeKind {
    Plain,
    Host(HostSlot),
    Switch(Rc<SwitchedNode>),
}

impl NodeKind {
    fn host_node(&self) -> Option<HostNodeId> {
        match self {
            NodeKind::Host(slot) => Some(slot.node),
            NodeKind::Plain | NodeKind::Switch(_) => None,
        }
    }
}

pub(crate) struct FragmentData {
    pub(crate) parent: Option<FragmentId>,
    pub(crate) prev: Option<FragmentId>,
    pub(crate) next: Option<FragmentId>,
    pub(crate) children: IndexSet<FragmentId>,
    pub(crate) kind: NodeKind,
    pub(crate) scope: Rc<Scope>,
    pub(crate) label: String,
}

pub(crate) struct TreeInner {
    nodes: RefCell<Arena>,
    host: SharedHost,
    executor: Rc<dyn Executor>,
}

/// Handle to a fragment arena bound to one host.
#[derive(Clone)]
pub struct Tree {
    inner: Rc<TreeInner>,
}

impl Tree {
    /// Tree applying host mutations immediately.
    pub fn new(host: SharedHost) -> Self {
        Self::with_executor(host, Rc::new(ImmediateExecutor))
    }

    pub fn with_executor(host: SharedHost, executor: Rc<dyn Executor>) -> Self {
        Self {
            inner: Rc::new(TreeInner {
                nodes: RefCell::new(Arena::default()),
                host,
                executor,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<TreeInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<TreeInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn same(&self, other: &Tree) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn host(&self) -> SharedHost {
        Rc::clone(&self.inner.host)
    }

    /// Create a root fragment rendering into `container` and build it.
    ///
    /// The container stays owned by the caller: destroying the root removes
    /// its content but leaves the container in place.
    pub fn mount(&self, container: HostNodeId, build: impl FnOnce(&Fragment)) -> Fragment {
        let id = self.push(FragmentData {
            parent: None,
            prev: None,
            next: None,
            children: IndexSet::new(),
            kind: NodeKind::Host(HostSlot {
                node: container,
                mounted: true,
                borrowed: true,
                container: true,
            }),
            scope: Rc::new(Scope::new()),
            label: "root".to_string(),
        });
        let root = Fragment::new(self.clone(), id);
        build(&root);
        root
    }

    pub fn fragment(&self, id: FragmentId) -> Result<Fragment, TreeError> {
        if self.contains(id) {
            Ok(Fragment::new(self.clone(), id))
        } else {
            Err(TreeError::Missing { id })
        }
    }

    pub fn contains(&self, id: FragmentId) -> bool {
        insertion::fragment(&self.inner.nodes.borrow(), id).is_some()
    }

    /// Number of live fragments.
    pub fn len(&self) -> usize {
        self.inner.nodes.borrow().len()
    }

    /// Number of arena slots ever allocated. Destroyed fragments leave their
    /// slot free for the next one, so this tracks the peak live count.
    pub fn capacity(&self) -> usize {
        self.inner.nodes.borrow().capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indented listing of the logical subtree under `root`.
    pub fn dump(&self, root: &Fragment) -> String {
        let nodes = self.inner.nodes.borrow();
        let mut output = String::new();
        dump_fragment(&nodes, root.id(), 0, &mut output);
        output
    }

    pub(crate) fn execute(
        &self,
        command: impl FnOnce(&mut dyn Host) -> Result<(), HostError> + 'static,
    ) {
        self.inner
            .executor
            .execute(&self.inner.host, Box::new(command));
    }

    /// Create a host node right away; attaching it goes through the executor.
    pub(crate) fn create_host_node(&self, create: impl FnOnce(&mut dyn Host) -> HostNodeId) -> HostNodeId {
        let mut host = self.inner.host.borrow_mut();
        create(&mut *host)
    }

    pub(crate) fn place(&self, node: HostNodeId, position: Position) {
        match position {
            Position::Before(reference) => {
                self.execute(move |host| host.insert_before(node, reference))
            }
            Position::Append(parent) => self.execute(move |host| host.append_child(parent, node)),
        }
    }

    pub(crate) fn with_data<R>(&self, id: FragmentId, f: impl FnOnce(&FragmentData) -> R) -> Option<R> {
        let nodes = self.inner.nodes.borrow();
        insertion::fragment(&nodes, id).map(f)
    }

    pub(crate) fn scope_of(&self, id: FragmentId) -> Rc<Scope> {
        self.with_data(id, |data| Rc::clone(&data.scope))
            .unwrap_or_else(|| panic!("fragment {id} used after destroy"))
    }

    pub(crate) fn set_kind(&self, id: FragmentId, kind: NodeKind) {
        let mut nodes = self.inner.nodes.borrow_mut();
        live_mut(&mut nodes, id).kind = kind;
    }

    /// Link a new fragment under `parent`, before `anchor` or at the end, and
    /// attach its host node if it owns one.
    pub(crate) fn insert(
        &self,
        parent: FragmentId,
        anchor: Option<FragmentId>,
        kind: NodeKind,
        label: &str,
    ) -> FragmentId {
        let (id, attach) = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let (prev, next) = {
                let parent_data = live(&nodes, parent);
                if let NodeKind::Host(slot) = &parent_data.kind {
                    assert!(slot.container, "fragment {parent} is a text node and cannot have children");
                }
                match anchor {
                    Some(anchor) => {
                        let anchor_data = live(&nodes, anchor);
                        assert_eq!(
                            anchor_data.parent,
                            Some(parent),
                            "fragment {anchor} is not a child of {parent}"
                        );
                        (anchor_data.prev, Some(anchor))
                    }
                    None => (parent_data.children.last().copied(), None),
                }
            };

            let host_node = kind.host_node();
            let id = nodes.alloc(FragmentData {
                parent: Some(parent),
                prev,
                next,
                children: IndexSet::new(),
                kind,
                scope: Rc::new(Scope::new()),
                label: label.to_string(),
            });

            let siblings = &mut live_mut(&mut nodes, parent).children;
            match anchor.and_then(|anchor| siblings.get_index_of(&anchor)) {
                Some(index) => {
                    siblings.shift_insert(index, id);
                }
                None => {
                    siblings.insert(id);
                }
            }
            if let Some(prev) = prev {
                live_mut(&mut nodes, prev).next = Some(id);
            }
            if let Some(next) = next {
                live_mut(&mut nodes, next).prev = Some(id);
            }

            let attach = host_node.map(|node| (node, insertion::position_after(&nodes, id)));
            (id, attach)
        };
        match attach {
            Some((node, Some(position))) => self.place(node, position),
            Some((node, None)) => log::warn!("fragment {id} has no host position for node {node}"),
            None => {}
        }
        id
    }

    /// Detach or reattach the host node of an owning fragment.
    pub(crate) fn set_mounted(&self, id: FragmentId, mounted: bool) {
        let change = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let Some(data) = nodes.get_mut(id) else {
                return;
            };
            let NodeKind::Host(slot) = &mut data.kind else {
                return;
            };
            if slot.mounted == mounted || slot.borrowed {
                return;
            }
            slot.mounted = mounted;
            let node = slot.node;
            if mounted {
                Some((node, insertion::position_after(&nodes, id)))
            } else {
                Some((node, None))
            }
        };
        match change {
            Some((node, Some(position))) => self.place(node, position),
            Some((node, None)) if !mounted => self.execute(move |host| host.detach(node)),
            Some((node, None)) => log::warn!("fragment {id} has no host position for node {node}"),
            None => {}
        }
    }

    /// Destroy `id` and its subtree. Destroying a missing fragment is a no-op.
    pub(crate) fn destroy(&self, id: FragmentId) {
        self.destroy_inner(id, false);
    }

    fn destroy_inner(&self, id: FragmentId, host_detached: bool) {
        let scope = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let Some(data) = insertion::fragment(&nodes, id) else {
                return;
            };
            let (parent, prev, next) = (data.parent, data.prev, data.next);
            let scope = Rc::clone(&data.scope);
            if let Some(parent) = parent.and_then(|parent| slot_mut(&mut nodes, parent)) {
                parent.children.shift_remove(&id);
            }
            if let Some(prev_data) = prev.and_then(|prev| slot_mut(&mut nodes, prev)) {
                prev_data.next = next;
            }
            if let Some(next_data) = next.and_then(|next| slot_mut(&mut nodes, next)) {
                next_data.prev = prev;
            }
            if let Some(data) = slot_mut(&mut nodes, id) {
                data.parent = None;
                data.prev = None;
                data.next = None;
            }
            scope
        };
        log::trace!("destroying fragment {id}");
        scope.destroy();

        let (children, discard, owns_subtree) = {
            let nodes = self.inner.nodes.borrow();
            let Some(data) = insertion::fragment(&nodes, id) else {
                return;
            };
            // A hidden node sits outside its ancestors' host subtree and must
            // be released on its own.
            let (discard, owns_subtree) = match &data.kind {
                NodeKind::Host(slot) if !slot.borrowed => {
                    ((!host_detached || !slot.mounted).then_some(slot.node), true)
                }
                _ => (None, false),
            };
            let children: Vec<FragmentId> = data.children.iter().copied().collect();
            (children, discard, owns_subtree)
        };
        let children_detached = host_detached || owns_subtree;
        for child in children {
            self.destroy_inner(child, children_detached);
        }

        let removed = self.inner.nodes.borrow_mut().release(id);
        drop(removed);
        if let Some(node) = discard {
            self.execute(move |host| host.discard(node));
        }
    }

    fn push(&self, data: FragmentData) -> FragmentId {
        self.inner.nodes.borrow_mut().alloc(data)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("fragments", &self.len()).finish()
    }
}

fn live(nodes: &Arena, id: FragmentId) -> &FragmentData {
    insertion::fragment(nodes, id).unwrap_or_else(|| panic!("fragment {id} used after destroy"))
}

fn live_mut(nodes: &mut Arena, id: FragmentId) -> &mut FragmentData {
    slot_mut(nodes, id).unwrap_or_else(|| panic!("fragment {id} used after destroy"))
}

fn slot_mut(nodes: &mut Arena, id: FragmentId) -> Option<&mut FragmentData> {
    nodes.get_mut(id)
}

fn dump_fragment(
    nodes: &Arena,
    id: FragmentId,
    depth: usize,
    output: &mut String,
) {
    let indent = "  ".repeat(depth);
    let Some(data) = insertion::fragment(nodes, id) else {
        let _ = writeln!(output, "{indent}{id} (destroyed)");
        return;
    };
    let _ = match &data.kind {
        NodeKind::Host(slot) if slot.mounted => {
            writeln!(output, "{indent}{id} {} [{}]", data.label, slot.node)
        }
        NodeKind::Host(slot) => {
            writeln!(output, "{indent}{id} {} [{}] hidden", data.label, slot.node)
        }
        NodeKind::Plain => writeln!(output, "{indent}{id} {}", data.label),
        NodeKind::Switch(switch) => match switch.selected() {
            Some(index) => writeln!(output, "{indent}{id} {} case {index}", data.label),
            None => writeln!(output, "{indent}{id} {} none", data.label),
        },
    };
    for child in &data.children {
        dump_fragment(nodes, *child, depth + 1, output);
    }
}
