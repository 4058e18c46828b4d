use std::fmt;
use std::rc::{Rc, Weak};

use trellis_core::collections::OrderedMap;
use trellis_core::{HostNodeId, Scope};

use crate::error::TreeError;
use crate::tree::{FragmentData, FragmentId, HostSlot, NodeKind, Tree, TreeInner};

/// Construction-time options of an element fragment.
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub attributes: OrderedMap<String, String>,
    pub classes: Vec<String>,
    pub styles: OrderedMap<String, String>,
}

impl TagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }
}

/// Handle to one node of a fragment [`Tree`].
///
/// Builder callbacks receive the fragment they populate, so nested content
/// is always created against an explicit parent.
#[derive(Clone)]
pub struct Fragment {
    tree: Tree,
    id: FragmentId,
}

impl Fragment {
    pub(crate) fn new(tree: Tree, id: FragmentId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> FragmentId {
        self.id
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn downgrade(&self) -> WeakFragment {
        WeakFragment {
            tree: self.tree.downgrade(),
            id: self.id,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.tree.contains(self.id)
    }

    /// Disposables owned by this fragment; destroyed with it.
    pub fn scope(&self) -> Rc<Scope> {
        self.tree.scope_of(self.id)
    }

    /// Non-owning child grouping further content.
    pub fn fragment(&self, build: impl FnOnce(&Fragment)) -> Fragment {
        let child = self.child(NodeKind::Plain, "fragment");
        build(&child);
        child
    }

    /// Non-owning sibling placed right before this fragment.
    pub fn before(&self, build: impl FnOnce(&Fragment)) -> Result<Fragment, TreeError> {
        let parent = self.parent().ok_or(TreeError::Missing { id: self.id })?;
        let id = self
            .tree
            .insert(parent.id, Some(self.id), NodeKind::Plain, "fragment");
        let sibling = Fragment::new(self.tree.clone(), id);
        build(&sibling);
        Ok(sibling)
    }

    /// Element child.
    pub fn tag(&self, name: &str, build: impl FnOnce(&Fragment)) -> Fragment {
        self.tag_with(name, TagOptions::default(), build)
    }

    pub fn tag_with(
        &self,
        name: &str,
        options: TagOptions,
        build: impl FnOnce(&Fragment),
    ) -> Fragment {
        let node = self.tree.create_host_node(|host| host.create_element(name));
        let TagOptions {
            attributes,
            classes,
            styles,
        } = options;
        if !attributes.is_empty() || !classes.is_empty() || !styles.is_empty() {
            self.tree.execute(move |host| {
                for (attribute, value) in &attributes {
                    host.set_attribute(node, attribute, Some(value.as_str()))?;
                }
                for class in &classes {
                    host.set_class(node, class, true)?;
                }
                for (property, value) in &styles {
                    host.set_style(node, property, Some(value.as_str()))?;
                }
                Ok(())
            });
        }
        let child = self.child(NodeKind::Host(HostSlot::element(node)), name);
        build(&child);
        child
    }

    /// Static text child.
    ///
    /// The returned fragment is a leaf: building children under it panics,
    /// as a host text node cannot hold other nodes.
    pub fn text(&self, content: &str) -> Fragment {
        let node = self.tree.create_host_node(|host| host.create_text(content));
        self.child(NodeKind::Host(HostSlot::text(node)), "text")
    }

    /// Destroy this fragment, its subtree and everything its scope owns.
    /// Destroying twice is a no-op.
    pub fn destroy(&self) {
        self.tree.destroy(self.id);
    }

    pub fn parent(&self) -> Option<Fragment> {
        self.related(|data| data.parent)
    }

    pub fn next_sibling(&self) -> Option<Fragment> {
        self.related(|data| data.next)
    }

    pub fn prev_sibling(&self) -> Option<Fragment> {
        self.related(|data| data.prev)
    }

    pub fn children(&self) -> Vec<Fragment> {
        self.tree
            .with_data(self.id, |data| data.children.iter().copied().collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
            .map(|id| Fragment::new(self.tree.clone(), id))
            .collect()
    }

    pub fn last_child(&self) -> Option<Fragment> {
        self.related(|data| data.children.last().copied())
    }

    /// Host node owned by this fragment, if it is a rendering fragment.
    pub fn host_node(&self) -> Option<HostNodeId> {
        self.tree
            .with_data(self.id, |data| match &data.kind {
                NodeKind::Host(slot) => Some(slot.node),
                _ => None,
            })
            .flatten()
    }

    /// Whether the owned host node is attached. Non-owning fragments report
    /// `false`.
    pub fn is_mounted(&self) -> bool {
        self.tree
            .with_data(self.id, |data| matches!(&data.kind, NodeKind::Host(slot) if slot.mounted))
            .unwrap_or(false)
    }

    pub(crate) fn child(&self, kind: NodeKind, label: &str) -> Fragment {
        let id = self.tree.insert(self.id, None, kind, label);
        Fragment::new(self.tree.clone(), id)
    }

    pub(crate) fn child_before(&self, anchor: FragmentId, label: &str) -> Fragment {
        let id = self.tree.insert(self.id, Some(anchor), NodeKind::Plain, label);
        Fragment::new(self.tree.clone(), id)
    }

    /// Host node of an element fragment.
    pub(crate) fn element_node(&self) -> Result<HostNodeId, TreeError> {
        self.tree
            .with_data(self.id, |data| match &data.kind {
                NodeKind::Host(slot) if slot.container => Ok(slot.node),
                _ => Err(TreeError::NotAnElement { id: self.id }),
            })
            .unwrap_or(Err(TreeError::Missing { id: self.id }))
    }

    fn related(&self, pick: impl FnOnce(&FragmentData) -> Option<FragmentId>) -> Option<Fragment> {
        let id = self.tree.with_data(self.id, pick).flatten()?;
        Some(Fragment::new(self.tree.clone(), id))
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tree.same(&other.tree)
    }
}

impl Eq for Fragment {}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fragment").field(&self.id).finish()
    }
}

/// Non-owning fragment handle held by handlers and views.
#[derive(Clone)]
pub struct WeakFragment {
    tree: Weak<TreeInner>,
    id: FragmentId,
}

impl WeakFragment {
    /// `None` once the tree is gone or the fragment was destroyed.
    pub fn upgrade(&self) -> Option<Fragment> {
        let tree = Tree::from_inner(self.tree.upgrade()?);
        tree.contains(self.id).then(|| Fragment::new(tree, self.id))
    }

    pub fn id(&self) -> FragmentId {
        self.id
    }
}

impl fmt::Debug for WeakFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakFragment").field(&self.id).finish()
    }
}
