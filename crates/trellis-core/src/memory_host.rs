use std::fmt::Write as _;

use crate::collections::{OrderedMap, OrderedSet};
use crate::platform::{Host, HostError, HostNodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNodeKind {
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug)]
struct HostNode {
    kind: HostNodeKind,
    parent: Option<HostNodeId>,
    children: Vec<HostNodeId>,
    attributes: OrderedMap<String, String>,
    classes: OrderedSet<String>,
    styles: OrderedMap<String, String>,
}

impl HostNode {
    fn new(kind: HostNodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: OrderedMap::default(),
            classes: OrderedSet::default(),
            styles: OrderedMap::default(),
        }
    }
}

/// In-memory host tree used by tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<Option<HostNode>>,
    operations: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of structural mutations applied so far.
    pub fn operation_count(&self) -> usize {
        self.operations
    }

    pub fn contains(&self, id: HostNodeId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    pub fn kind(&self, id: HostNodeId) -> Option<&HostNodeKind> {
        self.node(id).ok().map(|node| &node.kind)
    }

    pub fn parent(&self, id: HostNodeId) -> Option<HostNodeId> {
        self.node(id).ok().and_then(|node| node.parent)
    }

    pub fn children(&self, id: HostNodeId) -> Vec<HostNodeId> {
        self.node(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn attribute(&self, id: HostNodeId, name: &str) -> Option<String> {
        self.node(id).ok()?.attributes.get(name).cloned()
    }

    pub fn has_class(&self, id: HostNodeId, class: &str) -> bool {
        self.node(id)
            .map(|node| node.classes.contains(class))
            .unwrap_or(false)
    }

    pub fn style(&self, id: HostNodeId, property: &str) -> Option<String> {
        self.node(id).ok()?.styles.get(property).cloned()
    }

    /// Concatenated text of every text node below `id`, in tree order.
    pub fn text_content(&self, id: HostNodeId) -> String {
        let mut output = String::new();
        self.collect_text(id, &mut output);
        output
    }

    /// Tag names of the direct element children of `id`.
    pub fn child_tags(&self, id: HostNodeId) -> Vec<String> {
        self.children(id)
            .into_iter()
            .filter_map(|child| match self.kind(child) {
                Some(HostNodeKind::Element { tag }) => Some(tag.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn dump_tree(&self, root: Option<HostNodeId>) -> String {
        let mut output = String::new();
        if let Some(root_id) = root {
            self.dump_node(&mut output, root_id, 0);
        } else {
            output.push_str("(no root)\n");
        }
        output
    }

    fn dump_node(&self, output: &mut String, id: HostNodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.node(id) {
            Ok(node) => {
                match &node.kind {
                    HostNodeKind::Element { tag } => {
                        let _ = write!(output, "{indent}[{id}] <{tag}");
                        for (name, value) in &node.attributes {
                            let _ = write!(output, " {name}=\"{value}\"");
                        }
                        if !node.classes.is_empty() {
                            let classes: Vec<&str> =
                                node.classes.iter().map(String::as_str).collect();
                            let _ = write!(output, " class=\"{}\"", classes.join(" "));
                        }
                        output.push_str(">\n");
                    }
                    HostNodeKind::Text { text } => {
                        let _ = writeln!(output, "{indent}[{id}] {text:?}");
                    }
                }
                for child in &node.children {
                    self.dump_node(output, *child, depth + 1);
                }
            }
            Err(_) => {
                let _ = writeln!(output, "{indent}[{id}] (missing)");
            }
        }
    }

    fn collect_text(&self, id: HostNodeId, output: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            HostNodeKind::Text { text } => output.push_str(text),
            HostNodeKind::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, output);
                }
            }
        }
    }

    fn node(&self, id: HostNodeId) -> Result<&HostNode, HostError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(HostError::Missing { id })
    }

    fn node_mut(&mut self, id: HostNodeId) -> Result<&mut HostNode, HostError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(HostError::Missing { id })
    }

    fn element_mut(&mut self, id: HostNodeId) -> Result<&mut HostNode, HostError> {
        let node = self.node_mut(id)?;
        match node.kind {
            HostNodeKind::Element { .. } => Ok(node),
            HostNodeKind::Text { .. } => Err(HostError::NotAnElement { id }),
        }
    }

    fn create(&mut self, kind: HostNodeKind) -> HostNodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(HostNode::new(kind)));
        id
    }

    fn unlink(&mut self, id: HostNodeId) -> Result<(), HostError> {
        let parent = self.node_mut(id)?.parent.take();
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|child| *child != id);
        }
        Ok(())
    }
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str) -> HostNodeId {
        self.create(HostNodeKind::Element {
            tag: tag.to_string(),
        })
    }

    fn create_text(&mut self, text: &str) -> HostNodeId {
        self.create(HostNodeKind::Text {
            text: text.to_string(),
        })
    }

    fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError> {
        self.element_mut(parent)?;
        self.node(child)?;
        self.unlink(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.operations += 1;
        Ok(())
    }

    fn insert_before(
        &mut self,
        child: HostNodeId,
        reference: HostNodeId,
    ) -> Result<(), HostError> {
        self.node(child)?;
        let parent = self
            .node(reference)?
            .parent
            .ok_or(HostError::Detached { id: reference })?;
        self.unlink(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|sibling| *sibling == reference)
            .ok_or(HostError::Detached { id: reference })?;
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.operations += 1;
        Ok(())
    }

    fn detach(&mut self, node: HostNodeId) -> Result<(), HostError> {
        self.unlink(node)?;
        self.operations += 1;
        Ok(())
    }

    fn discard(&mut self, node: HostNodeId) -> Result<(), HostError> {
        self.unlink(node)?;
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(slot) = self.nodes.get_mut(id) {
                if let Some(removed) = slot.take() {
                    pending.extend(removed.children);
                }
            }
        }
        self.operations += 1;
        Ok(())
    }

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError> {
        if let HostNodeKind::Text { text: current } = &mut self.node_mut(node)?.kind {
            *current = text.to_string();
            return Ok(());
        }
        // Elements take their text through a single text child.
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            if let Some(slot) = self.nodes.get_mut(child) {
                slot.take();
            }
        }
        let text_node = self.create_text(text);
        self.node_mut(text_node)?.parent = Some(node);
        self.node_mut(node)?.children.push(text_node);
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError> {
        let element = self.element_mut(node)?;
        match value {
            Some(value) => {
                element
                    .attributes
                    .insert(name.to_string(), value.to_string());
            }
            None => {
                element.attributes.shift_remove(name);
            }
        }
        Ok(())
    }

    fn set_class(&mut self, node: HostNodeId, class: &str, enabled: bool) -> Result<(), HostError> {
        let element = self.element_mut(node)?;
        if enabled {
            element.classes.insert(class.to_string());
        } else {
            element.classes.shift_remove(class);
        }
        Ok(())
    }

    fn set_style(
        &mut self,
        node: HostNodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), HostError> {
        let element = self.element_mut(node)?;
        match value {
            Some(value) => {
                element
                    .styles
                    .insert(property.to_string(), value.to_string());
            }
            None => {
                element.styles.shift_remove(property);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_before_and_append_keep_sibling_order() {
        let mut host = MemoryHost::new();
        let root = host.create_element("div");
        let a = host.create_text("a");
        let b = host.create_text("b");
        let c = host.create_text("c");

        host.append_child(root, c).unwrap();
        host.insert_before(a, c).unwrap();
        host.insert_before(b, c).unwrap();

        assert_eq!(host.children(root), vec![a, b, c]);
        assert_eq!(host.text_content(root), "abc");
        assert_eq!(host.parent(b), Some(root));
    }

    #[test]
    fn insert_before_detached_reference_fails() {
        let mut host = MemoryHost::new();
        let loose = host.create_element("span");
        let child = host.create_text("x");
        assert_eq!(
            host.insert_before(child, loose),
            Err(HostError::Detached { id: loose })
        );
        assert_eq!(
            host.append_child(child, loose),
            Err(HostError::NotAnElement { id: child })
        );
    }

    #[test]
    fn discard_releases_subtree() {
        let mut host = MemoryHost::new();
        let root = host.create_element("ul");
        let item = host.create_element("li");
        let text = host.create_text("row");
        host.append_child(root, item).unwrap();
        host.append_child(item, text).unwrap();

        host.discard(item).unwrap();
        assert_eq!(host.len(), 1);
        assert!(host.children(root).is_empty());
        assert!(!host.contains(text));
        assert_eq!(host.discard(item), Err(HostError::Missing { id: item }));
    }

    #[test]
    fn element_properties_show_up_in_dump() {
        let mut host = MemoryHost::new();
        let root = host.create_element("p");
        host.set_attribute(root, "id", Some("intro")).unwrap();
        host.set_class(root, "lead", true).unwrap();
        host.set_class(root, "muted", true).unwrap();
        host.set_class(root, "muted", false).unwrap();
        host.set_style(root, "color", Some("red")).unwrap();
        host.set_text(root, "hi").unwrap();

        assert_eq!(host.style(root, "color").as_deref(), Some("red"));
        assert!(host.has_class(root, "lead"));
        assert_eq!(
            host.dump_tree(Some(root)),
            "[0] <p id=\"intro\" class=\"lead\">\n  [1] \"hi\"\n"
        );
    }
}
