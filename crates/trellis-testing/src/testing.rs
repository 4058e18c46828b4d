use std::cell::RefCell;
use std::rc::Rc;

use trellis_core::{Executor, Host, HostNodeId, MemoryHost, SharedHost};
use trellis_ui::{Fragment, Tree};

/// Headless harness for exercising fragment trees in tests.
///
/// `TreeTestRule` owns an in-memory host with a single `<div>` container and
/// a [`Tree`] rendering into it. Content installed with
/// [`set_content`](Self::set_content) replaces whatever was mounted before.
pub struct TreeTestRule {
    memory: Rc<RefCell<MemoryHost>>,
    tree: Tree,
    container: HostNodeId,
    root: Option<Fragment>,
}

impl TreeTestRule {
    /// Create a rule applying host mutations immediately.
    pub fn new() -> Self {
        let (memory, container, host) = Self::host_parts();
        Self {
            memory,
            tree: Tree::new(host),
            container,
            root: None,
        }
    }

    /// Create a rule whose tree routes host mutations through `executor`.
    pub fn with_executor(executor: Rc<dyn Executor>) -> Self {
        let (memory, container, host) = Self::host_parts();
        Self {
            memory,
            tree: Tree::with_executor(host, executor),
            container,
            root: None,
        }
    }

    fn host_parts() -> (Rc<RefCell<MemoryHost>>, HostNodeId, SharedHost) {
        let memory = Rc::new(RefCell::new(MemoryHost::new()));
        let container = memory.borrow_mut().create_element("div");
        let host: SharedHost = memory.clone();
        (memory, container, host)
    }

    /// Mount `build` as the root content, destroying any previous root.
    pub fn set_content(&mut self, build: impl FnOnce(&Fragment)) -> Fragment {
        if let Some(previous) = self.root.take() {
            previous.destroy();
        }
        let root = self.tree.mount(self.container, build);
        self.root = Some(root.clone());
        root
    }

    /// Returns whether content has been installed in this rule.
    pub fn has_content(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Fragment> {
        self.root.as_ref()
    }

    /// Concatenated text rendered into the container.
    pub fn text(&self) -> String {
        self.memory.borrow().text_content(self.container)
    }

    /// Tag names of the container's element children.
    pub fn child_tags(&self) -> Vec<String> {
        self.memory.borrow().child_tags(self.container)
    }

    /// Host tree under the container.
    pub fn dump(&self) -> String {
        self.memory.borrow().dump_tree(Some(self.container))
    }

    /// Logical fragment tree under the current root.
    pub fn dump_fragments(&self) -> String {
        match &self.root {
            Some(root) => self.tree.dump(root),
            None => String::new(),
        }
    }

    pub fn host(&self) -> Rc<RefCell<MemoryHost>> {
        Rc::clone(&self.memory)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn container(&self) -> HostNodeId {
        self.container
    }
}

impl Default for TreeTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `TreeTestRule`.
pub fn run_test_tree<R>(f: impl FnOnce(&mut TreeTestRule) -> R) -> R {
    let mut rule = TreeTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Reference, WritableCell};

    #[test]
    fn set_content_replaces_the_previous_root() {
        run_test_tree(|rule| {
            assert!(!rule.has_content());

            let label = Rc::new(Reference::new(String::from("one")));
            rule.set_content(|root| {
                root.tag("h1", |h1| {
                    h1.text_cell(&label);
                });
            });
            assert_eq!(rule.text(), "one");
            assert_eq!(rule.child_tags(), vec!["h1"]);

            label.set("two".into());
            assert_eq!(rule.text(), "two");

            rule.set_content(|root| {
                root.text("plain");
            });
            assert_eq!(rule.text(), "plain");
            assert_eq!(label.handler_count(), 0);
            assert_eq!(rule.dump(), "[0] <div>\n  [3] \"plain\"\n");
        });
    }
}
