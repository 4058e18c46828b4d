use super::*;
use std::cell::RefCell;

use trellis_core::{Host, HostNodeId, MemoryHost, Reference, SharedHost, WritableCell};

use crate::tree::Tree;

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Rc<RefCell<MemoryHost>>, Tree, HostNodeId) {
    let memory = Rc::new(RefCell::new(MemoryHost::new()));
    let container = memory.borrow_mut().create_element("div");
    let host: SharedHost = memory.clone();
    (memory, Tree::new(host), container)
}

/// Builder writing `name` as text and logging its build and teardown.
fn branch(name: &'static str, log: &Log) -> impl Fn(&Fragment) + 'static {
    let log = Rc::clone(log);
    move |fragment: &Fragment| {
        log.borrow_mut().push(format!("+{name}"));
        fragment.text(name);
        let log = Rc::clone(&log);
        fragment
            .scope()
            .on_destroy(move || log.borrow_mut().push(format!("-{name}")));
    }
}

#[test]
fn first_true_case_wins_and_previous_branch_is_destroyed_once() {
    let (memory, tree, container) = setup();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let a = Rc::new(Reference::new(false));
    let b = Rc::new(Reference::new(false));
    let c = Rc::new(Reference::new(true));

    let root = tree.mount(container, |root| {
        root.when(&a, branch("a", &log));
        root.else_when(&b, branch("b", &log)).unwrap();
        root.else_when(&c, branch("c", &log)).unwrap();
        root.otherwise(branch("else", &log)).unwrap();
    });
    let switch = root.last_child().and_then(|host| host.switch_node()).unwrap();
    assert_eq!(switch.case_count(), 4);
    assert!(switch.is_closed());
    assert_eq!(switch.selected(), Some(2));
    assert_eq!(memory.borrow().text_content(container), "c");

    c.set(false);
    assert_eq!(switch.selected(), Some(3));
    assert_eq!(memory.borrow().text_content(container), "else");

    a.set(true);
    assert_eq!(memory.borrow().text_content(container), "a");

    // Selection stays on the first true case.
    b.set(true);
    assert_eq!(switch.selected(), Some(0));

    a.set(false);
    assert_eq!(memory.borrow().text_content(container), "b");

    assert_eq!(
        *log.borrow(),
        vec!["+c", "-c", "+else", "-else", "+a", "-a", "+b"]
    );
}

#[test]
fn no_true_case_means_no_branch() {
    let (memory, tree, container) = setup();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let flag = Rc::new(Reference::new(true));

    let root = tree.mount(container, |root| {
        root.when(&flag, branch("on", &log));
    });
    let switch = root.last_child().and_then(|host| host.switch_node()).unwrap();
    assert!(switch.branch().is_some());

    flag.set(false);
    assert_eq!(switch.selected(), None);
    assert!(switch.branch().is_none());
    assert_eq!(memory.borrow().text_content(container), "");
    assert_eq!(*log.borrow(), vec!["+on", "-on"]);
}

#[test]
fn branch_content_lands_before_later_siblings() {
    let (memory, tree, container) = setup();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let flag = Rc::new(Reference::new(false));

    tree.mount(container, |root| {
        root.text("<");
        root.when(&flag, branch("x", &log));
        root.text(">");
    });
    assert_eq!(memory.borrow().text_content(container), "<>");

    flag.set(true);
    assert_eq!(memory.borrow().text_content(container), "<x>");
    flag.set(false);
    assert_eq!(memory.borrow().text_content(container), "<>");
}

#[test]
fn else_without_open_conditional_is_an_error() {
    let (_memory, tree, container) = setup();
    let flag = Rc::new(Reference::new(false));

    tree.mount(container, |root| {
        let missing = TreeError::MissingIf { parent: root.id() };
        assert_eq!(root.otherwise(|_| {}).unwrap_err(), missing);

        root.tag("p", |_| {});
        assert_eq!(root.else_when(&flag, |_| {}).unwrap_err(), missing);

        root.when(&flag, |_| {});
        assert!(root.otherwise(|_| {}).is_ok());
        assert_eq!(root.otherwise(|_| {}).unwrap_err(), missing);
    });
}

#[test]
fn destroying_the_conditional_unsubscribes_its_guards() {
    let (memory, tree, container) = setup();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let flag = Rc::new(Reference::new(true));

    let root = tree.mount(container, |root| {
        root.when(&flag, branch("on", &log));
    });
    assert_eq!(flag.handler_count(), 1);

    root.destroy();
    assert_eq!(flag.handler_count(), 0);
    assert_eq!(memory.borrow().text_content(container), "");
    assert!(tree.is_empty());

    flag.set(false);
    assert_eq!(*log.borrow(), vec!["+on", "-on"]);
}

#[test]
fn toggling_a_branch_reuses_arena_slots() {
    let (memory, tree, container) = setup();
    let flag = Rc::new(Reference::new(true));

    let root = tree.mount(container, |root| {
        root.when(&flag, |branch: &Fragment| {
            branch.tag("p", |p| {
                p.text("on");
            });
        });
    });
    let switch = root.last_child().and_then(|host| host.switch_node()).unwrap();
    let first = switch.branch().unwrap();
    let live = tree.len();
    let capacity = tree.capacity();

    for step in 0..10_000 {
        flag.set(step % 2 == 1);
    }

    let latest = switch.branch().unwrap();
    assert_eq!(memory.borrow().text_content(container), "on");
    assert_eq!(tree.len(), live);
    assert_eq!(tree.capacity(), capacity);
    // A slot handed to a newer fragment no longer answers to the old id.
    assert_ne!(latest.id(), first.id());
    assert!(!first.is_alive());
    assert!(tree.fragment(first.id()).is_err());
}
