use super::*;
use crate::cell::handler;

struct Tracked {
    destroyed: Rc<Cell<usize>>,
}

impl Destroy for Tracked {
    fn destroy(&self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

fn tracked(counter: &Rc<Cell<usize>>) -> Rc<Tracked> {
    Rc::new(Tracked {
        destroyed: Rc::clone(counter),
    })
}

#[test]
fn destroy_cascades_once_and_runs_callback_last() {
    let scope = Scope::new();
    let counter = Rc::new(Cell::new(0));
    for _ in 0..3 {
        scope.register(tracked(&counter));
    }
    let cells: Vec<_> = (0..4).map(|v| scope.reference(v)).collect();
    let seen_at_callback = Rc::new(Cell::new(usize::MAX));
    {
        let counter = Rc::clone(&counter);
        let seen = Rc::clone(&seen_at_callback);
        scope.on_destroy(move || seen.set(counter.get()));
    }
    for cell in &cells {
        cell.on(&handler(|_: &i32| {}));
    }
    assert_eq!(scope.len(), 7);

    scope.destroy();
    assert!(scope.is_destroyed());
    assert_eq!(counter.get(), 3);
    assert_eq!(seen_at_callback.get(), 3);
    assert!(cells.iter().all(|cell| cell.handler_count() == 0));

    scope.destroy();
    assert_eq!(counter.get(), 3);
    assert!(scope.is_empty());
}

#[test]
fn release_hands_lifetime_back() {
    let scope = Scope::new();
    let counter = Rc::new(Cell::new(0));
    let kept = scope.register(tracked(&counter));
    let released = scope.register(tracked(&counter));

    assert!(scope.release(&released));
    assert!(!scope.release(&released));
    scope.destroy();

    assert_eq!(counter.get(), 1);
    drop(kept);
    released.destroy();
    assert_eq!(counter.get(), 2);
}

#[test]
fn register_after_destroy_destroys_immediately() {
    let scope = Scope::new();
    scope.destroy();
    let counter = Rc::new(Cell::new(0));
    scope.register(tracked(&counter));
    assert_eq!(counter.get(), 1);
    assert_eq!(scope.len(), 0);
}

#[test]
fn scope_built_cells_are_torn_down_with_the_scope() {
    let scope = Scope::new();
    let count = scope.reference(1);
    let double = scope.expression(|(n,): &(i32,)| n * 2, (count.clone(),));
    let view = scope.forward_mirror(&double);
    let edit = scope.mirror(&count);

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    scope.watch((view.clone(),), move |(v,): &(i32,)| sink.borrow_mut().push(*v));

    edit.set(5);
    assert_eq!(count.get(), 5);
    assert_eq!(view.get(), 10);
    assert_eq!(*log.borrow(), vec![2, 10]);

    scope.destroy();
    count.set(7);
    assert_eq!(double.get(), 10);
    assert_eq!(*log.borrow(), vec![2, 10]);
    assert_eq!(count.handler_count(), 0);
}

#[test]
fn nested_scopes_cascade() {
    let outer = Scope::new();
    let inner = outer.register(Rc::new(Scope::new()));
    let counter = Rc::new(Cell::new(0));
    inner.register(tracked(&counter));

    outer.destroy();
    assert!(inner.is_destroyed());
    assert_eq!(counter.get(), 1);
}
