use super::*;
use crate::cell::handler;
use crate::expression::Expression;
use crate::reference::Reference;
use std::cell::Cell;

#[test]
fn forward_only_mirror_keeps_source_untouched() {
    let source = Rc::new(Reference::new(1));
    let mirror = Mirror::new(Source::writable(source.clone()), true);

    mirror.set(9);
    assert_eq!(mirror.get(), 9);
    assert_eq!(source.get(), 1);

    source.set(2);
    assert_eq!(mirror.get(), 2);
}

#[test]
fn two_way_mirror_writes_back() {
    let source = Rc::new(Reference::new(String::from("a")));
    let mirror = Mirror::two_way(source.clone());
    assert!(!mirror.is_forward_only());

    mirror.set("b".to_string());
    assert_eq!(source.get(), "b");
    assert_eq!(mirror.get(), "b");
}

#[test]
fn readable_source_is_never_written() {
    let base = Rc::new(Reference::new(3));
    let tripled = Expression::new(|(v,): &(i32,)| v * 3, (base.clone(),));
    let mirror = Mirror::new(Source::readable(tripled.clone()), false);
    assert!(mirror.is_forward_only());

    mirror.set(100);
    assert_eq!(tripled.get(), 9);
    base.set(4);
    assert_eq!(mirror.get(), 12);
}

#[test]
fn disabled_mirror_unsubscribes_then_pulls_on_enable() {
    let source = Rc::new(Reference::new(1));
    let mirror = Mirror::forward(source.clone());
    let calls = Rc::new(Cell::new(0));
    let sink = Rc::clone(&calls);
    mirror.on(&handler(move |_: &i32| sink.set(sink.get() + 1)));

    mirror.disable();
    assert_eq!(source.handler_count(), 0);
    source.set(5);
    assert_eq!(mirror.get(), 1);

    mirror.enable();
    assert_eq!(source.handler_count(), 1);
    assert_eq!(mirror.get(), 5);
    assert_eq!(calls.get(), 1);
}

#[test]
fn pointer_follows_new_source_only() {
    let a = Rc::new(Reference::new(1));
    let b = Rc::new(Reference::new(20));
    let pointer = Pointer::new(Source::writable(a.clone()), false);

    assert!(pointer.point(Source::writable(b.clone())));
    assert!(!pointer.point(Source::writable(b.clone())));
    assert_eq!(pointer.get(), 20);
    assert_eq!(a.handler_count(), 0);

    a.set(2);
    assert_eq!(pointer.get(), 20);
    b.set(21);
    assert_eq!(pointer.get(), 21);

    pointer.set(30);
    assert_eq!(b.get(), 30);
    assert_eq!(a.get(), 2);
}

#[test]
fn disabled_pointer_defers_resync_until_enabled() {
    let a = Rc::new(Reference::new(1));
    let b = Rc::new(Reference::new(2));
    let pointer = Pointer::new(Source::readable(a.clone()), true);

    pointer.disable();
    pointer.point(Source::readable(b.clone()));
    assert_eq!(pointer.get(), 1);
    assert_eq!(b.handler_count(), 0);

    pointer.enable();
    assert_eq!(pointer.get(), 2);
    assert_eq!(b.handler_count(), 1);
    assert_eq!(a.handler_count(), 0);
}

#[test]
fn destroy_detaches_from_source() {
    let source = Rc::new(Reference::new(0));
    let mirror = Mirror::forward(source.clone());
    mirror.destroy();
    assert_eq!(source.handler_count(), 0);
    source.set(1);
    assert_eq!(mirror.get(), 0);
}
