//! Property tests for cell propagation.
//!
//! Invariants covered:
//! 1. Writing a cell's current value back fires no handler.
//! 2. A value-changing write fires each handler exactly once.
//! 3. An expression always equals its function applied to the source values,
//!    after any sequence of writes to any source.
//! 4. A forward-only mirror never writes its source; a two-way mirror always
//!    does.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use trellis_core::{handler, Expression, Mirror, ReactiveCell, Reference, WritableCell};

fn counted(cell: &Reference<i64>) -> Rc<Cell<usize>> {
    let calls = Rc::new(Cell::new(0));
    let sink = Rc::clone(&calls);
    cell.on(&handler(move |_: &i64| sink.set(sink.get() + 1)));
    calls
}

proptest! {
    #[test]
    fn equal_writes_are_suppressed(initial in any::<i64>(), repeats in 1usize..8) {
        let cell = Reference::new(initial);
        let calls = counted(&cell);
        for _ in 0..repeats {
            cell.set(cell.get());
        }
        prop_assert_eq!(calls.get(), 0);
    }

    #[test]
    fn changing_writes_notify_once_each(writes in prop::collection::vec(any::<i64>(), 0..32)) {
        let cell = Reference::new(0_i64);
        let calls = counted(&cell);
        let mut expected = 0;
        let mut current = 0_i64;
        for value in writes {
            if value != current {
                expected += 1;
                current = value;
            }
            cell.set(value);
        }
        prop_assert_eq!(calls.get(), expected);
    }

    #[test]
    fn expression_matches_function_of_sources(
        initial in prop::array::uniform3(-1000i64..1000),
        writes in prop::collection::vec((0usize..3, -1000i64..1000), 0..24),
    ) {
        let cells: Vec<Rc<Reference<i64>>> =
            initial.iter().map(|v| Rc::new(Reference::new(*v))).collect();
        let f = |(a, b, c): &(i64, i64, i64)| a * 3 - b + c * c;
        let expr = Expression::new(f, (cells[0].clone(), cells[1].clone(), cells[2].clone()));
        prop_assert_eq!(expr.get(), f(&(initial[0], initial[1], initial[2])));

        for (index, value) in writes {
            cells[index].set(value);
            let live = (cells[0].get(), cells[1].get(), cells[2].get());
            prop_assert_eq!(expr.get(), f(&live));
        }
    }

    #[test]
    fn mirror_write_back_follows_direction(start in any::<i32>(), next in any::<i32>()) {
        let source = Rc::new(Reference::new(start));
        let forward = Mirror::new(trellis_core::Source::writable(source.clone()), true);
        forward.set(next);
        prop_assert_eq!(source.get(), start);
        prop_assert_eq!(forward.get(), next);

        let two_way = Mirror::two_way(source.clone());
        two_way.set(next);
        prop_assert_eq!(source.get(), next);
    }
}
