//! Standard execution strategies backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the [`Executor`] seam
//! defined in `trellis-core`. A tree built with a [`DeferredExecutor`] records
//! its host mutations and applies them only when the embedder calls
//! [`DeferredExecutor::flush`], typically once per frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use trellis_core::{Executor, HostCommand, SharedHost};

/// Executor that queues host commands until flushed.
///
/// Commands run in submission order. A failing command is logged and the
/// remaining ones still run.
pub struct DeferredExecutor {
    queue: RefCell<VecDeque<(SharedHost, HostCommand)>>,
    flush_waker: RefCell<Option<Rc<dyn Fn()>>>,
}

impl DeferredExecutor {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            flush_waker: RefCell::new(None),
        }
    }

    /// Number of commands waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Apply every queued command, including commands queued while
    /// flushing. Returns how many ran.
    pub fn flush(&self) -> usize {
        let mut applied = 0;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((host, command)) = next else {
                break;
            };
            let result = {
                let mut host = host.borrow_mut();
                command(&mut *host)
            };
            if let Err(err) = result {
                log::error!("deferred host command failed: {err}");
            }
            applied += 1;
        }
        if applied > 0 {
            log::debug!("flushed {applied} host commands");
        }
        applied
    }

    /// Registers a waker that will be invoked whenever a command is queued.
    pub fn set_flush_waker(&self, waker: impl Fn() + 'static) {
        *self.flush_waker.borrow_mut() = Some(Rc::new(waker));
    }

    /// Clears any registered flush waker.
    pub fn clear_flush_waker(&self) {
        *self.flush_waker.borrow_mut() = None;
    }

    fn wake(&self) {
        let waker = self.flush_waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for DeferredExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeferredExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredExecutor")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Executor for DeferredExecutor {
    fn execute(&self, host: &SharedHost, command: HostCommand) {
        self.queue.borrow_mut().push_back((Rc::clone(host), command));
        self.wake();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use trellis_core::{Host, Reference, WritableCell};
    use trellis_testing::TreeTestRule;

    #[test]
    fn mutations_wait_for_flush() {
        let executor = Rc::new(DeferredExecutor::new());
        let wakes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&wakes);
        executor.set_flush_waker(move || counter.set(counter.get() + 1));

        let mut rule = TreeTestRule::with_executor(executor.clone());
        let label = Rc::new(Reference::new(String::from("a")));
        rule.set_content(|root| {
            root.tag("p", |p| {
                p.text_cell(&label);
            });
        });
        assert_eq!(rule.text(), "");
        assert!(executor.pending() > 0);
        assert_eq!(wakes.get(), executor.pending());

        executor.flush();
        assert_eq!(rule.text(), "a");
        assert_eq!(executor.pending(), 0);

        label.set("b".into());
        assert_eq!(rule.text(), "a");
        assert_eq!(executor.flush(), 1);
        assert_eq!(rule.text(), "b");

        executor.clear_flush_waker();
        label.set("c".into());
        assert_eq!(executor.pending(), 1);
    }

    #[test]
    fn failed_commands_do_not_stop_the_queue() {
        let executor = Rc::new(DeferredExecutor::new());
        let mut rule = TreeTestRule::with_executor(executor.clone());
        let root = rule.set_content(|root| {
            root.text("kept");
        });
        executor.flush();

        // Destroying the text queues a discard; a second discard of the same
        // node then fails.
        let text = root.children()[0].clone();
        let node = text.host_node().unwrap();
        text.destroy();
        executor.execute(
            &rule.tree().host(),
            Box::new(move |host: &mut dyn Host| host.discard(node)),
        );
        root.text("after");
        assert_eq!(executor.flush(), 3);
        assert_eq!(rule.text(), "after");
    }
}
