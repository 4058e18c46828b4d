//! Recovery of panics raised by user handlers during change propagation.
//!
//! A cell or listener invokes each of its handlers through [`guard`]. When a
//! handler panics, the panic is caught, turned into a [`HandlerFault`] and
//! handed to the reporter installed for the current thread. Delivery to the
//! remaining handlers of the same wave continues.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A panic that escaped one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFault {
    /// Kind of the emitter whose handler failed (`"Reference"`, `"Listener"`, ...).
    pub origin: &'static str,
    /// Panic payload rendered as text.
    pub message: String,
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} handler panicked: {}", self.origin, self.message)
    }
}

impl std::error::Error for HandlerFault {}

type Reporter = Rc<dyn Fn(&HandlerFault)>;

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = RefCell::new(None);
}

/// Replace the reporter that receives handler faults on this thread.
pub fn set_error_reporter(reporter: impl Fn(&HandlerFault) + 'static) {
    REPORTER.with(|slot| *slot.borrow_mut() = Some(Rc::new(reporter)));
}

/// Restore the default reporter, which logs the fault and continues.
pub fn reset_error_reporter() {
    REPORTER.with(|slot| slot.borrow_mut().take());
}

/// Deliver a fault to the active reporter.
pub fn report_fault(fault: HandlerFault) {
    // Cloned out so a reporter may replace itself.
    let reporter = REPORTER.with(|slot| slot.borrow().clone());
    match reporter {
        Some(reporter) => reporter(&fault),
        None => log::error!("{fault}"),
    }
}

/// Run `call`, reporting instead of propagating a panic.
pub fn guard(origin: &'static str, call: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(call)) {
        report_fault(HandlerFault {
            origin,
            message: panic_message(payload.as_ref()),
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn guard_reports_string_payloads() {
        let seen: Rc<RefCell<Vec<HandlerFault>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        set_error_reporter(move |fault| sink.borrow_mut().push(fault.clone()));

        guard("Reference", || panic!("boom {}", 7));
        guard("Listener", || std::panic::panic_any(42_u32));

        reset_error_reporter();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].origin, "Reference");
        assert_eq!(seen[0].message, "boom 7");
        assert_eq!(seen[1].message, "non-string panic payload");
    }

    #[test]
    fn guard_runs_call_without_reporting_on_success() {
        let calls = Rc::new(Cell::new(0));
        let reported = Rc::new(Cell::new(false));
        let flag = Rc::clone(&reported);
        set_error_reporter(move |_| flag.set(true));

        let counter = Rc::clone(&calls);
        guard("Reference", move || counter.set(counter.get() + 1));

        reset_error_reporter();
        assert_eq!(calls.get(), 1);
        assert!(!reported.get());
    }
}
