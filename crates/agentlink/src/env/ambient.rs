//! The thread's ambient environment.
//!
//! Some agent-side code resolves types lazily against an implicit "current"
//! namespace rather than an explicit parameter. The dispatcher makes the
//! target's environment ambient for the duration of each bridged call and
//! restores the previous one when the call leaves, on every exit path.
//!
//! The ambient slot is a true thread-local: concurrent calls on different
//! threads cannot observe each other's context.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use super::Environment;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<Environment>>> = const { RefCell::new(None) };
}

/// The environment the current thread resolves types against, if any.
pub fn current() -> Option<Arc<Environment>> {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Make `environment` the thread's ambient environment until the guard drops.
///
/// Guards nest: each one remembers the value it displaced and puts it back on
/// drop, so re-entrant bridged calls unwind to the right context.
#[must_use = "dropping the guard restores the previous ambient environment"]
pub fn enter(environment: Arc<Environment>) -> ContextGuard {
    let previous = ACTIVE.with(|active| active.borrow_mut().replace(environment));
    ContextGuard {
        previous,
        _not_send: PhantomData,
    }
}

/// Restores the previously ambient environment when dropped.
///
/// `!Send`: restoration must happen on the thread that entered.
pub struct ContextGuard {
    previous: Option<Arc<Environment>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}
