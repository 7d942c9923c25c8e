//! sync::operations
//!
//! In-flight tracking per operation class.
//!
//! # Design
//!
//! Each class (push, pull, fetch, checkout) has one atomic flag. Callers
//! acquire a flag with [`OperationStates::try_begin`], which hands back an
//! [`OperationGuard`] that clears the flag when dropped. This makes the
//! release run on every exit path, including early returns via `?`.
//!
//! Classes are independent: a fetch may overlap a checkout.
//!
//! # Example
//!
//! ```
//! use gitsync::sync::{OperationClass, OperationStates};
//!
//! let states = OperationStates::new();
//! {
//!     let _guard = states.try_begin(OperationClass::Pull).unwrap();
//!     assert!(states.is_pull_in_progress());
//!     assert!(states.try_begin(OperationClass::Pull).is_none());
//! }
//! assert!(!states.is_pull_in_progress());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// The mutating operation classes tracked for in-flight status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationClass {
    Push,
    Pull,
    Fetch,
    Checkout,
}

impl OperationClass {
    pub const ALL: [OperationClass; 4] = [
        OperationClass::Push,
        OperationClass::Pull,
        OperationClass::Fetch,
        OperationClass::Checkout,
    ];
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationClass::Push => "push",
            OperationClass::Pull => "pull",
            OperationClass::Fetch => "fetch",
            OperationClass::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// Four independent in-flight flags.
#[derive(Debug, Default)]
pub struct OperationStates {
    push: AtomicBool,
    pull: AtomicBool,
    fetch: AtomicBool,
    checkout: AtomicBool,
}

impl OperationStates {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, class: OperationClass) -> &AtomicBool {
        match class {
            OperationClass::Push => &self.push,
            OperationClass::Pull => &self.pull,
            OperationClass::Fetch => &self.fetch,
            OperationClass::Checkout => &self.checkout,
        }
    }

    pub fn is_in_progress(&self, class: OperationClass) -> bool {
        self.flag(class).load(Ordering::SeqCst)
    }

    pub fn set_in_progress(&self, class: OperationClass, value: bool) {
        self.flag(class).store(value, Ordering::SeqCst);
    }

    pub fn is_push_in_progress(&self) -> bool {
        self.is_in_progress(OperationClass::Push)
    }

    pub fn set_push_in_progress(&self, value: bool) {
        self.set_in_progress(OperationClass::Push, value);
    }

    pub fn is_pull_in_progress(&self) -> bool {
        self.is_in_progress(OperationClass::Pull)
    }

    pub fn set_pull_in_progress(&self, value: bool) {
        self.set_in_progress(OperationClass::Pull, value);
    }

    pub fn is_fetch_in_progress(&self) -> bool {
        self.is_in_progress(OperationClass::Fetch)
    }

    pub fn set_fetch_in_progress(&self, value: bool) {
        self.set_in_progress(OperationClass::Fetch, value);
    }

    pub fn is_checkout_in_progress(&self) -> bool {
        self.is_in_progress(OperationClass::Checkout)
    }

    pub fn set_checkout_in_progress(&self, value: bool) {
        self.set_in_progress(OperationClass::Checkout, value);
    }

    /// Mark `class` in flight unless it already is.
    ///
    /// Returns `None` when another operation of the same class holds the
    /// flag. The check and the set are a single atomic step.
    pub fn try_begin(&self, class: OperationClass) -> Option<OperationGuard<'_>> {
        self.flag(class)
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| {
                log::debug!("{class} started");
                OperationGuard {
                    states: self,
                    class,
                }
            })
    }

    /// Point-in-time copy of all four flags.
    pub fn snapshot(&self) -> OperationFlags {
        OperationFlags {
            push: self.is_push_in_progress(),
            pull: self.is_pull_in_progress(),
            fetch: self.is_fetch_in_progress(),
            checkout: self.is_checkout_in_progress(),
        }
    }
}

/// Clears its operation flag on drop.
#[derive(Debug)]
#[must_use = "the operation is only marked in flight while the guard is alive"]
pub struct OperationGuard<'a> {
    states: &'a OperationStates,
    class: OperationClass,
}

impl OperationGuard<'_> {
    pub fn class(&self) -> OperationClass {
        self.class
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.states.set_in_progress(self.class, false);
        log::debug!("{} finished", self.class);
    }
}

/// Serializable copy of [`OperationStates`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationFlags {
    pub push: bool,
    pub pull: bool,
    pub fetch: bool,
    pub checkout: bool,
}

impl OperationFlags {
    pub fn get(&self, class: OperationClass) -> bool {
        match class {
            OperationClass::Push => self.push,
            OperationClass::Pull => self.pull,
            OperationClass::Fetch => self.fetch,
            OperationClass::Checkout => self.checkout,
        }
    }

    pub fn any(&self) -> bool {
        self.push || self.pull || self.fetch || self.checkout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear() {
        let states = OperationStates::new();
        for class in OperationClass::ALL {
            assert!(!states.is_in_progress(class));
        }
        assert!(!states.snapshot().any());
    }

    #[test]
    fn setters_are_independent() {
        let states = OperationStates::new();
        states.set_fetch_in_progress(true);
        assert!(states.is_fetch_in_progress());
        assert!(!states.is_push_in_progress());
        assert!(!states.is_pull_in_progress());
        assert!(!states.is_checkout_in_progress());

        states.set_fetch_in_progress(false);
        assert!(!states.is_fetch_in_progress());
    }

    #[test]
    fn guard_rejects_same_class() {
        let states = OperationStates::new();
        let guard = states.try_begin(OperationClass::Push).unwrap();
        assert_eq!(guard.class(), OperationClass::Push);
        assert!(states.try_begin(OperationClass::Push).is_none());

        // other classes are unaffected
        let fetch = states.try_begin(OperationClass::Fetch);
        assert!(fetch.is_some());
    }

    #[test]
    fn guard_clears_on_error_path() {
        fn failing(states: &OperationStates) -> Result<(), &'static str> {
            let _guard = states.try_begin(OperationClass::Checkout).ok_or("busy")?;
            Err("backend failed")
        }

        let states = OperationStates::new();
        assert!(failing(&states).is_err());
        assert!(!states.is_checkout_in_progress());
    }

    #[test]
    fn snapshot_reports_set_flags() {
        let states = OperationStates::new();
        let _guard = states.try_begin(OperationClass::Pull).unwrap();
        let flags = states.snapshot();
        assert!(flags.pull);
        assert!(flags.get(OperationClass::Pull));
        assert!(!flags.get(OperationClass::Push));
        assert!(flags.any());
    }

    #[test]
    fn flags_serialize_by_class() {
        let flags = OperationFlags {
            fetch: true,
            ..Default::default()
        };
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["fetch"], true);
        assert_eq!(json["push"], false);
    }
}
