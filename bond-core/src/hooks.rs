//! Lifecycle hook fan-out
//!
//! Dependent subsystems (e.g. a derived voting-power cache) observe deposit
//! lifecycle transitions without mutation rights: observers receive only
//! the account id, never a handle to the ledger.

use crate::types::AccountId;

/// Observer of deposit lifecycle transitions.
///
/// All methods default to no-ops so observers implement only what they
/// watch. Observers must not mutate ledger state; they are notified, not
/// consulted.
pub trait BondHooks {
    /// A deposit record is about to be created for `owner`
    fn before_deposit_created(&mut self, owner: &AccountId) {
        let _ = owner;
    }

    /// An existing deposit's token balance is about to change
    fn before_deposit_tokens_modified(&mut self, owner: &AccountId) {
        let _ = owner;
    }

    /// A deposit record is about to be removed
    fn before_deposit_removed(&mut self, owner: &AccountId) {
        let _ = owner;
    }

    /// A deposit record was created or changed
    fn after_deposit_modified(&mut self, owner: &AccountId) {
        let _ = owner;
    }
}

/// Ordered multicast over registered observers.
///
/// Observers are supplied at ledger construction and invoked in
/// registration order.
#[derive(Default)]
pub struct MultiBondHooks {
    observers: Vec<Box<dyn BondHooks>>,
}

impl MultiBondHooks {
    /// Create a dispatcher with no observers
    pub fn new(observers: Vec<Box<dyn BondHooks>>) -> Self {
        Self { observers }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True when no observers are registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for MultiBondHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiBondHooks")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl BondHooks for MultiBondHooks {
    fn before_deposit_created(&mut self, owner: &AccountId) {
        for observer in &mut self.observers {
            observer.before_deposit_created(owner);
        }
    }

    fn before_deposit_tokens_modified(&mut self, owner: &AccountId) {
        for observer in &mut self.observers {
            observer.before_deposit_tokens_modified(owner);
        }
    }

    fn before_deposit_removed(&mut self, owner: &AccountId) {
        for observer in &mut self.observers {
            observer.before_deposit_removed(owner);
        }
    }

    fn after_deposit_modified(&mut self, owner: &AccountId) {
        for observer in &mut self.observers {
            observer.after_deposit_modified(owner);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every notification as `(observer_tag, event, owner)`.
    pub struct RecordingHooks {
        pub tag: &'static str,
        pub log: Rc<RefCell<Vec<(String, String, String)>>>,
    }

    impl RecordingHooks {
        fn record(&mut self, event: &str, owner: &AccountId) {
            self.log.borrow_mut().push((
                self.tag.to_string(),
                event.to_string(),
                owner.to_string(),
            ));
        }
    }

    impl BondHooks for RecordingHooks {
        fn before_deposit_created(&mut self, owner: &AccountId) {
            self.record("before_created", owner);
        }

        fn before_deposit_tokens_modified(&mut self, owner: &AccountId) {
            self.record("before_modified", owner);
        }

        fn before_deposit_removed(&mut self, owner: &AccountId) {
            self.record("before_removed", owner);
        }

        fn after_deposit_modified(&mut self, owner: &AccountId) {
            self.record("after_modified", owner);
        }
    }
}
