use crate::Abortable;
use std::sync::{Arc, Mutex};

/// Rule applied when a new item is watched while others are already in flight.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ConcurrencyPolicy {
    /// No restriction; any number of items may be in flight at once.
    #[default]
    All,
    /// The first item wins: a newcomer is aborted on arrival and refused.
    First,
    /// The last item wins: everything already in flight is aborted first.
    Last,
}

/// Ordered set of in-flight [`Abortable`] items for one logical caller scope.
///
/// Membership doubles as the freshness criterion for overlapping runs: a case
/// that is no longer watched when it settles is stale and its result must not
/// be applied to shared tracked state. Entries are identified by allocation,
/// so two clones of the same `Arc` are the same entry.
///
/// Dropping the registry aborts everything still watched, which gives the
/// owning scope its teardown guarantee.
pub struct AbortRegistry {
    policy: ConcurrencyPolicy,
    items: Mutex<Vec<Arc<dyn Abortable>>>,
}

impl AbortRegistry {
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        AbortRegistry {
            policy,
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Registers `item` as in flight.
    ///
    /// Re-watching an item removes its previous entry first, so an item is
    /// never watched twice. With others already in flight the policy decides:
    /// under [`ConcurrencyPolicy::First`] the new item is aborted immediately
    /// and `false` is returned; under [`ConcurrencyPolicy::Last`] all current
    /// entries are aborted before the new one is registered.
    pub fn watch(&self, item: Arc<dyn Abortable>) -> bool {
        self.unwatch(item.as_ref());
        if !self.is_empty() {
            match self.policy {
                ConcurrencyPolicy::All => {}
                ConcurrencyPolicy::First => {
                    item.on_abort();
                    return false;
                }
                ConcurrencyPolicy::Last => self.abort(),
            }
        }
        self.items.lock().unwrap().push(item);
        true
    }

    /// Removes `item` without aborting it. No-op when not watched.
    pub fn unwatch(&self, item: &dyn Abortable) {
        let key = addr_of(item);
        self.items
            .lock()
            .unwrap()
            .retain(|watched| addr_of(watched.as_ref()) != key);
    }

    /// Whether `item` is currently watched.
    pub fn watched(&self, item: &dyn Abortable) -> bool {
        let key = addr_of(item);
        self.items
            .lock()
            .unwrap()
            .iter()
            .any(|watched| addr_of(watched.as_ref()) == key)
    }

    /// Drains the registry, aborting every entry exactly once.
    ///
    /// Entries are removed one at a time with the lock released around each
    /// `on_abort` call, so an abort hook may safely touch the registry again.
    /// Safe to call on an empty or already-drained registry.
    pub fn abort(&self) {
        loop {
            let item = {
                let mut items = self.items.lock().unwrap();
                if items.is_empty() {
                    break;
                }
                items.remove(0)
            };
            item.on_abort();
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

impl Default for AbortRegistry {
    fn default() -> Self {
        AbortRegistry::new(ConcurrencyPolicy::All)
    }
}

impl Drop for AbortRegistry {
    fn drop(&mut self) {
        self.abort();
    }
}

impl std::fmt::Debug for AbortRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbortRegistry")
            .field("policy", &self.policy)
            .field("len", &self.len())
            .finish()
    }
}

/// Identity of an abortable: the address of its allocation.
fn addr_of(item: &dyn Abortable) -> *const () {
    item as *const dyn Abortable as *const ()
}
