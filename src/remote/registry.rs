// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Futures resolving when named services become reachable

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::future::{Future, Promise};

#[derive(Default)]
struct State {
    available: HashSet<String>,
    waiters: HashMap<String, Vec<(usize, Promise<()>)>>,
    next_id: usize,
}

/// Tracks which services are reachable
///
/// `when_available` hands out futures that resolve once a service is
/// advertised. Cancelling such a future withdraws the wait. Waits whose
/// futures were all dropped are discarded the next time `when_available`
/// is called for that service. Clones share the same registry.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    state: Arc<Mutex<State>>,
}

impl ServiceRegistry {
    pub fn new() -> ServiceRegistry {
        ServiceRegistry::default()
    }

    fn lock(&self) -> MutexGuard<State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `name` reachable and resolve everyone waiting on it.
    /// Returns the number of observed waiters resolved.
    pub fn advertise(&self, name: &str) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.available.insert(name.to_owned());
            state.waiters.remove(name).unwrap_or_default()
        };

        debug!("service {} advertised, {} waiting", name, waiters.len());

        waiters.into_iter()
               .filter(|&(_, ref promise)| promise.has_observers() && promise.resolve(()))
               .count()
    }

    /// Mark `name` unreachable. Returns whether it was reachable.
    pub fn withdraw(&self, name: &str) -> bool {
        let removed = self.lock().available.remove(name);
        if removed {
            debug!("service {} withdrawn", name);
        }
        removed
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.lock().available.contains(name)
    }

    /// Number of pending waits on `name` that somebody still observes
    pub fn waiting(&self, name: &str) -> usize {
        self.lock()
            .waiters
            .get(name)
            .map_or(0, |w| w.iter().filter(|&&(_, ref p)| p.has_observers()).count())
    }

    /// A future resolving once `name` is reachable, already resolved if it is
    pub fn when_available(&self, name: &str) -> Future<()> {
        let mut stale = Vec::new();
        let future = self.register(name, &mut stale);

        // Abandoned promises settle when dropped, keep that out of the lock
        if !stale.is_empty() {
            trace!("discarding {} abandoned waits on {}", stale.len(), name);
        }
        drop(stale);

        future
    }

    fn register(&self, name: &str, stale: &mut Vec<(usize, Promise<()>)>) -> Future<()> {
        let mut state = self.lock();

        if state.available.contains(name) {
            return Future::of(());
        }

        let id = state.next_id;
        state.next_id += 1;

        let promise = Promise::new();
        let future = promise.future();

        let registry = Arc::downgrade(&self.state);
        let service = name.to_owned();
        promise.set_cancel_handler(move |promise| {
            if let Some(state) = registry.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(waiters) = state.waiters.get_mut(&service) {
                    waiters.retain(|&(waiter, _)| waiter != id);
                }
            }
            promise.cancel();
        });

        let waiters = state.waiters.entry(name.to_owned()).or_insert_with(Vec::new);
        let (live, abandoned): (Vec<_>, Vec<_>) =
            waiters.drain(..).partition(|&(_, ref p)| p.has_observers());
        *waiters = live;
        *stale = abandoned;

        waiters.push((id, promise));
        future
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::thread;

    use crate::error::Error;

    #[test]
    fn test_wait_then_advertise() {
        let registry = ServiceRegistry::new();
        let a = registry.when_available("org.example.Echo");
        let b = registry.when_available("org.example.Echo");
        assert_eq!(registry.waiting("org.example.Echo"), 2);
        assert!(a.poll().is_pending());

        let r = registry.clone();
        let t = thread::spawn(move || r.advertise("org.example.Echo"));

        assert_eq!(a.get(), Ok(()));
        assert_eq!(b.get(), Ok(()));
        assert_eq!(t.join().unwrap(), 2);
        assert_eq!(registry.waiting("org.example.Echo"), 0);
    }

    #[test]
    fn test_already_available() {
        let registry = ServiceRegistry::new();
        assert_eq!(registry.advertise("svc"), 0);
        assert!(registry.is_available("svc"));
        assert!(registry.when_available("svc").is_done());

        assert!(registry.withdraw("svc"));
        assert!(!registry.withdraw("svc"));
        assert!(!registry.when_available("svc").is_done());
    }

    #[test]
    fn test_cancel_wait() {
        let registry = ServiceRegistry::new();
        let keep = registry.when_available("svc");
        let gone = registry.when_available("svc");

        assert!(gone.request_cancel());
        assert_eq!(gone.get(), Err(Error::Cancelled));
        assert_eq!(registry.waiting("svc"), 1);

        assert_eq!(registry.advertise("svc"), 1);
        assert_eq!(keep.get(), Ok(()));
    }

    #[test]
    fn test_dropped_registry_fails_waiters() {
        let registry = ServiceRegistry::new();
        let f = registry.when_available("svc");
        drop(registry);
        assert!(f.get().unwrap_err().message().is_some());
    }

    #[test]
    fn test_abandoned_waits_are_discarded() {
        let registry = ServiceRegistry::new();
        for _ in 0..10 {
            drop(registry.when_available("svc"));
        }
        assert_eq!(registry.waiting("svc"), 0);

        let keep = registry.when_available("svc");
        assert_eq!(registry.lock().waiters["svc"].len(), 1);
        assert_eq!(registry.waiting("svc"), 1);

        assert_eq!(registry.advertise("svc"), 1);
        assert_eq!(keep.get(), Ok(()));
    }

    #[test]
    fn test_wait_observed_through_continuation_is_kept() {
        let registry = ServiceRegistry::new();
        let derived = registry.when_available("svc").then(|()| 7);

        drop(registry.when_available("svc"));
        drop(registry.when_available("svc"));
        assert_eq!(registry.waiting("svc"), 1);

        assert_eq!(registry.advertise("svc"), 1);
        assert_eq!(derived.get(), Ok(7));
    }
}
