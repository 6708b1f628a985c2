// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Signal emissions as futures

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::future::{Future, Promise};

struct Subscribers<T>
    where T: Send + 'static
{
    pending: Vec<(usize, Promise<T>)>,
    next_id: usize,
}

/// A named signal; `next` yields a future of the following emission
///
/// Subscriptions whose futures were all dropped are discarded by the next
/// call to `next` and skipped by `emit`.
pub struct Signal<T>
    where T: Send + 'static
{
    name: String,
    subscribers: Arc<Mutex<Subscribers<T>>>,
}

impl<T> Signal<T>
    where T: Clone + Send + 'static
{
    pub fn new<S: Into<String>>(name: S) -> Signal<T> {
        Signal {
            name: name.into(),
            subscribers: Arc::new(Mutex::new(Subscribers {
                pending: Vec::new(),
                next_id: 0,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<Subscribers<T>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The value of the next `emit`. Cancelling it unsubscribes.
    pub fn next(&self) -> Future<T> {
        let mut stale = Vec::new();
        let future = self.subscribe(&mut stale);

        if !stale.is_empty() {
            trace!("signal {} dropping {} abandoned subscriptions", self.name, stale.len());
        }
        drop(stale);

        future
    }

    fn subscribe(&self, stale: &mut Vec<(usize, Promise<T>)>) -> Future<T> {
        let mut subscribers = self.lock();
        let id = subscribers.next_id;
        subscribers.next_id += 1;

        let promise = Promise::new();
        let future = promise.future();

        let weak = Arc::downgrade(&self.subscribers);
        promise.set_cancel_handler(move |promise| {
            if let Some(subscribers) = weak.upgrade() {
                subscribers.lock()
                           .unwrap_or_else(PoisonError::into_inner)
                           .pending
                           .retain(|&(sub, _)| sub != id);
            }
            promise.cancel();
        });

        let (live, abandoned): (Vec<_>, Vec<_>) =
            subscribers.pending.drain(..).partition(|&(_, ref p)| p.has_observers());
        subscribers.pending = live;
        *stale = abandoned;

        subscribers.pending.push((id, promise));
        future
    }

    /// Deliver `val` to every pending `next`, returning how many received it
    pub fn emit(&self, val: T) -> usize {
        let pending = ::std::mem::replace(&mut self.lock().pending, Vec::new());
        trace!("signal {} emitted to {} subscribers", self.name, pending.len());

        pending.into_iter()
               .filter(|&(_, ref promise)| promise.has_observers() && promise.resolve(val.clone()))
               .count()
    }

    /// Number of pending `next` futures somebody still observes
    pub fn subscribers(&self) -> usize {
        self.lock().pending.iter().filter(|&&(_, ref p)| p.has_observers()).count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::error::Error;

    #[test]
    fn test_emit_resolves_pending() {
        let signal = Signal::new("PropertiesChanged");
        let first = signal.next();
        let second = signal.next();

        assert_eq!(signal.emit(1u32), 2);
        assert_eq!(first.get(), Ok(1));
        assert_eq!(second.get(), Ok(1));

        // Only the following emission is observed
        let third = signal.next();
        assert_eq!(signal.emit(2), 1);
        assert_eq!(signal.emit(3), 0);
        assert_eq!(third.get(), Ok(2));
    }

    #[test]
    fn test_cancel_unsubscribes() {
        let signal = Signal::<u32>::new("Tick");
        let f = signal.next();
        assert_eq!(signal.subscribers(), 1);

        assert!(f.request_cancel());
        assert_eq!(signal.subscribers(), 0);
        assert_eq!(f.get(), Err(Error::Cancelled));
        assert_eq!(signal.emit(1), 0);
        assert_eq!(signal.name(), "Tick");
    }

    #[test]
    fn test_abandoned_subscriptions_are_skipped() {
        let signal = Signal::<u32>::new("NameOwnerChanged");
        drop(signal.next());
        drop(signal.next());
        assert_eq!(signal.subscribers(), 0);

        let live = signal.next();
        assert_eq!(signal.lock().pending.len(), 1);

        drop(signal.next());
        assert_eq!(signal.subscribers(), 1);
        assert_eq!(signal.emit(5), 1);
        assert_eq!(live.get(), Ok(5));
    }

    #[test]
    fn test_subscription_observed_through_continuation_is_kept() {
        let signal = Signal::<u32>::new("Tick");
        let doubled = signal.next().then(|v| v * 2);

        drop(signal.next());
        assert_eq!(signal.subscribers(), 1);
        assert_eq!(signal.emit(4), 1);
        assert_eq!(doubled.get(), Ok(8));
    }
}
