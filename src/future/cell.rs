// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::dispatch::{self, DispatchPolicy, Task};

use super::{Future, Outcome, Promise};

pub type Continuation<T> = Box<dyn FnOnce(Future<T>) + Send + 'static>;
pub type CancelHandler<T> = Box<dyn FnOnce(&Promise<T>) -> bool + Send + 'static>;

struct Registration<T>
    where T: Send + 'static
{
    policy: DispatchPolicy,
    handler: Continuation<T>,
}

struct Inner<T>
    where T: Send + 'static
{
    outcome: Outcome<T>,
    waiters: Vec<Registration<T>>,
    cancel: Option<CancelHandler<T>>,
}

/// The state shared by a `Promise` and every `Future` observing it
pub struct Core<T>
    where T: Send + 'static
{
    inner: Mutex<Inner<T>>,
    cond: Condvar,
    producers: AtomicUsize,
    policy: DispatchPolicy,
}

impl<T> Core<T>
    where T: Send + 'static
{
    pub fn new(outcome: Outcome<T>, policy: DispatchPolicy) -> Arc<Core<T>> {
        Arc::new(Core {
            inner: Mutex::new(Inner {
                outcome: outcome,
                waiters: Vec::new(),
                cancel: None,
            }),
            cond: Condvar::new(),
            producers: AtomicUsize::new(0),
            policy: policy,
        })
    }

    #[inline]
    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    #[inline]
    fn lock(&self) -> MutexGuard<Inner<T>> {
        // Nothing panics while holding the lock, the state is always consistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn acquire_producer(&self) {
        self.producers.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns true if the last producer handle went away
    pub fn release_producer(&self) -> bool {
        self.producers.fetch_sub(1, Ordering::AcqRel) == 1
    }

    #[inline]
    pub fn producers(&self) -> usize {
        self.producers.load(Ordering::Acquire)
    }

    pub fn is_pending(&self) -> bool {
        self.lock().outcome.is_pending()
    }

    pub fn has_waiters(&self) -> bool {
        !self.lock().waiters.is_empty()
    }

    pub fn with_outcome<F, R>(&self, f: F) -> R
        where F: FnOnce(&Outcome<T>) -> R
    {
        f(&self.lock().outcome)
    }

    /// Move out of `Pending`. Only the first call has an effect.
    pub fn settle(self: &Arc<Self>, outcome: Outcome<T>) -> bool {
        if outcome.is_pending() {
            return false;
        }

        let (waiters, cancel) = {
            let mut inner = self.lock();

            if !inner.outcome.is_pending() {
                trace!("ignoring settlement of an already settled future");
                return false;
            }

            trace!("settling future: {}", outcome.kind());
            inner.outcome = outcome;
            self.cond.notify_all();

            (mem::replace(&mut inner.waiters, Vec::new()), inner.cancel.take())
        };

        // Dropped outside the lock, it may own a producer of this very core
        drop(cancel);

        // Deferred runs collected so far are handed off before each inline
        // continuation, so registration order holds across policies
        let mut deferred: Vec<Task> = Vec::new();
        for Registration { policy, handler } in waiters {
            let future = Future::from_core(self.clone(), policy);
            let task: Task = Box::new(move || handler(future));

            match policy.effective() {
                DispatchPolicy::Deferred => deferred.push(task),
                _ => {
                    flush_deferred(&mut deferred);
                    dispatch::run(task);
                }
            }
        }
        flush_deferred(&mut deferred);

        true
    }

    /// Run `handler` once this core settles, immediately if it already has
    pub fn add_continuation(self: &Arc<Self>, policy: DispatchPolicy, handler: Continuation<T>) {
        {
            let mut inner = self.lock();
            if inner.outcome.is_pending() {
                inner.waiters.push(Registration {
                    policy: policy,
                    handler: handler,
                });
                return;
            }
        }

        let future = Future::from_core(self.clone(), policy);
        dispatch::dispatch(policy, Box::new(move || handler(future)));
    }

    /// Install the cancellation handler, returning true if one was replaced
    pub fn set_cancel_handler(&self, handler: CancelHandler<T>) -> bool {
        let (replaced, dropped) = {
            let mut inner = self.lock();
            if !inner.outcome.is_pending() {
                // Never going to be invoked
                (false, Some(handler))
            } else {
                let previous = mem::replace(&mut inner.cancel, Some(handler));
                (previous.is_some(), previous)
            }
        };

        // Outside the lock, it may own a producer of this very core
        drop(dropped);
        replaced
    }

    pub fn request_cancel(self: &Arc<Self>) -> bool {
        let handler = {
            let mut inner = self.lock();
            if !inner.outcome.is_pending() {
                return false;
            }
            inner.cancel.take()
        };

        match handler {
            Some(handler) => {
                trace!("invoking cancellation handler");
                let promise = Promise::from_core(self.clone());
                handler(&promise)
            }
            None => false,
        }
    }

    pub fn wait(&self) {
        let mut inner = self.lock();
        while inner.outcome.is_pending() {
            inner = self.cond.wait(inner).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns false if `timeout` elapsed while still pending
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => {
                self.wait();
                return true;
            }
        };

        let mut inner = self.lock();
        loop {
            if !inner.outcome.is_pending() {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            inner = self.cond
                        .wait_timeout(inner, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
        }
    }
}

/// Schedule `tasks` as one executor task that runs them in order
fn flush_deferred(tasks: &mut Vec<Task>) {
    if tasks.is_empty() {
        return;
    }

    let batch = mem::replace(tasks, Vec::new());
    dispatch::dispatch(DispatchPolicy::Deferred,
                       Box::new(move || {
                           for task in batch {
                               dispatch::run(task);
                           }
                       }));
}
