// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::DispatchPolicy;
use crate::error::Result;
use crate::init;

use super::cell::Core;
use super::{Future, Outcome};

/// The writable end of an asynchronous result
///
/// Only the first of `resolve`, `reject`, `cancel` (or `settle`) takes
/// effect; the rest return false and change nothing, so a timeout may race
/// a reply without coordination. Clones write to the same future. When the
/// last handle is dropped while the future is still pending, the future
/// fails instead of hanging its observers.
pub struct Promise<T>
    where T: Send + 'static
{
    core: Arc<Core<T>>,
}

const BROKEN: &str = "promise dropped before being resolved";

impl<T> Promise<T>
    where T: Send + 'static
{
    pub fn new() -> Promise<T> {
        Promise::with_policy(init::default_policy())
    }

    /// A promise whose future dispatches continuations with `policy`
    pub fn with_policy(policy: DispatchPolicy) -> Promise<T> {
        Promise::from_core(Core::new(Outcome::Pending, policy))
    }

    pub(crate) fn from_core(core: Arc<Core<T>>) -> Promise<T> {
        core.acquire_producer();
        Promise { core: core }
    }

    /// The future observing this promise. Every call returns a handle on the
    /// same result, see `Future::ptr_eq`.
    pub fn future(&self) -> Future<T> {
        Future::from_core(self.core.clone(), self.core.policy())
    }

    pub fn resolve(&self, val: T) -> bool {
        self.core.settle(Outcome::Value(val))
    }

    pub fn reject<S: Into<String>>(&self, msg: S) -> bool {
        self.core.settle(Outcome::Error(msg.into()))
    }

    /// Settle as cancelled. Once this returns, `is_cancelled` is true on
    /// every handle, from any thread.
    pub fn cancel(&self) -> bool {
        self.core.settle(Outcome::Cancelled)
    }

    /// Settle with an arbitrary outcome, `Outcome::Pending` is ignored
    pub fn settle(&self, outcome: Outcome<T>) -> bool {
        self.core.settle(outcome)
    }

    pub fn settle_result(&self, result: Result<T>) -> bool {
        self.core.settle(Outcome::from(result))
    }

    pub fn is_pending(&self) -> bool {
        self.core.is_pending()
    }

    /// Whether anything besides the producers can still see the outcome:
    /// a live `Future` handle or a registered continuation
    pub fn has_observers(&self) -> bool {
        Arc::strong_count(&self.core) > self.core.producers() || self.core.has_waiters()
    }

    /// Register the handler invoked when cancellation of the future is
    /// requested while it is still pending. It is called at most once and
    /// receives this promise, usually to `cancel` it.
    ///
    /// A second registration replaces the first one. That is almost always a
    /// mistake, so it is logged.
    pub fn set_cancel_handler<F>(&self, handler: F)
        where F: FnOnce(&Promise<T>) + Send + 'static
    {
        let replaced = self.core.set_cancel_handler(Box::new(move |promise: &Promise<T>| {
            handler(promise);
            true
        }));

        if replaced {
            warn!("cancellation handler replaced by a second registration");
        }
    }

    /// Route cancellation requests on this promise's future to `upstream`.
    /// The link is weak: it never keeps `upstream` alive.
    pub(crate) fn route_cancel_to<U>(&self, upstream: &Future<U>)
        where U: Send + 'static
    {
        let upstream = Arc::downgrade(upstream.core());
        self.core.set_cancel_handler(Box::new(move |_: &Promise<T>| {
            match upstream.upgrade() {
                Some(core) => core.request_cancel(),
                None => false,
            }
        }));
    }
}

impl<T> Promise<T>
    where T: Clone + Send + 'static
{
    /// Settle with whatever `next` settles with, and route cancellation
    /// to it in the meantime
    pub(crate) fn follow(self, next: &Future<T>) {
        self.route_cancel_to(next);
        next.core().add_continuation(DispatchPolicy::Inline,
                                     Box::new(move |done: Future<T>| {
                                         self.settle(done.poll());
                                     }));
    }
}

impl<T> Clone for Promise<T>
    where T: Send + 'static
{
    fn clone(&self) -> Promise<T> {
        Promise::from_core(self.core.clone())
    }
}

impl<T> Drop for Promise<T>
    where T: Send + 'static
{
    fn drop(&mut self) {
        if self.core.release_producer() && self.core.settle(Outcome::Error(BROKEN.to_owned())) {
            debug!("{}", BROKEN);
        }
    }
}

impl<T> Default for Promise<T>
    where T: Send + 'static
{
    fn default() -> Promise<T> {
        Promise::new()
    }
}

impl<T> fmt::Debug for Promise<T>
    where T: Send + 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.core.with_outcome(|o| write!(f, "Promise({})", o.kind()))
    }
}
