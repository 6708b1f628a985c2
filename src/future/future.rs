// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::DispatchPolicy;
use crate::error::{panic_message, Error, Result};
use crate::init;

use super::cell::Core;
use super::{Outcome, Promise};

/// The readable end of an asynchronous result
///
/// Cloning a `Future` yields another handle on the same result. Each handle
/// carries the `DispatchPolicy` used for continuations registered through
/// it; futures derived by a continuation inherit it.
pub struct Future<T>
    where T: Send + 'static
{
    core: Arc<Core<T>>,
    policy: DispatchPolicy,
}

impl<T> Future<T>
    where T: Send + 'static
{
    pub(crate) fn from_core(core: Arc<Core<T>>, policy: DispatchPolicy) -> Future<T> {
        Future {
            core: core,
            policy: policy,
        }
    }

    #[inline]
    pub(crate) fn core(&self) -> &Arc<Core<T>> {
        &self.core
    }

    /// Whether both handles observe the same result
    #[inline]
    pub fn ptr_eq(&self, other: &Future<T>) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    #[inline]
    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// This handle with a different dispatch policy for its continuations
    pub fn with_policy(mut self, policy: DispatchPolicy) -> Future<T> {
        self.policy = policy;
        self
    }
}

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    fn settled(outcome: Outcome<T>) -> Future<T> {
        let policy = init::default_policy();
        Future::from_core(Core::new(outcome, policy), policy)
    }

    pub fn of(val: T) -> Future<T> {
        Future::settled(Outcome::Value(val))
    }

    pub fn from_error<S: Into<String>>(msg: S) -> Future<T> {
        Future::settled(Outcome::Error(msg.into()))
    }

    pub fn cancelled() -> Future<T> {
        Future::settled(Outcome::Cancelled)
    }

    pub fn from_result(result: Result<T>) -> Future<T> {
        Future::settled(Outcome::from(result))
    }

    /// A snapshot of the current outcome, never blocks
    pub fn poll(&self) -> Outcome<T> {
        self.core.with_outcome(|o| o.clone())
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        !self.core.is_pending()
    }

    /// True only for a cancelled outcome, never for an error
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.core.with_outcome(|o| o.is_cancelled())
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.core.with_outcome(|o| o.is_error())
    }

    /// Block until settled
    pub fn wait(&self) {
        self.core.wait()
    }

    /// Block until settled or `timeout` elapses. Returns whether it settled;
    /// a timeout leaves the future untouched.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.core.wait_timeout(timeout)
    }

    /// Block until settled and unwrap the outcome
    pub fn get(&self) -> Result<T> {
        self.wait();
        self.result()
    }

    /// Like `get`, failing with `Error::Timeout` if `timeout` elapses first
    pub fn get_timeout(&self, timeout: Duration) -> Result<T> {
        if !self.wait_timeout(timeout) {
            return Err(Error::Timeout);
        }
        self.result()
    }

    fn result(&self) -> Result<T> {
        match self.poll().into_result() {
            Some(result) => result,
            None => Err(Error::Timeout),
        }
    }

    /// Ask the operation behind this future to cancel
    ///
    /// Returns whether a cancellation handler was invoked. Without one the
    /// operation cannot be cancelled and nothing happens. The future is not
    /// settled here; the handler settles it, now or later.
    pub fn request_cancel(&self) -> bool {
        self.core.request_cancel()
    }

    /// Register `handler` to run with this future once it settles
    ///
    /// The future returned by `handler` becomes the outcome of the returned
    /// future. A panic in `handler` fails it instead. Cancellation requested
    /// on the returned future is routed to this one until `handler` ran, and
    /// to the future `handler` returned afterwards.
    pub fn add_continuation<R, F>(&self, policy: DispatchPolicy, handler: F) -> Future<R>
        where R: Clone + Send + 'static,
              F: FnOnce(Future<T>) -> Future<R> + Send + 'static
    {
        self.continue_with(policy, move |upstream, promise| {
            let next = handler(upstream);
            promise.follow(&next);
        })
    }

    /// The primitive beneath every combinator: run `handler` with the settled
    /// future and the promise of the returned one
    ///
    /// If `handler` panics the returned future fails with the panic message.
    /// If it drops the promise unresolved the returned future fails too.
    pub fn continue_with<R, F>(&self, policy: DispatchPolicy, handler: F) -> Future<R>
        where R: Clone + Send + 'static,
              F: FnOnce(Future<T>, Promise<R>) + Send + 'static
    {
        let promise = Promise::with_policy(policy);
        promise.route_cancel_to(self);
        let downstream = promise.future();

        self.core.add_continuation(policy,
                                   Box::new(move |upstream: Future<T>| {
                                       let guard = promise.clone();
                                       let invoke = move || handler(upstream, promise);

                                       if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(invoke)) {
                                           let msg = panic_message(payload);
                                           debug!("continuation failed: {}", msg);
                                           guard.reject(msg);
                                       }
                                   }));

        downstream
    }
}

impl<T> Clone for Future<T>
    where T: Send + 'static
{
    fn clone(&self) -> Future<T> {
        Future {
            core: self.core.clone(),
            policy: self.policy,
        }
    }
}

impl<T> fmt::Debug for Future<T>
    where T: Send + 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.core.with_outcome(|o| write!(f, "Future({}, {:?})", o.kind(), self.policy))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::mpsc;
    use std::thread;

    use crate::make;

    #[test]
    fn test_immediate_values() {
        assert_eq!(Future::of(42).get(), Ok(42));
        assert_eq!(Future::<i32>::from_error("x").get(), Err(Error::operation("x")));
        assert_eq!(Future::<i32>::cancelled().get(), Err(Error::Cancelled));
        assert!(Future::<i32>::cancelled().is_cancelled());
        assert!(!Future::<i32>::from_error("x").is_cancelled());
    }

    #[test]
    fn test_wait_across_threads() {
        let (p, f) = make();

        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            p.resolve("done".to_owned());
        });

        assert_eq!(f.get(), Ok("done".to_owned()));
        assert!(f.is_done());
        t.join().unwrap();
    }

    #[test]
    fn test_timeout_does_not_poison() {
        let (p, f) = make::<u32>();

        assert_eq!(f.get_timeout(Duration::from_millis(10)), Err(Error::Timeout));
        assert!(!f.wait_timeout(Duration::from_millis(1)));
        assert!(f.poll().is_pending());

        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            p.resolve(5);
        });

        assert_eq!(f.get(), Ok(5));
        assert_eq!(f.get_timeout(Duration::from_millis(0)), Ok(5));
        t.join().unwrap();
    }

    #[test]
    fn test_cancel_without_handler() {
        let (_p, f) = make::<u32>();
        assert!(!f.request_cancel());
        assert!(f.poll().is_pending());
    }

    #[test]
    fn test_cancel_after_settlement_is_noop() {
        let (p, f) = make::<u32>();
        let (tx, rx) = mpsc::channel();
        p.set_cancel_handler(move |_| tx.send(()).unwrap());
        p.resolve(1);

        assert!(!f.request_cancel());
        assert!(rx.try_recv().is_err());
        assert_eq!(f.get(), Ok(1));
    }

    #[test]
    fn test_cancel_handler_invoked_once() {
        let (p, f) = make::<u32>();
        let (tx, rx) = mpsc::channel();
        p.set_cancel_handler(move |_| tx.send(()).unwrap());

        assert!(f.request_cancel());
        assert!(!f.request_cancel());
        assert_eq!(rx.try_iter().count(), 1);

        // The handler chose not to settle
        assert!(f.poll().is_pending());
    }

    #[test]
    fn test_continuation_on_settled_future_runs_now() {
        let f = Future::of(2).with_policy(DispatchPolicy::Inline);
        let g = f.add_continuation(DispatchPolicy::Inline, |up| Future::of(up.get().unwrap() + 1));
        assert_eq!(g.poll(), Outcome::Value(3));
    }

    #[test]
    fn test_continuation_panic_fails_downstream() {
        let (p, f) = make::<u32>();
        let g: Future<u32> = f.add_continuation(DispatchPolicy::Inline, |_| panic!("boom"));
        p.resolve(1);

        assert_eq!(g.get(), Err(Error::operation("handler panicked: boom")));
        assert_eq!(f.get(), Ok(1));
    }

    #[test]
    fn test_continuation_dropping_promise_fails_downstream() {
        let f = Future::of(1u8);
        let g: Future<u8> = f.continue_with(DispatchPolicy::Inline, |_, promise| drop(promise));
        assert!(g.is_error());
    }
}
