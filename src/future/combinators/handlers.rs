// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::{Error, Result};

use super::super::{Future, Outcome};

type OnValue<T, R> = Box<dyn FnOnce(T) -> Result<R> + Send + 'static>;
type OnError<R> = Box<dyn FnOnce(String) -> Result<R> + Send + 'static>;
type OnCancel<R> = Box<dyn FnOnce() -> Result<R> + Send + 'static>;

/// Separate handlers for the three ways a future can settle
///
/// Exactly one of them runs and its return value settles the downstream
/// future: `Ok` resolves it, `Err(Error::Cancelled)` cancels it, any other
/// error fails it. Without `on_error` the error is passed on; without
/// `on_cancel` the cancellation is.
///
/// ```
/// use objcall::{Future, Handlers};
///
/// let f = Future::<u32>::from_error("unreachable")
///     .on_outcome(Handlers::on_value(|v| Ok(v * 2))
///                     .on_error(|_| Ok(0)));
/// assert_eq!(f.get(), Ok(0));
/// ```
pub struct Handlers<T, R> {
    value: OnValue<T, R>,
    error: OnError<R>,
    cancel: OnCancel<R>,
}

impl<T, R> Handlers<T, R>
    where T: Send + 'static,
          R: Send + 'static
{
    pub fn on_value<F>(f: F) -> Handlers<T, R>
        where F: FnOnce(T) -> Result<R> + Send + 'static
    {
        Handlers {
            value: Box::new(f),
            error: Box::new(|msg| Err(Error::Operation(msg))),
            cancel: Box::new(|| Err(Error::Cancelled)),
        }
    }

    pub fn on_error<F>(mut self, f: F) -> Handlers<T, R>
        where F: FnOnce(String) -> Result<R> + Send + 'static
    {
        self.error = Box::new(f);
        self
    }

    pub fn on_cancel<F>(mut self, f: F) -> Handlers<T, R>
        where F: FnOnce() -> Result<R> + Send + 'static
    {
        self.cancel = Box::new(f);
        self
    }

    fn invoke(self, outcome: Outcome<T>) -> Result<R> {
        match outcome {
            Outcome::Value(val) => (self.value)(val),
            Outcome::Error(msg) => (self.error)(msg),
            Outcome::Cancelled => (self.cancel)(),
            Outcome::Pending => Err(Error::operation("handlers invoked on a pending future")),
        }
    }
}

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    /// Settle the returned future through whichever of `handlers` matches
    /// the outcome of this one
    pub fn on_outcome<R>(&self, handlers: Handlers<T, R>) -> Future<R>
        where R: Clone + Send + 'static
    {
        self.and_then(move |upstream| {
            let result = handlers.invoke(upstream.poll());
            let future = Future::from_result(result);
            future.with_policy(upstream.policy())
        })
    }
}
