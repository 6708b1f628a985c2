// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Promise/future pairs
//!
//! A `Promise` is the writable end of an asynchronous result and a `Future`
//! the readable one. Both are handles on a shared core holding an `Outcome`,
//! which moves out of `Pending` exactly once. Futures are cheap to clone and
//! every clone observes the same outcome.

mod combinators;
mod cell;
mod future;
mod promise;

pub use self::combinators::Handlers;
pub use self::future::Future;
pub use self::promise::Promise;

use std::fmt;

use crate::error::{Error, Result};

/// The state of an asynchronous result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Pending,
    Value(T),
    Error(String),
    Cancelled,
}

impl<T> Outcome<T> {
    #[inline]
    pub fn is_pending(&self) -> bool {
        match *self {
            Outcome::Pending => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        !self.is_pending()
    }

    #[inline]
    pub fn is_value(&self) -> bool {
        match *self {
            Outcome::Value(..) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        match *self {
            Outcome::Error(..) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        match *self {
            Outcome::Cancelled => true,
            _ => false,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `None` while pending
    pub fn into_result(self) -> Option<Result<T>> {
        match self {
            Outcome::Pending => None,
            Outcome::Value(v) => Some(Ok(v)),
            Outcome::Error(msg) => Some(Err(Error::Operation(msg))),
            Outcome::Cancelled => Some(Err(Error::Cancelled)),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
        where F: FnOnce(T) -> U
    {
        match self {
            Outcome::Pending => Outcome::Pending,
            Outcome::Value(v) => Outcome::Value(f(v)),
            Outcome::Error(msg) => Outcome::Error(msg),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match *self {
            Outcome::Pending => "pending",
            Outcome::Value(..) => "value",
            Outcome::Error(..) => "error",
            Outcome::Cancelled => "cancelled",
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Outcome<T> {
        match result {
            Ok(v) => Outcome::Value(v),
            Err(Error::Operation(msg)) => Outcome::Error(msg),
            Err(Error::Cancelled) => Outcome::Cancelled,
            Err(err @ Error::Timeout) => Outcome::Error(err.to_string()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Outcome::Pending => write!(f, "pending"),
            Outcome::Value(ref v) => write!(f, "value({})", v),
            Outcome::Error(ref msg) => write!(f, "error({})", msg),
            Outcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Create a connected promise and future
pub fn make<T>() -> (Promise<T>, Future<T>)
    where T: Clone + Send + 'static
{
    let promise = Promise::new();
    let future = promise.future();
    (promise, future)
}

/// A future already holding `val`
pub fn of<T>(val: T) -> Future<T>
    where T: Clone + Send + 'static
{
    Future::of(val)
}

/// A future already failed with `msg`
pub fn from_error<T, S>(msg: S) -> Future<T>
    where T: Clone + Send + 'static,
          S: Into<String>
{
    Future::from_error(msg)
}
