// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors surfaced by `Future::get`

use std::any::Any;
use std::error;
use std::fmt;
use std::result;

/// The ways an asynchronous result can fail to produce a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The operation itself failed, or one of the continuations feeding
    /// this future panicked or returned an error
    Operation(String),
    /// The operation was cancelled before it produced a value
    Cancelled,
    /// A bounded wait elapsed. The future is left untouched and may
    /// still be waited on again.
    Timeout,
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn operation<S: Into<String>>(msg: S) -> Error {
        Error::Operation(msg.into())
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        *self == Error::Cancelled
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        *self == Error::Timeout
    }

    /// The failure message, if this is an operation error
    pub fn message(&self) -> Option<&str> {
        match *self {
            Error::Operation(ref msg) => Some(msg),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Operation(ref msg) => write!(f, "operation failed: {}", msg),
            Error::Cancelled => write!(f, "operation cancelled"),
            Error::Timeout => write!(f, "timed out waiting for the operation"),
        }
    }
}

impl error::Error for Error {}

/// Turns a caught panic payload into the message carried by an error outcome
pub(crate) fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return format!("handler panicked: {}", s);
    }

    match payload.downcast::<String>() {
        Ok(s) => format!("handler panicked: {}", s),
        Err(_) => "handler panicked".to_owned(),
    }
}
