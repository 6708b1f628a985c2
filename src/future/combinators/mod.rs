// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Every combinator is built on `Future::continue_with`: it registers one
// continuation on the upstream core and owns the promise of a fresh
// downstream future. Upstream errors and cancellations are forwarded by
// `forward` unless the combinator handles them itself.

mod and_then;
mod consume;
mod handlers;
mod then;

pub use self::handlers::Handlers;

use super::{Outcome, Promise};

/// Settle `promise` with a non-value `outcome`
fn forward<T, R>(outcome: Outcome<T>, promise: &Promise<R>)
    where R: Send + 'static
{
    match outcome {
        Outcome::Error(msg) => {
            promise.reject(msg);
        }
        Outcome::Cancelled => {
            promise.cancel();
        }
        Outcome::Pending => {
            promise.reject("continuation invoked on a pending future");
        }
        Outcome::Value(..) => {
            promise.reject("value outcome forwarded unhandled");
        }
    }
}
