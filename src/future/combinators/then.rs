// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::convert::Infallible;
use std::fmt::Display;

use super::super::{Future, Outcome};
use super::forward;

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    /// Transform the value once it arrives
    ///
    /// Errors and cancellation of this future pass through to the returned
    /// one without calling `f`. A panic in `f` fails the returned future.
    pub fn then<R, F>(&self, f: F) -> Future<R>
        where R: Clone + Send + 'static,
              F: FnOnce(T) -> R + Send + 'static
    {
        self.try_then(move |val| Ok::<R, Infallible>(f(val)))
    }

    /// Like `then`, but `f` may fail; its error's message fails the
    /// returned future
    pub fn try_then<R, E, F>(&self, f: F) -> Future<R>
        where R: Clone + Send + 'static,
              E: Display,
              F: FnOnce(T) -> Result<R, E> + Send + 'static
    {
        self.continue_with(self.policy(), move |upstream, promise| {
            match upstream.poll() {
                Outcome::Value(val) => {
                    match f(val) {
                        Ok(r) => promise.resolve(r),
                        Err(err) => promise.reject(err.to_string()),
                    };
                }
                outcome => forward(outcome, &promise),
            }
        })
    }
}
