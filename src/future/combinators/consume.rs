// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::super::{Future, Outcome};
use super::forward;

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    /// Run a side effect with the value
    ///
    /// The returned future completes with `()` after `f` returned, fails if
    /// `f` panicked, and otherwise mirrors an error or cancellation of this
    /// future without calling `f`.
    pub fn then_consume<F>(&self, f: F) -> Future<()>
        where F: FnOnce(T) + Send + 'static
    {
        self.continue_with(self.policy(), move |upstream, promise| {
            match upstream.poll() {
                Outcome::Value(val) => {
                    f(val);
                    promise.resolve(());
                }
                outcome => forward(outcome, &promise),
            }
        })
    }
}
