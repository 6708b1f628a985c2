// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::super::Future;

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    /// Continue with another asynchronous step
    ///
    /// `f` is called with this future once it settled, whatever the outcome,
    /// so it can branch on `poll()` itself. The future it returns becomes
    /// the outcome of the returned future.
    pub fn and_then<R, F>(&self, f: F) -> Future<R>
        where R: Clone + Send + 'static,
              F: FnOnce(Future<T>) -> Future<R> + Send + 'static
    {
        self.add_continuation(self.policy(), f)
    }
}

#[cfg(test)]
mod test {
    use std::thread;
    use std::time::Duration;

    use crate::dispatch::DispatchPolicy;
    use crate::error::Error;
    use crate::future::{make, Future, Outcome};

    #[test]
    fn test_and_then_sees_every_outcome() {
        let describe = |up: Future<i32>| {
            Future::of(match up.poll() {
                Outcome::Value(v) => format!("value {}", v),
                Outcome::Error(msg) => format!("error {}", msg),
                Outcome::Cancelled => "cancelled".to_owned(),
                Outcome::Pending => "pending".to_owned(),
            })
        };

        assert_eq!(Future::of(1).and_then(describe).get(), Ok("value 1".to_owned()));
        assert_eq!(Future::from_error("e").and_then(describe).get(), Ok("error e".to_owned()));
        assert_eq!(Future::cancelled().and_then(describe).get(), Ok("cancelled".to_owned()));
    }

    #[test]
    fn test_and_then_follows_returned_future() {
        let (p, f) = make::<u32>();
        let (inner_p, inner_f) = make::<String>();

        let g = f.and_then(move |_| inner_f);
        p.resolve(1);
        assert!(g.poll().is_pending());

        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            inner_p.resolve("inner".to_owned());
        });

        assert_eq!(g.get(), Ok("inner".to_owned()));
        t.join().unwrap();
    }

    #[test]
    fn test_and_then_routes_cancel_to_returned_future() {
        let (p, f) = make::<u32>();
        let (inner_p, inner_f) = make::<u32>();
        inner_p.set_cancel_handler(|p| {
            p.cancel();
        });

        let g = f.with_policy(DispatchPolicy::Inline).and_then(move |_| inner_f);
        p.resolve(1);

        // The step ran on resolve, cancelling reaches the inner operation
        assert!(g.request_cancel());
        assert_eq!(g.get(), Err(Error::Cancelled));
        assert!(inner_p.future().is_cancelled());
    }

    #[test]
    fn test_and_then_panic_fails_downstream() {
        let g: Future<u8> = Future::of(1u8).and_then(|_| panic!("no step"));
        assert_eq!(g.get(), Err(Error::operation("handler panicked: no step")));
    }
}
