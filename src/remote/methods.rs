// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Name to handler tables for method calls

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::panic_message;
use crate::future::{Future, Promise};

type Handler<A, R> = Box<dyn Fn(A, Promise<R>) + Send + Sync + 'static>;

/// Methods callable by name with arguments `A`, replying with `R`
///
/// A handler receives the arguments and the promise of the reply. It may
/// settle the promise before returning or hand it to another thread, and it
/// may register a cancellation handler on it.
pub struct MethodTable<A, R>
    where R: Send + 'static
{
    handlers: HashMap<String, Handler<A, R>>,
}

impl<A, R> MethodTable<A, R>
    where A: 'static,
          R: Clone + Send + 'static
{
    pub fn new() -> MethodTable<A, R> {
        MethodTable { handlers: HashMap::new() }
    }

    /// Register an asynchronous method, replacing one of the same name
    pub fn register<S, F>(&mut self, name: S, handler: F) -> &mut MethodTable<A, R>
        where S: Into<String>,
              F: Fn(A, Promise<R>) + Send + Sync + 'static
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            warn!("method {} registered twice", name);
        }
        self
    }

    /// Register a method that replies before returning
    pub fn register_fn<S, F>(&mut self, name: S, handler: F) -> &mut MethodTable<A, R>
        where S: Into<String>,
              F: Fn(A) -> Result<R, String> + Send + Sync + 'static
    {
        self.register(name, move |args, reply: Promise<R>| {
            match handler(args) {
                Ok(val) => reply.resolve(val),
                Err(msg) => reply.reject(msg),
            };
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Call `name` with `args`
    ///
    /// Unknown methods and panicking handlers fail the returned future.
    pub fn invoke(&self, name: &str, args: A) -> Future<R> {
        let handler = match self.handlers.get(name) {
            Some(handler) => handler,
            None => {
                debug!("call to unknown method {}", name);
                return Future::from_error(format!("no such method: {}", name));
            }
        };

        trace!("invoking method {}", name);

        let reply = Promise::new();
        let future = reply.future();
        let guard = reply.clone();

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(args, reply))) {
            guard.reject(panic_message(payload));
        }

        future
    }
}

impl<A, R> Default for MethodTable<A, R>
    where A: 'static,
          R: Clone + Send + 'static
{
    fn default() -> MethodTable<A, R> {
        MethodTable::new()
    }
}

impl<A, R> fmt::Debug for MethodTable<A, R>
    where R: Send + 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names = self.handlers.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}
