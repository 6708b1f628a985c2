// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime options

use std::default::Default;

use crate::dispatch::DispatchPolicy;

/// Default worker stack size, 2MB
pub const DEFAULT_STACK: usize = 2 * 1024 * 1024; // 2MB

/// Default prefix of worker thread names
pub const DEFAULT_NAME: &str = "objcall-worker";

/// Options of the default executor installed by `initialize_with`
#[derive(Debug, Clone)]
pub struct Options {
    pub workers: usize,
    pub stack_size: usize,
    pub name: Option<String>,
    pub policy: DispatchPolicy,
}

impl Options {
    pub fn new() -> Options {
        Options {
            workers: num_cpus::get(),
            stack_size: DEFAULT_STACK,
            name: Some(DEFAULT_NAME.to_owned()),
            policy: DispatchPolicy::Auto,
        }
    }

    /// Set the number of worker threads, at least one is always started
    pub fn workers(&mut self, workers: usize) -> &mut Options {
        self.workers = workers;
        self
    }

    pub fn stack_size(&mut self, size: usize) -> &mut Options {
        self.stack_size = size;
        self
    }

    /// Name prefix of the worker threads, `None` leaves them unnamed
    pub fn name(&mut self, name: Option<String>) -> &mut Options {
        self.name = name;
        self
    }

    /// Dispatch policy of futures which were not given one explicitly
    pub fn policy(&mut self, policy: DispatchPolicy) -> &mut Options {
        self.policy = policy;
        self
    }
}

impl Default for Options {
    fn default() -> Options {
        Options::new()
    }
}
