// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Asynchronous results for remote method calls, properties and signals
//!
//! Every remote operation hands back a `Future`, settled later by whichever
//! thread completes the operation through the matching `Promise`. A future
//! ends up holding a value, an error message, or a cancellation, and can be
//! waited on, polled, cancelled, or continued with `then`, `and_then`,
//! `then_consume` and `on_outcome`.
//!
//! ```
//! use std::thread;
//!
//! objcall::initialize().unwrap();
//!
//! let (promise, future) = objcall::make::<u32>();
//! let doubled = future.then(|v| v * 2);
//!
//! thread::spawn(move || promise.resolve(21));
//! assert_eq!(doubled.get(), Ok(42));
//! ```
//!
//! Continuations run according to a `DispatchPolicy`; deferred ones go to the
//! executor installed by `initialize` or `set_executor`.

#[macro_use]
extern crate log;
extern crate crossbeam_channel;
extern crate num_cpus;

pub use crate::dispatch::{DispatchPolicy, Executor, Task};
pub use crate::error::{Error, Result};
pub use crate::future::{from_error, make, of, Future, Handlers, Outcome, Promise};
pub use crate::init::{initialize, initialize_with, is_initialized, set_executor, shutdown};
pub use crate::options::Options;
pub use crate::remote::{MethodTable, ServiceRegistry, Signal};
pub use crate::runtime::ThreadPool;

pub mod dispatch;
pub mod error;
pub mod future;
pub mod options;
pub mod remote;
pub mod runtime;
mod init;
