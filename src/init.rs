// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Process-wide initialization
//!
//! The embedding application calls `initialize` (or `initialize_with`) once
//! at startup. It installs the executor used for deferred continuations and
//! the default dispatch policy of new futures. Nothing here runs implicitly
//! on first use.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use crate::dispatch::{DispatchPolicy, Executor};
use crate::options::Options;
use crate::runtime::ThreadPool;

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static POLICY: AtomicU8 = AtomicU8::new(POLICY_AUTO);
static EXECUTOR: RwLock<Option<Arc<dyn Executor>>> = RwLock::new(None);

const POLICY_INLINE: u8 = 0;
const POLICY_DEFERRED: u8 = 1;
const POLICY_AUTO: u8 = 2;

/// Initialize with `Options::default()`
///
/// Returns `Ok(true)` if this call did the initialization, `Ok(false)` if the
/// process was already initialized.
pub fn initialize() -> io::Result<bool> {
    initialize_with(Options::default())
}

/// Initialize with the given options, idempotent
pub fn initialize_with(opts: Options) -> io::Result<bool> {
    let mut guard = EXECUTOR.write().unwrap_or_else(|e| e.into_inner());

    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(false);
    }

    let pool = ThreadPool::new(&opts)?;
    *guard = Some(Arc::new(pool));
    set_default_policy(opts.policy);
    INITIALIZED.store(true, Ordering::Release);

    debug!("objcall initialized with {:?}", opts);
    Ok(true)
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Replace the executor used for deferred continuations
///
/// Marks the process as initialized; a later `initialize` is a no-op.
pub fn set_executor(executor: Arc<dyn Executor>) {
    let mut guard = EXECUTOR.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(executor);
    INITIALIZED.store(true, Ordering::Release);
}

/// Uninstall the executor and reset to the uninitialized state
///
/// A bundled thread pool finishes its queued continuations and joins its
/// workers once the last in-flight dispatch lets go of it. Continuations
/// deferred after this call run inline until the process is initialized
/// again.
pub fn shutdown() {
    let executor = {
        let mut guard = EXECUTOR.write().unwrap_or_else(|e| e.into_inner());
        INITIALIZED.store(false, Ordering::Release);
        guard.take()
    };

    set_default_policy(DispatchPolicy::Auto);
    drop(executor);
    debug!("objcall shut down");
}

pub(crate) fn executor() -> Option<Arc<dyn Executor>> {
    EXECUTOR.read().unwrap_or_else(|e| e.into_inner()).clone()
}

pub(crate) fn default_policy() -> DispatchPolicy {
    match POLICY.load(Ordering::Relaxed) {
        POLICY_INLINE => DispatchPolicy::Inline,
        POLICY_DEFERRED => DispatchPolicy::Deferred,
        _ => DispatchPolicy::Auto,
    }
}

fn set_default_policy(policy: DispatchPolicy) {
    let raw = match policy {
        DispatchPolicy::Inline => POLICY_INLINE,
        DispatchPolicy::Deferred => POLICY_DEFERRED,
        DispatchPolicy::Auto => POLICY_AUTO,
    };
    POLICY.store(raw, Ordering::Relaxed);
}
