// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Continuation dispatch
//!
//! When a future settles, each continuation registered on it is handed to
//! `dispatch` together with the `DispatchPolicy` it was registered with.
//! `Inline` runs it right away on the settling thread, `Deferred` passes it to
//! the installed `Executor`. `Auto` runs inline unless the settling thread is
//! already executing a continuation, in which case it defers. A chain of
//! continuations therefore never nests more than one dispatch frame deep on
//! any stack, and a continuation settling a future never re-enters itself.
//!
//! Without an installed executor, deferred work is queued on the current
//! thread and run by the outermost dispatch frame once its task returned.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::panic_message;
use crate::init;

/// A unit of work handed to an `Executor`
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Where a continuation runs relative to the settlement of its future
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// On the thread that settles the future
    Inline,
    /// On the installed executor
    Deferred,
    /// Inline at the outermost frame, deferred inside another continuation
    Auto,
}

impl Default for DispatchPolicy {
    fn default() -> DispatchPolicy {
        DispatchPolicy::Auto
    }
}

impl DispatchPolicy {
    /// Resolve `Auto` against the current thread
    pub fn effective(self) -> DispatchPolicy {
        match self {
            DispatchPolicy::Auto if in_dispatch() => DispatchPolicy::Deferred,
            DispatchPolicy::Auto => DispatchPolicy::Inline,
            policy => policy,
        }
    }
}

/// An execution context for deferred continuations
pub trait Executor: Send + Sync {
    fn schedule(&self, task: Task);
}

impl<F> Executor for F
    where F: Fn(Task) + Send + Sync
{
    fn schedule(&self, task: Task) {
        self(task)
    }
}

thread_local!(static DEPTH: Cell<usize> = Cell::new(0));
thread_local!(static LOCAL_QUEUE: RefCell<VecDeque<Task>> = RefCell::new(VecDeque::new()));

static WARNED_NO_EXECUTOR: AtomicBool = AtomicBool::new(false);

/// Whether the current thread is executing a continuation
pub fn in_dispatch() -> bool {
    DEPTH.with(|d| d.get() > 0)
}

struct Frame;

impl Frame {
    fn enter() -> Frame {
        DEPTH.with(|d| d.set(d.get() + 1));
        Frame
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Run `task` inside a dispatch frame. A panic escaping it is logged and
/// swallowed; it never unwinds into the settling thread.
///
/// The outermost frame on a thread also runs whatever `run_local` queued
/// while it executed, one task after the other.
pub fn run(task: Task) {
    let outermost = !in_dispatch();

    invoke(task);

    if outermost {
        while let Some(task) = LOCAL_QUEUE.with(|q| q.borrow_mut().pop_front()) {
            invoke(task);
        }
    }
}

fn invoke(task: Task) {
    let _frame = Frame::enter();

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
        error!("continuation escaped its handler: {}", panic_message(payload));
    }
}

/// Run `task` on the current thread without nesting it into a running
/// continuation: inside a dispatch frame it is queued for the outermost
/// frame, otherwise it runs right away.
pub fn run_local(task: Task) {
    if in_dispatch() {
        LOCAL_QUEUE.with(|q| q.borrow_mut().push_back(task));
    } else {
        run(task);
    }
}

/// Run `task` according to `policy`
pub fn dispatch(policy: DispatchPolicy, task: Task) {
    match policy.effective() {
        DispatchPolicy::Deferred => {
            match init::executor() {
                Some(executor) => {
                    trace!("deferring continuation");
                    executor.schedule(Box::new(move || run(task)));
                }
                None => {
                    if !WARNED_NO_EXECUTOR.swap(true, Ordering::Relaxed) {
                        warn!("no executor installed, deferred continuations run on the settling thread");
                    }
                    run_local(task);
                }
            }
        }
        _ => {
            trace!("running continuation inline");
            run(task);
        }
    }
}
