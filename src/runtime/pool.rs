// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A fixed set of worker threads executing deferred continuations

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread::{self, Builder, JoinHandle};

use crossbeam_channel::{self, Receiver, Sender};

use crate::dispatch::{self, Executor, Task};
use crate::error::panic_message;
use crate::options::Options;

/// Worker threads fed from a shared queue
///
/// Tasks are executed in the order they were scheduled by whichever worker
/// is free first. Dropping the pool (or calling `shutdown`) closes the queue,
/// lets the workers drain what is already queued, and joins them.
pub struct ThreadPool {
    sender: Mutex<Option<Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Spawn the workers described by `opts`
    pub fn new(opts: &Options) -> io::Result<ThreadPool> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let count = if opts.workers == 0 { 1 } else { opts.workers };

        let mut workers = Vec::with_capacity(count);
        for id in 0..count {
            let mut builder = Builder::new().stack_size(opts.stack_size);
            if let Some(ref name) = opts.name {
                builder = builder.name(format!("{}-{}", name, id));
            }

            let rx = rx.clone();
            workers.push(builder.spawn(move || worker_loop(id, rx))?);
        }

        debug!("thread pool started with {} workers", count);

        Ok(ThreadPool {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
        })
    }

    /// Number of workers still attached to the pool
    pub fn workers(&self) -> usize {
        self.workers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Stop accepting tasks, finish the queued ones and join the workers.
    ///
    /// Calling this from one of the pool's own workers only closes the queue;
    /// that worker is not joined.
    pub fn shutdown(&self) {
        drop(self.sender.lock().unwrap_or_else(|e| e.into_inner()).take());

        let workers = {
            let mut guard = self.workers.lock().unwrap_or_else(|e| e.into_inner());
            guard.drain(..).collect::<Vec<_>>()
        };

        if workers.is_empty() {
            return;
        }

        let me = thread::current().id();
        for worker in workers {
            if worker.thread().id() == me {
                continue;
            }

            if worker.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }

        debug!("thread pool stopped");
    }
}

impl Executor for ThreadPool {
    fn schedule(&self, task: Task) {
        let rejected = {
            let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
            match *guard {
                Some(ref tx) => tx.send(task).err().map(|e| e.into_inner()),
                None => Some(task),
            }
        };

        // The pool is shutting down, nobody else would ever run it
        if let Some(task) = rejected {
            warn!("task scheduled on a stopped thread pool, running it on the caller");
            dispatch::run_local(task);
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, rx: Receiver<Task>) {
    trace!("worker {} started", id);

    for task in rx.iter() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            error!("worker {}: task panicked: {}", id, panic_message(payload));
        }
    }

    trace!("worker {} exiting", id);
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};

    fn pool(workers: usize) -> ThreadPool {
        let mut opts = Options::new();
        opts.workers(workers).stack_size(256 * 1024);
        ThreadPool::new(&opts).unwrap()
    }

    #[test]
    fn test_pool_basic() {
        let pool = pool(4);
        assert_eq!(pool.workers(), 4);

        let (tx, rx) = mpsc::channel();
        for i in 0..10 {
            let tx = tx.clone();
            pool.schedule(Box::new(move || tx.send(i).unwrap()));
        }

        let mut got = rx.iter().take(10).collect::<Vec<_>>();
        got.sort();
        assert_eq!(got, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_pool_drains_on_shutdown() {
        let counter = Arc::new(AtomicUsize::new(0));

        let pool = pool(1);
        for _ in 0..100 {
            let counter = counter.clone();
            pool.schedule(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(pool.workers(), 0);
    }

    #[test]
    fn test_pool_survives_panicking_task() {
        let pool = pool(1);
        pool.schedule(Box::new(|| panic!("task failure")));

        let (tx, rx) = mpsc::channel();
        pool.schedule(Box::new(move || tx.send(7).unwrap()));
        assert_eq!(rx.recv().unwrap(), 7);
    }

    #[test]
    fn test_schedule_after_shutdown_runs_on_caller() {
        let pool = pool(2);
        pool.shutdown();

        let (tx, rx) = mpsc::channel();
        pool.schedule(Box::new(move || tx.send(thread::current().id()).unwrap()));
        assert_eq!(rx.try_recv().unwrap(), thread::current().id());
    }

    #[test]
    fn test_schedule_after_shutdown_waits_for_running_continuation() {
        let pool = Arc::new(pool(1));
        pool.shutdown();

        let (tx, rx) = mpsc::channel();
        let inner = pool.clone();
        dispatch::run(Box::new(move || {
            let late = tx.clone();
            inner.schedule(Box::new(move || late.send("scheduled").unwrap()));
            tx.send("body").unwrap();
        }));

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["body", "scheduled"]);
    }

    #[test]
    fn test_zero_workers_starts_one() {
        let pool = pool(0);
        assert_eq!(pool.workers(), 1);
    }
}
