extern crate env_logger;
extern crate objcall;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use objcall::{DispatchPolicy, Executor, Options, Promise, Task};

// Process-wide state; kept in a single test so nothing runs concurrently.
#[test]
fn test_initialize_and_shutdown() {
    let _ = env_logger::try_init();

    assert!(!objcall::is_initialized());

    let mut opts = Options::new();
    opts.workers(2).name(Some("lifecycle".to_owned())).policy(DispatchPolicy::Deferred);
    assert!(objcall::initialize_with(opts).unwrap());
    assert!(!objcall::initialize().unwrap());
    assert!(objcall::is_initialized());

    // New futures pick up the configured policy and run on the pool
    let promise = Promise::<u8>::new();
    let future = promise.future();
    assert_eq!(future.policy(), DispatchPolicy::Deferred);

    let worker = future.then(|_| thread::current().name().map(|s| s.to_owned()));
    promise.resolve(1);
    let name = worker.get().unwrap().unwrap();
    assert!(name.starts_with("lifecycle-"), "ran on {}", name);

    objcall::shutdown();
    assert!(!objcall::is_initialized());

    // Without an executor deferred work falls back to the resolving thread
    let promise = Promise::<u8>::with_policy(DispatchPolicy::Deferred);
    let ran_on = promise.future().then(|_| thread::current().id());
    promise.resolve(1);
    assert_eq!(ran_on.get(), Ok(thread::current().id()));

    // An injected executor receives every deferred continuation
    let scheduled = Arc::new(AtomicUsize::new(0));
    let counter = scheduled.clone();
    let executor: Arc<dyn Executor> = Arc::new(move |task: Task| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::spawn(task);
    });
    objcall::set_executor(executor);
    assert!(objcall::is_initialized());
    assert!(!objcall::initialize().unwrap());

    let promise = Promise::<u8>::with_policy(DispatchPolicy::Deferred);
    let future = promise.future();
    let a = future.then(|v| v + 1);
    let b = future.then(|v| v + 2);
    promise.resolve(1);

    assert_eq!(a.get(), Ok(2));
    assert_eq!(b.get(), Ok(3));
    assert!(scheduled.load(Ordering::SeqCst) >= 1);

    objcall::shutdown();
    assert!(!objcall::is_initialized());
}
