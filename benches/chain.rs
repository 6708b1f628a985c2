extern crate num_cpus;
extern crate objcall;

use std::time::{Duration, Instant};

use objcall::{DispatchPolicy, Options, Promise};

const LINKS: usize = 10_000;
const ROUNDS: usize = 20;

#[inline]
fn nanos(d: Duration) -> u64 {
    d.as_secs() * 1_000_000_000 + d.subsec_nanos() as u64
}

// Time building a chain of `LINKS` continuations and driving a value
// through it, returning ns per link.
fn run_test(policy: DispatchPolicy) -> u64 {
    let promise = Promise::<usize>::with_policy(policy);
    let mut tail = promise.future();

    let beg = Instant::now();
    for _ in 0..LINKS {
        tail = tail.then(|v| v + 1);
    }
    promise.resolve(0);
    assert_eq!(tail.get(), Ok(LINKS));

    nanos(beg.elapsed()) / LINKS as u64
}

// Run this with
//   cargo bench --bench chain -- --csv
// to get a parsable output: policy;round;ns per link
fn main() {
    let csv = std::env::args().any(|arg| arg == "--csv");

    let mut opts = Options::new();
    opts.workers(num_cpus::get());
    objcall::initialize_with(opts).unwrap();

    // Inline chains nest one stack frame per link and are left out
    for &policy in &[DispatchPolicy::Auto, DispatchPolicy::Deferred] {
        let results = (0..ROUNDS).map(|_| run_test(policy)).collect::<Vec<_>>();
        report(csv, policy, &results);
    }

    objcall::shutdown();
}

fn report(csv: bool, policy: DispatchPolicy, results: &[u64]) {
    if csv {
        for (i, r) in results.iter().enumerate() {
            println!("{:?};{};{}", policy, i, r);
        }
        return;
    }

    let avg = results.iter().sum::<u64>() / results.len() as u64;
    let min = results.iter().min().cloned().unwrap_or(0);
    let max = results.iter().max().cloned().unwrap_or(0);

    println!("\n==== {:?} ====\n", policy);
    println!("Avg: {} ns/link, Min: {}, Max: {}", avg, min, max);
}
