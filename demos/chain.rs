// Simulates a remote service: calls are answered by worker threads after a
// delay, and the replies are processed through continuation chains.

extern crate clap;
extern crate env_logger;
extern crate objcall;

use std::thread;
use std::time::Duration;

use clap::{App, Arg};

use objcall::{Error, Handlers, MethodTable, Options, Promise, ServiceRegistry};

fn main() {
    env_logger::init();

    let matches = App::new("chain")
        .about("Drives remote calls through continuation chains")
        .arg(Arg::with_name("WORKERS")
            .short("w")
            .long("workers")
            .takes_value(true)
            .help("Worker threads running deferred continuations"))
        .arg(Arg::with_name("CALLS")
            .short("n")
            .long("calls")
            .takes_value(true)
            .help("Number of calls to issue"))
        .arg(Arg::with_name("DELAY")
            .short("d")
            .long("delay")
            .takes_value(true)
            .help("Reply delay in milliseconds"))
        .get_matches();

    let workers = matches.value_of("WORKERS").unwrap_or("4").parse::<usize>().unwrap();
    let calls = matches.value_of("CALLS").unwrap_or("16").parse::<u64>().unwrap();
    let delay = matches.value_of("DELAY").unwrap_or("10").parse::<u64>().unwrap();

    let mut opts = Options::new();
    opts.workers(workers);
    objcall::initialize_with(opts).unwrap();

    let services = ServiceRegistry::new();
    let ready = services.when_available("org.example.Calculator");

    let mut methods = MethodTable::<u64, u64>::new();
    methods.register("Square", move |n, reply: Promise<u64>| {
        reply.set_cancel_handler(|p| {
            p.cancel();
        });
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(delay));
            reply.resolve(n * n);
        });
    });

    let announcer = services.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(delay));
        announcer.advertise("org.example.Calculator");
    });

    ready.get().unwrap();
    println!("service available");

    let replies = (0..calls)
        .map(|n| {
            methods.invoke("Square", n)
                   .then(|sq| sq + 1)
                   .on_outcome(Handlers::on_value(|v| Ok(format!("ok {}", v)))
                                   .on_cancel(|| Ok("cancelled".to_owned())))
        })
        .collect::<Vec<_>>();

    // Cancel every other call while its reply is still in flight
    for reply in replies.iter().skip(1).step_by(2) {
        reply.request_cancel();
    }

    for (n, reply) in replies.iter().enumerate() {
        match reply.get() {
            Ok(msg) => println!("call {}: {}", n, msg),
            Err(Error::Operation(msg)) => println!("call {}: failed: {}", n, msg),
            Err(err) => println!("call {}: {}", n, err),
        }
    }

    objcall::shutdown();
}
