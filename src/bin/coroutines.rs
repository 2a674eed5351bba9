//! Walkthrough of the runtime: eleven sleeping computations on two workers,
//! a fixed three-step routine, and a pull-driven random generator.
//!
//! Run with `RUST_LOG=coro=trace` to watch the workers.

use coro::{Co, Flow, Generator, Producer, Runtime, Step};

use rand::Rng;
use tracing_subscriber::EnvFilter;

const SEPARATOR: &str = "----------------------------";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let rt = Runtime::builder().worker_threads(2).build()?;

    let bridges: Vec<_> = ('a'..='k')
        .map(|name| rt.start(move |co| work(co, name.to_string())))
        .collect();

    for bridge in bridges {
        let transcript = bridge.wait()?;

        println!("{SEPARATOR}");
        println!("{transcript}");
        println!("{SEPARATOR}\n");
    }

    let points = rt.start(simple_routine).wait()?;
    println!("{points}\n");

    rt.shutdown();

    println!("{SEPARATOR}");
    let values: Vec<String> = tricky_random()
        .take(11)
        .map(|value| value.to_string())
        .collect();
    println!("{}", values.join(", "));
    println!("{SEPARATOR}");

    Ok(())
}

/// Four rounds that each sleep 100ms with probability 6/10, recording which
/// worker resumed every round.
fn work(co: Co<String>, name: String) -> Step<String> {
    let transcript = format!("{name} start on {}\n\n", co.worker_name());
    round(co, name, transcript, 0)
}

fn round(co: Co<String>, name: String, mut transcript: String, i: u32) -> Step<String> {
    if i > 3 {
        transcript.push_str(&format!("\n{name} done on {}", co.worker_name()));
        return Step::done(transcript);
    }

    let requested = if should_sleep() { 100 } else { 0 };

    co.sleep(requested, move |co, resumed| {
        transcript.push_str(&format!(
            "{name} {i}: {requested} {} on {}\n",
            resumed.as_millis(),
            co.worker_name()
        ));
        round(co, name, transcript, i + 1)
    })
}

fn should_sleep() -> bool {
    rand::thread_rng().gen_range(0..10) > 3
}

fn simple_routine(co: Co<String>) -> Step<String> {
    let mut result = String::from("Point 1");

    co.sleep(1, move |co, _| {
        result.push_str(" Point 2");
        co.sleep(2, move |co, _| {
            result.push_str(" Point 3");
            co.sleep(3, move |_, _| {
                result.push_str(" Point 4");
                Step::done(result)
            })
        })
    })
}

/// Yields 4, 2, 1 and then random numbers below 100 forever.
fn tricky_random() -> Generator<u32> {
    Generator::new(|p| {
        p.produce(4, |p| p.produce(2, |p| p.produce(1, random_forever)))
    })
}

fn random_forever(p: Producer<u32>) -> Flow {
    let value = rand::thread_rng().gen_range(0..100);
    p.produce(value, random_forever)
}
