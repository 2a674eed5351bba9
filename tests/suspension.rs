mod common;

use coro::{Co, Failure, Resumed, Step};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

type Probe = (ThreadId, ThreadId, Resumed);

fn fast_path_probe(co: Co<Probe>, delay: i64) -> Step<Probe> {
    let before = thread::current().id();
    let step = co.sleep(delay, move |_, resumed| {
        Step::done((before, thread::current().id(), resumed))
    });
    assert!(!step.is_suspended(), "Fast path must not suspend");
    step
}

#[test]
fn test_zero_delay_takes_fast_path() {
    let rt = common::runtime(2);

    let (before, after, resumed) = rt.start(|co| fast_path_probe(co, 0)).wait().unwrap();

    assert_eq!(before, after, "Zero delay must stay on the calling thread");
    assert_eq!(resumed, Resumed::Immediate);
    assert_eq!(resumed.as_millis(), Resumed::SENTINEL);
    assert_eq!(rt.pending(), 0);
}

#[test]
fn test_negative_delay_takes_fast_path() {
    let rt = common::runtime(1);

    let (before, after, resumed) = rt.start(|co| fast_path_probe(co, -250)).wait().unwrap();

    assert_eq!(before, after);
    assert!(resumed.is_immediate());
    assert_eq!(resumed.elapsed(), None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn fast_path_for_any_non_positive_delay(delay in i64::MIN..=0) {
        let rt = common::runtime(1);

        let (before, after, resumed) = rt.start(move |co| fast_path_probe(co, delay)).wait().unwrap();

        prop_assert_eq!(before, after);
        prop_assert_eq!(resumed.as_millis(), -1);
    }

    #[test]
    fn positive_delay_never_resumes_early(delay in 1i64..40) {
        let rt = common::runtime(2);

        let resumed = rt.start(move |co| co.sleep(delay, |_, resumed| Step::done(resumed))).wait().unwrap();

        let elapsed = resumed.elapsed().expect("positive delay suspends");
        prop_assert!(elapsed >= Duration::from_millis(delay as u64));
    }
}

#[test]
fn test_positive_delay_suspends() {
    let rt = common::runtime(2);
    let started = Instant::now();

    let resumed = rt
        .start(|co| {
            let step = co.sleep(60, |_, resumed| Step::done(resumed));
            assert!(step.is_suspended(), "Positive delay must suspend");
            step
        })
        .wait()
        .unwrap();

    let elapsed = resumed.elapsed().expect("computation should have suspended");
    assert!(elapsed >= Duration::from_millis(60), "Resumed too early: {elapsed:?}");
    assert!(resumed.as_millis() >= 60);
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[test]
fn test_continuation_resumes_exactly_once() {
    let rt = common::runtime(4);
    let resumes = Arc::new(AtomicUsize::new(0));
    let counter = resumes.clone();

    rt.start(move |co| {
        co.sleep(10, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Step::done(())
        })
    })
    .wait()
    .unwrap();

    // Give any stray duplicate a chance to show up.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(resumes.load(Ordering::SeqCst), 1);
}

fn chain(co: Co<usize>, remaining: usize, done: usize) -> Step<usize> {
    if remaining == 0 {
        return Step::done(done);
    }

    let delay = 1 + (remaining % 3) as i64;
    co.sleep(delay, move |co, _| chain(co, remaining - 1, done + 1))
}

#[test]
fn test_many_computations_complete_once_each() {
    let computations = 12;
    let suspensions = 4;

    for workers in [1, 3, computations * suspensions] {
        let rt = common::runtime(workers);

        let bridges: Vec<_> = (0..computations)
            .map(|_| rt.start(move |co| chain(co, suspensions, 0)))
            .collect();

        for bridge in bridges {
            assert_eq!(bridge.wait().unwrap(), suspensions, "workers = {workers}");
        }

        assert_eq!(rt.pending(), 0, "Nothing should be left queued");
    }
}

#[test]
fn test_shorter_delay_completes_first() {
    let rt = common::runtime(2);
    let order = Arc::new(Mutex::new(Vec::new()));

    let bridges: Vec<_> = [100i64, 50]
        .into_iter()
        .map(|delay| {
            let order = order.clone();
            rt.start(move |co| {
                co.sleep(delay, move |_, _| {
                    order.lock().unwrap().push(delay);
                    Step::done(Instant::now())
                })
            })
        })
        .collect();

    let finished: Vec<Instant> = bridges.into_iter().map(|b| b.wait().unwrap()).collect();

    assert_eq!(*order.lock().unwrap(), vec![50, 100]);
    assert!(finished[1] <= finished[0], "Delay 50 should finish no later than delay 100");
}

#[test]
fn test_steps_may_resume_on_different_workers() {
    let rt = common::runtime(2);

    let names = rt
        .start(|co| {
            let first = co.worker_name();
            co.sleep(5, move |co, _| Step::done((first, co.worker_name())))
        })
        .wait()
        .unwrap();

    assert!(names.0.starts_with("coro-worker-"));
    assert!(names.1.starts_with("coro-worker-"));
}

#[test]
fn test_step_error_is_recorded() {
    let rt = common::runtime(1);

    let outcome = rt
        .start(|co| co.sleep(5, |_, _| Step::<u32>::from_result("nope".parse::<u32>())))
        .wait();

    assert!(matches!(outcome, Err(Failure::Raised(_))));
}

#[test]
fn test_step_panic_is_recorded_and_worker_survives() {
    let rt = common::runtime(1);

    let outcome = rt
        .start(|co| co.sleep(5, |_, _| -> Step<()> { panic!("boom") }))
        .wait();

    match outcome {
        Err(Failure::Panicked(message)) => assert_eq!(message, "boom"),
        other => panic!("expected a panic failure, got {other:?}"),
    }

    let after = rt.start(|co| co.sleep(5, |_, _| Step::done("still running")));
    assert_eq!(after.wait().unwrap(), "still running");
}

#[test]
fn test_panicking_raw_effect_does_not_stop_worker() {
    let rt = common::runtime(1);

    rt.schedule(Duration::ZERO, |_| panic!("bad action"));
    rt.schedule(Duration::from_millis(1), |_| panic!("another bad action"));

    let outcome = rt.start(|co| co.sleep(10, |_, _| Step::done(7)));
    assert_eq!(outcome.wait().unwrap(), 7);
}

#[test]
fn test_fast_path_inside_suspended_chain() {
    let rt = common::runtime(2);

    let marks = rt
        .start(|co| {
            co.sleep(5, |co, first| {
                co.sleep(0, move |co, second| {
                    co.sleep(5, move |_, third| {
                        Step::done(vec![first.as_millis() >= 5, second.is_immediate(), third.as_millis() >= 5])
                    })
                })
            })
        })
        .wait()
        .unwrap();

    assert_eq!(marks, vec![true, true, true]);
}

fn spin(co: Co<u64>, left: u64, count: u64) -> Step<u64> {
    if left == 0 {
        return Step::done(count);
    }

    co.sleep(0, move |co, _| spin(co, left - 1, count + 1))
}

#[test]
fn test_long_fast_path_chain_uses_constant_stack() {
    let rt = common::runtime(1);

    let count = rt.start(|co| spin(co, 200_000, 0)).wait().unwrap();

    assert_eq!(count, 200_000, "Every fast-path point should have resumed");

    let after = rt.start(|co| co.sleep(5, |_, _| Step::done("worker alive")));
    assert_eq!(after.wait().unwrap(), "worker alive");
}

#[test]
fn test_fast_path_chain_between_suspensions() {
    let rt = common::runtime(2);

    let count = rt
        .start(|co| co.sleep(5, |co, _| spin(co, 50_000, 0)))
        .wait()
        .unwrap();

    assert_eq!(count, 50_000);
}
