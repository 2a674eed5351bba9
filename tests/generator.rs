use coro::{Flow, Generator, GeneratorError, Producer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

const SEED: u64 = 0xDEAD_BEEF;

type Log = Rc<RefCell<Vec<String>>>;

fn tricky_random(seed: u64, log: Log) -> Generator<u32> {
    Generator::new(move |p| {
        p.produce(4, move |p| {
            p.produce(2, move |p| {
                p.produce(1, move |p| random_loop(p, StdRng::seed_from_u64(seed), log, 0))
            })
        })
    })
}

fn random_loop(p: Producer<u32>, mut rng: StdRng, log: Log, i: usize) -> Flow {
    log.borrow_mut().push(format!("loop {i}"));
    let value = rng.gen_range(0..100);
    p.produce(value, move |p| random_loop(p, rng, log, i + 1))
}

#[test]
fn test_fixed_prefix_then_random_values() {
    let log = Log::default();
    let mut generator = tricky_random(SEED, log);

    let mut expected_rng = StdRng::seed_from_u64(SEED);
    let mut expected = vec![4, 2, 1];
    expected.extend((0..8).map(|_| expected_rng.gen_range(0..100)));

    let produced: Vec<u32> = (0..11).map(|_| generator.consume().unwrap()).collect();

    assert_eq!(produced, expected);
    assert!(produced[3..].iter().all(|v| *v < 100));
}

#[test]
fn test_producer_runs_between_consumes() {
    let log = Log::default();
    let mut generator = tricky_random(SEED, log.clone());

    for _ in 0..3 {
        generator.consume().unwrap();
        assert!(log.borrow().is_empty(), "No loop body during the fixed prefix");
    }

    for i in 0..5 {
        log.borrow_mut().push(format!("consume {}", 4 + i));
        generator.consume().unwrap();
    }

    let log = log.borrow();
    let expected: Vec<String> = (0..5)
        .flat_map(|i| [format!("consume {}", 4 + i), format!("loop {i}")])
        .collect();
    assert_eq!(*log, expected, "Loop body i runs inside consume 4 + i");
}

#[test]
fn test_body_is_lazy() {
    let started = Rc::new(RefCell::new(false));
    let flag = started.clone();

    let mut generator = Generator::new(move |p| {
        *flag.borrow_mut() = true;
        p.produce("first", |_| Flow::finish())
    });

    assert!(!*started.borrow(), "Body must not run before the first consume");
    assert_eq!(generator.consume(), Ok("first"));
    assert!(*started.borrow());
}

#[test]
fn test_finished_generator_is_exhausted() {
    let mut generator = Generator::new(|p| p.produce(1, |p| p.produce(2, |_| Flow::finish())));

    assert_eq!(generator.consume(), Ok(1));
    assert_eq!(generator.consume(), Ok(2));
    assert!(!generator.is_exhausted(), "Body has not observed its end yet");
    assert_eq!(generator.consume(), Err(GeneratorError::Exhausted));
    assert!(generator.is_exhausted());
    assert_eq!(generator.consume(), Err(GeneratorError::Exhausted));
}

#[test]
fn test_empty_generator() {
    let mut generator: Generator<()> = Generator::new(|_| Flow::finish());

    assert_eq!(generator.consume(), Err(GeneratorError::Exhausted));
}

#[test]
fn test_iterator_stops_at_end_of_sequence() {
    fn countdown(p: Producer<u32>, n: u32) -> Flow {
        if n == 0 {
            return Flow::finish();
        }
        p.produce(n, move |p| countdown(p, n - 1))
    }

    let generator = Generator::new(|p| countdown(p, 5));

    assert_eq!(generator.collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_unbounded_generator_with_take() {
    fn naturals(p: Producer<u64>, n: u64) -> Flow {
        p.produce(n, move |p| naturals(p, n + 1))
    }

    let sum: u64 = Generator::new(|p| naturals(p, 0)).take(10_000).sum();

    assert_eq!(sum, (0..10_000u64).sum::<u64>());
}
