//! Scheduler regression test
//!
//! Ordered results under out-of-order completion, failure isolation,
//! backpressure and shutdown with queued work.
//!
//! Run with:
//! ```
//! cargo test -p glyphmatch-sched --test sched_reg
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use glyphmatch_sched::{SchedError, Scheduler, SchedulerOptions};
use glyphmatch_test::RegParams;

#[test]
fn sched_order_reg() {
    let mut rp = RegParams::new("sched_order");
    let scheduler = Scheduler::new(SchedulerOptions::default()).expect("scheduler");

    // later inputs finish first
    let inputs: Vec<u64> = (0..20).collect();
    let work = Arc::new(|_index: usize, x: u64| {
        thread::sleep(Duration::from_millis(20 - x));
        Ok::<u64, String>(x * x)
    });
    let outcomes = scheduler.submit(inputs, work).expect("submit").await_all().expect("await");

    rp.compare_values(20.0, outcomes.len() as f64, 0.0);
    for (i, outcome) in outcomes.iter().enumerate() {
        let value = outcome.as_ref().copied().unwrap_or(u64::MAX);
        rp.compare_values((i * i) as f64, value as f64, 0.0);
    }

    rp.compare_values(0.0, scheduler.shutdown().expect("shutdown") as f64, 0.0);
    assert!(rp.cleanup(), "sched_order regression test failed");
}

#[test]
fn sched_failure_isolation_reg() {
    let mut rp = RegParams::new("sched_failures");
    let scheduler = Scheduler::new(SchedulerOptions::default().with_threads(2)).expect("scheduler");

    let work = Arc::new(|index: usize, x: i32| {
        if index == 3 {
            return Err(format!("bad input {x}"));
        }
        if index == 5 {
            panic!("worker panic");
        }
        Ok(x + 1)
    });
    let outcomes = scheduler
        .submit((0..8).collect::<Vec<i32>>(), work)
        .expect("submit")
        .await_all()
        .expect("await");

    rp.compare_values(8.0, outcomes.len() as f64, 0.0);
    let failed: Vec<usize> = outcomes
        .iter()
        .filter_map(|o| o.as_ref().err().map(|f| f.index))
        .collect();
    rp.compare_strings(b"[3, 5]", format!("{failed:?}").as_bytes());
    rp.compare_values(1.0, outcomes[0].as_ref().copied().unwrap_or(0) as f64, 0.0);
    rp.compare_values(8.0, outcomes[7].as_ref().copied().unwrap_or(0) as f64, 0.0);

    // every task failing fails the batch
    let failing = Arc::new(|_: usize, _: i32| Err::<i32, _>("no"));
    let all = scheduler.submit(vec![1, 2, 3], failing).expect("submit").await_all();
    let all_failed = matches!(all, Err(SchedError::AllTasksFailed { count: 3, .. }));
    rp.compare_values(1.0, all_failed as u8 as f64, 0.0);

    assert!(rp.cleanup(), "sched_failures regression test failed");
}

#[test]
fn sched_backpressure_reg() {
    let mut rp = RegParams::new("sched_backpressure");
    let scheduler = Arc::new(
        Scheduler::new(SchedulerOptions::default().with_threads(1).with_queue_capacity(1)).expect("scheduler"),
    );

    // the first job holds the only worker until released
    let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
    let (release_tx, release_rx) = crossbeam_channel::unbounded::<()>();
    let work = Arc::new(move |index: usize, x: u32| {
        if index == 0 {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        }
        Ok::<u32, String>(x)
    });

    // one job running, one queued, the third cannot be enqueued
    let submitted = Arc::new(AtomicBool::new(false));
    let submitter = {
        let (scheduler, submitted) = (Arc::clone(&scheduler), Arc::clone(&submitted));
        thread::spawn(move || {
            let handle = scheduler.submit((0..4).collect::<Vec<u32>>(), work);
            submitted.store(true, Ordering::SeqCst);
            handle
        })
    };
    started_rx.recv().expect("first job started");
    thread::sleep(Duration::from_millis(100));
    rp.compare_values(0.0, submitted.load(Ordering::SeqCst) as u8 as f64, 0.0);

    drop(release_tx);
    let handle = submitter.join().expect("submitter").expect("submit");
    rp.compare_values(1.0, submitted.load(Ordering::SeqCst) as u8 as f64, 0.0);
    let outcomes = handle.await_all().expect("await");
    rp.compare_values(4.0, outcomes.iter().filter(|o| o.is_ok()).count() as f64, 0.0);
    rp.compare_values(3.0, outcomes[3].as_ref().copied().unwrap_or(0) as f64, 0.0);

    rp.compare_values(0.0, scheduler.shutdown().expect("shutdown") as f64, 0.0);
    assert!(rp.cleanup(), "sched_backpressure regression test failed");
}

#[test]
fn sched_shutdown_reg() {
    let mut rp = RegParams::new("sched_shutdown");
    let scheduler = Scheduler::new(SchedulerOptions::default().with_threads(1)).expect("scheduler");

    let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
    let work = Arc::new(move |index: usize, x: u32| {
        if index == 0 {
            let _ = started_tx.send(());
            thread::sleep(Duration::from_millis(100));
        }
        Ok::<u32, String>(x)
    });
    let handle = scheduler.submit(vec![10, 11, 12, 13], work).expect("submit");
    started_rx.recv().expect("first task started");

    let still_running = scheduler.shutdown().expect("shutdown");
    rp.compare_values(0.0, still_running as f64, 0.0);

    let outcomes = handle.await_all().expect("await");
    rp.compare_values(4.0, outcomes.len() as f64, 0.0);
    rp.compare_values(10.0, outcomes[0].as_ref().copied().unwrap_or(0) as f64, 0.0);
    let discarded = outcomes[1..].iter().all(|o| o.is_err());
    rp.compare_values(1.0, discarded as u8 as f64, 0.0);

    let after = scheduler.submit(vec![1u32], Arc::new(|_: usize, x: u32| Ok::<u32, String>(x)));
    rp.compare_values(1.0, matches!(after, Err(SchedError::Stopped)) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "sched_shutdown regression test failed");
}
