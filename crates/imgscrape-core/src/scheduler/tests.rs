use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tracks how many operations are running at once and the highest value seen.
#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn doubles_in_input_order() {
    let out = run_bounded(2, vec![0u64, 1, 2, 3, 4], |x| async move {
        Ok::<_, String>(x * 2)
    })
    .await
    .unwrap();
    assert_eq!(out, vec![0, 2, 4, 6, 8]);
}

#[tokio::test]
async fn order_preserved_when_later_tasks_finish_first() {
    // Earlier tasks sleep longer, so completion order is the reverse of input order.
    let inputs: Vec<u64> = (0..6).collect();
    let out = run_bounded(6, inputs, |x| async move {
        tokio::time::sleep(Duration::from_millis(60 - x * 10)).await;
        Ok::<_, String>(format!("item-{x}"))
    })
    .await
    .unwrap();
    let expected: Vec<String> = (0..6).map(|x| format!("item-{x}")).collect();
    assert_eq!(out, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_exceeds_concurrency() {
    let gauge = Arc::new(Gauge::default());
    let g = Arc::clone(&gauge);
    let out = run_bounded(3, 0..20u32, move |x| {
        let g = Arc::clone(&g);
        async move {
            g.enter();
            tokio::time::sleep(Duration::from_millis(10 + u64::from(x % 3) * 5)).await;
            g.exit();
            Ok::<_, String>(x)
        }
    })
    .await
    .unwrap();
    assert_eq!(out, (0..20).collect::<Vec<_>>());
    assert!(gauge.peak() <= 3, "peak {} exceeded limit", gauge.peak());
    assert_eq!(gauge.peak(), 3, "all slots should be used");
}

#[tokio::test]
async fn concurrency_larger_than_tasks() {
    let out = run_bounded(64, vec!["a", "b"], |s| async move {
        Ok::<_, String>(s.len())
    })
    .await
    .unwrap();
    assert_eq!(out, vec![1, 1]);
}

#[tokio::test]
async fn empty_tasks_never_invoke_operation() {
    for concurrency in [1, 4] {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let out = run_bounded(concurrency, Vec::<u32>::new(), move |x| {
            c.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, String>(x) }
        })
        .await
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn zero_concurrency_is_invalid_argument() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let err = run_bounded(0, vec![1u32, 2, 3], move |x| {
        c.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, String>(x) }
    })
    .await
    .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidArgument { concurrency: 0 }));
    assert!(err.aggregated().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(err.to_string(), "concurrency must be at least 1, got 0");
}

#[tokio::test]
async fn zero_concurrency_checked_before_empty_input() {
    let err = run_bounded(0, Vec::<u32>::new(), |x| async move { Ok::<_, String>(x) })
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidArgument { .. }));
}

#[tokio::test]
async fn single_failure_stops_dispatch_and_drains_in_flight() {
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::new(Mutex::new(Vec::new()));
    let d = Arc::clone(&dispatched);
    let f = Arc::clone(&finished);

    let err = run_bounded(3, vec!["A", "B", "C", "D"], move |name| {
        d.lock().unwrap().push(name);
        let f = Arc::clone(&f);
        async move {
            if name == "B" {
                return Err(format!("{name} broke"));
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            f.lock().unwrap().push(name);
            Ok(name)
        }
    })
    .await
    .unwrap_err();

    let agg = err.aggregated().expect("aggregated failure");
    assert_eq!(agg.len(), 1);
    assert_eq!(agg.total(), 4);
    assert_eq!(agg.errors()[0].index, 1);
    assert_eq!(agg.errors()[0].error().map(String::as_str), Some("B broke"));

    // B fails before A or C finish, so D is never started.
    let dispatched = dispatched.lock().unwrap().clone();
    assert_eq!(dispatched, vec!["A", "B", "C"]);
    // In-flight siblings were not cancelled.
    let mut finished = finished.lock().unwrap().clone();
    finished.sort_unstable();
    assert_eq!(finished, vec!["A", "C"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_bound_holds_while_draining_after_failure() {
    let gauge = Arc::new(Gauge::default());
    let g = Arc::clone(&gauge);
    let err = run_bounded(3, 0..30u32, move |x| {
        let g = Arc::clone(&g);
        async move {
            g.enter();
            tokio::time::sleep(Duration::from_millis(5 + u64::from(x % 4) * 5)).await;
            g.exit();
            if x == 7 {
                Err(format!("task {x}"))
            } else {
                Ok(x)
            }
        }
    })
    .await
    .unwrap_err();
    assert!(gauge.peak() <= 3, "peak {} exceeded limit", gauge.peak());
    let agg = err.aggregated().unwrap();
    assert_eq!(agg.failed_indices(), vec![7]);
    assert_eq!(agg.total(), 30);
}

#[tokio::test]
async fn sequential_run_halts_after_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let err = run_bounded(1, 0..5u32, move |x| {
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            if x == 2 {
                Err(format!("task {x}"))
            } else {
                Ok(x)
            }
        }
    })
    .await
    .unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let agg = err.aggregated().unwrap();
    assert_eq!(agg.failed_indices(), vec![2]);
}

#[tokio::test]
async fn multiple_failures_are_all_collected() {
    let err = run_bounded(4, 0..4u32, |x| async move {
        tokio::time::sleep(Duration::from_millis(u64::from(x) * 5)).await;
        if x % 2 == 1 {
            Err(format!("odd {x}"))
        } else {
            Ok(x)
        }
    })
    .await
    .unwrap_err();
    let agg = err.aggregated().unwrap();
    assert_eq!(agg.len(), 2);
    assert_eq!(agg.failed_indices(), vec![1, 3]);
    assert_eq!(err.to_string(), "2 of 4 tasks failed");

    let messages: Vec<String> = match err {
        ScheduleError::Aggregated(agg) => agg
            .into_errors()
            .into_iter()
            .filter_map(TaskError::into_error)
            .collect(),
        ScheduleError::InvalidArgument { .. } => unreachable!(),
    };
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"odd 1".to_string()));
    assert!(messages.contains(&"odd 3".to_string()));
}

#[tokio::test]
async fn panicking_task_is_recorded_as_failure() {
    let finished = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&finished);
    let err = run_bounded(2, 0..2u32, move |x| {
        let f = Arc::clone(&f);
        async move {
            if x == 0 {
                panic!("boom");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            f.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(x)
        }
    })
    .await
    .unwrap_err();
    let agg = err.aggregated().unwrap();
    assert_eq!(agg.len(), 1);
    let first = &agg.errors()[0];
    assert_eq!(first.index, 0);
    assert!(matches!(&first.failure, TaskFailure::Panicked(msg) if msg == "boom"));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_task_invoked_once_on_success() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    run_bounded(3, 0..10u32, move |x| {
        s.lock().unwrap().push(x);
        async move { Ok::<_, String>(()) }
    })
    .await
    .unwrap();
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
}

#[tokio::test]
async fn error_chain_reaches_operation_error() {
    use std::error::Error;

    let err = run_bounded(2, 0..3u32, |x| async move {
        if x == 1 {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        } else {
            Ok(x)
        }
    })
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "1 of 3 tasks failed");
    let task = err.source().expect("task error");
    assert_eq!(task.to_string(), "task 1 failed");
    let cause = task.source().expect("operation error");
    assert_eq!(cause.to_string(), "disk full");

    let chain = format!("{:#}", anyhow::Error::new(err));
    assert_eq!(chain, "1 of 3 tasks failed: task 1 failed: disk full");
}
