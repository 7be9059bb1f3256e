//! Cross-crate flow: dispatch attacks, store their reports and project them
//! onto Prometheus collectors, without the HTTP layer.

use std::sync::Arc;
use std::time::Duration;

use barrage_core::{AttackOpts, AttackParams, AttackResult, TaskId, TaskStatus};
use barrage_execution::{AttackRunner, Dispatcher};
use barrage_interfaces::{ResultStream, TaskFilter};
use barrage_metrics::{exposition, AttackMetrics, MetricId, MetricRegistrar, ReportMetricsProjector};
use barrage_storage::InMemoryReportStore;
use chrono::Utc;
use prometheus::Registry;
use tokio::sync::mpsc;

struct Harness {
    dispatcher: Arc<Dispatcher>,
    metrics: AttackMetrics,
    projector: ReportMetricsProjector,
}

fn harness<E>(engine: E) -> Harness
where
    E: Fn(&AttackOpts) -> Option<ResultStream> + Send + Sync + 'static,
{
    let store = Arc::new(InMemoryReportStore::new());
    let runner = AttackRunner::new(Arc::new(engine)).with_sink(store.clone());
    let dispatcher = Arc::new(Dispatcher::new(runner));
    let metrics = MetricRegistrar::new(Registry::new(), "barrage").register().unwrap();
    let projector = ReportMetricsProjector::new(dispatcher.clone(), store, &metrics).unwrap();
    Harness {
        dispatcher,
        metrics,
        projector,
    }
}

/// Engine that replays a fixed set of (latency ms, status code) pairs
fn replay(samples: &'static [(u64, u16)]) -> impl Fn(&AttackOpts) -> Option<ResultStream> + Send + Sync {
    move |opts: &AttackOpts| {
        let (tx, rx) = mpsc::channel(samples.len().max(1));
        for (seq, (ms, code)) in samples.iter().enumerate() {
            tx.try_send(AttackResult {
                attack: opts.name.clone(),
                seq: seq as u64,
                code: *code,
                timestamp: Utc::now(),
                latency: Duration::from_millis(*ms),
                bytes_out: 0,
                bytes_in: 0,
                error: if *code >= 500 {
                    "503 Service Unavailable".to_string()
                } else {
                    String::new()
                },
            })
            .ok()?;
        }
        Some(rx)
    }
}

async fn wait_until_terminal(dispatcher: &Dispatcher, id: &TaskId) -> TaskStatus {
    for _ in 0..200 {
        let status = dispatcher.get(id).unwrap().status;
        if status.is_terminal() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {} did not finish", id);
}

fn render(metrics: &AttackMetrics) -> String {
    let (_, body) = exposition::render(metrics.registry()).unwrap();
    String::from_utf8(body).unwrap()
}

#[tokio::test]
async fn completed_attack_is_projected() {
    static SAMPLES: [(u64, u16); 4] = [(10, 200), (20, 200), (30, 503), (40, 200)];
    let h = harness(replay(&SAMPLES));

    let info = h
        .dispatcher
        .dispatch(AttackParams::new("http://localhost:8080/", 50, "10s"))
        .unwrap();
    assert_eq!(
        wait_until_terminal(&h.dispatcher, &info.id).await,
        TaskStatus::Completed
    );

    let summary = h
        .projector
        .project(&TaskFilter::from_query(None, TaskStatus::Completed).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.observations, 4);

    let id = info.id.as_str();
    let gauge = |metric| {
        h.metrics
            .gauge(metric)
            .unwrap()
            .with_label_values(&[id, "50", "10s"])
            .get()
    };
    assert_eq!(gauge(MetricId::ReqCnt), 4.0);
    assert_eq!(gauge(MetricId::ResSuccessRatio), 0.75);
    assert_eq!(gauge(MetricId::ReqLatMax), 40.0);
    assert_eq!(
        h.metrics
            .gauge(MetricId::ReqStsCode)
            .unwrap()
            .with_label_values(&[id, "50", "10s", "503"])
            .get(),
        1.0
    );

    let text = render(&h.metrics);
    assert!(text.contains(&format!(
        "barrage_request_duration_histogram_bucket{{id=\"{}\",le=\"20\"}} 2",
        id
    )));
    assert!(text.contains(&format!(
        "barrage_request_duration_histogram_bucket{{id=\"{}\",le=\"50\"}} 4",
        id
    )));
}

#[tokio::test]
async fn default_filter_skips_unfinished_and_failed_attacks() {
    // the first attack never gets a stream, the second one hangs
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let h = harness(move |_: &AttackOpts| {
        if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
            return None;
        }
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move { tx.closed().await });
        Some(rx)
    });

    let failed = h
        .dispatcher
        .dispatch(AttackParams::new("http://localhost:8080/", 10, "1s"))
        .unwrap();
    assert_eq!(
        wait_until_terminal(&h.dispatcher, &failed.id).await,
        TaskStatus::Failed
    );

    let running = h
        .dispatcher
        .dispatch(AttackParams::new("http://localhost:8080/", 10, "1m"))
        .unwrap();

    let summary = h
        .projector
        .project(&TaskFilter::from_query(None, TaskStatus::Completed).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.tasks, 0);
    assert_eq!(summary.reports, 0);

    h.dispatcher.cancel(&running.id).unwrap();
    assert_eq!(
        wait_until_terminal(&h.dispatcher, &running.id).await,
        TaskStatus::Canceled
    );
    assert!(h.dispatcher.cancel(&failed.id).is_err());

    let canceled = h
        .projector
        .project(&TaskFilter::from_query(Some("canceled"), TaskStatus::Completed).unwrap())
        .await
        .unwrap();
    assert_eq!(canceled.tasks, 1);
    assert_eq!(canceled.matched, 0);
}

#[tokio::test]
async fn repeated_scrapes_keep_scalars_and_accumulate_histogram() {
    static SAMPLES: [(u64, u16); 3] = [(1, 200), (20, 200), (600, 200)];
    let h = harness(replay(&SAMPLES));

    let info = h
        .dispatcher
        .dispatch(AttackParams::new("http://localhost:8080/", 5, "30s"))
        .unwrap();
    wait_until_terminal(&h.dispatcher, &info.id).await;

    let filter = TaskFilter::default();
    h.projector.project(&filter).await.unwrap();
    let first = render(&h.metrics);
    h.projector.project(&filter).await.unwrap();
    let second = render(&h.metrics);

    let requests_line = format!(
        "barrage_requests_total{{duration=\"30s\",id=\"{}\",rate=\"5\"}} 3",
        info.id
    );
    assert!(first.contains(&requests_line));
    assert!(second.contains(&requests_line));

    let count = |n: u64| {
        format!(
            "barrage_request_duration_histogram_count{{id=\"{}\"}} {}",
            info.id, n
        )
    };
    assert!(first.contains(&count(3)));
    assert!(second.contains(&count(6)));
}
