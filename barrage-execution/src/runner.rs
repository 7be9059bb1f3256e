//! Attack execution driver

use std::sync::Arc;

use barrage_core::{AttackOpts, TaskId, TaskStatus};
use barrage_interfaces::{AttackEngine, ResultSink};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::encoder::{JsonLinesEncoder, ResultEncoder};
use crate::error::ExecutionError;
use crate::task::Task;

/// Drives tasks through an injected attack engine.
///
/// Cheap to clone; every running task gets its own copy.
#[derive(Clone)]
pub struct AttackRunner {
    engine: Arc<dyn AttackEngine>,
    encoder: Arc<dyn ResultEncoder>,
    sink: Option<Arc<dyn ResultSink>>,
}

impl AttackRunner {
    pub fn new(engine: Arc<dyn AttackEngine>) -> Self {
        Self {
            engine,
            encoder: Arc::new(JsonLinesEncoder),
            sink: None,
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ResultEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Deliver the encoded results of completed attacks to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Convenience for [`Task::run`]
    pub fn run(&self, task: &Arc<Task>) -> Result<JoinHandle<()>, barrage_core::TaskError> {
        task.run(self)
    }

    /// Consume one task's result stream until it closes or the task is
    /// canceled. Outcomes are reported through the task status and the log.
    pub(crate) async fn drive(self, task: Arc<Task>) {
        let id = task.id().clone();

        let opts = match AttackOpts::from_params(&id, task.params()) {
            Ok(opts) => opts,
            Err(e) => {
                let err = ExecutionError::from(e);
                error!(task_id = %id, error = %err, "Attack could not be started");
                let _ = task.fail();
                return;
            }
        };

        let Some(mut results) = self.engine.attack(&opts) else {
            let err = ExecutionError::EmptyStream;
            error!(task_id = %id, error = %err, "Attack failed");
            let _ = task.fail();
            return;
        };

        let mut buf = Vec::new();
        let mut received = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = task.context().canceled() => {
                    warn!(task_id = %id, received, "Attack was canceled");
                    return;
                }
                next = results.recv() => match next {
                    Some(result) => {
                        received += 1;
                        // keep draining after a failed encode, the task is already marked failed
                        if let Err(e) = self.encoder.encode(&result, &mut buf) {
                            error!(task_id = %id, seq = result.seq, error = %e, "Failed to encode attack result");
                            let _ = task.fail();
                        }
                    }
                    None => break,
                }
            }
        }
        debug!(task_id = %id, received, bytes = buf.len(), "Result stream closed");

        if let Some(sink) = &self.sink {
            if task.status() == TaskStatus::Running {
                let submitted = tokio::select! {
                    biased;
                    _ = task.context().canceled() => {
                        warn!(task_id = %id, received, "Attack was canceled while storing results");
                        self.discard(&id).await;
                        return;
                    }
                    submitted = sink.submit(&id, buf) => submitted,
                };
                if let Err(e) = submitted {
                    let err = ExecutionError::from(e);
                    error!(task_id = %id, error = %err, "Attack results could not be stored");
                    let _ = task.fail();
                    return;
                }
            }
        }

        match task.complete() {
            Ok(()) => info!(task_id = %id, received, "Attack completed"),
            // canceled after the results were stored
            Err(_) if task.context().is_canceled() => {
                warn!(task_id = %id, received, "Attack was canceled");
                self.discard(&id).await;
            }
            Err(e) => {
                error!(task_id = %id, error = %e, "Failed to complete attack");
                let _ = task.fail();
            }
        }
    }

    /// Drop results already handed to the sink for `id`
    pub(crate) async fn discard(&self, id: &TaskId) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.discard(id).await {
            warn!(task_id = %id, error = %e, "Failed to discard attack results");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use barrage_core::{AttackParams, AttackResult};
    use barrage_interfaces::{ResultStream, StoreError};
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::sync::{mpsc, Notify};

    fn params() -> AttackParams {
        AttackParams::new("http://localhost:8080/", 50, "10s")
    }

    fn result(seq: u64) -> AttackResult {
        AttackResult {
            attack: "test".to_string(),
            seq,
            code: 200,
            timestamp: Utc::now(),
            latency: Duration::from_millis(10),
            bytes_out: 0,
            bytes_in: 64,
            error: String::new(),
        }
    }

    /// Engine replaying a fixed number of results, then closing the stream
    fn replay_engine(count: u64) -> Arc<dyn AttackEngine> {
        Arc::new(move |_: &AttackOpts| -> Option<ResultStream> {
            let (tx, rx) = mpsc::channel(count.max(1) as usize);
            for seq in 0..count {
                tx.try_send(result(seq)).ok()?;
            }
            Some(rx)
        })
    }

    /// Engine whose stream stays open until the test drops the senders
    #[derive(Default)]
    struct HangingEngine {
        senders: Mutex<Vec<mpsc::Sender<AttackResult>>>,
    }

    impl AttackEngine for HangingEngine {
        fn attack(&self, _opts: &AttackOpts) -> Option<ResultStream> {
            let (tx, rx) = mpsc::channel(8);
            self.senders.lock().push(tx);
            Some(rx)
        }
    }

    struct FailingEncoder;

    impl ResultEncoder for FailingEncoder {
        fn encode(&self, result: &AttackResult, buf: &mut Vec<u8>) -> Result<(), ExecutionError> {
            if result.seq == 1 {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                return Err(ExecutionError::Encode(err));
            }
            buf.push(b'x');
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        submitted: Mutex<Vec<(TaskId, Vec<u8>)>>,
        discarded: Mutex<Vec<TaskId>>,
        /// Canceled from inside `submit`, after the results were recorded
        cancel_on_submit: Mutex<Option<Arc<Task>>>,
    }

    #[async_trait]
    impl ResultSink for RecordingSink {
        async fn submit(&self, id: &TaskId, encoded: Vec<u8>) -> Result<(), StoreError> {
            self.submitted.lock().push((id.clone(), encoded));
            if let Some(task) = self.cancel_on_submit.lock().take() {
                task.cancel().unwrap();
            }
            Ok(())
        }

        async fn discard(&self, id: &TaskId) -> Result<(), StoreError> {
            self.submitted.lock().retain(|(other, _)| other != id);
            self.discarded.lock().push(id.clone());
            Ok(())
        }
    }

    /// Sink that holds every submission until the test releases it
    #[derive(Default)]
    struct BlockingSink {
        entered: Notify,
        release: Notify,
        submitted: Mutex<Vec<TaskId>>,
        discarded: Mutex<Vec<TaskId>>,
    }

    #[async_trait]
    impl ResultSink for BlockingSink {
        async fn submit(&self, id: &TaskId, _encoded: Vec<u8>) -> Result<(), StoreError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.submitted.lock().push(id.clone());
            Ok(())
        }

        async fn discard(&self, id: &TaskId) -> Result<(), StoreError> {
            self.discarded.lock().push(id.clone());
            Ok(())
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl ResultSink for BrokenSink {
        async fn submit(&self, _id: &TaskId, _encoded: Vec<u8>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                message: "disk full".to_string(),
            })
        }

        async fn discard(&self, _id: &TaskId) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stream_exhaustion_completes_task() {
        let sink = Arc::new(RecordingSink::default());
        let runner = AttackRunner::new(replay_engine(3)).with_sink(sink.clone());
        let task = Arc::new(Task::new(params()));

        runner.run(&task).unwrap().await.unwrap();

        assert_eq!(task.status(), TaskStatus::Completed);
        let submitted = sink.submitted.lock();
        assert_eq!(submitted.len(), 1);
        assert_eq!(&submitted[0].0, task.id());
        let text = String::from_utf8(submitted[0].1.clone()).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_missing_stream_fails_task() {
        let runner = AttackRunner::new(Arc::new(|_: &AttackOpts| -> Option<ResultStream> { None }));
        let task = Arc::new(Task::new(params()));

        runner.run(&task).unwrap().await.unwrap();
        assert_eq!(task.status(), TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_invalid_params_fail_task() {
        let runner = AttackRunner::new(replay_engine(1));
        let task = Arc::new(Task::new(AttackParams::new("http://localhost/", 5, "forever")));

        runner.run(&task).unwrap().await.unwrap();
        assert_eq!(task.status(), TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_encode_failure_fails_task_but_drains_stream() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = mpsc::channel(8);
        let stream = Mutex::new(Some(rx));
        let engine = move |_: &AttackOpts| -> Option<ResultStream> { stream.lock().take() };
        let runner = AttackRunner::new(Arc::new(engine))
            .with_encoder(Arc::new(FailingEncoder))
            .with_sink(sink.clone());
        let task = Arc::new(Task::new(params()));

        let handle = runner.run(&task).unwrap();
        for seq in 0..4 {
            tx.send(result(seq)).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(task.status(), TaskStatus::Failed);
        // the sink only sees attacks that are still running at the end
        assert!(sink.submitted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_abandons_open_stream() {
        let engine = Arc::new(HangingEngine::default());
        let runner = AttackRunner::new(engine.clone());
        let task = Arc::new(Task::new(params()));

        let handle = runner.run(&task).unwrap();
        tokio::task::yield_now().await;
        task.cancel().unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("driver should return promptly after cancel")
            .unwrap();
        assert_eq!(task.status(), TaskStatus::Canceled);
        assert!(task.context().is_canceled());
        // the engine still holds its sender, the stream was never closed
        assert_eq!(engine.senders.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_fails_task() {
        let runner = AttackRunner::new(replay_engine(2)).with_sink(Arc::new(BrokenSink));
        let task = Arc::new(Task::new(params()));

        runner.run(&task).unwrap().await.unwrap();
        assert_eq!(task.status(), TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancel_while_storing_results_keeps_task_canceled() {
        let sink = Arc::new(BlockingSink::default());
        let runner = AttackRunner::new(replay_engine(2)).with_sink(sink.clone());
        let task = Arc::new(Task::new(params()));

        let handle = runner.run(&task).unwrap();
        sink.entered.notified().await;
        task.cancel().unwrap();
        sink.release.notify_one();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("driver should return promptly after cancel")
            .unwrap();
        assert_eq!(task.status(), TaskStatus::Canceled);
        assert!(sink.submitted.lock().is_empty());
        assert_eq!(*sink.discarded.lock(), vec![task.id().clone()]);
    }

    #[tokio::test]
    async fn test_cancel_after_results_stored_discards_them() {
        let sink = Arc::new(RecordingSink::default());
        let runner = AttackRunner::new(replay_engine(2)).with_sink(sink.clone());
        let task = Arc::new(Task::new(params()));
        *sink.cancel_on_submit.lock() = Some(Arc::clone(&task));

        runner.run(&task).unwrap().await.unwrap();

        assert_eq!(task.status(), TaskStatus::Canceled);
        assert!(sink.submitted.lock().is_empty());
        assert_eq!(*sink.discarded.lock(), vec![task.id().clone()]);
    }
}
