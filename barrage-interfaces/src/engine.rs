//! Attack engine interface
//!
//! The engine is the component that actually issues requests. The core only
//! sees it as a function from [`AttackOpts`] to an ordered stream of
//! results that closes when the attack is over.

use barrage_core::{AttackOpts, AttackResult};
use tokio::sync::mpsc;

/// Ordered, closeable stream of per-request results
pub type ResultStream = mpsc::Receiver<AttackResult>;

/// Source of attack result streams.
///
/// Returning `None` means the engine could not produce a stream at all;
/// the task running the attack is then marked failed.
pub trait AttackEngine: Send + Sync {
    fn attack(&self, opts: &AttackOpts) -> Option<ResultStream>;
}

impl<F> AttackEngine for F
where
    F: Fn(&AttackOpts) -> Option<ResultStream> + Send + Sync,
{
    fn attack(&self, opts: &AttackOpts) -> Option<ResultStream> {
        self(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_core::{AttackParams, TaskId};

    #[tokio::test]
    async fn test_closure_is_an_engine() {
        let engine = |_: &AttackOpts| -> Option<ResultStream> {
            let (_tx, rx) = mpsc::channel(1);
            Some(rx)
        };
        let opts = AttackOpts::from_params(
            &TaskId::from("t1"),
            &AttackParams::new("http://localhost/", 1, "1s"),
        )
        .unwrap();

        let mut stream = engine.attack(&opts).expect("stream");
        // sender dropped, so the stream is already closed
        assert!(stream.recv().await.is_none());
    }
}
