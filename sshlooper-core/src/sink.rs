//! Result sink: the hand-off between host tasks and the consumer
//!
//! Producers push completed results into an unbounded channel and never
//! wait. The consumer polls with [`ResultDrain::try_pop`] on its own
//! schedule or awaits [`ResultDrain::recv`]. Results arrive in completion
//! order, which is unrelated to host list order.

use tokio::sync::mpsc;

use crate::models::HostResult;

/// Outcome of a non-blocking read
#[derive(Debug, Clone, PartialEq)]
pub enum Drained {
    /// The oldest buffered result
    Result(Box<HostResult>),
    /// Nothing buffered right now; producers are still alive
    Empty,
    /// Nothing buffered and every producer has been dropped
    Closed,
}

/// Creates a connected sink and drain
#[must_use]
pub fn result_channel() -> (ResultSink, ResultDrain) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResultSink { tx }, ResultDrain { rx })
}

/// Producer half, cloned into every host task
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::UnboundedSender<HostResult>,
}

impl ResultSink {
    /// Hands a result to the consumer without blocking
    ///
    /// Returns false if the consumer has gone away; the result is dropped.
    pub fn push(&self, result: HostResult) -> bool {
        match self.tx.send(result) {
            Ok(()) => true,
            Err(mpsc::error::SendError(result)) => {
                tracing::debug!(address = %result.address, "Result dropped, consumer is gone");
                false
            }
        }
    }

    /// Returns true if the consumer has been dropped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half
#[derive(Debug)]
pub struct ResultDrain {
    rx: mpsc::UnboundedReceiver<HostResult>,
}

impl ResultDrain {
    /// Takes the oldest result without waiting
    pub fn try_pop(&mut self) -> Drained {
        match self.rx.try_recv() {
            Ok(result) => Drained::Result(Box::new(result)),
            Err(mpsc::error::TryRecvError::Empty) => Drained::Empty,
            Err(mpsc::error::TryRecvError::Disconnected) => Drained::Closed,
        }
    }

    /// Takes everything currently buffered
    pub fn drain(&mut self) -> Vec<HostResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        results
    }

    /// Waits for the next result; `None` once all producers are gone
    pub async fn recv(&mut self) -> Option<HostResult> {
        self.rx.recv().await
    }

    /// Number of results waiting to be read
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns true if nothing is buffered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
