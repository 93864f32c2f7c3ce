// Consumer runner: the transport poll loop for one topic.
//
// Purpose
// - Pull one bounded batch at a time, hand it to a BatchHandler, and acknowledge
//   it only when the handler returned Ok.
//
// Responsibilities
// - Reject (nack) a failed batch so the transport redelivers it.
// - Sleep for the poll interval when the topic is idle.
// - Stop between batches once the shutdown signal flips.

use crate::application::consumer::handler::{BatchHandler, BatchReport};
use crate::core::ports::{Batch, BatchSource, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Idle,
    Acknowledged(BatchReport),
    Redelivered { reason: String },
}

pub struct BatchConsumer<TSource, THandler>
where
    TSource: BatchSource + 'static,
    THandler: BatchHandler + 'static,
{
    topic: String,
    source: Arc<TSource>,
    handler: Arc<THandler>,
    batch_limit: usize,
    poll_interval: Duration,
}

impl<TSource, THandler> BatchConsumer<TSource, THandler>
where
    TSource: BatchSource + 'static,
    THandler: BatchHandler + 'static,
{
    pub fn new(
        topic: impl Into<String>,
        source: Arc<TSource>,
        handler: Arc<THandler>,
        batch_limit: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            topic: topic.into(),
            source,
            handler,
            batch_limit,
            poll_interval,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn run_once(&self) -> Result<PollOutcome, TransportError> {
        let Some(batch) = self.source.poll(&self.topic, self.batch_limit).await? else {
            return Ok(PollOutcome::Idle);
        };

        let span = info_span!(
            "batch",
            batch_id = %Uuid::now_v7(),
            topic = %batch.topic,
            delivery_tag = batch.delivery_tag,
            size = batch.events.len()
        );
        self.dispatch(&batch).instrument(span).await
    }

    async fn dispatch(&self, batch: &Batch) -> Result<PollOutcome, TransportError> {
        match self.handler.handle_batch(&batch.events).await {
            Ok(report) => {
                self.source.ack(batch).await?;
                Ok(PollOutcome::Acknowledged(report))
            }
            Err(err) => {
                error!(error = %err, "batch failed, leaving it for redelivery");
                self.source.nack(batch).await?;
                Ok(PollOutcome::Redelivered {
                    reason: err.to_string(),
                })
            }
        }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(topic = %self.topic, "consumer started");
        while !*shutdown.borrow() {
            let idle = match self.run_once().await {
                Ok(PollOutcome::Idle) => true,
                Ok(_) => false,
                Err(err) => {
                    warn!(topic = %self.topic, error = %err, "transport error, backing off");
                    true
                }
            };
            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        info!(topic = %self.topic, "consumer stopped");
    }
}
