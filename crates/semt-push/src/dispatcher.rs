//! Chunked, bounded-concurrency push dispatch.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use semt_core::config::push::PushConfig;
use semt_core::types::id::{NotificationId, UserId};

use crate::gateway::PushGateway;
use crate::message::{PushMessage, PushTicket};

/// One record's push, pairing the message with the identifiers the
/// caller needs to update delivery state afterwards.
#[derive(Debug, Clone)]
pub struct OutboundPush {
    /// The notification record this message belongs to.
    pub notification_id: NotificationId,
    /// The recipient (used to invalidate the token cache on pruning).
    pub recipient_id: UserId,
    /// The gateway message.
    pub message: PushMessage,
}

/// Aggregated result of dispatching one batch.
///
/// `sent` and `retryable` partition the input ids (minus pruned-token
/// messages, which are neither — their token is gone, so retrying is
/// pointless).
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Records confirmed accepted by the gateway. Only these may be
    /// marked `push_sent`.
    pub sent: Vec<NotificationId>,
    /// Records in failed chunks or with transient per-message errors.
    pub retryable: Vec<NotificationId>,
    /// Tokens the provider reported as unregistered, with the owning
    /// recipient.
    pub invalid_tokens: Vec<(UserId, String)>,
    /// Number of chunks that failed wholesale.
    pub failed_chunks: usize,
    /// Total number of gateway calls made.
    pub total_chunks: usize,
}

/// Outcome of one chunk's gateway call.
#[derive(Debug, Default)]
struct ChunkOutcome {
    sent: Vec<NotificationId>,
    retryable: Vec<NotificationId>,
    invalid_tokens: Vec<(UserId, String)>,
    failed: bool,
}

/// Partitions outbound pushes into gateway-sized chunks and dispatches
/// them concurrently, bounded by the configured limit.
pub struct PushDispatcher {
    gateway: Arc<dyn PushGateway>,
    chunk_size: usize,
    max_concurrent: usize,
}

impl std::fmt::Debug for PushDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushDispatcher")
            .field("chunk_size", &self.chunk_size)
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

impl PushDispatcher {
    /// Create a dispatcher over a gateway.
    pub fn new(gateway: Arc<dyn PushGateway>, config: &PushConfig) -> Self {
        Self {
            gateway,
            chunk_size: config.chunk_size.max(1),
            max_concurrent: config.max_concurrent_chunks.max(1),
        }
    }

    /// Dispatch a batch and report per-record outcomes.
    ///
    /// Never returns an error: gateway failures degrade to retryable
    /// records in the report. Chunks share no mutable state, so they are
    /// dispatched concurrently up to the configured limit.
    pub async fn dispatch(&self, batch: Vec<OutboundPush>) -> DispatchReport {
        if batch.is_empty() {
            return DispatchReport::default();
        }

        let chunks: Vec<&[OutboundPush]> = batch.chunks(self.chunk_size).collect();
        let total_chunks = chunks.len();
        debug!(
            records = batch.len(),
            chunks = total_chunks,
            "Dispatching push batch"
        );

        let pending: Vec<_> = chunks.into_iter().map(|chunk| self.send_chunk(chunk)).collect();
        let outcomes: Vec<ChunkOutcome> = futures::stream::iter(pending)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut report = DispatchReport {
            total_chunks,
            ..DispatchReport::default()
        };
        for outcome in outcomes {
            report.sent.extend(outcome.sent);
            report.retryable.extend(outcome.retryable);
            report.invalid_tokens.extend(outcome.invalid_tokens);
            if outcome.failed {
                report.failed_chunks += 1;
            }
        }
        report
    }

    /// One gateway call for one chunk.
    ///
    /// A chunk-level failure (network, timeout, non-success HTTP status,
    /// misaligned response) confirms nothing: every record stays
    /// unsent and retryable.
    async fn send_chunk(&self, chunk: &[OutboundPush]) -> ChunkOutcome {
        let messages: Vec<PushMessage> = chunk.iter().map(|o| o.message.clone()).collect();

        let tickets = match self.gateway.send_batch(&messages).await {
            Ok(tickets) => tickets,
            Err(e) => {
                warn!(
                    size = chunk.len(),
                    error = %e,
                    "Push chunk failed, no messages confirmed"
                );
                return ChunkOutcome {
                    retryable: chunk.iter().map(|o| o.notification_id).collect(),
                    failed: true,
                    ..ChunkOutcome::default()
                };
            }
        };

        if tickets.len() != chunk.len() {
            warn!(
                expected = chunk.len(),
                received = tickets.len(),
                "Gateway response not aligned with request, treating chunk as failed"
            );
            return ChunkOutcome {
                retryable: chunk.iter().map(|o| o.notification_id).collect(),
                failed: true,
                ..ChunkOutcome::default()
            };
        }

        let mut outcome = ChunkOutcome::default();
        for (outbound, ticket) in chunk.iter().zip(tickets.iter()) {
            if ticket.is_ok() {
                outcome.sent.push(outbound.notification_id);
            } else if ticket.is_unregistered_device() {
                outcome
                    .invalid_tokens
                    .push((outbound.recipient_id, outbound.message.to.clone()));
            } else {
                warn!(
                    notification_id = %outbound.notification_id,
                    detail = ?ticket.message,
                    "Gateway rejected message"
                );
                outcome.retryable.push(outbound.notification_id);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use semt_core::error::AppError;
    use semt_core::result::AppResult;

    use super::*;
    use crate::message::TicketStatus;

    /// Scripted gateway: pops one response per call and records batch
    /// sizes.
    struct FakeGateway {
        responses: Mutex<Vec<AppResult<Vec<PushTicket>>>>,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl FakeGateway {
        fn new(responses: Vec<AppResult<Vec<PushTicket>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }

        /// Always answers `ok` for every message.
        fn all_ok() -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }

        fn sizes(&self) -> Vec<usize> {
            self.batch_sizes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushGateway for FakeGateway {
        async fn send_batch(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>> {
            self.batch_sizes.lock().unwrap().push(messages.len());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(messages.iter().map(|_| PushTicket::ok()).collect())
            } else {
                responses.remove(0)
            }
        }
    }

    fn config(chunk_size: usize) -> PushConfig {
        PushConfig {
            gateway_url: "http://gateway.test/send".to_string(),
            chunk_size,
            timeout_seconds: 5,
            max_concurrent_chunks: 2,
            sound: "default".to_string(),
            retry: Default::default(),
        }
    }

    fn outbound(n: usize) -> Vec<OutboundPush> {
        (0..n)
            .map(|i| OutboundPush {
                notification_id: NotificationId::new(),
                recipient_id: UserId::new(),
                message: PushMessage {
                    to: format!("token-{i}"),
                    title: "t".to_string(),
                    body: "b".to_string(),
                    data: serde_json::json!({}),
                    sound: "default".to_string(),
                    badge: None,
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn test_batch_at_limit_is_one_call() {
        let gateway = Arc::new(FakeGateway::all_ok());
        let dispatcher = PushDispatcher::new(gateway.clone(), &config(100));

        let report = dispatcher.dispatch(outbound(100)).await;

        assert_eq!(gateway.sizes(), vec![100]);
        assert_eq!(report.total_chunks, 1);
        assert_eq!(report.sent.len(), 100);
    }

    #[tokio::test]
    async fn test_batch_over_limit_splits() {
        let gateway = Arc::new(FakeGateway::all_ok());
        let dispatcher = PushDispatcher::new(gateway.clone(), &config(100));

        let report = dispatcher.dispatch(outbound(250)).await;

        let mut sizes = gateway.sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![50, 100, 100]);
        assert_eq!(report.total_chunks, 3);
        assert_eq!(report.sent.len(), 250);
        assert!(report.retryable.is_empty());
    }

    #[tokio::test]
    async fn test_failed_chunk_confirms_nothing() {
        let gateway = Arc::new(FakeGateway::new(vec![Err(AppError::external_service(
            "gateway timed out",
        ))]));
        let dispatcher = PushDispatcher::new(gateway, &config(100));

        let batch = outbound(35);
        let ids: std::collections::HashSet<NotificationId> =
            batch.iter().map(|o| o.notification_id).collect();
        let report = dispatcher.dispatch(batch).await;

        assert!(report.sent.is_empty());
        assert_eq!(report.failed_chunks, 1);
        let retryable: std::collections::HashSet<NotificationId> =
            report.retryable.iter().copied().collect();
        assert_eq!(retryable, ids);
    }

    #[tokio::test]
    async fn test_mixed_tickets_partition_outcomes() {
        let tickets = vec![
            PushTicket::ok(),
            PushTicket::error("DeviceNotRegistered"),
            PushTicket::error("MessageTooBig"),
        ];
        let gateway = Arc::new(FakeGateway::new(vec![Ok(tickets)]));
        let dispatcher = PushDispatcher::new(gateway, &config(100));

        let batch = outbound(3);
        let ids: Vec<NotificationId> = batch.iter().map(|o| o.notification_id).collect();
        let recipients: Vec<UserId> = batch.iter().map(|o| o.recipient_id).collect();
        let report = dispatcher.dispatch(batch).await;

        assert_eq!(report.sent, vec![ids[0]]);
        assert_eq!(report.retryable, vec![ids[2]]);
        assert_eq!(report.invalid_tokens.len(), 1);
        assert_eq!(report.invalid_tokens[0].0, recipients[1]);
        assert_eq!(report.invalid_tokens[0].1, "token-1");
    }

    #[tokio::test]
    async fn test_misaligned_response_is_chunk_failure() {
        let gateway = Arc::new(FakeGateway::new(vec![Ok(vec![PushTicket {
            status: TicketStatus::Ok,
            message: None,
        }])]));
        let dispatcher = PushDispatcher::new(gateway, &config(100));

        let report = dispatcher.dispatch(outbound(3)).await;

        assert!(report.sent.is_empty());
        assert_eq!(report.retryable.len(), 3);
        assert_eq!(report.failed_chunks, 1);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let gateway = Arc::new(FakeGateway::all_ok());
        let dispatcher = PushDispatcher::new(gateway.clone(), &config(100));

        let report = dispatcher.dispatch(Vec::new()).await;

        assert!(gateway.sizes().is_empty());
        assert_eq!(report.total_chunks, 0);
    }
}
