//! The fan-out pipeline: resolve → write → dispatch.
//!
//! One shared implementation serves every trigger kind. Call sites
//! submit a validated trigger onto the job queue and return; the worker
//! executes the pipeline off the request path, so user-facing latency
//! never depends on audience size.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use semt_core::config::push::{PushConfig, PushRetryConfig};
use semt_core::result::AppResult;
use semt_core::types::id::{NotificationId, UserId};
use semt_database::repositories::{JobRepository, NotificationRepository};
use semt_entity::job::model::{CreateJob, Job};
use semt_entity::notification::Notification;
use semt_entity::trigger::TriggerContext;
use semt_push::{OutboundPush, PushDispatcher, PushMessage};

use crate::audience::AudienceResolver;
use crate::tokens::TokenDirectory;

/// What one pipeline run did, returned as the job result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanoutSummary {
    /// Resolved audience size.
    pub audience: usize,
    /// Records newly inserted (conflicts from earlier attempts excluded).
    pub written: u64,
    /// Records confirmed accepted by the gateway.
    pub pushed: usize,
    /// Records skipped for push because the recipient has no token.
    pub no_token: usize,
    /// Records handed to a delayed retry job.
    pub retry_scheduled: usize,
    /// Provider-reported dead tokens pruned from the directory.
    pub tokens_pruned: usize,
}

/// Orchestrates audience resolution, record writing, and push dispatch
/// for all trigger kinds.
#[derive(Clone)]
pub struct FanoutService {
    resolver: AudienceResolver,
    notifications: Arc<NotificationRepository>,
    tokens: TokenDirectory,
    dispatcher: Arc<PushDispatcher>,
    jobs: Arc<JobRepository>,
    push_config: PushConfig,
}

impl std::fmt::Debug for FanoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutService").finish()
    }
}

impl FanoutService {
    /// Creates the fan-out service.
    pub fn new(
        resolver: AudienceResolver,
        notifications: Arc<NotificationRepository>,
        tokens: TokenDirectory,
        dispatcher: Arc<PushDispatcher>,
        jobs: Arc<JobRepository>,
        push_config: PushConfig,
    ) -> Self {
        Self {
            resolver,
            notifications,
            tokens,
            dispatcher,
            jobs,
            push_config,
        }
    }

    /// Validate a trigger and enqueue its fan-out job.
    ///
    /// This is the only entry point call sites use. It must be invoked
    /// *after* the triggering business write has committed; a failure
    /// here surfaces to the caller but can never roll that write back.
    pub async fn submit(&self, trigger: &TriggerContext) -> AppResult<Job> {
        trigger.validate()?;
        let job = self.jobs.create(&CreateJob::fanout(trigger)?).await?;
        info!(
            job_id = %job.id,
            kind = ?trigger.kind,
            source_ref = %trigger.source_ref,
            "Fan-out submitted"
        );
        Ok(job)
    }

    /// Run the full pipeline for one trigger. Called by the worker.
    ///
    /// Safe to re-run for the same trigger: the uniqueness constraint on
    /// `(source_ref, recipient_id, kind)` skips records an earlier
    /// attempt wrote, and dispatch covers exactly the records still
    /// marked unsent.
    pub async fn execute(&self, trigger: &TriggerContext) -> AppResult<FanoutSummary> {
        trigger.validate()?;

        let audience = self.resolver.resolve(trigger).await?;
        if audience.is_empty() {
            info!(
                kind = ?trigger.kind,
                source_ref = %trigger.source_ref,
                "Empty audience, nothing to notify"
            );
            return Ok(FanoutSummary::default());
        }

        let records: Vec<Notification> = audience
            .iter()
            .map(|&recipient_id| Notification::for_recipient(trigger, recipient_id))
            .collect();
        let written = self.notifications.insert_batch(&records).await?;

        let unsent = self
            .notifications
            .find_unsent_for_source(trigger.source_ref, trigger.notification_kind())
            .await?;

        let mut summary = FanoutSummary {
            audience: audience.len(),
            written,
            ..FanoutSummary::default()
        };
        self.deliver(unsent, 1, &mut summary).await?;

        info!(
            kind = ?trigger.kind,
            source_ref = %trigger.source_ref,
            audience = summary.audience,
            written = summary.written,
            pushed = summary.pushed,
            no_token = summary.no_token,
            retry_scheduled = summary.retry_scheduled,
            "Fan-out complete"
        );
        Ok(summary)
    }

    /// Re-attempt push delivery for the records of a failed chunk.
    ///
    /// `attempt` counts the delivery attempts that have already failed.
    /// Records marked sent or deleted in the meantime are skipped.
    pub async fn retry_chunk(
        &self,
        notification_ids: &[Uuid],
        attempt: u32,
    ) -> AppResult<FanoutSummary> {
        let unsent = self.notifications.find_unsent_by_ids(notification_ids).await?;
        let mut summary = FanoutSummary::default();
        if unsent.is_empty() {
            info!(attempt, "Push retry found nothing left to deliver");
            return Ok(summary);
        }

        self.deliver(unsent, attempt + 1, &mut summary).await?;
        info!(
            attempt,
            pushed = summary.pushed,
            retry_scheduled = summary.retry_scheduled,
            "Push retry complete"
        );
        Ok(summary)
    }

    /// Shared delivery tail: token lookup, dispatch, state updates, and
    /// retry scheduling.
    ///
    /// `current_attempt` is the 1-based number of this delivery attempt,
    /// used to decide whether a further retry is allowed.
    async fn deliver(
        &self,
        unsent: Vec<Notification>,
        current_attempt: u32,
        summary: &mut FanoutSummary,
    ) -> AppResult<()> {
        let recipient_ids: Vec<Uuid> = unsent.iter().map(|n| n.recipient_id).collect();
        let token_map = self.tokens.lookup(&recipient_ids).await?;

        let batch = build_outbound(&unsent, &token_map, &self.push_config.sound);
        summary.no_token = unsent.len() - batch.len();
        if batch.is_empty() {
            return Ok(());
        }

        let report = self.dispatcher.dispatch(batch).await;

        if !report.sent.is_empty() {
            let sent_ids: Vec<Uuid> = report.sent.iter().map(|id| id.into_uuid()).collect();
            self.notifications.mark_push_sent(&sent_ids).await?;
            summary.pushed = report.sent.len();
        }

        for (recipient_id, token) in &report.invalid_tokens {
            match self.tokens.prune(recipient_id.into_uuid(), token).await {
                Ok(_) => summary.tokens_pruned += 1,
                Err(e) => error!(
                    recipient_id = %recipient_id,
                    error = %e,
                    "Failed to prune dead push token"
                ),
            }
        }

        if !report.retryable.is_empty() {
            let retry = &self.push_config.retry;
            if retry.can_retry(current_attempt) {
                let retry_ids: Vec<Uuid> =
                    report.retryable.iter().map(|id| id.into_uuid()).collect();
                let scheduled_at = retry_schedule(retry, current_attempt);
                self.jobs
                    .create(&CreateJob::push_retry(
                        retry_ids,
                        current_attempt,
                        scheduled_at,
                    )?)
                    .await?;
                summary.retry_scheduled = report.retryable.len();
            } else {
                warn!(
                    records = report.retryable.len(),
                    attempts = current_attempt,
                    "Push delivery exhausted retries, records stay unsent"
                );
            }
        }

        Ok(())
    }
}

/// Pair each record that has a token with its gateway message.
///
/// Recipients absent from the token map are skipped for push; their
/// record keeps full in-app visibility regardless.
pub fn build_outbound(
    records: &[Notification],
    tokens: &HashMap<Uuid, String>,
    sound: &str,
) -> Vec<OutboundPush> {
    records
        .iter()
        .filter_map(|record| {
            tokens.get(&record.recipient_id).map(|token| OutboundPush {
                notification_id: NotificationId::from(record.id),
                recipient_id: UserId::from(record.recipient_id),
                message: PushMessage {
                    to: token.clone(),
                    title: record.title.clone(),
                    body: record.body.clone(),
                    data: record.data.clone().unwrap_or_else(|| serde_json::json!({})),
                    sound: sound.to_string(),
                    badge: None,
                },
            })
        })
        .collect()
}

/// When the next delivery attempt should run: exponential backoff with
/// up to 50% jitter so retried chunks do not stampede the gateway.
fn retry_schedule(retry: &PushRetryConfig, failed_attempts: u32) -> DateTime<Utc> {
    let base = retry.backoff_delay(failed_attempts);
    let jitter_secs = (base.as_secs_f64() * 0.5 * rand::random::<f64>()) as i64;
    Utc::now()
        + ChronoDuration::seconds(base.as_secs() as i64)
        + ChronoDuration::seconds(jitter_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semt_entity::trigger::Severity;

    fn record(trigger: &TriggerContext) -> Notification {
        Notification::for_recipient(trigger, Uuid::new_v4())
    }

    #[test]
    fn test_build_outbound_skips_tokenless_recipients() {
        let trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::High,
            "Trabzon",
            Some("Ortahisar".to_string()),
            None,
            "Water outage",
            "Scheduled maintenance",
            Uuid::new_v4(),
        );
        let records: Vec<Notification> = (0..40).map(|_| record(&trigger)).collect();

        // 35 of 40 recipients have a registered token
        let mut tokens = HashMap::new();
        for rec in records.iter().take(35) {
            tokens.insert(rec.recipient_id, format!("token-{}", rec.recipient_id));
        }

        let batch = build_outbound(&records, &tokens, "default");
        assert_eq!(batch.len(), 35);
        for push in &batch {
            assert_eq!(push.message.title, "Water outage");
            assert_eq!(push.message.sound, "default");
            assert_eq!(push.message.data["kind"], "event");
        }
    }

    #[test]
    fn test_build_outbound_preserves_record_identity() {
        let trigger = TriggerContext::follow(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "New follower",
            "",
            Uuid::new_v4(),
        );
        let rec = record(&trigger);
        let tokens = HashMap::from([(rec.recipient_id, "tok".to_string())]);

        let batch = build_outbound(std::slice::from_ref(&rec), &tokens, "default");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].notification_id.into_uuid(), rec.id);
        assert_eq!(batch[0].recipient_id.into_uuid(), rec.recipient_id);
        assert_eq!(batch[0].message.to, "tok");
    }

    #[test]
    fn test_retry_schedule_is_in_the_future_and_bounded() {
        let retry = PushRetryConfig {
            max_attempts: 5,
            base_backoff_seconds: 30,
            max_backoff_seconds: 3600,
        };
        let before = Utc::now();
        let scheduled = retry_schedule(&retry, 1);
        // base 30s plus at most 50% jitter
        assert!(scheduled >= before + ChronoDuration::seconds(30));
        assert!(scheduled <= before + ChronoDuration::seconds(46));
    }
}
