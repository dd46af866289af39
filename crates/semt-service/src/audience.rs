//! Audience resolution — who receives which trigger.
//!
//! One resolver serves every call site (reports, follows, messages,
//! broadcasts) so the tier rules cannot drift between handlers.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use semt_core::traits::ProfileStore;
use semt_core::{AppError, AppResult};
use semt_entity::trigger::{Severity, TriggerContext, TriggerKind};

/// Resolves the deduplicated recipient set for a trigger.
///
/// Pure with respect to the snapshot behind the [`ProfileStore`]: no
/// side effects, actor always excluded, inactive accounts never
/// included (the store filters them). An empty result is a valid
/// outcome, not an error.
#[derive(Clone)]
pub struct AudienceResolver {
    profiles: Arc<dyn ProfileStore>,
}

impl std::fmt::Debug for AudienceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudienceResolver").finish()
    }
}

impl AudienceResolver {
    /// Creates a new resolver over a profile store.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Resolve the recipient set for a validated trigger.
    pub async fn resolve(&self, trigger: &TriggerContext) -> AppResult<Vec<Uuid>> {
        let candidates = match trigger.kind {
            TriggerKind::Report => self.resolve_report(trigger).await?,
            TriggerKind::Follow => self.resolve_singleton(trigger.target_user_id).await?,
            TriggerKind::Message => {
                let conversation_id = trigger.conversation_id.ok_or_else(|| {
                    AppError::validation("Message trigger requires a conversation")
                })?;
                self.profiles.conversation_member_ids(conversation_id).await?
            }
            TriggerKind::Broadcast => match trigger.target_user_id {
                Some(_) => self.resolve_singleton(trigger.target_user_id).await?,
                None => self.profiles.all_active_ids().await?,
            },
        };

        let audience = dedup_excluding(candidates, trigger.actor_id);
        debug!(
            kind = ?trigger.kind,
            severity = ?trigger.severity,
            recipients = audience.len(),
            "Resolved audience"
        );
        Ok(audience)
    }

    /// Tiered report rules.
    async fn resolve_report(&self, trigger: &TriggerContext) -> AppResult<Vec<Uuid>> {
        let severity = trigger
            .severity
            .ok_or_else(|| AppError::validation("Report trigger requires a severity"))?;
        let city = trigger
            .city
            .as_deref()
            .ok_or_else(|| AppError::validation("Report trigger requires a city"))?;

        match severity {
            Severity::Critical => self.profiles.active_ids_in_city(city).await,
            Severity::High => match trigger.district.as_deref() {
                Some(district) => self.profiles.active_ids_in_district(city, district).await,
                // No district on the trigger: degrade to city-wide.
                None => self.profiles.active_ids_in_city(city).await,
            },
            Severity::Normal => {
                let mut members = match trigger.district.as_deref() {
                    Some(district) => {
                        self.profiles.active_ids_in_district(city, district).await?
                    }
                    None => Vec::new(),
                };
                if let Some(category) = trigger.category.as_deref() {
                    members.extend(self.profiles.active_ids_subscribed_to(category).await?);
                }
                Ok(members)
            }
            // Deliberate no-push tier: content stays reachable through
            // feed queries only.
            Severity::Low => Ok(Vec::new()),
        }
    }

    /// A single-target audience, empty when the target is missing or
    /// deactivated.
    async fn resolve_singleton(&self, target: Option<Uuid>) -> AppResult<Vec<Uuid>> {
        let Some(user_id) = target else {
            return Err(AppError::validation("Trigger requires a target user"));
        };
        if self.profiles.is_active(user_id).await? {
            Ok(vec![user_id])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Deduplicate while preserving first-seen order, dropping the actor.
fn dedup_excluding(candidates: Vec<Uuid>, actor_id: Uuid) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|id| *id != actor_id && seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    /// In-memory profile snapshot for resolver tests.
    #[derive(Default)]
    struct FakeProfiles {
        by_city: HashMap<String, Vec<Uuid>>,
        by_district: HashMap<(String, String), Vec<Uuid>>,
        by_category: HashMap<String, Vec<Uuid>>,
        conversations: HashMap<Uuid, Vec<Uuid>>,
        active: HashSet<Uuid>,
    }

    #[async_trait]
    impl ProfileStore for FakeProfiles {
        async fn active_ids_in_city(&self, city: &str) -> AppResult<Vec<Uuid>> {
            Ok(self.by_city.get(city).cloned().unwrap_or_default())
        }

        async fn active_ids_in_district(
            &self,
            city: &str,
            district: &str,
        ) -> AppResult<Vec<Uuid>> {
            Ok(self
                .by_district
                .get(&(city.to_string(), district.to_string()))
                .cloned()
                .unwrap_or_default())
        }

        async fn active_ids_subscribed_to(&self, category: &str) -> AppResult<Vec<Uuid>> {
            Ok(self.by_category.get(category).cloned().unwrap_or_default())
        }

        async fn conversation_member_ids(&self, conversation_id: Uuid) -> AppResult<Vec<Uuid>> {
            Ok(self
                .conversations
                .get(&conversation_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn all_active_ids(&self) -> AppResult<Vec<Uuid>> {
            Ok(self.active.iter().copied().collect())
        }

        async fn is_active(&self, user_id: Uuid) -> AppResult<bool> {
            Ok(self.active.contains(&user_id))
        }
    }

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[tokio::test]
    async fn test_critical_is_city_wide_minus_actor() {
        let users = ids(5);
        let actor = users[0];
        let mut profiles = FakeProfiles::default();
        profiles.by_city.insert("Trabzon".to_string(), users.clone());

        let resolver = AudienceResolver::new(Arc::new(profiles));
        let trigger = TriggerContext::report(
            actor,
            Severity::Critical,
            "Trabzon",
            None,
            None,
            "Road closed",
            "Flooding",
            Uuid::new_v4(),
        );

        let audience = resolver.resolve(&trigger).await.unwrap();
        assert_eq!(audience.len(), 4);
        assert!(!audience.contains(&actor));
    }

    #[tokio::test]
    async fn test_high_uses_district_and_degrades_to_city() {
        let city_users = ids(10);
        let district_users = city_users[..3].to_vec();
        let mut profiles = FakeProfiles::default();
        profiles
            .by_city
            .insert("Trabzon".to_string(), city_users.clone());
        profiles.by_district.insert(
            ("Trabzon".to_string(), "Ortahisar".to_string()),
            district_users.clone(),
        );
        let resolver = AudienceResolver::new(Arc::new(profiles));
        let actor = Uuid::new_v4();

        let with_district = TriggerContext::report(
            actor,
            Severity::High,
            "Trabzon",
            Some("Ortahisar".to_string()),
            None,
            "Water outage",
            "",
            Uuid::new_v4(),
        );
        assert_eq!(resolver.resolve(&with_district).await.unwrap().len(), 3);

        let without_district = TriggerContext::report(
            actor,
            Severity::High,
            "Trabzon",
            None,
            None,
            "Water outage",
            "",
            Uuid::new_v4(),
        );
        assert_eq!(resolver.resolve(&without_district).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_normal_unions_district_and_category_without_duplicates() {
        let district_users = ids(3);
        let mut category_users = ids(2);
        // One user is both a district member and a subscriber
        category_users.push(district_users[0]);
        // The actor satisfies both legs as well
        let actor = district_users[1];

        let mut profiles = FakeProfiles::default();
        profiles.by_district.insert(
            ("Trabzon".to_string(), "Ortahisar".to_string()),
            district_users.clone(),
        );
        profiles
            .by_category
            .insert("football".to_string(), category_users.clone());

        let resolver = AudienceResolver::new(Arc::new(profiles));
        let trigger = TriggerContext::report(
            actor,
            Severity::Normal,
            "Trabzon",
            Some("Ortahisar".to_string()),
            Some("football".to_string()),
            "Match tonight",
            "",
            Uuid::new_v4(),
        );

        let audience = resolver.resolve(&trigger).await.unwrap();
        // 3 district + 2 category + 1 overlap - overlap - actor = 4
        assert_eq!(audience.len(), 4);
        assert!(!audience.contains(&actor));
        let unique: HashSet<_> = audience.iter().collect();
        assert_eq!(unique.len(), audience.len());
    }

    #[tokio::test]
    async fn test_low_severity_resolves_to_nobody() {
        let mut profiles = FakeProfiles::default();
        profiles.by_city.insert("Trabzon".to_string(), ids(50));

        let resolver = AudienceResolver::new(Arc::new(profiles));
        let trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::Low,
            "Trabzon",
            None,
            Some("market".to_string()),
            "Stall open",
            "",
            Uuid::new_v4(),
        );

        assert!(resolver.resolve(&trigger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follow_targets_only_the_followed_user() {
        let followed = Uuid::new_v4();
        let mut profiles = FakeProfiles::default();
        profiles.active.insert(followed);

        let resolver = AudienceResolver::new(Arc::new(profiles));
        let trigger = TriggerContext::follow(
            Uuid::new_v4(),
            followed,
            "New follower",
            "",
            Uuid::new_v4(),
        );

        assert_eq!(resolver.resolve(&trigger).await.unwrap(), vec![followed]);
    }

    #[tokio::test]
    async fn test_follow_of_deactivated_user_is_empty() {
        let resolver = AudienceResolver::new(Arc::new(FakeProfiles::default()));
        let trigger = TriggerContext::follow(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "New follower",
            "",
            Uuid::new_v4(),
        );

        assert!(resolver.resolve(&trigger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_message_excludes_the_sender() {
        let conversation = Uuid::new_v4();
        let members = ids(2);
        let sender = members[0];
        let mut profiles = FakeProfiles::default();
        profiles.conversations.insert(conversation, members.clone());

        let resolver = AudienceResolver::new(Arc::new(profiles));
        let trigger =
            TriggerContext::message(sender, conversation, "New message", "hey", Uuid::new_v4());

        assert_eq!(resolver.resolve(&trigger).await.unwrap(), vec![members[1]]);
    }

    #[tokio::test]
    async fn test_broadcast_without_target_reaches_everyone_active() {
        let admin = Uuid::new_v4();
        let users = ids(4);
        let mut profiles = FakeProfiles::default();
        profiles.active.extend(users.iter().copied());
        profiles.active.insert(admin);

        let resolver = AudienceResolver::new(Arc::new(profiles));
        let trigger = TriggerContext::broadcast(admin, None, "Maintenance", "", Uuid::new_v4());

        let audience = resolver.resolve(&trigger).await.unwrap();
        assert_eq!(audience.len(), 4);
        assert!(!audience.contains(&admin));
    }
}
