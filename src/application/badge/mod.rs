//! Badge awarding and the rules that decide who earns what.
//!
//! [`award_badge`] is the only write path into the award table. Every rule
//! module computes eligibility and then calls it; rules report
//! [`RuleOutcome`]s instead of failing so the triggering write is never
//! blocked.
//!
//! [`RuleOutcome`]: crate::domain::badge::RuleOutcome

pub mod catalog;
pub mod placement;
pub mod season;
pub mod top10;
pub mod tour;
pub mod unit;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::badge::{
    AwardContext, AwardWrite, Awarded, BadgeCode, RuleResult, SkipReason, UserBadge,
};
use crate::domain::id::UserId;
use crate::error::Result;
use crate::port::outbound::store::BadgeStore;

/// Award `code` to `user`.
///
/// Returns true only when a new award row was created. A code missing from
/// the catalog is a no-op. For an award the user already holds, the stored
/// context is replaced when the new one is non-empty and differs; the
/// original award time is kept.
///
/// # Errors
/// Propagates storage failures.
pub async fn award_badge<S: BadgeStore>(
    store: &S,
    user: UserId,
    code: &BadgeCode,
    context: AwardContext,
) -> Result<bool> {
    award(store, user, code, context, ContextPolicy::Refresh).await
}

/// Award `code` to `user` unless already held.
///
/// Like [`award_badge`], but an existing award keeps the context it was
/// first given.
///
/// # Errors
/// Propagates storage failures.
pub async fn award_badge_once<S: BadgeStore>(
    store: &S,
    user: UserId,
    code: &BadgeCode,
    context: AwardContext,
) -> Result<bool> {
    award(store, user, code, context, ContextPolicy::Keep).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextPolicy {
    Refresh,
    Keep,
}

async fn award<S: BadgeStore>(
    store: &S,
    user: UserId,
    code: &BadgeCode,
    context: AwardContext,
    policy: ContextPolicy,
) -> Result<bool> {
    if store.badge(code).await?.is_none() {
        debug!(user = %user, badge = %code, "Badge not in catalog, skipping award");
        return Ok(false);
    }

    let award = UserBadge {
        user,
        badge: code.clone(),
        context,
        awarded_at: Utc::now(),
    };

    match store.insert_user_badge_if_absent(&award).await? {
        AwardWrite::Created => {
            debug!(user = %user, badge = %code, context = %award.context, "Badge awarded");
            Ok(true)
        }
        AwardWrite::Existing { context } => {
            let stale = !is_empty_context(&award.context) && context != award.context;
            if policy == ContextPolicy::Refresh && stale {
                store
                    .update_user_badge_context(user, code, &award.context)
                    .await?;
                debug!(
                    user = %user,
                    badge = %code,
                    context = %award.context,
                    "Badge context updated"
                );
            }
            Ok(false)
        }
    }
}

fn is_empty_context(context: &AwardContext) -> bool {
    match context.as_value() {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Run [`award_badge`] for a rule, folding storage failures into a skip.
pub(crate) async fn award_for_rule<S: BadgeStore>(
    store: &S,
    user: UserId,
    code: &BadgeCode,
    context: AwardContext,
) -> RuleResult {
    match award_badge(store, user, code, context).await {
        Ok(newly_awarded) => Ok(Awarded {
            user,
            code: code.clone(),
            newly_awarded,
        }),
        Err(e) => {
            warn!(user = %user, badge = %code, error = %e, "Badge award failed");
            Err(SkipReason::Storage(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::domain::badge::Badge;
    use crate::domain::id::{OneDayRaceId, StageId};
    use crate::domain::unit::UnitRef;
    use serde_json::json;

    async fn store_with(code: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_badge(&Badge {
                code: BadgeCode::from(code),
                name: code.to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn missing_catalog_entry_awards_nothing() {
        let store = MemoryStore::new();
        let code = BadgeCode::from(BadgeCode::WIN_UNIT);
        let awarded = award_badge(&store, UserId::new(1), &code, AwardContext::global())
            .await
            .unwrap();
        assert!(!awarded);
        assert!(store.user_badges(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_award_is_not_new_but_refreshes_context() {
        let store = store_with(BadgeCode::WIN_UNIT).await;
        let code = BadgeCode::from(BadgeCode::WIN_UNIT);
        let user = UserId::new(1);

        let first = AwardContext::unit(UnitRef::OneDay(OneDayRaceId::new(1)));
        assert!(award_badge(&store, user, &code, first).await.unwrap());
        let awarded_at = store.user_badges(user).await.unwrap()[0].awarded_at;

        let second = AwardContext::unit(UnitRef::Stage(StageId::new(7)));
        assert!(!award_badge(&store, user, &code, second.clone()).await.unwrap());

        let held = store.user_badges(user).await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].context, second);
        assert_eq!(held[0].awarded_at, awarded_at);
    }

    #[tokio::test]
    async fn award_once_keeps_the_first_context() {
        let store = store_with(BadgeCode::PODIUM_UNIT).await;
        let code = BadgeCode::from(BadgeCode::PODIUM_UNIT);
        let user = UserId::new(2);

        let first = AwardContext::placement(UnitRef::OneDay(OneDayRaceId::new(1)));
        let later = AwardContext::placement(UnitRef::Stage(StageId::new(9)));
        assert!(award_badge_once(&store, user, &code, first.clone()).await.unwrap());
        assert!(!award_badge_once(&store, user, &code, later).await.unwrap());

        let held = store.user_badges(user).await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].context, first);
    }

    #[tokio::test]
    async fn empty_context_never_overwrites() {
        let store = store_with(BadgeCode::FIRST_BET).await;
        let code = BadgeCode::from(BadgeCode::FIRST_BET);
        let user = UserId::new(3);

        award_badge(&store, user, &code, AwardContext::global()).await.unwrap();
        award_badge(&store, user, &code, AwardContext::from_value(json!({})))
            .await
            .unwrap();

        let held = store.user_badges(user).await.unwrap();
        assert_eq!(held[0].context, AwardContext::global());
    }
}
