use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::modules::reaction::schema::ReactionEntity;
pub use crate::modules::reaction::schema::ReactionSummary;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReactionModel {
    #[validate(length(min = 1, message = "Emoji must not be blank"))]
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub emoji: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReactionEntity> for ReactionResponse {
    fn from(entity: ReactionEntity) -> Self {
        ReactionResponse {
            id: entity.id,
            creator_id: entity.creator_id,
            emoji: entity.emoji,
            created_at: entity.created_at,
        }
    }
}

/// One row of the grouped summary query, keyed by the owning entity so
/// a whole page can be decorated from a single query.
#[derive(Debug, Clone, FromRow)]
pub struct ReactionSummaryRow {
    pub owner_id: Uuid,
    pub emoji: String,
    pub count: i64,
}

/// One row of the viewer-reaction query over a page of owner ids.
#[derive(Debug, Clone, FromRow)]
pub struct ViewerReactionRow {
    pub owner_id: Uuid,
    pub id: Uuid,
    pub emoji: String,
}

/// The viewer's own reaction on one entity, surfaced on read models as
/// `has_reacted` / `user_reaction_emoji` / `user_reaction_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerReaction {
    pub reaction_id: Uuid,
    pub emoji: String,
}

pub fn summaries_by_owner(rows: Vec<ReactionSummaryRow>) -> HashMap<Uuid, Vec<ReactionSummary>> {
    let mut map: HashMap<Uuid, Vec<ReactionSummary>> = HashMap::new();
    for row in rows {
        map.entry(row.owner_id)
            .or_default()
            .push(ReactionSummary { emoji: row.emoji, count: row.count });
    }
    map
}

pub fn viewer_reactions_by_owner(rows: Vec<ViewerReactionRow>) -> HashMap<Uuid, ViewerReaction> {
    rows.into_iter()
        .map(|row| (row.owner_id, ViewerReaction { reaction_id: row.id, emoji: row.emoji }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(owner: Uuid, emoji: &str, count: i64) -> ReactionSummaryRow {
        ReactionSummaryRow { owner_id: owner, emoji: emoji.to_string(), count }
    }

    #[test]
    fn summaries_group_by_owner_and_emoji() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let map = summaries_by_owner(vec![row(a, "👍", 2), row(a, "❤️", 1), row(b, "👍", 5)]);

        let a_summary = &map[&a];
        assert_eq!(a_summary.len(), 2);
        let total: i64 = a_summary.iter().map(|s| s.count).sum();
        assert_eq!(total, 3);
        assert_eq!(map[&b], vec![ReactionSummary { emoji: "👍".into(), count: 5 }]);
    }

    #[test]
    fn owners_without_reactions_are_absent_not_errors() {
        let map = summaries_by_owner(vec![]);
        assert!(map.get(&Uuid::now_v7()).is_none());
    }

    #[test]
    fn viewer_reaction_map_keyed_by_owner() {
        let owner = Uuid::now_v7();
        let reaction_id = Uuid::now_v7();
        let map = viewer_reactions_by_owner(vec![ViewerReactionRow {
            owner_id: owner,
            id: reaction_id,
            emoji: "🔥".into(),
        }]);
        assert_eq!(map[&owner], ViewerReaction { reaction_id, emoji: "🔥".into() });
    }
}
