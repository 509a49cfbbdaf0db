use std::collections::HashMap;

use serde::Serialize;

use super::changes::RivalryChange;
use crate::domain::PlayerId;

/// One rivalry card in a player's feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCard {
    pub recipient: PlayerId,
    pub change: RivalryChange,
}

/// Sorts changes for announcement: priority first, then pair key so the
/// order does not depend on processing order.
pub fn order_changes(changes: &mut [RivalryChange]) {
    changes.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.pair_key.cmp(&b.pair_key))
    });
}

/// Subset that warrants a push alert
pub fn notifiable(changes: &[RivalryChange]) -> Vec<RivalryChange> {
    changes
        .iter()
        .filter(|c| c.kind.is_notifiable())
        .cloned()
        .collect()
}

/// Fans changes out to both players of each pair, keeping at most
/// `per_user_cap` cards per recipient. Lower priority changes lose out.
pub fn select_feed_cards(changes: &[RivalryChange], per_user_cap: usize) -> Vec<FeedCard> {
    let mut ordered = changes.to_vec();
    order_changes(&mut ordered);

    let mut issued: HashMap<PlayerId, usize> = HashMap::new();
    let mut cards = Vec::new();

    for change in ordered {
        for recipient in [&change.player_a.player_id, &change.player_b.player_id] {
            let count = issued.entry(recipient.clone()).or_insert(0);
            if *count >= per_user_cap {
                continue;
            }
            *count += 1;
            cards.push(FeedCard {
                recipient: recipient.clone(),
                change: change.clone(),
            });
        }
    }

    cards
}
