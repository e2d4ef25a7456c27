use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::model::card::Card;

/// Cards keyed by the ticket key parsed from their names.
pub type CardMap = BTreeMap<String, Card>;

/// Keep only cards that carry the origin label and are assigned to
/// `member_id`, keyed by ticket key.
///
/// When several cards claim the same key, the one with the lowest card id
/// wins so that repeated runs always pick the same card.
pub fn resolve_cards(
    cards: impl IntoIterator<Item = Card>,
    origin_label: &str,
    member_id: &str,
) -> CardMap {
    let mut resolved = CardMap::new();

    for card in cards {
        if !card.has_label(origin_label) || !card.has_member(member_id) {
            continue;
        }
        let key = card.ticket_key().to_string();
        match resolved.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(card);
            }
            Entry::Occupied(mut slot) => {
                tracing::warn!(
                    key = %slot.key(),
                    kept = %std::cmp::min(&slot.get().id, &card.id),
                    "Several cards claim the same ticket"
                );
                if card.id < slot.get().id {
                    slot.insert(card);
                }
            }
        }
    }

    resolved
}
