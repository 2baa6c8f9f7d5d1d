//! Task-board access: the `Board` trait, the fuzzy move search, and the
//! Trello REST client.

pub mod model;
pub mod trello;

pub use model::{Card, NewCard};
pub use trello::TrelloClient;

use async_trait::async_trait;

use crate::command::ListSlot;
use crate::error::BoardError;

/// Backend-agnostic board operations.
///
/// `list_cards` degrades to an empty list on non-fatal remote failure
/// (the status digest then renders "No cards."); mutations surface their
/// errors so the dispatcher can log them.
#[async_trait]
pub trait Board: Send + Sync {
    /// Cards currently in the given list, in the board's natural order.
    async fn list_cards(&self, slot: ListSlot) -> Vec<Card>;

    /// Create a card in the default On Deck list.
    async fn create_card(&self, card: &NewCard) -> Result<Card, BoardError>;

    /// Relocate an existing card to `destination`.
    async fn relocate_card(&self, card_id: &str, destination: ListSlot) -> Result<(), BoardError>;
}

/// Find and relocate the first card whose name contains `task_query` as a
/// case-insensitive substring.
///
/// Chat text carries no card identifiers, only fuzzy names, so ambiguity
/// is accepted; determinism comes from the fixed search order (On Deck,
/// This Week, Pause, then each list's natural card order).
pub async fn move_matching(
    board: &dyn Board,
    task_query: &str,
    destination: ListSlot,
) -> Result<Card, BoardError> {
    let needle = task_query.to_lowercase();
    for slot in ListSlot::MOVE_SOURCES {
        for card in board.list_cards(slot).await {
            if card.name.to_lowercase().contains(&needle) {
                board.relocate_card(&card.id, destination).await?;
                return Ok(card);
            }
        }
    }
    Err(BoardError::CardNotFound {
        query: task_query.to_string(),
    })
}
