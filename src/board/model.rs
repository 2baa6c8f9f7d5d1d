//! Board data model — only the fields this router consumes.

use serde::Deserialize;

/// A single card on the board. Never cached; every operation re-fetches
/// current state from the remote board.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub name: String,
}

/// Parameters for creating a card in the default (On Deck) list.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub title: String,
    pub client: String,
    pub notes: Option<String>,
    /// `YYYY-MM-DD`, attached as the card's due timestamp when present.
    pub due_date: Option<String>,
}

impl NewCard {
    /// Compose the card description: the client line, optionally followed
    /// by a blank line and free-form notes.
    pub fn description(&self) -> String {
        match self.notes.as_deref() {
            Some(notes) if !notes.is_empty() => {
                format!("Client: {}\n\n{}", self.client, notes)
            }
            _ => format!("Client: {}", self.client),
        }
    }
}
