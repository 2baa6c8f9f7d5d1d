//! Webhook dispatch: dedup check, command classification, board calls,
//! and the status digest.
//!
//! Side effects are strictly ordered: the dedup check precedes any board
//! mutation, and the processed mark follows all other side effects. A
//! crash between a mutation and the mark can therefore repeat the mutation
//! on redelivery; that window is accepted (board mutations resolve by name
//! match, so a repeat still finds its card).

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::board::{self, Board, Card, NewCard};
use crate::command::{self, Command, ListSlot};
use crate::dedup::ProcessedStore;
use crate::error::BoardError;
use crate::slack::{Notifier, WebhookPayload};

/// One inbound message event, reduced to the fields the router consumes.
#[derive(Debug, Clone)]
pub struct Event {
    /// Platform-assigned identifier, used for deduplication.
    pub id: String,
    pub channel: String,
    pub text: String,
}

/// What the webhook handler should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// URL-verification handshake; echo the challenge.
    Challenge(String),
    /// Event was already processed; acknowledged without side effects.
    Duplicate,
    /// A command was dispatched (or its failure reported).
    Handled,
    /// The text was not addressed to the router.
    NoCommand,
    /// Payload carried no usable message event.
    Ignored,
}

/// Orchestrates dedup, parsing, and board calls for each inbound event.
pub struct Dispatcher {
    board: Arc<dyn Board>,
    store: Arc<dyn ProcessedStore>,
    notifier: Arc<dyn Notifier>,
    /// Event ids currently being handled. Claimed under one lock together
    /// with the durable-store check, so two concurrent deliveries of the
    /// same id cannot both pass the dedup gate.
    in_flight: Mutex<HashSet<String>>,
}

impl Dispatcher {
    pub fn new(
        board: Arc<dyn Board>,
        store: Arc<dyn ProcessedStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            board,
            store,
            notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Atomically claim an event id for handling. Returns false if the id
    /// is already recorded as processed or is being handled right now.
    async fn try_claim(&self, event_id: &str) -> bool {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.contains(event_id) {
            return false;
        }
        if self.store.has_processed(event_id).await {
            return false;
        }
        in_flight.insert(event_id.to_string());
        true
    }

    async fn release(&self, event_id: &str) {
        self.in_flight.lock().await.remove(event_id);
    }

    /// Handle one webhook delivery end to end.
    ///
    /// The handshake short-circuits everything, including dedup. Payloads
    /// missing the message fields are acknowledged and dropped.
    pub async fn handle_payload(&self, payload: &WebhookPayload) -> Outcome {
        if let Some(challenge) = payload.verification_challenge() {
            return Outcome::Challenge(challenge.to_string());
        }

        let Some(event) = payload.event.as_ref() else {
            return Outcome::Ignored;
        };
        let (Some(ts), Some(channel), Some(text)) =
            (event.ts.as_deref(), event.channel.as_deref(), event.text.as_deref())
        else {
            tracing::debug!("Event payload missing ts/channel/text, ignoring");
            return Outcome::Ignored;
        };

        self.handle_event(&Event {
            id: ts.to_string(),
            channel: channel.to_string(),
            text: text.to_string(),
        })
        .await
    }

    /// Handle one message event: claim the id, classify, dispatch, mark.
    pub async fn handle_event(&self, event: &Event) -> Outcome {
        if !self.try_claim(&event.id).await {
            tracing::debug!(event_id = %event.id, "Duplicate delivery, skipping");
            return Outcome::Duplicate;
        }

        let outcome = match command::parse(&event.text) {
            Some(cmd) => {
                self.run_command(event, cmd).await;
                Outcome::Handled
            }
            None => Outcome::NoCommand,
        };

        // Durable marking follows all other side effects. A write failure
        // must not block the ack already owed to the platform.
        if let Err(e) = self.store.mark_processed(&event.id).await {
            tracing::warn!(event_id = %event.id, error = %e, "Failed to record processed event");
        }
        self.release(&event.id).await;

        outcome
    }

    async fn run_command(&self, event: &Event, cmd: Command) {
        match cmd {
            Command::StatusQuery => {
                let on_deck = self.board.list_cards(ListSlot::OnDeck).await;
                let this_week = self.board.list_cards(ListSlot::ThisWeek).await;
                let digest = render_status(&on_deck, &this_week);
                self.reply(&event.channel, &digest).await;
            }
            Command::CreateCard {
                title,
                client,
                due_date,
            } => {
                let new_card = NewCard {
                    title,
                    client,
                    notes: None,
                    due_date,
                };
                match self.board.create_card(&new_card).await {
                    Ok(card) => {
                        tracing::info!(card_id = %card.id, name = %card.name, "Card created");
                    }
                    Err(e) => {
                        tracing::warn!(title = %new_card.title, error = %e, "Card creation failed");
                    }
                }
            }
            Command::MoveCard {
                task_query,
                destination,
            } => match board::move_matching(self.board.as_ref(), &task_query, destination).await {
                Ok(card) => {
                    tracing::info!(
                        card_id = %card.id,
                        name = %card.name,
                        destination = destination.name(),
                        "Card moved"
                    );
                }
                Err(BoardError::CardNotFound { query }) => {
                    tracing::warn!(query = %query, "No card matched move query");
                }
                Err(e) => {
                    tracing::warn!(query = %task_query, error = %e, "Card move failed");
                }
            },
            Command::Unrecognized { raw_text } => {
                let reply = format!("Sorry, I couldn't parse that command: \"{raw_text}\"");
                self.reply(&event.channel, &reply).await;
            }
        }
    }

    async fn reply(&self, channel: &str, text: &str) {
        if let Err(e) = self.notifier.post_message(channel, text).await {
            tracing::warn!(channel = %channel, error = %e, "Failed to post reply");
        }
    }
}

/// Render the two-section status digest.
pub fn render_status(on_deck: &[Card], this_week: &[Card]) -> String {
    let mut message = String::from("*📋 Status On Deck:*\n");
    message.push_str(&render_section(on_deck));
    message.push_str("\n\n*🟢 Status This Week:*\n");
    message.push_str(&render_section(this_week));
    message
}

fn render_section(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "No cards.".to_string();
    }
    cards
        .iter()
        .map(|card| format!("• {}", card.name))
        .collect::<Vec<_>>()
        .join("\n")
}
