//! Trello REST client.
//!
//! Authenticates every call with `key`/`token` query parameters. List
//! fetches degrade to an empty result on failure; card mutations surface
//! a `BoardError` to the caller.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::board::{Board, Card, NewCard};
use crate::command::ListSlot;
use crate::config::{ListIds, TrelloConfig};
use crate::error::BoardError;

const TRELLO_API_BASE: &str = "https://api.trello.com/1";

/// Bounded timeout for every board call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Trello-backed implementation of the `Board` trait.
pub struct TrelloClient {
    config: TrelloConfig,
    lists: ListIds,
    base_url: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(config: TrelloConfig, lists: ListIds) -> Self {
        Self::with_base_url(config, lists, TRELLO_API_BASE)
    }

    /// Point the client at a different API base (used in tests).
    pub fn with_base_url(config: TrelloConfig, lists: ListIds, base_url: impl Into<String>) -> Self {
        Self {
            config,
            lists,
            base_url: base_url.into(),
            // Construction happens once at startup; a failure here means
            // no board call could ever succeed.
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build board HTTP client"),
        }
    }

    fn list_id(&self, slot: ListSlot) -> &str {
        match slot {
            ListSlot::OnDeck => &self.lists.on_deck,
            ListSlot::ThisWeek => &self.lists.this_week,
            ListSlot::Pause => &self.lists.pause,
            ListSlot::Done => &self.lists.done,
        }
    }

    fn auth_params(&self) -> [(&'static str, &str); 2] {
        [
            ("key", self.config.api_key.expose_secret()),
            ("token", self.config.token.expose_secret()),
        ]
    }
}

#[async_trait]
impl Board for TrelloClient {
    async fn list_cards(&self, slot: ListSlot) -> Vec<Card> {
        let url = format!("{}/lists/{}/cards", self.base_url, self.list_id(slot));
        let resp = match self
            .client
            .get(&url)
            .query(&self.auth_params())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(list = slot.name(), error = %e, "Board list fetch failed");
                return Vec::new();
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(
                list = slot.name(),
                status = %resp.status(),
                "Board list fetch returned non-success"
            );
            return Vec::new();
        }

        match resp.json::<Vec<Card>>().await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(list = slot.name(), error = %e, "Board list response malformed");
                Vec::new()
            }
        }
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card, BoardError> {
        let url = format!("{}/cards", self.base_url);
        let description = card.description();

        let mut params: Vec<(&str, &str)> = self.auth_params().to_vec();
        params.push(("idList", self.list_id(ListSlot::OnDeck)));
        params.push(("name", card.title.as_str()));
        params.push(("desc", description.as_str()));
        if let Some(due) = card.due_date.as_deref() {
            params.push(("due", due));
        }

        let resp = self
            .client
            .post(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| BoardError::RemoteFailure {
                operation: "create_card".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(BoardError::RemoteStatus {
                operation: "create_card".into(),
                status: resp.status().as_u16(),
            });
        }

        resp.json::<Card>().await.map_err(|e| BoardError::RemoteFailure {
            operation: "create_card".into(),
            reason: e.to_string(),
        })
    }

    async fn relocate_card(&self, card_id: &str, destination: ListSlot) -> Result<(), BoardError> {
        let url = format!("{}/cards/{card_id}", self.base_url);

        let mut params: Vec<(&str, &str)> = self.auth_params().to_vec();
        params.push(("idList", self.list_id(destination)));

        let resp = self
            .client
            .put(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| BoardError::RemoteFailure {
                operation: "relocate_card".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(BoardError::RemoteStatus {
                operation: "relocate_card".into(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_client() -> TrelloClient {
        TrelloClient::with_base_url(
            TrelloConfig {
                api_key: SecretString::from("k"),
                token: SecretString::from("t"),
            },
            ListIds {
                on_deck: "list-od".into(),
                this_week: "list-tw".into(),
                pause: "list-p".into(),
                done: "list-d".into(),
            },
            // Unroutable host: calls fail fast at the transport layer.
            "http://127.0.0.1:1/1",
        )
    }

    #[test]
    fn list_ids_map_to_slots() {
        let client = test_client();
        assert_eq!(client.list_id(ListSlot::OnDeck), "list-od");
        assert_eq!(client.list_id(ListSlot::ThisWeek), "list-tw");
        assert_eq!(client.list_id(ListSlot::Pause), "list-p");
        assert_eq!(client.list_id(ListSlot::Done), "list-d");
    }

    #[tokio::test]
    async fn list_fetch_degrades_to_empty_on_transport_failure() {
        let client = test_client();
        let cards = client.list_cards(ListSlot::OnDeck).await;
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn create_surfaces_transport_failure() {
        let client = test_client();
        let err = client
            .create_card(&NewCard {
                title: "x".into(),
                client: "y".into(),
                notes: None,
                due_date: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::RemoteFailure { .. }));
    }

    #[tokio::test]
    async fn relocate_surfaces_transport_failure() {
        let client = test_client();
        let err = client
            .relocate_card("card-1", ListSlot::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::RemoteFailure { .. }));
    }
}
