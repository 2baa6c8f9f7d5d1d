//! boardbot — Slack webhook command router for a Trello board.

pub mod board;
pub mod command;
pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod slack;
