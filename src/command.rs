//! Command classification for inbound chat text.
//!
//! Runs over the trimmed, lower-cased text and checks prefixes in a fixed
//! priority order:
//! - `status:` → status digest request
//! - `new: <title> for <client> due <YYYYMMDD>` → create a card
//! - `start:` / `pause:` / `done:` → move a card by fuzzy name match
//!
//! A malformed `new:` line is reported back to the user as unrecognized
//! (carrying the original-case text); any other non-command text produces
//! no command at all and the router stays silent.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// One of the board's fixed lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSlot {
    OnDeck,
    ThisWeek,
    Pause,
    Done,
}

impl ListSlot {
    /// Lists searched for a move target, in fixed priority order.
    pub const MOVE_SOURCES: [ListSlot; 3] = [ListSlot::OnDeck, ListSlot::ThisWeek, ListSlot::Pause];

    /// Human-readable list name for logs.
    pub fn name(self) -> &'static str {
        match self {
            ListSlot::OnDeck => "On Deck",
            ListSlot::ThisWeek => "This Week",
            ListSlot::Pause => "Pause",
            ListSlot::Done => "Done",
        }
    }
}

/// The classified intent of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render the On Deck / This Week digest.
    StatusQuery,
    /// Create a card in On Deck.
    CreateCard {
        title: String,
        client: String,
        /// `YYYY-MM-DD`, already validated as a calendar date.
        due_date: Option<String>,
    },
    /// Relocate the first card whose name contains `task_query`.
    MoveCard {
        task_query: String,
        destination: ListSlot,
    },
    /// A `new:` line that did not match the expected shape. Carries the
    /// original-case text so the failure can be echoed back.
    Unrecognized { raw_text: String },
}

fn create_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^new:\s*(.+?)\s+for\s+(.+?)\s+due\s+(\d{8})\s*$")
            .expect("create pattern is valid")
    })
}

/// Classify one line of chat text.
///
/// Prefixes are matched against the trimmed, lower-cased text, anchored at
/// the start. Returns `None` for text that is not addressed to the router.
pub fn parse(raw_text: &str) -> Option<Command> {
    let normalized = raw_text.trim().to_lowercase();

    if normalized.starts_with("status:") {
        return Some(Command::StatusQuery);
    }

    if normalized.starts_with("new:") {
        let command = match create_pattern().captures(&normalized) {
            Some(caps) => {
                let due = format_due_date(&caps[3]);
                if due.is_none() {
                    // Eight digits but not a real calendar date.
                    Command::Unrecognized {
                        raw_text: raw_text.trim().to_string(),
                    }
                } else {
                    Command::CreateCard {
                        title: caps[1].to_string(),
                        client: caps[2].to_string(),
                        due_date: due,
                    }
                }
            }
            None => Command::Unrecognized {
                raw_text: raw_text.trim().to_string(),
            },
        };
        return Some(command);
    }

    for (prefix, destination) in [
        ("start:", ListSlot::ThisWeek),
        ("pause:", ListSlot::Pause),
        ("done:", ListSlot::Done),
    ] {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            return Some(Command::MoveCard {
                task_query: rest.trim().to_string(),
                destination,
            });
        }
    }

    None
}

/// Reformat an 8-digit `YYYYMMDD` string as `YYYY-MM-DD`, rejecting
/// impossible dates.
fn format_due_date(digits: &str) -> Option<String> {
    NaiveDate::parse_from_str(digits, "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prefix() {
        assert_eq!(parse("status: "), Some(Command::StatusQuery));
    }

    #[test]
    fn status_case_and_whitespace_insensitive() {
        assert_eq!(parse("  STATUS: anything  "), Some(Command::StatusQuery));
    }

    #[test]
    fn status_not_matched_mid_string() {
        assert_eq!(parse("what is status: now"), None);
    }

    #[test]
    fn create_with_due_date() {
        let cmd = parse("new: Redesign logo for Acme due 20240915");
        assert_eq!(
            cmd,
            Some(Command::CreateCard {
                title: "redesign logo".into(),
                client: "acme".into(),
                due_date: Some("2024-09-15".into()),
            })
        );
    }

    #[test]
    fn create_malformed_is_unrecognized_with_original_case() {
        let cmd = parse("new: Bad Format Text");
        assert_eq!(
            cmd,
            Some(Command::Unrecognized {
                raw_text: "new: Bad Format Text".into(),
            })
        );
    }

    #[test]
    fn create_rejects_impossible_date() {
        let cmd = parse("new: thing for someone due 20241399");
        assert!(matches!(cmd, Some(Command::Unrecognized { .. })));
    }

    #[test]
    fn create_date_must_be_exactly_eight_digits() {
        assert!(matches!(
            parse("new: thing for someone due 2024091"),
            Some(Command::Unrecognized { .. })
        ));
        assert!(matches!(
            parse("new: thing for someone due 202409155"),
            Some(Command::Unrecognized { .. })
        ));
    }

    #[test]
    fn create_title_is_non_greedy_around_for() {
        // "for" appears in both title and client positions; the first
        // separating "for" wins.
        let cmd = parse("new: wait for review for Acme due 20240901");
        assert_eq!(
            cmd,
            Some(Command::CreateCard {
                title: "wait".into(),
                client: "review for acme".into(),
                due_date: Some("2024-09-01".into()),
            })
        );
    }

    #[test]
    fn start_moves_to_this_week() {
        assert_eq!(
            parse("start: Redesign logo"),
            Some(Command::MoveCard {
                task_query: "redesign logo".into(),
                destination: ListSlot::ThisWeek,
            })
        );
    }

    #[test]
    fn pause_moves_to_pause() {
        assert_eq!(
            parse("pause: logo"),
            Some(Command::MoveCard {
                task_query: "logo".into(),
                destination: ListSlot::Pause,
            })
        );
    }

    #[test]
    fn done_moves_to_done() {
        assert_eq!(
            parse("done: logo "),
            Some(Command::MoveCard {
                task_query: "logo".into(),
                destination: ListSlot::Done,
            })
        );
    }

    #[test]
    fn plain_chatter_is_no_command() {
        assert_eq!(parse("hey, lunch at noon?"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn parse_is_deterministic() {
        for input in ["status:", "new: a for b due 20240101", "start: x", "hi"] {
            assert_eq!(parse(input), parse(input));
        }
    }
}
