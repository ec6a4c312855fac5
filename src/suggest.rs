//! Autocomplete suggestions
//!
//! Recomputed on every text change:
//! - Find the trigger (`@` or `#`) the cursor is still inside, if any.
//! - Filter the directory snapshot into the dropdown candidates.
//!
//! A trigger is open only while no whitespace has been typed after it. The
//! tokenizer accepts spaces inside a finished mention, so a multi-word name
//! can render as one mention yet never be completed past its first word here.

use crate::config::{ComposeConfig, EmptyQuerySampling};
use crate::cursor;
use crate::directory::{Department, Directory, Taggable, TicketSummary, User};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionMode {
    #[default]
    None,
    Mention,
    Ticket,
}

/// Trigger state for one keystroke. Rebuilt from scratch each time.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionContext {
    pub mode: SuggestionMode,
    /// Char offset of the trigger character
    pub trigger_start: Option<usize>,
    /// Text typed between the trigger and the cursor
    pub query: String,
    pub cursor: usize,
}

impl SuggestionContext {
    /// No trigger open at `cursor`.
    pub fn closed(cursor: usize) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }

    /// Walk back from the cursor to the nearest trigger, giving up at the
    /// first whitespace. The closest trigger wins, so `@Bob #4|` is a ticket
    /// query.
    pub fn detect(text: &str, cursor: usize) -> Self {
        let cursor = cursor::clamp(text, cursor);
        let before: Vec<char> = text.chars().take(cursor).collect();

        for (idx, &ch) in before.iter().enumerate().rev() {
            let mode = match ch {
                '@' => SuggestionMode::Mention,
                '#' => SuggestionMode::Ticket,
                c if c.is_whitespace() => break,
                _ => continue,
            };
            return Self {
                mode,
                trigger_start: Some(idx),
                query: before[idx + 1..].iter().collect(),
                cursor,
            };
        }

        Self::closed(cursor)
    }

    pub fn is_active(&self) -> bool {
        self.mode != SuggestionMode::None
    }
}

/// One dropdown entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    User(User),
    Department(Department),
    Ticket(TicketSummary),
}

impl Candidate {
    /// Text spliced into the message, trigger char included.
    pub fn insertion_text(&self) -> String {
        match self {
            Candidate::User(u) => format!("@{} ", u.name),
            Candidate::Department(d) => format!("@{} ", d.name),
            Candidate::Ticket(t) => format!("#{} ", t.ticket_number),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Candidate::User(u) => &u.id,
            Candidate::Department(d) => &d.id,
            Candidate::Ticket(t) => &t.id,
        }
    }
}

impl From<Taggable> for Candidate {
    fn from(t: Taggable) -> Self {
        match t {
            Taggable::User(u) => Candidate::User(u),
            Taggable::Department(d) => Candidate::Department(d),
        }
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Suggestions {
    pub context: SuggestionContext,
    pub candidates: Vec<Candidate>,
}

/// Compute the dropdown for `text` with the cursor at `cursor`.
pub fn suggest<R: Rng + ?Sized>(
    text: &str,
    cursor: usize,
    directory: &Directory,
    config: &ComposeConfig,
    rng: &mut R,
) -> Suggestions {
    let context = SuggestionContext::detect(text, cursor);

    let candidates = match context.mode {
        SuggestionMode::None => Vec::new(),
        SuggestionMode::Mention if context.query.is_empty() => {
            sample_taggables(directory, config, rng)
        }
        SuggestionMode::Mention => match_taggables(&context.query, directory, config),
        SuggestionMode::Ticket => match_tickets(&context.query, directory, config),
    };

    tracing::debug!(
        mode = ?context.mode,
        query = %context.query,
        candidates = candidates.len(),
        "suggestions computed"
    );

    Suggestions {
        context,
        candidates,
    }
}

fn sample_taggables<R: Rng + ?Sized>(
    directory: &Directory,
    config: &ComposeConfig,
    rng: &mut R,
) -> Vec<Candidate> {
    let mut departments: Vec<&Department> = directory.departments.iter().collect();
    let mut users: Vec<&User> = directory.users.iter().collect();
    let random = config.empty_query_sampling == EmptyQuerySampling::Random;

    if random {
        departments.shuffle(rng);
        users.shuffle(rng);
    }

    let mut picks: Vec<Candidate> = departments
        .into_iter()
        .take(config.sample_departments)
        .map(|d| Candidate::Department(d.clone()))
        .chain(
            users
                .into_iter()
                .take(config.sample_users)
                .map(|u| Candidate::User(u.clone())),
        )
        .collect();

    if random {
        picks.shuffle(rng);
    }
    picks
}

fn match_taggables(query: &str, directory: &Directory, config: &ComposeConfig) -> Vec<Candidate> {
    let q = query.to_lowercase();

    let departments = directory
        .departments
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&q))
        .map(|d| Candidate::Department(d.clone()));

    let users = directory
        .users
        .iter()
        .filter(|u| u.name.to_lowercase().contains(&q) || u.email.to_lowercase().contains(&q))
        .map(|u| Candidate::User(u.clone()));

    departments
        .chain(users)
        .take(config.max_mention_suggestions)
        .collect()
}

fn match_tickets(query: &str, directory: &Directory, config: &ComposeConfig) -> Vec<Candidate> {
    let q = query.to_lowercase();

    directory
        .tickets
        .iter()
        .filter(|t| !t.status.is_closed())
        .filter(|t| {
            q.is_empty()
                || t.ticket_number.to_string().contains(&q)
                || t.subject.to_lowercase().contains(&q)
        })
        .take(config.max_ticket_suggestions)
        .map(|t| Candidate::Ticket(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixtures::*;
    use crate::directory::TicketStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn directory() -> Directory {
        let mut tickets: Vec<TicketSummary> = (1..=12)
            .map(|n| ticket(&format!("t{n}"), 100 + n, &format!("Issue {n}"), TicketStatus::Open))
            .collect();
        tickets.push(ticket("tc", 4242, "Login loop", TicketStatus::Closed));
        tickets.push(ticket("tl", 500, "Login page blank", TicketStatus::InProgress));

        Directory::new(
            vec![
                user("u1", "Alice"),
                user("u2", "Alina Ops"),
                user("u3", "Bob"),
                user("u4", "Carol"),
            ],
            vec![
                department("d1", "Technical Support"),
                department("d2", "Billing"),
                department("d3", "Alignment"),
            ],
            tickets,
        )
    }

    fn run(text: &str, cursor: usize) -> Suggestions {
        let mut rng = StdRng::seed_from_u64(7);
        suggest(text, cursor, &directory(), &ComposeConfig::default(), &mut rng)
    }

    #[test]
    fn test_detects_mention_query() {
        let ctx = SuggestionContext::detect("hi @Ali", 7);
        assert_eq!(ctx.mode, SuggestionMode::Mention);
        assert_eq!(ctx.trigger_start, Some(3));
        assert_eq!(ctx.query, "Ali");
    }

    #[test]
    fn test_space_closes_trigger() {
        let ctx = SuggestionContext::detect("@Ali ce", 7);
        assert_eq!(ctx.mode, SuggestionMode::None);
        assert!(run("@Ali ce", 7).candidates.is_empty());
    }

    #[test]
    fn test_nearest_trigger_wins() {
        let ctx = SuggestionContext::detect("@Bob#1", 6);
        assert_eq!(ctx.mode, SuggestionMode::Ticket);
        assert_eq!(ctx.query, "1");

        let ctx = SuggestionContext::detect("#12@Al", 6);
        assert_eq!(ctx.mode, SuggestionMode::Mention);
        assert_eq!(ctx.query, "Al");
    }

    #[test]
    fn test_cursor_is_clamped() {
        let ctx = SuggestionContext::detect("@Bo", 99);
        assert_eq!(ctx.cursor, 3);
        assert_eq!(ctx.query, "Bo");
    }

    #[test]
    fn test_cursor_mid_text_ignores_later_chars() {
        let ctx = SuggestionContext::detect("@Bob hello", 2);
        assert_eq!(ctx.mode, SuggestionMode::Mention);
        assert_eq!(ctx.query, "B");
    }

    #[test]
    fn test_empty_query_sample_bounds() {
        let dir = directory();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let s = suggest("@", 1, &dir, &ComposeConfig::default(), &mut rng);
            let depts = s
                .candidates
                .iter()
                .filter(|c| matches!(c, Candidate::Department(_)))
                .count();
            let users = s.candidates.iter().filter(|c| matches!(c, Candidate::User(_))).count();
            assert!(s.candidates.len() <= 3);
            assert!(depts <= 1);
            assert!(users <= 2);
            assert!(s
                .candidates
                .iter()
                .all(|c| dir.user(c.id()).is_some() || dir.department(c.id()).is_some()));
        }
    }

    #[test]
    fn test_empty_query_first_n_is_stable() {
        let config = ComposeConfig {
            empty_query_sampling: EmptyQuerySampling::FirstN,
            ..ComposeConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let s = suggest("@", 1, &directory(), &config, &mut rng);
        let ids: Vec<&str> = s.candidates.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["d1", "u1", "u2"]);
    }

    #[test]
    fn test_mention_query_lists_departments_first_and_caps() {
        let s = run("@ali", 4);
        let ids: Vec<&str> = s.candidates.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["d3", "u1", "u2"]);
    }

    #[test]
    fn test_mention_query_matches_email() {
        let s = run("@bob@example", 12);
        // the second @ is the nearest trigger
        assert_eq!(s.context.query, "example");
        assert_eq!(s.candidates.len(), 3);

        let s = run("@a.ops", 6);
        assert_eq!(s.candidates.iter().map(|c| c.id()).collect::<Vec<_>>(), vec!["u2"]);
    }

    #[test]
    fn test_ticket_cap_and_closed_exclusion() {
        let s = run("#", 1);
        assert_eq!(s.context.mode, SuggestionMode::Ticket);
        assert_eq!(s.candidates.len(), 8);

        let s = run("#login", 6);
        let ids: Vec<&str> = s.candidates.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["tl"]);

        let s = run("#4242", 5);
        assert!(s.candidates.is_empty());
    }

    #[test]
    fn test_ticket_number_substring() {
        let s = run("see #10", 7);
        let ids: Vec<&str> = s.candidates.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8"]);

        let s = run("see #112", 8);
        assert_eq!(s.candidates.iter().map(|c| c.id()).collect::<Vec<_>>(), vec!["t12"]);
    }
}
