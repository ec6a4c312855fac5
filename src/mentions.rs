//! Mention and ticket-reference tokenizer
//!
//! Single pass over the message chars, producing contiguous tokens that cover
//! the whole string.
//! - `@name` spans resolve against departments first, then users.
//!   Multi-word names resolve when the words after `@` spell a known name;
//!   otherwise the span is the first word and stays unresolved. Spaces right
//!   after the `@` are part of the span and trimmed before lookup.
//! - `#digits` spans resolve against ticket numbers.
//!
//! Used both to render sent messages and to collect the ids submitted with a
//! new message.

use crate::directory::{Directory, Taggable};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// A classified span of a message. Spans are half-open char ranges.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    PlainText {
        span: Range<usize>,
        text: String,
    },
    UserMention {
        span: Range<usize>,
        text: String,
        user_id: String,
        name: String,
    },
    DepartmentMention {
        span: Range<usize>,
        text: String,
        department_id: String,
        name: String,
    },
    /// Styled like a mention but carries no id.
    UnresolvedMention {
        span: Range<usize>,
        text: String,
    },
    TicketReference {
        span: Range<usize>,
        text: String,
        number: String,
        ticket_id: Option<String>,
    },
}

impl Token {
    pub fn span(&self) -> &Range<usize> {
        match self {
            Token::PlainText { span, .. }
            | Token::UserMention { span, .. }
            | Token::DepartmentMention { span, .. }
            | Token::UnresolvedMention { span, .. }
            | Token::TicketReference { span, .. } => span,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Token::PlainText { text, .. }
            | Token::UserMention { text, .. }
            | Token::DepartmentMention { text, .. }
            | Token::UnresolvedMention { text, .. }
            | Token::TicketReference { text, .. } => text,
        }
    }
}

/// Ids collected from a message, each list in order of first appearance.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReferences {
    pub user_ids: Vec<String>,
    pub department_ids: Vec<String>,
    pub ticket_ids: Vec<String>,
}

impl ResolvedReferences {
    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.department_ids.is_empty() && self.ticket_ids.is_empty()
    }
}

fn is_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn collect(chars: &[char], range: Range<usize>) -> String {
    chars[range].iter().collect()
}

/// Lowercased names of every mention target, built once per tokenize call.
/// Departments are indexed first so they win over users of the same name.
struct NameIndex {
    by_name: HashMap<String, Taggable>,
    /// Most words in any known name; bounds how far a mention can reach
    max_words: usize,
}

impl NameIndex {
    fn new(directory: &Directory) -> Self {
        let mut by_name = HashMap::new();
        let mut max_words = 1;

        let targets = directory
            .departments
            .iter()
            .map(|d| Taggable::Department(d.clone()))
            .chain(directory.users.iter().map(|u| Taggable::User(u.clone())));

        for target in targets {
            let words = target.name().split(' ').filter(|w| !w.is_empty()).count();
            max_words = max_words.max(words);
            by_name.entry(target.name().to_lowercase()).or_insert(target);
        }

        Self { by_name, max_words }
    }

    fn lookup(&self, name: &str) -> Option<&Taggable> {
        self.by_name.get(&name.trim().to_lowercase())
    }
}

/// Scan an `@` span starting at `at`. Spaces may sit between the `@` and the
/// first word. Returns the span end and the resolved target, or `None` when
/// no word follows the `@`.
fn scan_mention(chars: &[char], at: usize, index: &NameIndex) -> Option<(usize, Option<Taggable>)> {
    let mut pos = at + 1;
    while pos < chars.len() && chars[pos] == ' ' {
        pos += 1;
    }
    if pos >= chars.len() || !is_word(chars[pos]) {
        return None;
    }

    // Candidate ends sit right after each word, up to the longest known name.
    let mut ends = Vec::new();
    while ends.len() < index.max_words {
        while pos < chars.len() && is_word(chars[pos]) {
            pos += 1;
        }
        ends.push(pos);

        let mut next = pos;
        while next < chars.len() && chars[next] == ' ' {
            next += 1;
        }
        if next >= chars.len() || !is_word(chars[next]) {
            break;
        }
        pos = next;
    }

    for &end in ends.iter().rev() {
        let name = collect(chars, (at + 1)..end);
        if let Some(target) = index.lookup(&name) {
            return Some((end, Some(target.clone())));
        }
    }

    Some((ends[0], None))
}

/// Scan a `#` span starting at `at`; needs at least one ASCII digit.
fn scan_ticket(chars: &[char], at: usize) -> Option<usize> {
    let mut end = at + 1;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    (end > at + 1).then_some(end)
}

/// Split `content` into tokens. An empty string yields no tokens.
pub fn tokenize(content: &str, directory: &Directory) -> Vec<Token> {
    let chars: Vec<char> = content.chars().collect();
    let index = NameIndex::new(directory);
    let mut tokens = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    let flush = |tokens: &mut Vec<Token>, from: usize, to: usize| {
        if to > from {
            tokens.push(Token::PlainText {
                span: from..to,
                text: collect(&chars, from..to),
            });
        }
    };

    while i < chars.len() {
        let span = match chars[i] {
            '@' => scan_mention(&chars, i, &index).map(|(end, target)| {
                let text = collect(&chars, i..end);
                match target {
                    Some(Taggable::Department(d)) => Token::DepartmentMention {
                        span: i..end,
                        text,
                        department_id: d.id,
                        name: d.name,
                    },
                    Some(Taggable::User(u)) => Token::UserMention {
                        span: i..end,
                        text,
                        user_id: u.id,
                        name: u.name,
                    },
                    None => Token::UnresolvedMention { span: i..end, text },
                }
            }),
            '#' => scan_ticket(&chars, i).map(|end| {
                let number = collect(&chars, (i + 1)..end);
                let ticket_id = directory.ticket_by_number(&number).map(|t| t.id.clone());
                Token::TicketReference {
                    span: i..end,
                    text: collect(&chars, i..end),
                    number,
                    ticket_id,
                }
            }),
            _ => None,
        };

        match span {
            Some(token) => {
                flush(&mut tokens, plain_start, i);
                i = token.span().end;
                plain_start = i;
                tokens.push(token);
            }
            None => i += 1,
        }
    }

    flush(&mut tokens, plain_start, chars.len());
    tokens
}

/// Collect the deduplicated ids a message refers to.
pub fn extract_references(content: &str, directory: &Directory) -> ResolvedReferences {
    let mut refs = ResolvedReferences::default();
    let mut seen = HashSet::new();

    for token in tokenize(content, directory) {
        match token {
            Token::UserMention { user_id, .. } => {
                if seen.insert(("user", user_id.clone())) {
                    refs.user_ids.push(user_id);
                }
            }
            Token::DepartmentMention { department_id, .. } => {
                if seen.insert(("department", department_id.clone())) {
                    refs.department_ids.push(department_id);
                }
            }
            Token::TicketReference {
                ticket_id: Some(ticket_id),
                ..
            } => {
                if seen.insert(("ticket", ticket_id.clone())) {
                    refs.ticket_ids.push(ticket_id);
                }
            }
            _ => {}
        }
    }

    refs
}
