//! Participant directory
//!
//! Read-only snapshots of the people, departments and tickets a message can
//! refer to. The host app refetches these periodically and hands the latest
//! snapshot to every call; nothing here is ever mutated by the composer.
//! - Users and departments are `@` mention targets (`Taggable`)
//! - Tickets are `#` reference targets, keyed by their number

use serde::{Deserialize, Serialize};

/// Staff member as supplied by the host app
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

/// Department as supplied by the host app
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub member_count: usize,
}

fn default_active() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Closed,
    #[serde(other)]
    Other,
}

impl TicketStatus {
    pub fn is_closed(&self) -> bool {
        matches!(self, TicketStatus::Closed)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub id: String,
    pub ticket_number: u64,
    pub subject: String,
    pub status: TicketStatus,
}

/// Anything that can follow an `@`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Taggable {
    User(User),
    Department(Department),
}

impl Taggable {
    pub fn id(&self) -> &str {
        match self {
            Taggable::User(u) => &u.id,
            Taggable::Department(d) => &d.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Taggable::User(u) => &u.name,
            Taggable::Department(d) => &d.name,
        }
    }
}

/// Snapshot of everything a message may mention.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Directory {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub tickets: Vec<TicketSummary>,
}

impl Directory {
    /// Build a snapshot, keeping only active users and departments.
    ///
    /// Department member counts are recomputed from the active users whenever
    /// any user carries a department id; otherwise the supplied counts stand.
    pub fn new(
        users: Vec<User>,
        departments: Vec<Department>,
        tickets: Vec<TicketSummary>,
    ) -> Self {
        let users: Vec<User> = users.into_iter().filter(|u| u.is_active).collect();
        let track_members = users.iter().any(|u| u.department_id.is_some());

        let departments = departments
            .into_iter()
            .filter(|d| d.is_active)
            .map(|mut d| {
                if track_members {
                    d.member_count = users
                        .iter()
                        .filter(|u| u.department_id.as_deref() == Some(d.id.as_str()))
                        .count();
                }
                d
            })
            .collect();

        Self {
            users,
            departments,
            tickets,
        }
    }

    /// Re-apply the active filters after deserializing a raw snapshot.
    pub fn normalized(self) -> Self {
        Self::new(self.users, self.departments, self.tickets)
    }

    /// Case-insensitive exact match on the trimmed department name
    pub fn department_by_name(&self, name: &str) -> Option<&Department> {
        let needle = name.trim().to_lowercase();
        self.departments
            .iter()
            .find(|d| d.name.to_lowercase() == needle)
    }

    /// Case-insensitive exact match on the trimmed user name
    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        let needle = name.trim().to_lowercase();
        self.users.iter().find(|u| u.name.to_lowercase() == needle)
    }

    /// Departments take precedence over users carrying the same name.
    pub fn taggable_by_name(&self, name: &str) -> Option<Taggable> {
        if let Some(d) = self.department_by_name(name) {
            return Some(Taggable::Department(d.clone()));
        }
        self.user_by_name(name).map(|u| Taggable::User(u.clone()))
    }

    /// Ticket numbers are compared as strings, so `#007` does not match 7.
    pub fn ticket_by_number(&self, digits: &str) -> Option<&TicketSummary> {
        self.tickets
            .iter()
            .find(|t| t.ticket_number.to_string() == digits)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    /// Active members of a department
    pub fn members_of(&self, department_id: &str) -> Vec<&User> {
        self.users
            .iter()
            .filter(|u| u.department_id.as_deref() == Some(department_id))
            .collect()
    }
}
