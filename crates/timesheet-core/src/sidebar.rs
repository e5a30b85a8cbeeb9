use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Name,
    Number,
}

/// Sidebar user search. The signed-in user is pinned and checked by default.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    me: UserSummary,
    include_me: bool,
    users: Vec<UserSummary>,
    search_by: SearchField,
    query: String,
    selected: Vec<String>,
}

impl UserDirectory {
    pub fn new(me: UserSummary, users: Vec<UserSummary>) -> Self {
        Self {
            me,
            include_me: true,
            users,
            search_by: SearchField::default(),
            query: String::new(),
            selected: Vec::new(),
        }
    }

    pub fn me(&self) -> &UserSummary {
        &self.me
    }

    pub fn search_by(&mut self, field: SearchField) {
        self.search_by = field;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    pub fn filtered(&self) -> Vec<&UserSummary> {
        self.users
            .iter()
            .filter(|u| match self.search_by {
                SearchField::Name => u.name.contains(&self.query),
                SearchField::Number => u.number.contains(&self.query),
            })
            .collect()
    }

    pub fn toggle(&mut self, user_id: &str) {
        if let Some(idx) = self.selected.iter().position(|id| id == user_id) {
            self.selected.remove(idx);
            debug!(user_id, "user deselected");
        } else if self.users.iter().any(|u| u.id == user_id) {
            self.selected.push(user_id.to_string());
            debug!(user_id, "user selected");
        }
    }

    pub fn set_include_me(&mut self, include: bool) {
        self.include_me = include;
    }

    /// Ids whose entries should be shown on the calendar.
    pub fn visible_user_ids(&self) -> Vec<&str> {
        let mut ids = Vec::with_capacity(self.selected.len() + 1);
        if self.include_me {
            ids.push(self.me.id.as_str());
        }
        ids.extend(self.selected.iter().map(String::as_str));
        ids
    }
}
