//! Date-grouped presentation of the todo list.
//!
//! Recomputed from the flat list on every change; nothing here is persisted.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Todo;
use crate::models::todo::{format_due, parse_due_date};

/// Variant order is display order: real dates first, then values that are
/// not dates, then todos with no due date at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GroupKey {
    Date(NaiveDate),
    Unparsed(String),
    NoDate,
}

impl GroupKey {
    pub fn of(todo: &Todo) -> Self {
        match todo.due_date.as_deref().map(str::trim) {
            None | Some("") => GroupKey::NoDate,
            Some(raw) => match parse_due_date(raw) {
                Some(date) => GroupKey::Date(date),
                None => GroupKey::Unparsed(raw.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: GroupKey,
    pub todos: Vec<Todo>,
}

impl Group {
    pub fn heading(&self) -> String {
        match &self.key {
            GroupKey::Date(date) => format_due(*date),
            GroupKey::Unparsed(raw) => raw.clone(),
            GroupKey::NoDate => "No due date".to_string(),
        }
    }
}

/// Groups keep the list's own order inside each group.
pub fn group_todos(todos: &[Todo]) -> Vec<Group> {
    let mut groups: BTreeMap<GroupKey, Vec<Todo>> = BTreeMap::new();
    for todo in todos {
        groups.entry(GroupKey::of(todo)).or_default().push(todo.clone());
    }

    groups
        .into_iter()
        .map(|(key, todos)| Group { key, todos })
        .collect()
}

/// Which groups the user has folded away.
#[derive(Debug, Default, Clone)]
pub struct BoardState {
    collapsed: HashSet<GroupKey>,
}

impl BoardState {
    /// Flips the group and returns whether it is now collapsed.
    pub fn toggle(&mut self, key: &GroupKey) -> bool {
        if self.collapsed.remove(key) {
            false
        } else {
            self.collapsed.insert(key.clone());
            true
        }
    }

    pub fn is_collapsed(&self, key: &GroupKey) -> bool {
        self.collapsed.contains(key)
    }
}
