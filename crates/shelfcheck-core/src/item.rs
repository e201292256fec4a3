//! Items and the task set submitted in one run.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// One query to look up, tagged with its submission position.
///
/// Position is 1-based and only used to order the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    position: usize,
    query: String,
}

impl Item {
    /// Create a new Item. Positions start at 1.
    pub fn new(position: usize, query: impl Into<String>) -> Result<Self, CoreError> {
        if position == 0 {
            return Err(CoreError::InvalidPosition(position));
        }
        Ok(Self {
            position,
            query: query.into(),
        })
    }

    /// 1-based submission position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The query string. Treat as sensitive: it belongs in notifications,
    /// not in shared logs.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// The ordered items submitted in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSet {
    items: Vec<Item>,
}

impl TaskSet {
    /// Number queries in order, starting at position 1.
    pub fn from_queries<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = queries
            .into_iter()
            .enumerate()
            .map(|(idx, query)| Item {
                position: idx + 1,
                query: query.into(),
            })
            .collect();
        Self { items }
    }

    /// Parse a semicolon-separated list such as `"Book1; Book Number2; Book3"`.
    ///
    /// Entries are trimmed and blank entries are skipped before numbering.
    pub fn parse(list: &str) -> Result<Self, CoreError> {
        let set = Self::from_queries(
            list.split(';')
                .map(str::trim)
                .filter(|entry| !entry.is_empty()),
        );
        if set.is_empty() {
            return Err(CoreError::EmptyTaskSet);
        }
        Ok(set)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by its position.
    pub fn get(&self, position: usize) -> Option<&Item> {
        position
            .checked_sub(1)
            .and_then(|idx| self.items.get(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
