use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: u32,
    pub number: u32,
    #[serde(default)]
    pub is_occupied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoardData {
    pub tables: BTreeMap<u32, Table>,
}

impl BoardData {
    /// Tables in display order.
    pub fn ordered(&self) -> Vec<&Table> {
        let mut tables: Vec<&Table> = self.tables.values().collect();
        tables.sort_by_key(|table| table.number);
        tables
    }

    pub fn next_id(&self) -> u32 {
        self.tables.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn next_number(&self) -> u32 {
        self.tables
            .values()
            .map(|table| table.number)
            .max()
            .map_or(1, |number| number + 1)
    }

    /// Appends a free table numbered after the current highest one.
    pub fn add_table(&mut self) -> Table {
        let table = Table {
            id: self.next_id(),
            number: self.next_number(),
            is_occupied: false,
        };
        self.tables.insert(table.id, table.clone());
        table
    }
}

/// Body of a toggle answer. The flag is optional on the wire so a missing
/// field can be told apart from `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_occupied: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<Table>,
}
