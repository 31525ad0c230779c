use crate::aggregate::count_deduplicated_by_table;
use crate::labels::display_name_for;
use crate::models::Registrant;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Seat limits per capacity-tracked table, in configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCapacity {
    tables: Vec<(String, u32)>,
}

impl TableCapacity {
    pub fn new(tables: Vec<(String, u32)>) -> Self {
        Self { tables }
    }

    pub fn limit(&self, table: &str) -> Option<u32> {
        self.tables
            .iter()
            .find(|(id, _)| id == table)
            .map(|(_, limit)| *limit)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> + Clone {
        self.tables.iter().map(|(id, _)| id.as_str())
    }
}

impl Default for TableCapacity {
    fn default() -> Self {
        Self::new(vec![
            ("it".to_string(), 5),
            ("japanese".to_string(), 10),
            ("board-game".to_string(), 10),
            ("free-talk".to_string(), 10),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityParseError(String);

impl fmt::Display for CapacityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid table capacity entry '{}' (expected id=limit)", self.0)
    }
}

impl std::error::Error for CapacityParseError {}

/// Parses `id=limit,id=limit`.
impl FromStr for TableCapacity {
    type Err = CapacityParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut tables: Vec<(String, u32)> = Vec::new();
        for entry in value.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (id, limit) = entry
                .split_once('=')
                .ok_or_else(|| CapacityParseError(entry.to_string()))?;
            let id = id.trim();
            let limit = limit
                .trim()
                .parse::<u32>()
                .map_err(|_| CapacityParseError(entry.to_string()))?;
            if id.is_empty() {
                return Err(CapacityParseError(entry.to_string()));
            }
            match tables.iter_mut().find(|(existing, _)| existing == id) {
                Some(slot) => slot.1 = limit,
                None => tables.push((id.to_string(), limit)),
            }
        }
        Ok(Self::new(tables))
    }
}

/// `None` when the table is not capacity-limited. Overbooking clamps to zero.
pub fn remaining_spots(table: &str, deduped_count: u64, capacity: &TableCapacity) -> Option<u32> {
    let limit = capacity.limit(table)?;
    let taken = u32::try_from(deduped_count).unwrap_or(u32::MAX);
    Some(limit.saturating_sub(taken))
}

pub fn is_full(table: &str, deduped_count: u64, capacity: &TableCapacity) -> Option<bool> {
    remaining_spots(table, deduped_count, capacity).map(|left| left == 0)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableSpots {
    pub table: String,
    pub label: String,
    pub capacity: u32,
    pub taken: u64,
    pub remaining: u32,
    pub full: bool,
    pub option_text: String,
}

/// Spot availability for every tracked table, for the registration form.
/// Display only: nothing stops a write against a full table.
pub fn table_spots(registrants: &[Registrant], capacity: &TableCapacity) -> Vec<TableSpots> {
    let taken = count_deduplicated_by_table(registrants, capacity.tables());
    capacity
        .tables
        .iter()
        .map(|(table, limit)| {
            let count = taken.get(table);
            let remaining = remaining_spots(table, count, capacity).unwrap_or(0);
            let full = remaining == 0;
            let label = display_name_for(table);
            let mut option_text = format!("{label} (spot left: {remaining})");
            if full {
                option_text.push_str(" - FULL");
            }
            TableSpots {
                table: table.clone(),
                label,
                capacity: *limit,
                taken: count,
                remaining,
                full,
                option_text,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_it(limit: u32) -> TableCapacity {
        TableCapacity::new(vec![("it".to_string(), limit)])
    }

    #[test]
    fn exactly_full_table_has_no_spots() {
        let capacity = only_it(5);
        assert_eq!(remaining_spots("it", 5, &capacity), Some(0));
        assert_eq!(is_full("it", 5, &capacity), Some(true));
    }

    #[test]
    fn overbooking_clamps_to_zero() {
        assert_eq!(remaining_spots("it", 6, &only_it(5)), Some(0));
    }

    #[test]
    fn untracked_table_has_no_limit() {
        assert_eq!(remaining_spots("poker", 3, &only_it(5)), None);
        assert_eq!(is_full("poker", 3, &only_it(5)), None);
    }

    #[test]
    fn parses_configured_capacities_in_order() {
        let capacity: TableCapacity = "it=5, japanese=10,free-talk = 8".parse().unwrap();
        assert_eq!(capacity.tables().collect::<Vec<_>>(), vec!["it", "japanese", "free-talk"]);
        assert_eq!(capacity.limit("free-talk"), Some(8));
    }

    #[test]
    fn rejects_malformed_capacity_entries() {
        assert!("it".parse::<TableCapacity>().is_err());
        assert!("it=five".parse::<TableCapacity>().is_err());
        assert!("=5".parse::<TableCapacity>().is_err());
    }

    #[test]
    fn spots_dedupe_names_and_mark_full_tables() {
        let registrants: Vec<Registrant> = ["Ann", "ann ", "Bob"]
            .iter()
            .map(|name| Registrant {
                name: Some(name.to_string()),
                table: Some("it".to_string()),
                ..Registrant::default()
            })
            .collect();
        let capacity: TableCapacity = "it=2,free-talk=10".parse().unwrap();

        let spots = table_spots(&registrants, &capacity);
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].taken, 2);
        assert!(spots[0].full);
        assert_eq!(spots[0].option_text, "AI / IT (spot left: 0) - FULL");
        assert_eq!(spots[1].remaining, 10);
        assert_eq!(spots[1].option_text, "Free Talk (spot left: 10)");
    }
}
