use crate::models::Registrant;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};

pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Sentinel the sheet uses for first-time attendees.
pub const FIRST_TIME_SENTINEL: &str = "Yes";

/// Label counts kept in first-seen order so chart labels stay stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    pub fn add(&mut self, label: &str, amount: u64) {
        match self.index.get(label) {
            Some(&slot) => {
                let count = &mut self.entries[slot].1;
                *count = count.saturating_add(amount);
            }
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), amount));
            }
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.index
            .get(label)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.counts().fold(0u64, |acc, count| acc.saturating_add(count))
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NewVsReturning {
    pub new: u64,
    pub returning: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    pub total: usize,
    pub by_table: Tally,
    pub new_vs_returning: NewVsReturning,
    pub by_language: Tally,
}

/// Narrowing applied before aggregation. The default passes every record.
#[derive(Debug, Clone, Default)]
pub struct RegistrantFilter {
    pub table: Option<String>,
}

impl RegistrantFilter {
    fn accepts(&self, registrant: &Registrant) -> bool {
        match &self.table {
            Some(table) => registrant.table.as_deref().map(str::trim) == Some(table.as_str()),
            None => true,
        }
    }
}

pub fn apply_filters<'a>(registrants: &'a [Registrant], filter: &RegistrantFilter) -> Vec<&'a Registrant> {
    registrants
        .iter()
        .filter(|registrant| filter.accepts(registrant))
        .collect()
}

pub fn aggregate<'a, I>(registrants: I) -> AggregationResult
where
    I: IntoIterator<Item = &'a Registrant> + Clone,
{
    AggregationResult {
        total: registrants.clone().into_iter().count(),
        by_table: count_by_table(registrants.clone()),
        new_vs_returning: count_by_first_time_status(registrants.clone()),
        by_language: count_by_language(registrants),
    }
}

/// Raw registrations per table, duplicates included.
pub fn count_by_table<'a>(registrants: impl IntoIterator<Item = &'a Registrant>) -> Tally {
    let mut tally = Tally::new();
    for registrant in registrants {
        let table = registrant
            .table
            .as_deref()
            .map(str::trim)
            .filter(|table| !table.is_empty())
            .unwrap_or(UNKNOWN_BUCKET);
        tally.increment(table);
    }
    tally
}

pub fn count_by_first_time_status<'a>(
    registrants: impl IntoIterator<Item = &'a Registrant>,
) -> NewVsReturning {
    let mut split = NewVsReturning::default();
    for registrant in registrants {
        if registrant.first_time.as_deref() == Some(FIRST_TIME_SENTINEL) {
            split.new += 1;
        } else {
            split.returning += 1;
        }
    }
    split
}

/// Languages are bucketed verbatim; spelling variants stay separate.
pub fn count_by_language<'a>(registrants: impl IntoIterator<Item = &'a Registrant>) -> Tally {
    let mut tally = Tally::new();
    for registrant in registrants {
        let language = registrant
            .languages
            .as_deref()
            .filter(|language| !language.is_empty())
            .unwrap_or(UNKNOWN_BUCKET);
        tally.increment(language);
    }
    tally
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Unique names per table for every table in `universe`. Tables outside the
/// universe are skipped, and so are records without a usable name.
pub fn count_deduplicated_by_table<'a, 'u>(
    registrants: impl IntoIterator<Item = &'a Registrant>,
    universe: impl IntoIterator<Item = &'u str>,
) -> Tally {
    let mut tally = Tally::new();
    let mut seen: HashMap<String, HashSet<String>> = HashMap::new();
    for table in universe {
        tally.add(table, 0);
        seen.entry(table.to_string()).or_default();
    }

    for registrant in registrants {
        let Some(table) = registrant.table.as_deref() else {
            continue;
        };
        let Some(names) = seen.get_mut(table) else {
            continue;
        };
        let normalized = registrant.name.as_deref().map(normalize_name).unwrap_or_default();
        if normalized.is_empty() {
            continue;
        }
        if names.insert(normalized) {
            tally.increment(table);
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, table: &str) -> Registrant {
        Registrant {
            name: Some(name.to_string()),
            table: Some(table.to_string()),
            ..Registrant::default()
        }
    }

    #[test]
    fn table_counts_keep_duplicates_and_first_seen_order() {
        let registrants = vec![
            Registrant::at_table("it"),
            Registrant::at_table("it"),
            Registrant::at_table("free-talk"),
        ];
        let tally = count_by_table(&registrants);
        assert_eq!(tally.get("it"), 2);
        assert_eq!(tally.get("free-talk"), 1);
        assert_eq!(tally.labels().collect::<Vec<_>>(), vec!["it", "free-talk"]);
    }

    #[test]
    fn missing_or_blank_table_is_unknown() {
        let registrants = vec![
            Registrant::default(),
            Registrant::at_table(""),
            Registrant::at_table("  japanese "),
        ];
        let tally = count_by_table(&registrants);
        assert_eq!(tally.get(UNKNOWN_BUCKET), 2);
        assert_eq!(tally.get("japanese"), 1);
    }

    #[test]
    fn only_the_exact_sentinel_is_new() {
        let mut yes = Registrant::at_table("it");
        yes.first_time = Some("Yes".to_string());
        let mut lower = Registrant::at_table("it");
        lower.first_time = Some("yes".to_string());
        let missing = Registrant::at_table("it");

        let split = count_by_first_time_status(&[yes, lower, missing]);
        assert_eq!(split, NewVsReturning { new: 1, returning: 2 });
    }

    #[test]
    fn languages_are_not_normalized() {
        let mut english = Registrant::default();
        english.languages = Some("English".to_string());
        let mut lower = Registrant::default();
        lower.languages = Some("english".to_string());
        let tally = count_by_language(&[english, lower, Registrant::default()]);
        assert_eq!(tally.labels().count(), 3);
        assert_eq!(tally.get(UNKNOWN_BUCKET), 1);
    }

    #[test]
    fn dedup_folds_case_and_whitespace() {
        let registrants = vec![person("Bob", "it"), person(" bob ", "it")];
        let tally = count_deduplicated_by_table(&registrants, ["it"]);
        assert_eq!(tally.get("it"), 1);
    }

    #[test]
    fn dedup_is_scoped_per_table() {
        let registrants = vec![person("Bob", "it"), person("bob", "japanese")];
        let tally = count_deduplicated_by_table(&registrants, ["it", "japanese"]);
        assert_eq!(tally.get("it"), 1);
        assert_eq!(tally.get("japanese"), 1);
    }

    #[test]
    fn dedup_ignores_tables_outside_universe_and_nameless_rows() {
        let registrants = vec![
            person("Ann", "poker"),
            person("   ", "it"),
            Registrant::at_table("it"),
            person("Cid", "it"),
        ];
        let tally = count_deduplicated_by_table(&registrants, ["it", "free-talk"]);
        assert_eq!(tally.get("it"), 1);
        assert_eq!(tally.get("free-talk"), 0);
        assert_eq!(tally.get(UNKNOWN_BUCKET), 0);
        assert_eq!(tally.labels().collect::<Vec<_>>(), vec!["it", "free-talk"]);
    }

    #[test]
    fn aggregate_runs_every_counter() {
        let mut first = person("Ann", "it");
        first.first_time = Some("Yes".to_string());
        first.languages = Some("English".to_string());
        let registrants = vec![first, person("Bob", "japanese")];

        let result = aggregate(&registrants);
        assert_eq!(result.total, 2);
        assert_eq!(result.by_table.total(), 2);
        assert_eq!(result.new_vs_returning, NewVsReturning { new: 1, returning: 1 });
        assert_eq!(result.by_language.get("English"), 1);
    }

    #[test]
    fn table_filter_narrows_before_counting() {
        let registrants = vec![person("Ann", "it"), person("Bob", "japanese")];
        let filter = RegistrantFilter {
            table: Some("it".to_string()),
        };
        let filtered = apply_filters(&registrants, &filter);
        assert_eq!(filtered.len(), 1);
        let everything = apply_filters(&registrants, &RegistrantFilter::default());
        assert_eq!(everything.len(), 2);
    }

    #[test]
    fn tally_serializes_as_ordered_object() {
        let mut tally = Tally::new();
        tally.increment("zeta");
        tally.increment("alpha");
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":1}"#);
    }
}
