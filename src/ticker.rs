use crate::labels::ticker_table_name;
use crate::models::{LatestResponse, Registrant};
use serde::Serialize;

pub const ROTATION_SECS: u64 = 4;

/// What the landing page shows for the next meetup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickerView {
    Rotating { date: String, lines: Vec<String>, interval_secs: u64 },
    Count { date: String, count: u64 },
    Open { date: String },
}

impl TickerView {
    pub fn from_latest(date: &str, latest: &LatestResponse) -> Self {
        let registrants = latest.registrants();
        if !registrants.is_empty() {
            let mut ticker = Ticker::new(registrants);
            let lines = (0..registrants.len())
                .filter_map(|_| {
                    let line = ticker.current().map(ticker_line);
                    ticker.advance();
                    line
                })
                .collect();
            return Self::Rotating {
                date: date.to_string(),
                lines,
                interval_secs: ROTATION_SECS,
            };
        }
        match latest.count {
            Some(count) if count > 0 => Self::Count {
                date: date.to_string(),
                count,
            },
            _ => Self::open(date),
        }
    }

    pub fn open(date: &str) -> Self {
        Self::Open {
            date: date.to_string(),
        }
    }
}

/// Cycles through registrants in arrival order.
#[derive(Debug, Clone)]
pub struct Ticker<'a> {
    registrants: &'a [Registrant],
    index: usize,
}

impl<'a> Ticker<'a> {
    pub fn new(registrants: &'a [Registrant]) -> Self {
        Self {
            registrants,
            index: 0,
        }
    }

    pub fn current(&self) -> Option<&'a Registrant> {
        self.registrants.get(self.index)
    }

    pub fn advance(&mut self) {
        if !self.registrants.is_empty() {
            self.index = (self.index + 1) % self.registrants.len();
        }
    }

}

pub fn ticker_line(registrant: &Registrant) -> String {
    let name = registrant.name.as_deref().unwrap_or_default();
    let table = ticker_table_name(registrant.table.as_deref().unwrap_or_default());
    format!("{name} has just registered for {table} the next meetup.")
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
    fn ticker_wraps_around() {
        let registrants = vec![person("Ann", "it"), person("Bob", "japanese")];
        let mut ticker = Ticker::new(&registrants);
        assert_eq!(ticker.current().unwrap().name.as_deref(), Some("Ann"));
        ticker.advance();
        assert_eq!(ticker.current().unwrap().name.as_deref(), Some("Bob"));
        ticker.advance();
        assert_eq!(ticker.current().unwrap().name.as_deref(), Some("Ann"));
    }

    #[test]
    fn single_entry_does_not_rotate() {
        let registrants = vec![person("Ann", "it")];
        let mut ticker = Ticker::new(&registrants);
        ticker.advance();
        assert_eq!(ticker.current().unwrap().name.as_deref(), Some("Ann"));
    }

    #[test]
    fn view_lists_every_registrant() {
        let latest = LatestResponse {
            registrants: Some(vec![person("Ann", "free-talk"), person("Bob", "poker")]),
            count: None,
        };
        match TickerView::from_latest("2024-01-04", &latest) {
            TickerView::Rotating { lines, interval_secs, .. } => {
                assert_eq!(interval_secs, 4);
                assert_eq!(
                    lines,
                    vec![
                        "Ann has just registered for English - Free Talk Table the next meetup.",
                        "Bob has just registered for poker the next meetup.",
                    ]
                );
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn legacy_count_and_open_fallbacks() {
        let legacy = LatestResponse {
            registrants: None,
            count: Some(3),
        };
        assert_eq!(
            TickerView::from_latest("2024-01-04", &legacy),
            TickerView::Count {
                date: "2024-01-04".to_string(),
                count: 3
            }
        );
        let empty = LatestResponse::default();
        assert_eq!(TickerView::from_latest("2024-01-04", &empty), TickerView::open("2024-01-04"));
    }
}
