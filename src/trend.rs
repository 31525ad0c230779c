use crate::dates::{EVENT_WEEKDAY, weekdays_in_range};
use crate::errors::GatewayError;
use crate::gateway::Gateway;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u64,
}

/// Registrations per meetup between `start` and `end`, oldest first.
pub async fn fetch_trend(gateway: &Gateway, start: NaiveDate, end: NaiveDate) -> Vec<TrendPoint> {
    let gateway = gateway.clone();
    collect_trend(start, end, move |date| {
        let gateway = gateway.clone();
        async move {
            let latest = gateway.latest(date).await?;
            let count = match &latest.registrants {
                Some(registrants) => registrants.len() as u64,
                None => latest.count.unwrap_or(0),
            };
            Ok::<u64, GatewayError>(count)
        }
    })
    .await
}

/// Runs `fetch` for every meetup date at once. A failed fetch contributes
/// a zero point.
pub async fn collect_trend<F, Fut>(start: NaiveDate, end: NaiveDate, fetch: F) -> Vec<TrendPoint>
where
    F: Fn(NaiveDate) -> Fut,
    Fut: Future<Output = Result<u64, GatewayError>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for date in weekdays_in_range(EVENT_WEEKDAY, start, end) {
        let request = fetch(date);
        tasks.spawn(async move {
            let count = match request.await {
                Ok(count) => count,
                Err(err) => {
                    warn!(%date, "trend fetch failed: {err}");
                    0
                }
            };
            TrendPoint { date, count }
        });
    }

    let mut points = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(point) => points.push(point),
            Err(err) => warn!("trend task aborted: {err}"),
        }
    }

    sort_trend(&mut points);
    info!(points = points.len(), "trend data loaded");
    points
}

pub fn sort_trend(points: &mut [TrendPoint]) {
    points.sort_by_key(|point| point.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date_key;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn day(value: &str) -> NaiveDate {
        parse_date_key(value).unwrap()
    }

    #[test]
    fn sorting_orders_by_date() {
        let mut points = vec![
            TrendPoint { date: day("2024-02-01"), count: 3 },
            TrendPoint { date: day("2024-01-25"), count: 5 },
        ];
        sort_trend(&mut points);
        assert_eq!(points[0].date, day("2024-01-25"));
        assert_eq!(points[1].date, day("2024-02-01"));
    }

    #[tokio::test]
    async fn out_of_order_completion_still_sorts_ascending() {
        let completed = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&completed);
        let latest = day("2024-02-01");

        let points = collect_trend(day("2024-01-25"), latest, move |date| {
            let log = Arc::clone(&log);
            async move {
                // The earlier meetup answers last.
                let delay = if date == latest { 5 } else { 60 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                log.lock().unwrap().push(date);
                Ok::<u64, GatewayError>(if date == latest { 2 } else { 9 })
            }
        })
        .await;

        assert_eq!(
            *completed.lock().unwrap(),
            vec![day("2024-02-01"), day("2024-01-25")]
        );
        assert_eq!(
            points,
            vec![
                TrendPoint { date: day("2024-01-25"), count: 9 },
                TrendPoint { date: day("2024-02-01"), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn failed_fetches_count_as_zero() {
        let points = collect_trend(day("2024-01-04"), day("2024-01-11"), |date| async move {
            if date == day("2024-01-04") {
                Err(GatewayError::Rejected("offline".to_string()))
            } else {
                Ok::<u64, GatewayError>(4)
            }
        })
        .await;
        assert_eq!(points.iter().map(|point| point.count).collect::<Vec<_>>(), vec![0, 4]);
    }

    #[tokio::test]
    async fn range_without_thursdays_is_empty() {
        let points = collect_trend(day("2024-01-05"), day("2024-01-09"), |_| async { Ok::<u64, GatewayError>(1) }).await;
        assert!(points.is_empty());
    }
}
