/// Player statistics queries.
///
/// Each operation fetches raw rows through a `PlayerCountStore`, converts
/// them to `Record`s, and aligns them into a dense monthly series. Failures
/// come back as `QueryError`; nothing here prints or swallows an error.

use chrono::{Datelike, NaiveDate};

use crate::analysis::series::align;
use crate::db::PlayerCountStore;
use crate::logging::{self, Component};
use crate::model::{records_from_rows, QueryError, Record};
use crate::months::to_month_date;
use crate::present::ComparisonChart;

/// Aligned series for two games over the same range.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub first: Vec<Record>,
    pub second: Vec<Record>,
    pub chart: ComparisonChart,
}

pub struct StatsService<S: PlayerCountStore> {
    store: S,
    /// First and last month the dataset covers.
    dataset_span: (NaiveDate, NaiveDate),
}

impl<S: PlayerCountStore> StatsService<S> {
    pub fn new(store: S, dataset_span: (NaiveDate, NaiveDate)) -> Self {
        Self { store, dataset_span }
    }

    pub fn dataset_span(&self) -> (NaiveDate, NaiveDate) {
        self.dataset_span
    }

    /// Monthly average player count for `title` across the whole dataset,
    /// with zeros for months the game was not in the top list.
    pub fn popularity_over_all_time(&mut self, title: &str) -> Result<Vec<Record>, QueryError> {
        self.popularity_inner(title)
            .inspect_err(|e| logging::log_query_failure(Some(title), "popularity over all time", e))
    }

    fn popularity_inner(&mut self, title: &str) -> Result<Vec<Record>, QueryError> {
        let rows = self.store.all_monthly_averages(title)?;
        if rows.is_empty() {
            return Err(QueryError::UnknownTitle(title.to_string()));
        }

        let records = records_from_rows(rows);
        let (first, last) = self.dataset_span;
        let aligned = align(title, &records, first, last)?;
        logging::log_alignment_summary(title, aligned.len(), stored_count(&records, first, last));
        Ok(aligned)
    }

    /// Monthly average player counts for two games over the range given by
    /// the form's year and month strings, inclusive at both ends.
    pub fn compare_in_range(
        &mut self,
        first_title: &str,
        second_title: &str,
        start_year: &str,
        start_month: &str,
        end_year: &str,
        end_month: &str,
    ) -> Result<Comparison, QueryError> {
        let subject = format!("{} vs {}", first_title, second_title);
        self.compare_inner(&subject, first_title, second_title, start_year, start_month, end_year, end_month)
            .inspect_err(|e| logging::log_query_failure(Some(&subject), "compare games", e))
    }

    #[allow(clippy::too_many_arguments)]
    fn compare_inner(
        &mut self,
        subject: &str,
        first_title: &str,
        second_title: &str,
        start_year: &str,
        start_month: &str,
        end_year: &str,
        end_month: &str,
    ) -> Result<Comparison, QueryError> {
        let start = to_month_date(start_year, start_month)?;
        let end = to_month_date(end_year, end_month)?;
        logging::info(
            Component::Service,
            Some(subject),
            &format!("comparing {} to {}", start.format("%Y-%m"), end.format("%Y-%m")),
        );

        let first = self.range_series(first_title, start, end)?;
        let second = self.range_series(second_title, start, end)?;
        let chart = ComparisonChart::new(&first, &second);
        Ok(Comparison { first, second, chart })
    }

    /// Aligned series for one game over `[start, end]`. A game with no rows
    /// in range yields an all-zero series.
    pub fn range_series(
        &mut self,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Record>, QueryError> {
        let rows = self.store.monthly_averages(title, start, end)?;
        let records = records_from_rows(rows);
        let aligned = align(title, &records, start, end)?;
        logging::log_alignment_summary(title, aligned.len(), stored_count(&records, start, end));
        Ok(aligned)
    }

    /// Titles in the top list for the given month, most popular first.
    pub fn monthly_top_games(&mut self, year: &str, month: &str) -> Result<Vec<String>, QueryError> {
        self.top_games_inner(year, month)
            .inspect_err(|e| logging::log_query_failure(None, "monthly top games", e))
    }

    fn top_games_inner(&mut self, year: &str, month: &str) -> Result<Vec<String>, QueryError> {
        let selected = to_month_date(year, month)?;
        let titles = self.store.top_titles(selected)?;
        if titles.is_empty() {
            return Err(QueryError::NoData {
                year: selected.year(),
                month: selected.month(),
            });
        }
        logging::info(
            Component::Service,
            None,
            &format!("{} top games for {}", titles.len(), selected.format("%Y-%m")),
        );
        Ok(titles)
    }
}

fn stored_count(records: &[Record], start: NaiveDate, end: NaiveDate) -> usize {
    records
        .iter()
        .filter(|r| r.month() >= start && r.month() <= end)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerCountRow, SeriesError, StoreError};
    use std::collections::HashMap;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn row(title: &str, y: i32, m: u32, stat: f64) -> PlayerCountRow {
        PlayerCountRow {
            stat,
            month: month(y, m).and_hms_opt(0, 0, 0).unwrap(),
            title: title.to_string(),
        }
    }

    #[derive(Default)]
    struct FakeStore {
        rows: Vec<PlayerCountRow>,
        top: HashMap<NaiveDate, Vec<String>>,
        fail: bool,
    }

    impl PlayerCountStore for FakeStore {
        fn monthly_averages(
            &mut self,
            title: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<PlayerCountRow>, StoreError> {
            Ok(self
                .all_monthly_averages(title)?
                .into_iter()
                .filter(|r| r.month.date() >= start && r.month.date() <= end)
                .collect())
        }

        fn all_monthly_averages(&mut self, title: &str) -> Result<Vec<PlayerCountRow>, StoreError> {
            if self.fail {
                return Err(StoreError::Connection("connection refused".into()));
            }
            let mut rows: Vec<_> = self.rows.iter().filter(|r| r.title == title).cloned().collect();
            rows.sort_by(|a, b| b.month.cmp(&a.month));
            Ok(rows)
        }

        fn top_titles(&mut self, month: NaiveDate) -> Result<Vec<String>, StoreError> {
            Ok(self.top.get(&month).cloned().unwrap_or_default())
        }
    }

    fn service(store: FakeStore) -> StatsService<FakeStore> {
        StatsService::new(store, (month(2019, 1), month(2019, 6)))
    }

    #[test]
    fn test_popularity_spans_whole_dataset() {
        let store = FakeStore {
            rows: vec![row("Dota 2", 2019, 2, 500.0), row("Dota 2", 2019, 5, 400.0)],
            ..Default::default()
        };
        let result = service(store).popularity_over_all_time("Dota 2").unwrap();
        let stats: Vec<_> = result.iter().map(|r| r.stat()).collect();
        assert_eq!(stats, vec![0.0, 500.0, 0.0, 0.0, 400.0, 0.0]);
    }

    #[test]
    fn test_popularity_of_unknown_title_is_error() {
        let result = service(FakeStore::default()).popularity_over_all_time("Nope");
        assert_eq!(result, Err(QueryError::UnknownTitle("Nope".to_string())));
    }

    #[test]
    fn test_compare_aligns_both_games_over_same_range() {
        let store = FakeStore {
            rows: vec![
                row("Dota 2", 2018, 11, 1.0),
                row("Dota 2", 2019, 4, 6.0),
                row("Rust", 2019, 1, 3.0),
            ],
            ..Default::default()
        };
        let cmp = service(store)
            .compare_in_range("Dota 2", "Rust", "2018", "11", "2019", "04")
            .unwrap();
        assert_eq!(cmp.first.len(), 6);
        assert_eq!(cmp.second.len(), 6);
        assert_eq!(cmp.first[0].stat(), 1.0);
        assert_eq!(cmp.first[5].stat(), 6.0);
        assert_eq!(cmp.second[2].stat(), 3.0);
        assert_eq!(cmp.chart.caption, "Results Graph: Dota 2 and Rust");
    }

    #[test]
    fn test_compare_with_game_absent_from_range_is_all_zero() {
        let cmp = service(FakeStore::default())
            .compare_in_range("A", "B", "2020", "1", "2020", "2")
            .unwrap();
        assert!(cmp.second.iter().all(|r| r.stat() == 0.0 && r.title() == "B"));
        assert_eq!(cmp.chart.caption, "Results Graph: A and B");
    }

    #[test]
    fn test_compare_with_bad_month_is_parse_error() {
        let result = service(FakeStore::default()).compare_in_range("A", "B", "2020", "13", "2020", "2");
        assert!(
            matches!(result, Err(QueryError::Series(SeriesError::ParseError(_)))),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_compare_with_reversed_range_is_error() {
        let result = service(FakeStore::default()).compare_in_range("A", "B", "2020", "5", "2020", "2");
        assert!(matches!(result, Err(QueryError::Series(SeriesError::InvalidRange { .. }))));
    }

    #[test]
    fn test_store_failure_propagates() {
        let store = FakeStore { fail: true, ..Default::default() };
        let result = service(store).popularity_over_all_time("Dota 2");
        assert!(matches!(result, Err(QueryError::Store(StoreError::Connection(_)))));
    }

    #[test]
    fn test_monthly_top_games() {
        let mut top = HashMap::new();
        top.insert(month(2014, 10), vec!["Dota 2".to_string(), "Counter-Strike".to_string()]);
        let store = FakeStore { top, ..Default::default() };
        let titles = service(store).monthly_top_games("2014", "10").unwrap();
        assert_eq!(titles, vec!["Dota 2", "Counter-Strike"]);
    }

    #[test]
    fn test_monthly_top_games_for_empty_month_is_no_data() {
        let result = service(FakeStore::default()).monthly_top_games("2030", "1");
        assert_eq!(result, Err(QueryError::NoData { year: 2030, month: 1 }));
    }
}
