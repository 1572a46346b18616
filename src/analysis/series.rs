//! Month-range alignment of sparse player-count records.
//!
//! A game only has rows in the store for months it was in the tracked top
//! list. Plotting and tabulating need one value per month, so `align` walks
//! the requested range and fills every month without a stored record with a
//! zero-valued placeholder.
//!
//! The input slice is never mutated. Records are sorted by reference into a
//! private buffer and consumed through an index cursor.

use chrono::NaiveDate;

use crate::model::{Record, SeriesError};
use crate::months::{first_of_month, months_between, MonthIter};

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Produces exactly one record per calendar month in `[start, end]`, in
/// ascending order.
///
/// Stored records are carried through unchanged; months without one get
/// `Record::placeholder(title, month)`. Input order does not matter.
/// Records outside the range are dropped without error.
///
/// # Errors
/// - `InvalidRange` if `start` is after `end` (compared by month).
/// - `TitleMismatch` if any record belongs to a game other than `title`.
/// - `DuplicateMonth` if two records inside the range share a month.
pub fn align(
    title: &str,
    records: &[Record],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Record>, SeriesError> {
    let start = first_of_month(start);
    let end = first_of_month(end);
    if start > end {
        return Err(SeriesError::InvalidRange { start, end });
    }

    let sorted = sorted_by_month(title, records)?;
    let mut cursor = sorted.partition_point(|r| r.month() < start);

    let expected_len = usize::try_from(months_between(start, end) + 1).unwrap_or(0);
    let mut aligned = Vec::with_capacity(expected_len);

    for current in MonthIter::new(start, end) {
        match sorted.get(cursor) {
            Some(record) if record.month() == current => {
                aligned.push((*record).clone());
                cursor += 1;
                if sorted.get(cursor).is_some_and(|next| next.month() == current) {
                    return Err(SeriesError::DuplicateMonth(current));
                }
            }
            _ => aligned.push(Record::placeholder(title, current)),
        }
    }

    Ok(aligned)
}

/// Like `align`, but takes the title from the first record.
///
/// Returns `EmptyInput` when there are no records, since no title is
/// available for the placeholders. Prefer `align` when the caller knows
/// which game it asked for.
pub fn align_records(
    records: &[Record],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Record>, SeriesError> {
    let title = records.first().ok_or(SeriesError::EmptyInput)?.title();
    align(title, records, start, end)
}

/// Borrows the records in ascending month order after checking they all
/// belong to `title`. The sort is stable.
fn sorted_by_month<'a>(title: &str, records: &'a [Record]) -> Result<Vec<&'a Record>, SeriesError> {
    if let Some(stray) = records.iter().find(|r| r.title() != title) {
        return Err(SeriesError::TitleMismatch {
            expected: title.to_string(),
            found: stray.title().to_string(),
        });
    }

    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by_key(|r| r.month());
    Ok(sorted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::months::increment_month;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn rec(title: &str, y: i32, m: u32, stat: f64) -> Record {
        Record::new(title, month(y, m), stat)
    }

    // --- Worked scenarios ---------------------------------------------------

    #[test]
    fn test_single_record_at_end_of_range() {
        let input = vec![rec("X", 2019, 3, 50.0)];
        let out = align("X", &input, month(2019, 1), month(2019, 3)).unwrap();
        assert_eq!(
            out,
            vec![rec("X", 2019, 1, 0.0), rec("X", 2019, 2, 0.0), rec("X", 2019, 3, 50.0)]
        );
    }

    #[test]
    fn test_empty_input_with_explicit_title() {
        let out = align("Y", &[], month(2020, 1), month(2020, 2)).unwrap();
        assert_eq!(out, vec![rec("Y", 2020, 1, 0.0), rec("Y", 2020, 2, 0.0)]);
    }

    #[test]
    fn test_descending_input_with_gap() {
        // Store returns most recent first.
        let input = vec![rec("Z", 2021, 7, 30.0), rec("Z", 2021, 5, 10.0)];
        let out = align("Z", &input, month(2021, 5), month(2021, 7)).unwrap();
        assert_eq!(
            out,
            vec![rec("Z", 2021, 5, 10.0), rec("Z", 2021, 6, 0.0), rec("Z", 2021, 7, 30.0)]
        );
    }

    #[test]
    fn test_records_after_end_are_dropped() {
        let input = vec![
            rec("W", 2020, 1, 5.0),
            rec("W", 2020, 2, 6.0),
            rec("W", 2020, 6, 99.0),
        ];
        let out = align("W", &input, month(2020, 1), month(2020, 3)).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.stat() != 99.0), "out-of-range record leaked: {:?}", out);
        assert_eq!(out[2], rec("W", 2020, 3, 0.0));
    }

    #[test]
    fn test_records_before_start_are_dropped() {
        let input = vec![rec("W", 2019, 12, 7.0), rec("W", 2020, 2, 8.0)];
        let out = align("W", &input, month(2020, 1), month(2020, 2)).unwrap();
        assert_eq!(out, vec![rec("W", 2020, 1, 0.0), rec("W", 2020, 2, 8.0)]);
    }

    #[test]
    fn test_range_across_year_boundary() {
        let input = vec![rec("Dota 2", 2019, 1, 400_000.0), rec("Dota 2", 2018, 11, 420_000.0)];
        let out = align("Dota 2", &input, month(2018, 11), month(2019, 4)).unwrap();
        let months: Vec<_> = out.iter().map(|r| r.month()).collect();
        assert_eq!(
            months,
            vec![
                month(2018, 11),
                month(2018, 12),
                month(2019, 1),
                month(2019, 2),
                month(2019, 3),
                month(2019, 4),
            ]
        );
        assert_eq!(out[0].stat(), 420_000.0);
        assert_eq!(out[2].stat(), 400_000.0);
    }

    #[test]
    fn test_mid_month_bounds_are_treated_as_whole_months() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        let out = align("V", &[rec("V", 2020, 2, 1.0)], start, end).unwrap();
        assert_eq!(out, vec![rec("V", 2020, 1, 0.0), rec("V", 2020, 2, 1.0)]);
    }

    // --- Properties ---------------------------------------------------------

    #[test]
    fn test_output_length_matches_month_count() {
        let input = vec![rec("P", 2013, 4, 1.0), rec("P", 2016, 8, 2.0)];
        let (start, end) = (month(2012, 7), month(2021, 9));
        let out = align("P", &input, start, end).unwrap();
        assert_eq!(out.len() as i64, months_between(start, end) + 1);
        for pair in out.windows(2) {
            assert_eq!(
                increment_month(pair[0].month()).unwrap(),
                pair[1].month(),
                "months must be contiguous and ascending"
            );
        }
    }

    #[test]
    fn test_stored_stats_survive_and_gaps_are_zero() {
        let input = vec![rec("F", 2015, 2, 11.0), rec("F", 2015, 4, 13.0)];
        let out = align("F", &input, month(2015, 1), month(2015, 5)).unwrap();
        let stats: Vec<_> = out.iter().map(|r| r.stat()).collect();
        assert_eq!(stats, vec![0.0, 11.0, 0.0, 13.0, 0.0]);
        assert!(out.iter().all(|r| r.title() == "F"));
    }

    #[test]
    fn test_order_does_not_change_output() {
        let ascending = vec![
            rec("O", 2017, 1, 1.0),
            rec("O", 2017, 3, 3.0),
            rec("O", 2017, 4, 4.0),
        ];
        let descending: Vec<_> = ascending.iter().rev().cloned().collect();
        let shuffled = vec![ascending[1].clone(), ascending[2].clone(), ascending[0].clone()];
        let (start, end) = (month(2016, 12), month(2017, 5));

        let a = align("O", &ascending, start, end).unwrap();
        assert_eq!(a, align("O", &descending, start, end).unwrap());
        assert_eq!(a, align("O", &shuffled, start, end).unwrap());
    }

    #[test]
    fn test_realigning_dense_series_is_unchanged() {
        let input = vec![rec("D", 2020, 11, 3.0), rec("D", 2021, 1, 9.0)];
        let (start, end) = (month(2020, 10), month(2021, 2));
        let once = align("D", &input, start, end).unwrap();
        let twice = align("D", &once, start, end).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_slice_is_not_mutated() {
        let input = vec![rec("M", 2020, 3, 3.0), rec("M", 2020, 1, 1.0)];
        let before = input.clone();
        let _ = align("M", &input, month(2020, 1), month(2020, 3)).unwrap();
        assert_eq!(input, before);
    }

    // --- Errors -------------------------------------------------------------

    #[test]
    fn test_start_after_end_is_invalid_range() {
        let result = align("E", &[], month(2020, 5), month(2020, 4));
        assert_eq!(
            result,
            Err(SeriesError::InvalidRange { start: month(2020, 5), end: month(2020, 4) })
        );
    }

    #[test]
    fn test_single_month_range() {
        let out = align("S", &[rec("S", 2020, 5, 8.0)], month(2020, 5), month(2020, 5)).unwrap();
        assert_eq!(out, vec![rec("S", 2020, 5, 8.0)]);
    }

    #[test]
    fn test_foreign_title_is_rejected() {
        let input = vec![rec("A", 2020, 1, 1.0), rec("B", 2020, 2, 2.0)];
        let result = align("A", &input, month(2020, 1), month(2020, 2));
        assert_eq!(
            result,
            Err(SeriesError::TitleMismatch { expected: "A".to_string(), found: "B".to_string() })
        );
    }

    #[test]
    fn test_duplicate_month_in_range_is_rejected() {
        let input = vec![rec("A", 2020, 2, 1.0), rec("A", 2020, 2, 2.0)];
        let result = align("A", &input, month(2020, 1), month(2020, 3));
        assert_eq!(result, Err(SeriesError::DuplicateMonth(month(2020, 2))));
    }

    #[test]
    fn test_align_records_takes_title_from_first_record() {
        let input = vec![rec("T", 2020, 2, 4.0)];
        let out = align_records(&input, month(2020, 1), month(2020, 2)).unwrap();
        assert_eq!(out, vec![rec("T", 2020, 1, 0.0), rec("T", 2020, 2, 4.0)]);
    }

    #[test]
    fn test_align_records_on_empty_input_is_error() {
        let result = align_records(&[], month(2020, 1), month(2020, 2));
        assert_eq!(result, Err(SeriesError::EmptyInput));
    }

    #[test]
    fn test_single_month_range_at_calendar_limit() {
        let last = first_of_month(NaiveDate::MAX);
        let out = align("L", &[Record::new("L", last, 2.0)], last, last).unwrap();
        assert_eq!(out, vec![Record::new("L", last, 2.0)]);
    }

    #[test]
    fn test_duplicate_months_outside_range_are_dropped() {
        let input = vec![
            rec("A", 2019, 12, 1.0),
            rec("A", 2019, 12, 2.0),
            rec("A", 2020, 2, 9.0),
            rec("A", 2020, 6, 3.0),
            rec("A", 2020, 6, 4.0),
        ];
        let out = align("A", &input, month(2020, 1), month(2020, 3)).unwrap();
        let stats: Vec<_> = out.iter().map(|r| r.stat()).collect();
        assert_eq!(stats, vec![0.0, 9.0, 0.0]);
    }
}
