/// Time-series shaping for monthly player counts.
///
/// The store only holds a row for a game in months where it made the tracked
/// top list, so raw query results are sparse. Everything that turns those
/// rows into a dense, plottable monthly series lives here.
///
/// Submodules:
/// - `series`: aligns sparse records against a closed month range.

pub mod series;
