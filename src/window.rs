//! Trailing window used to normalise ratings.
//!
//! The window rolls over once a season, on the first day of the season start
//! month (May). Results since the most recent season start count in full;
//! results from the `half_band_years` seasons before that count half.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::data_loader::{SeriesPointsRecord, SeriesRecord};
use crate::error::{RankingError, Result};
use crate::ranking_context::RankingContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: NaiveDate, // first day of the half-weight band
    pub mid: NaiveDate,   // first day of the full-weight band
    pub end: NaiveDate,   // reference date, inclusive
}

impl WindowBounds {
    pub fn ending_at(reference: NaiveDate, ranking_context: &RankingContext) -> Result<Self> {
        let season_month = ranking_context.season_start_month;
        let mid_year = if reference.month() >= season_month {
            reference.year()
        } else {
            reference.year() - 1
        };
        let start_year = mid_year - ranking_context.half_band_years;

        let season_start = |year: i32| {
            NaiveDate::from_ymd_opt(year, season_month, 1).ok_or_else(|| {
                RankingError::Config(format!("no season start for {}-{:02}", year, season_month))
            })
        };

        Ok(Self {
            start: season_start(start_year)?,
            mid: season_start(mid_year)?,
            end: reference,
        })
    }

    /// Weight for a series ending on `date`, or `None` outside the window.
    pub fn weight(&self, date: NaiveDate, ranking_context: &RankingContext) -> Option<f64> {
        if date < self.start || date > self.end {
            None
        } else if date < self.mid {
            Some(ranking_context.half_weight)
        } else {
            Some(ranking_context.full_weight)
        }
    }
}

fn add(totals: &mut BTreeMap<String, f64>, team: &str, amount: f64) {
    *totals.entry(team.to_string()).or_insert(0.0) += amount;
}

/// Weighted match count per team for the window ending at `reference`.
/// Multi-test series count one extra match for the series bonus; one-off
/// tests do not count at all.
pub fn rolling_matches<'a, I>(reference: NaiveDate, series: I, ranking_context: &RankingContext) -> Result<BTreeMap<String, f64>>
where
    I: IntoIterator<Item = &'a SeriesRecord>,
{
    let bounds = WindowBounds::ending_at(reference, ranking_context)?;
    let mut totals = BTreeMap::new();

    for s in series {
        if s.num_matches <= 1 { continue; }
        let Some(weight) = bounds.weight(s.end_date, ranking_context) else { continue };

        let matches = weight * (s.num_matches + 1) as f64;
        add(&mut totals, &s.home_team, matches);
        add(&mut totals, &s.away_team, matches);
    }

    totals.retain(|_, v| *v != 0.0);
    Ok(totals)
}

/// Weighted ranking points per team for the window ending at `reference`.
pub fn rolling_points<'a, I>(reference: NaiveDate, ledger: I, ranking_context: &RankingContext) -> Result<BTreeMap<String, f64>>
where
    I: IntoIterator<Item = &'a SeriesPointsRecord>,
{
    let bounds = WindowBounds::ending_at(reference, ranking_context)?;
    let mut totals = BTreeMap::new();

    for r in ledger {
        let Some(weight) = bounds.weight(r.end_date, ranking_context) else { continue };

        add(&mut totals, &r.home_team, weight * r.home_tot_points);
        add(&mut totals, &r.away_team, weight * r.away_tot_points);
    }

    totals.retain(|_, v| *v != 0.0);
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(end: NaiveDate, home: &str, away: &str, num_matches: u32) -> SeriesRecord {
        SeriesRecord {
            start_date: end - chrono::Duration::days(20),
            end_date: end,
            home_team: home.to_string(),
            away_team: away.to_string(),
            num_matches,
            home_points: 0,
            away_points: 0,
        }
    }

    fn ledger_row(end: NaiveDate, home: &str, away: &str, home_tot: f64, away_tot: f64) -> SeriesPointsRecord {
        SeriesPointsRecord {
            start_date: end - chrono::Duration::days(20),
            end_date: end,
            home_team: home.to_string(),
            away_team: away.to_string(),
            num_matches: 3,
            home_points: 0,
            away_points: 0,
            home_tot_points: home_tot,
            away_tot_points: away_tot,
            rolling_home_matches: 0.0,
            rolling_away_matches: 0.0,
            rolling_home_points: 0.0,
            rolling_away_points: 0.0,
            home_rating: 0.0,
            away_rating: 0.0,
        }
    }

    #[test]
    fn bounds_roll_over_in_may() {
        let ctx = RankingContext::default();

        let march = WindowBounds::ending_at(d(2013, 3, 1), &ctx).unwrap();
        assert_eq!(march.start, d(2010, 5, 1));
        assert_eq!(march.mid, d(2012, 5, 1));

        let may = WindowBounds::ending_at(d(2013, 5, 1), &ctx).unwrap();
        assert_eq!(may.start, d(2011, 5, 1));
        assert_eq!(may.mid, d(2013, 5, 1));
    }

    #[test]
    fn older_band_counts_half() {
        let ctx = RankingContext::default();
        let all = vec![
            series(d(2011, 6, 1), "England", "India", 3),
            series(d(2012, 5, 1), "England", "Australia", 4),
        ];

        let totals = rolling_matches(d(2013, 3, 1), &all, &ctx).unwrap();
        assert_eq!(totals["India"], 2.0);
        assert_eq!(totals["Australia"], 5.0);
        assert_eq!(totals["England"], 7.0);
    }

    #[test]
    fn single_tests_and_out_of_window_series_are_absent() {
        let ctx = RankingContext::default();
        let all = vec![
            series(d(2010, 4, 30), "England", "India", 3),
            series(d(2012, 8, 1), "Bangladesh", "Zimbabwe", 1),
            series(d(2013, 3, 2), "England", "New Zealand", 3),
        ];

        let totals = rolling_matches(d(2013, 3, 1), &all, &ctx).unwrap();
        assert!(totals.is_empty());
    }

    #[test]
    fn window_long_after_every_series_is_empty() {
        let ctx = RankingContext::default();
        let all = vec![series(d(2011, 6, 1), "England", "India", 3)];
        let ledger = vec![ledger_row(d(2011, 6, 1), "England", "India", 400.0, 300.0)];

        assert!(rolling_matches(d(2014, 6, 2), &all, &ctx).unwrap().is_empty());
        assert!(rolling_points(d(2014, 6, 2), &ledger, &ctx).unwrap().is_empty());
    }

    #[test]
    fn points_sum_home_and_away_with_weights() {
        let ctx = RankingContext::default();
        let ledger = vec![
            ledger_row(d(2011, 6, 1), "England", "India", 400.0, 300.0),
            ledger_row(d(2012, 7, 1), "Australia", "England", 500.0, 350.0),
            ledger_row(d(2012, 9, 1), "Bangladesh", "Zimbabwe", 0.0, 0.0),
        ];

        let totals = rolling_points(d(2013, 3, 1), &ledger, &ctx).unwrap();
        assert_eq!(totals["England"], 200.0 + 350.0);
        assert_eq!(totals["India"], 150.0);
        assert_eq!(totals["Australia"], 500.0);
        assert!(!totals.contains_key("Bangladesh"));
    }
}
