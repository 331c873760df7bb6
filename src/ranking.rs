use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use log::{debug, info};

use crate::calendar::YearMonth;
use crate::data_loader::{SeriesPointsRecord, SeriesRecord};
use crate::error::{RankingError, Result};
use crate::points::calc_points;
use crate::ranking_context::RankingContext;
use crate::rankings_table::RankingsTable;
use crate::util::round_to;
use crate::window::{rolling_matches, rolling_points};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationSummary {
    pub months_walked: usize,
    pub blocks_emitted: usize,
    pub series_processed: usize,
    pub series_already_recorded: usize,
    pub series_skipped: usize,
}

/// Walks forward month by month from the rankings table, scoring every
/// completed series into the ledger and emitting a ranking block for every
/// month the table doesn't have yet.
pub struct RankingPropagator<'a> {
    ranking_context: &'a RankingContext,
}

impl<'a> RankingPropagator<'a> {
    pub fn new(ranking_context: &'a RankingContext) -> Self {
        Self { ranking_context }
    }

    /// Runs from `from` (default: the month after the latest block) to `to`, inclusive.
    /// Series already in the ledger and months already in the table are left alone,
    /// so re-running over the same range changes nothing.
    pub fn run(
        &self,
        series: &[SeriesRecord],
        rankings: &mut RankingsTable,
        ledger: &mut Vec<SeriesPointsRecord>,
        from: Option<YearMonth>,
        to: YearMonth,
    ) -> Result<PropagationSummary> {
        let from = match from {
            Some(m) => m,
            None => rankings
                .latest_block()
                .map(|b| b.period.next())
                .ok_or_else(|| RankingError::Config("rankings table is empty, nothing to propagate from".to_string()))?,
        };

        let mut by_month: BTreeMap<YearMonth, Vec<&SeriesRecord>> = BTreeMap::new();
        for s in series {
            by_month.entry(YearMonth::of(s.end_date)).or_default().push(s);
        }
        for month_series in by_month.values_mut() {
            month_series.sort_by(|a, b| (a.end_date, a.start_date).cmp(&(b.end_date, b.start_date)));
        }

        let mut recorded: HashSet<(NaiveDate, String, String)> = ledger
            .iter()
            .map(|r| (r.start_date, r.home_team.clone(), r.away_team.clone()))
            .collect();

        // Anchored where the ledger begins so chained runs seed from the same block
        let anchor = ledger
            .iter()
            .map(|r| YearMonth::of(r.end_date))
            .min()
            .map_or(from, |first| first.min(from));
        let baseline = seed_baseline(series, &recorded, rankings, anchor);

        let mut summary = PropagationSummary::default();
        info!("Propagating rankings from {} to {} ({} series seeded from the table)", from, to, baseline.len());

        for month in from.through(to) {
            summary.months_walked += 1;

            // Months up to the latest block are official history, gaps included
            if !rankings.latest_block().is_some_and(|b| b.period >= month) {
                let updates = latest_ratings(ledger, month.first_day());
                let block = rankings.carry_forward(month, &updates)?;
                debug!("Emitted block {} with {} teams", month, block.entries.len());
                summary.blocks_emitted += 1;
            }

            let Some(month_series) = by_month.get(&month) else { continue };
            for s in month_series {
                let key = (s.start_date, s.home_team.clone(), s.away_team.clone());
                if recorded.contains(&key) {
                    summary.series_already_recorded += 1;
                    continue;
                }

                let record = self.score_series(s, series, rankings, ledger, &baseline)?;
                debug!(
                    "{} v {} ending {}: {:.1} / {:.1} points, ratings {:.1} / {:.1}",
                    record.home_team, record.away_team, record.end_date,
                    record.home_tot_points, record.away_tot_points,
                    record.home_rating, record.away_rating,
                );

                insert_chronologically(ledger, record);
                recorded.insert(key);
                summary.series_processed += 1;
            }
        }

        info!(
            "Walked {} months: {} blocks emitted, {} series scored, {} already in ledger",
            summary.months_walked, summary.blocks_emitted, summary.series_processed, summary.series_already_recorded
        );
        Ok(summary)
    }

    /// Scores one series against the ratings at its start and the window ending
    /// on its last day. Prior points come from the ledger plus the `baseline`
    /// standing in for series scored before the ledger began. The ledger must
    /// not contain the series yet.
    pub fn score_series(
        &self,
        s: &SeriesRecord,
        all_series: &[SeriesRecord],
        rankings: &RankingsTable,
        ledger: &[SeriesPointsRecord],
        baseline: &[SeriesPointsRecord],
    ) -> Result<SeriesPointsRecord> {
        let ctx = self.ranking_context;

        let matches = rolling_matches(s.end_date, all_series, ctx)?;
        let prior_points = rolling_points(s.end_date, ledger.iter().chain(baseline), ctx)?;

        let start_month = YearMonth::of(s.start_date);
        let home_start = rankings.rating_before(&s.home_team, start_month);
        let away_start = rankings.rating_before(&s.away_team, start_month);

        let (home_tot_points, away_tot_points) =
            calc_points(s.num_matches, s.home_points, s.away_points, home_start, away_start, ctx);

        let home_matches = matches.get(&s.home_team).copied().unwrap_or(0.0);
        let away_matches = matches.get(&s.away_team).copied().unwrap_or(0.0);
        let home_prior = prior_points.get(&s.home_team).copied().unwrap_or(0.0);
        let away_prior = prior_points.get(&s.away_team).copied().unwrap_or(0.0);

        Ok(SeriesPointsRecord {
            start_date: s.start_date,
            end_date: s.end_date,
            home_team: s.home_team.clone(),
            away_team: s.away_team.clone(),
            num_matches: s.num_matches,
            home_points: s.home_points,
            away_points: s.away_points,
            home_tot_points,
            away_tot_points,
            rolling_home_matches: home_matches,
            rolling_away_matches: away_matches,
            rolling_home_points: home_prior,
            rolling_away_points: away_prior,
            home_rating: self.new_rating(home_prior + home_tot_points, home_matches, home_start),
            away_rating: self.new_rating(away_prior + away_tot_points, away_matches, away_start),
        })
    }

    // A team without rated matches in the window keeps its starting rating
    fn new_rating(&self, points: f64, matches: f64, start_rating: f64) -> f64 {
        if matches <= 0.0 {
            return start_rating;
        }
        round_to(points / matches, self.ranking_context.rating_decimals)
    }
}

/// Points for the series that finished before `anchor` and are not in the
/// ledger, as if each side had earned exactly the rating it holds in the
/// table at `anchor` for every match. At the start of `anchor` a team's
/// weighted baseline is its rating times its rolling matches, and each
/// series' share ages out of the window on its own end date.
pub fn seed_baseline(
    series: &[SeriesRecord],
    recorded: &HashSet<(NaiveDate, String, String)>,
    rankings: &RankingsTable,
    anchor: YearMonth,
) -> Vec<SeriesPointsRecord> {
    let Some(block) = rankings.blocks().iter().rev().find(|b| b.period <= anchor) else {
        return Vec::new();
    };
    let cutoff = anchor.first_day();
    let rating = |team: &str| block.entry(team).map_or(0.0, |e| e.rating);

    series
        .iter()
        .filter(|s| s.num_matches > 1 && s.end_date < cutoff)
        .filter(|s| !recorded.contains(&(s.start_date, s.home_team.clone(), s.away_team.clone())))
        .map(|s| {
            let matches = (s.num_matches + 1) as f64;
            let (home_rating, away_rating) = (rating(&s.home_team), rating(&s.away_team));
            SeriesPointsRecord {
                start_date: s.start_date,
                end_date: s.end_date,
                home_team: s.home_team.clone(),
                away_team: s.away_team.clone(),
                num_matches: s.num_matches,
                home_points: s.home_points,
                away_points: s.away_points,
                home_tot_points: home_rating * matches,
                away_tot_points: away_rating * matches,
                rolling_home_matches: 0.0,
                rolling_away_matches: 0.0,
                rolling_home_points: 0.0,
                rolling_away_points: 0.0,
                home_rating,
                away_rating,
            }
        })
        .collect()
}

/// Most recent rating per team among ledger records ending before `cutoff`.
pub fn latest_ratings(ledger: &[SeriesPointsRecord], cutoff: NaiveDate) -> BTreeMap<String, f64> {
    let mut ordered: Vec<&SeriesPointsRecord> = ledger.iter().filter(|r| r.end_date < cutoff).collect();
    ordered.sort_by_key(|r| r.chrono_key());

    let mut ratings = BTreeMap::new();
    for r in ordered {
        ratings.insert(r.home_team.clone(), r.home_rating);
        ratings.insert(r.away_team.clone(), r.away_rating);
    }
    ratings
}

fn insert_chronologically(ledger: &mut Vec<SeriesPointsRecord>, record: SeriesPointsRecord) {
    let key = record.chrono_key();
    let pos = ledger.partition_point(|r| r.chrono_key() <= key);
    ledger.insert(pos, record);
}
