use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::match_index::MatchIndex;
use crate::rankings_table::RankingsTable;

// One archived match alongside both teams' standing in that month's table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRankingRow {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub result: String,
    pub toss: String,
    pub home_rank: u32,
    pub home_rating: f64,
    pub away_rank: u32,
    pub away_rating: f64,
}

// Joins every match dated in [from, to] with the rankings. Matches where either side has no entry
// in the match month (or earlier that year) are dropped.
pub fn merge_matches(index: &MatchIndex, rankings: &RankingsTable, from: NaiveDate, to: NaiveDate) -> Vec<MatchRankingRow> {
    let mut rows = Vec::new();
    let mut dropped = 0;

    for m in index.between_dates(from, to) {
        let period = YearMonth::of(m.date);
        let (Some(home), Some(away)) = (
            rankings.entry_before(&m.home_team, period),
            rankings.entry_before(&m.away_team, period),
        ) else {
            debug!("No ranking for match {} ({} v {}) in {}", m.match_id, m.home_team, m.away_team, period);
            dropped += 1;
            continue;
        };

        rows.push(MatchRankingRow {
            date: m.date,
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            result: m.result.clone(),
            toss: m.toss.clone(),
            home_rank: home.rank,
            home_rating: home.rating,
            away_rank: away.rank,
            away_rating: away.rating,
        });
    }

    rows.sort_by_key(|r| r.date);
    info!("Merged {} matches with rankings, dropped {}", rows.len(), dropped);
    rows
}
