use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::calendar::parse_date;
use crate::data_loader::SeriesRow;
use crate::error::{RankingError, Result};
use crate::match_index::MatchIndex;
use crate::ranking_context::RankingContext;

// A series as it appears in the scraped listing pages:
// teams "Test Series England v. Australia", result "England 3-0" / "Drawn 1-1"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRow {
    pub teams: String,
    pub date: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub num_matches: u32,
    pub result: String,
}

// Home team is the text before "v." minus its leading label word, away team is the rest.
pub fn split_teams(teams: &str) -> Option<(String, String)> {
    let (left, right) = teams.split_once("v.")?;
    let home = left.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
    let away = right.trim().to_string();

    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home, away))
}

fn parse_score(score: &str) -> Option<(u32, u32)> {
    let (a, b) = score.trim().split_once('-')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Reads a series result as `(home, away)` wins. The score is written with the
/// named side first; "Drawn" scores are home first.
pub fn parse_result(result: &str, home: &str, away: &str) -> Option<(u32, u32)> {
    let result = result.trim();

    if let Some(score) = result.strip_prefix("Drawn") {
        return parse_score(score);
    }
    if let Some(score) = result.strip_prefix(home) {
        return parse_score(score);
    }
    if let Some(score) = result.strip_prefix(away) {
        return parse_score(score).map(|(away_wins, home_wins)| (home_wins, away_wins));
    }
    None
}

pub fn parse_listing_row(row: &ListingRow) -> Result<SeriesRow> {
    let malformed = || RankingError::MalformedSeriesResult {
        teams: row.teams.clone(),
        result: row.result.clone(),
    };

    let (home_team, away_team) = split_teams(&row.teams).ok_or_else(malformed)?;
    let (home_team_pts, away_team_pts) = parse_result(&row.result, &home_team, &away_team).ok_or_else(malformed)?;

    Ok(SeriesRow {
        date: row.date.trim().to_string(),
        date_end: String::new(),
        home_team,
        away_team,
        num_matches: row.num_matches,
        home_team_pts,
        away_team_pts,
    })
}

// Converts a listing into series-table rows. Rows whose result can't be read are skipped;
// end dates are filled from the match archive where it has them.
pub fn convert_listing(rows: &[ListingRow], index: Option<&MatchIndex>, ranking_context: &RankingContext) -> Result<Vec<SeriesRow>> {
    let mut series = Vec::new();

    for row in rows {
        let mut parsed = match parse_listing_row(row) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping listing row: {}", e);
                continue;
            }
        };

        if let Some(index) = index {
            let start = parse_date(&parsed.date, &ranking_context.series_date_format)?;
            if let Some(end) = index.resolve_end_date(start, parsed.num_matches, &parsed.home_team, &parsed.away_team) {
                parsed.date_end = end.format(&ranking_context.series_date_format).to_string();
            }
        }

        series.push(parsed);
    }

    info!("Converted {} of {} listing rows", series.len(), rows.len());
    Ok(series)
}
