use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::*;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::calendar::{parse_date, YearMonth};
use crate::error::{RankingError, Result};
use crate::match_index::MatchIndex;
use crate::ranking_context::RankingContext;
use crate::rankings_table::{RankingSnapshot, RankingsTable};

// A completed series. Scores are match wins; drawn matches are implied by num_matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub num_matches: u32,
    pub home_points: u32,
    pub away_points: u32,
}

// Series that could be placed in time, plus the number that could not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedSeries {
    pub series: Vec<SeriesRecord>,
    pub skipped: usize,
}

// Series table row as stored on disk. date_end may be empty when it still has to be resolved
// against the match archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub date: String,
    #[serde(default)]
    pub date_end: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub num_matches: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub home_team_pts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub away_team_pts: u32,
}

// One row of the series-points ledger. Column names and order are the on-disk format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesPointsRecord {
    #[serde(rename = "date")]
    pub start_date: NaiveDate,
    #[serde(rename = "date_end")]
    pub end_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub num_matches: u32,
    #[serde(rename = "home_team_pts")]
    pub home_points: u32,
    #[serde(rename = "away_team_pts")]
    pub away_points: u32,
    pub home_tot_points: f64,
    pub away_tot_points: f64,
    pub rolling_home_matches: f64,
    pub rolling_away_matches: f64,
    pub rolling_home_points: f64,
    pub rolling_away_points: f64,
    pub home_rating: f64,
    pub away_rating: f64,
}

impl SeriesPointsRecord {
    pub fn chrono_key(&self) -> (NaiveDate, NaiveDate) {
        (self.end_date, self.start_date)
    }
}

// Rankings table row as stored on disk
#[derive(Serialize, Deserialize, Debug, Clone)]
struct RankingRow {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    year: i32,
    month: String,
    team: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    ranking: u32,
    rating: f64,
}

// One match from the archive. Dates use the archive's own format.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    pub match_id: u64,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub result: String,
    pub toss: String,
}

impl MatchInfo {
    pub fn is_between(&self, team_a: &str, team_b: &str) -> bool {
        (self.home_team == team_a && self.away_team == team_b)
            || (self.home_team == team_b && self.away_team == team_a)
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct MatchRow {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    match_id: u64,
    date: String,
    home_team: String,
    away_team: String,
    #[serde(default)]
    result: String,
    #[serde(default)]
    toss: String,
}

// Reads every row of a headed CSV file, naming the file and row in any error.
pub fn read_rows<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| RankingError::schema(path, format!("cannot open: {e}")))?;

    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize().enumerate() {
        let row: T = row.map_err(|e| RankingError::schema(path, format!("row {}: {}", idx + 1, e)))?;
        rows.push(row);
    }

    debug!("Read {} rows from {}", rows.len(), path);
    Ok(rows)
}

pub fn write_rows<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", rows.len(), path);
    Ok(())
}

// Loads the series table. Series without an end date are resolved against the match archive
// when one is given; those that still cannot be placed are skipped and counted.
pub fn load_series(path: &str, index: Option<&MatchIndex>, ranking_context: &RankingContext) -> Result<LoadedSeries> {
    let format = ranking_context.series_date_format.as_str();
    let mut series = Vec::new();
    let mut skipped = 0;

    for (idx, row) in read_rows::<SeriesRow>(path)?.into_iter().enumerate() {
        let row_err = |message: String| RankingError::schema(path, format!("row {}: {}", idx + 1, message));

        let start_date = parse_date(&row.date, format).map_err(|e| row_err(e.to_string()))?;

        let end_date = if row.date_end.trim().is_empty() {
            let resolved = index.and_then(|ix| {
                ix.resolve_end_date(start_date, row.num_matches, &row.home_team, &row.away_team)
            });
            match resolved {
                Some(d) => d,
                None => {
                    warn!("No end date for {} v {} starting {}, skipping", row.home_team, row.away_team, row.date);
                    skipped += 1;
                    continue;
                }
            }
        } else {
            parse_date(&row.date_end, format).map_err(|e| row_err(e.to_string()))?
        };

        if row.num_matches < 1 {
            return Err(row_err("num_matches must be at least 1".to_string()));
        }
        if row.home_team_pts + row.away_team_pts > row.num_matches {
            return Err(row_err(format!(
                "score {}-{} exceeds {} matches",
                row.home_team_pts, row.away_team_pts, row.num_matches
            )));
        }
        if end_date < start_date {
            return Err(row_err(format!("ends {} before it starts {}", end_date, start_date)));
        }

        series.push(SeriesRecord {
            start_date,
            end_date,
            home_team: row.home_team,
            away_team: row.away_team,
            num_matches: row.num_matches,
            home_points: row.home_team_pts,
            away_points: row.away_team_pts,
        });
    }

    // Chronological by completion, which is the order the propagator consumes them in
    series.sort_by(|a, b| (a.end_date, a.start_date).cmp(&(b.end_date, b.start_date)));

    info!("Loaded {} series from {} ({} without an end date)", series.len(), path, skipped);
    Ok(LoadedSeries { series, skipped })
}

pub fn load_rankings(path: &str) -> Result<RankingsTable> {
    let mut snapshots = Vec::new();

    for (idx, row) in read_rows::<RankingRow>(path)?.into_iter().enumerate() {
        let period = YearMonth::from_name(row.year, &row.month)
            .map_err(|e| RankingError::schema(path, format!("row {}: {}", idx + 1, e)))?;

        snapshots.push(RankingSnapshot {
            period,
            team: row.team,
            rank: row.ranking,
            rating: row.rating,
        });
    }

    let table = RankingsTable::from_snapshots(snapshots)
        .map_err(|e| RankingError::schema(path, e.to_string()))?;

    info!("Loaded {} ranking blocks from {}", table.blocks().len(), path);
    Ok(table)
}

pub fn save_rankings(path: &str, table: &RankingsTable) -> Result<()> {
    let rows: Vec<RankingRow> = table
        .snapshots()
        .map(|s| RankingRow {
            year: s.period.year(),
            month: s.period.month_name().to_string(),
            team: s.team.clone(),
            ranking: s.rank,
            rating: s.rating,
        })
        .collect();

    write_rows(path, &rows)
}

// A missing ledger file is an empty ledger; everything else must parse.
pub fn load_ledger(path: &str) -> Result<Vec<SeriesPointsRecord>> {
    if !Path::new(path).exists() {
        info!("No ledger at {}, starting empty", path);
        return Ok(Vec::new());
    }

    let mut ledger: Vec<SeriesPointsRecord> = read_rows(path)?;
    ledger.sort_by_key(|r| r.chrono_key());
    Ok(ledger)
}

pub fn save_ledger(path: &str, ledger: &[SeriesPointsRecord]) -> Result<()> {
    let mut sorted = ledger.to_vec();
    sorted.sort_by_key(|r| r.chrono_key());
    write_rows(path, &sorted)
}

pub fn load_matches(path: &str, ranking_context: &RankingContext) -> Result<Vec<MatchInfo>> {
    let format = ranking_context.match_date_format.as_str();
    let mut matches = Vec::new();

    for (idx, row) in read_rows::<MatchRow>(path)?.into_iter().enumerate() {
        let date = parse_date(&row.date, format)
            .map_err(|e| RankingError::schema(path, format!("row {}: {}", idx + 1, e)))?;

        matches.push(MatchInfo {
            match_id: row.match_id,
            date,
            home_team: row.home_team,
            away_team: row.away_team,
            result: row.result,
            toss: row.toss,
        });
    }

    info!("Loaded {} matches from {}", matches.len(), path);
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn loads_series_and_sorts_by_end_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "series.csv", "\
,date,date_end,home_team,away_team,num_matches,home_team_pts,away_team_pts
0,10/07/2013,05/08/2013,England,Australia,5,3,0
1,06/03/2013,26/03/2013,New Zealand,England,3,0,0
");
        let LoadedSeries { series, skipped } = load_series(&path, None, &RankingContext::default()).unwrap();

        assert_eq!(skipped, 0);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].home_team, "New Zealand");
        assert_eq!(series[1].end_date, NaiveDate::from_ymd_opt(2013, 8, 5).unwrap());
        assert_eq!(series[1].home_points, 3);
    }

    #[test]
    fn series_without_end_date_is_resolved_or_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "series.csv", "\
date,date_end,home_team,away_team,num_matches,home_team_pts,away_team_pts
06/03/2013,,New Zealand,England,2,0,1
10/07/2013,,England,Australia,5,3,0
");
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let index = MatchIndex::new(vec![
            MatchInfo { match_id: 10, date: d(2013, 3, 6), home_team: "New Zealand".into(), away_team: "England".into(), result: "draw".into(), toss: "home".into() },
            MatchInfo { match_id: 11, date: d(2013, 3, 14), home_team: "New Zealand".into(), away_team: "England".into(), result: "away".into(), toss: "away".into() },
        ]);

        let loaded = load_series(&path, Some(&index), &RankingContext::default()).unwrap();
        assert_eq!(loaded.series.len(), 1);
        assert_eq!(loaded.series[0].end_date, d(2013, 3, 14));
        assert_eq!(loaded.skipped, 1);

        // Without an archive neither can be placed
        let loaded = load_series(&path, None, &RankingContext::default()).unwrap();
        assert!(loaded.series.is_empty());
        assert_eq!(loaded.skipped, 2);
    }

    #[test]
    fn impossible_score_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "series.csv", "\
date,date_end,home_team,away_team,num_matches,home_team_pts,away_team_pts
06/03/2013,26/03/2013,New Zealand,England,2,2,1
");
        let err = load_series(&path, None, &RankingContext::default()).unwrap_err();
        assert!(matches!(err, RankingError::Schema { .. }));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rankings.csv", "year,month,team,rating\n2013,MARCH,England,117.0\n");
        assert!(matches!(load_rankings(&path), Err(RankingError::Schema { .. })));
    }

    #[test]
    fn rankings_are_written_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(&dir, "rankings.csv", "\
year,month,team,ranking,rating
2013,MARCH,South Africa,1,129.0
2013,MARCH,England,2,117.0
");
        let table = load_rankings(&input).unwrap();
        let output = dir.path().join("out.csv");
        save_rankings(output.to_str().unwrap(), &table).unwrap();

        let written = std::fs::read_to_string(output).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("year,month,team,ranking,rating"));
        assert_eq!(lines.next(), Some("2013,MARCH,South Africa,1,129.0"));
    }

    #[test]
    fn missing_ledger_is_empty_and_saved_ledger_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let path = path.to_str().unwrap();
        assert!(load_ledger(path).unwrap().is_empty());

        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let record = SeriesPointsRecord {
            start_date: d(2013, 3, 6),
            end_date: d(2013, 3, 26),
            home_team: "New Zealand".into(),
            away_team: "England".into(),
            num_matches: 3,
            home_points: 0,
            away_points: 0,
            home_tot_points: 394.0,
            away_tot_points: 396.0,
            rolling_home_matches: 20.0,
            rolling_away_matches: 32.0,
            rolling_home_points: 1520.0,
            rolling_away_points: 3700.0,
            home_rating: 95.7,
            away_rating: 117.7,
        };
        save_ledger(path, &[record.clone()]).unwrap();

        let header = std::fs::read_to_string(path).unwrap();
        assert!(header.starts_with("date,date_end,home_team,away_team,num_matches,home_team_pts,away_team_pts,home_tot_points"));
        assert_eq!(load_ledger(path).unwrap(), vec![record]);
    }
}
