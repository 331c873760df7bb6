use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;

use crate::data_loader::MatchInfo;

/// The match archive keyed by match id. Ids increase with time, though not
/// necessarily by one between consecutive matches of a series.
#[derive(Debug, Default)]
pub struct MatchIndex {
    matches: BTreeMap<u64, MatchInfo>,
}

impl MatchIndex {
    pub fn new(matches: Vec<MatchInfo>) -> Self {
        Self {
            matches: matches.into_iter().map(|m| (m.match_id, m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, match_id: u64) -> Option<&MatchInfo> {
        self.matches.get(&match_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchInfo> {
        self.matches.values()
    }

    // Matches dated inside [from, to], in id order
    pub fn between_dates(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = &MatchInfo> {
        self.matches.values().filter(move |m| m.date >= from && m.date <= to)
    }

    /// Date of the last match of a series: the `num_matches`-th match between
    /// the two teams, counting from the one played on `start`.
    pub fn resolve_end_date(&self, start: NaiveDate, num_matches: u32, home: &str, away: &str) -> Option<NaiveDate> {
        let first = self
            .matches
            .values()
            .find(|m| m.date == start && m.is_between(home, away))?;

        let last = self
            .matches
            .range(first.match_id..)
            .map(|(_, m)| m)
            .filter(|m| m.is_between(home, away))
            .nth(num_matches.saturating_sub(1) as usize);

        if last.is_none() {
            debug!("Archive has fewer than {} matches for {} v {} from {}", num_matches, home, away, start);
        }
        last.map(|m| m.date)
    }
}
