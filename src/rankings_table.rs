//! Monthly ranking snapshots.
//!
//! The table is a chronological list of blocks, one per month. Blocks are only
//! ever appended; history is never rewritten.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::calendar::YearMonth;
use crate::error::{RankingError, Result};
use crate::util::dense_rank;

#[derive(Debug, Clone, PartialEq)]
pub struct RankingSnapshot {
    pub period: YearMonth,
    pub team: String,
    pub rank: u32,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub team: String,
    pub rating: f64,
}

/// One month's rank/rating rows, ordered by rank then team name.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingBlock {
    pub period: YearMonth,
    pub entries: Vec<RankingEntry>,
}

impl RankingBlock {
    /// Builds a block from raw ratings, assigning dense ranks.
    pub fn ranked(period: YearMonth, ratings: Vec<(String, f64)>) -> Result<Self> {
        let values: Vec<f64> = ratings.iter().map(|(_, r)| *r).collect();
        let ranks = dense_rank(&values);

        let entries = ratings
            .into_iter()
            .zip(ranks)
            .map(|((team, rating), rank)| RankingEntry { rank, team, rating })
            .collect();

        Self::with_entries(period, entries)
    }

    fn with_entries(period: YearMonth, mut entries: Vec<RankingEntry>) -> Result<Self> {
        entries.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.team.cmp(&b.team)));

        let mut names: Vec<&str> = entries.iter().map(|e| e.team.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|p| p[0] == p[1]) {
            return Err(RankingError::DuplicateTeam { team: dup[0].to_string(), period });
        }

        Ok(Self { period, entries })
    }

    pub fn entry(&self, team: &str) -> Option<&RankingEntry> {
        self.entries.iter().find(|e| e.team == team)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingsTable {
    blocks: Vec<RankingBlock>,
}

impl RankingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups rows into blocks. Rows must already be in chronological order;
    /// ranks are taken as given.
    pub fn from_snapshots(snapshots: Vec<RankingSnapshot>) -> Result<Self> {
        let mut grouped: Vec<(YearMonth, Vec<RankingEntry>)> = Vec::new();

        for s in snapshots {
            let entry = RankingEntry { rank: s.rank, team: s.team, rating: s.rating };
            let latest = grouped.last().map(|(period, _)| *period);

            match latest {
                Some(period) if period > s.period => {
                    return Err(RankingError::OutOfOrder { latest: period, new: s.period });
                }
                Some(period) if period == s.period => {
                    if let Some((_, entries)) = grouped.last_mut() {
                        entries.push(entry);
                    }
                }
                _ => grouped.push((s.period, vec![entry])),
            }
        }

        let blocks = grouped
            .into_iter()
            .map(|(period, entries)| RankingBlock::with_entries(period, entries))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[RankingBlock] {
        &self.blocks
    }

    pub fn latest_block(&self) -> Option<&RankingBlock> {
        self.blocks.last()
    }

    pub fn block(&self, period: YearMonth) -> Option<&RankingBlock> {
        self.blocks
            .binary_search_by(|b| b.period.cmp(&period))
            .ok()
            .map(|idx| &self.blocks[idx])
    }

    pub fn has_block(&self, period: YearMonth) -> bool {
        self.block(period).is_some()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = RankingSnapshot> + '_ {
        self.blocks.iter().flat_map(|b| {
            b.entries.iter().map(move |e| RankingSnapshot {
                period: b.period,
                team: e.team.clone(),
                rank: e.rank,
                rating: e.rating,
            })
        })
    }

    /// Appends a block computed from ratings. The block must be later than every existing one.
    pub fn append_block(&mut self, period: YearMonth, ratings: Vec<(String, f64)>) -> Result<&RankingBlock> {
        if let Some(latest) = self.latest_block() {
            if latest.period >= period {
                return Err(RankingError::OutOfOrder { latest: latest.period, new: period });
            }
        }

        self.blocks.push(RankingBlock::ranked(period, ratings)?);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Copies the latest block forward to `period`, replacing ratings for the
    /// teams present in `updates` and re-ranking.
    pub fn carry_forward(&mut self, period: YearMonth, updates: &BTreeMap<String, f64>) -> Result<&RankingBlock> {
        let ratings: Vec<(String, f64)> = match self.latest_block() {
            Some(latest) => latest
                .entries
                .iter()
                .map(|e| (e.team.clone(), updates.get(&e.team).copied().unwrap_or(e.rating)))
                .collect(),
            None => updates.iter().map(|(t, r)| (t.clone(), *r)).collect(),
        };

        self.append_block(period, ratings)
    }

    pub fn rating_at(&self, team: &str, period: YearMonth) -> Option<f64> {
        self.block(period).and_then(|b| b.entry(team)).map(|e| e.rating)
    }

    /// Rank and rating for `team` in `period`, walking back through earlier
    /// months of the same year when that month has no entry.
    pub fn entry_before(&self, team: &str, period: YearMonth) -> Option<&RankingEntry> {
        let mut cursor = Some(period);
        while let Some(p) = cursor {
            if let Some(entry) = self.block(p).and_then(|b| b.entry(team)) {
                return Some(entry);
            }
            cursor = p.prev_in_year();
        }
        None
    }

    /// Like `entry_before` but never fails: an unknown team is rated 0.0.
    pub fn rating_before(&self, team: &str, period: YearMonth) -> f64 {
        match self.entry_before(team, period) {
            Some(entry) => entry.rating,
            None => {
                debug!("No rating for {} at or before {} in the same year, using 0.0", team, period);
                0.0
            }
        }
    }
}
