use serde::Serialize;

use crate::rankings_table::RankingsTable;
use crate::util::mean;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FitReport {
    pub blocks_compared: usize,
    pub rows_compared: usize,
    pub mean_abs_rating_error: f64,
    pub rank_agreement: f64, // share of rows with exactly the official rank
}

// Compares reconstructed blocks against official ones for every month both tables have.
// Only teams present in both blocks are compared.
pub fn analyze_fit(official: &RankingsTable, reconstructed: &RankingsTable, verbose: bool) -> FitReport {
    let mut errors = Vec::new();
    let mut rank_hits = 0;
    let mut blocks_compared = 0;

    for block in reconstructed.blocks() {
        let Some(truth) = official.block(block.period) else { continue };
        blocks_compared += 1;

        let mut block_errors = Vec::new();
        for entry in &block.entries {
            let Some(official_entry) = truth.entry(&entry.team) else { continue };

            block_errors.push((entry.rating - official_entry.rating).abs());
            if entry.rank == official_entry.rank { rank_hits += 1; }

            if verbose {
                println!("{0} | {1:20} | Rating {2:6.1} v {3:6.1} | Rank {4:2} v {5:2}",
                    block.period,
                    entry.team,
                    entry.rating,
                    official_entry.rating,
                    entry.rank,
                    official_entry.rank,
                );
            }
        }

        if verbose {
            println!("{0} | mean abs. error {1:5.2} over {2} teams", block.period, mean(&block_errors), block_errors.len());
        }
        errors.extend(block_errors);
    }

    let rows_compared = errors.len();
    FitReport {
        blocks_compared,
        rows_compared,
        mean_abs_rating_error: mean(&errors),
        rank_agreement: if rows_compared == 0 { 0.0 } else { rank_hits as f64 / rows_compared as f64 },
    }
}
