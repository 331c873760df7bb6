use serde::Serialize;

use crate::error::Result;
use crate::rankings_table::{RankingBlock, RankingEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

#[derive(Serialize)]
struct BlockReport<'a> {
    year: i32,
    month: &'a str,
    rankings: &'a [RankingEntry],
}

pub fn render_report(block: &RankingBlock, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let report = BlockReport {
                year: block.period.year(),
                month: block.period.month_name(),
                rankings: &block.entries,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Table => {
            let mut out = format!("{} {}\n", block.period.month_name(), block.period.year());
            for e in &block.entries {
                out.push_str(&format!("|{0:3}. | {1:20} | {2:6.1}\n", e.rank, e.team, e.rating));
            }
            Ok(out)
        }
    }
}

pub fn output_report(block: &RankingBlock, format: OutputFormat) -> Result<()> {
    print!("{}", render_report(block, format)?);
    Ok(())
}
