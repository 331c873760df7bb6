//! Test cricket rankings reconstruction
//!
//! Rebuilds monthly team rankings from series results using the points-based
//! rating scheme, chaining forward from the last official table.

pub mod calendar;
pub mod data_loader;
pub mod error;
pub mod fit;
pub mod match_index;
pub mod merge;
pub mod points;
pub mod ranking;
pub mod ranking_context;
pub mod rankings_table;
pub mod report;
pub mod series_listing;
pub mod util;
pub mod window;

pub use calendar::YearMonth;
pub use data_loader::{SeriesPointsRecord, SeriesRecord};
pub use error::{RankingError, Result};
pub use ranking::{PropagationSummary, RankingPropagator};
pub use ranking_context::RankingContext;
pub use rankings_table::{RankingBlock, RankingSnapshot, RankingsTable};
