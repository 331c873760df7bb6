use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

/// Every tunable of the rating scheme plus where the tables live.
/// Loaded from a TOML file; missing keys fall back to the ICC test values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingContext {
    // Points calculator
    pub rating_gap_threshold: f64,  // gaps below this use the "close" values
    pub close_step: f64,            // opponent rating +/- this per win/loss
    pub mismatch_small_step: f64,   // stronger side's win bonus, weaker side's loss penalty
    pub mismatch_large_step: f64,   // stronger side's loss penalty, weaker side's win bonus
    pub series_bonus: f64,
    pub draw_share: f64,

    // Rolling window
    pub season_start_month: u32,
    pub half_band_years: i32,
    pub full_weight: f64,
    pub half_weight: f64,

    pub rating_decimals: i32,

    pub series_date_format: String,
    pub match_date_format: String,

    pub data: DataPaths,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub series_path: String,
    pub rankings_path: String,
    pub ledger_path: String,
    pub matches_path: String,
    pub merged_path: String,
}

impl Default for RankingContext {
    fn default() -> Self {
        Self {
            rating_gap_threshold: 40.0,
            close_step: 50.0,
            mismatch_small_step: 10.0,
            mismatch_large_step: 90.0,
            series_bonus: 1.0,
            draw_share: 0.5,

            season_start_month: 5, // May
            half_band_years: 2,
            full_weight: 1.0,
            half_weight: 0.5,

            rating_decimals: 1,

            series_date_format: "%d/%m/%Y".to_string(),
            match_date_format: "%Y/%m/%d".to_string(),

            data: DataPaths::default(),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            series_path: "data/processed/series_data.csv".to_string(),
            rankings_path: "data/processed/rankings_data.csv".to_string(),
            ledger_path: "data/processed/series_points_data.csv".to_string(),
            matches_path: "data/processed/match_info.csv".to_string(),
            merged_path: "data/processed/match_rankings_data.csv".to_string(),
        }
    }
}

impl RankingContext {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RankingError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let context: Self = toml::from_str(&content)
            .map_err(|e| RankingError::Config(format!("Failed to parse config: {}", e)))?;
        context.validate()?;
        Ok(context)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RankingError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.season_start_month) {
            return Err(RankingError::Config(format!(
                "season_start_month must be 1-12, got {}",
                self.season_start_month
            )));
        }
        if self.half_band_years < 0 {
            return Err(RankingError::Config("half_band_years must not be negative".to_string()));
        }
        if !(0..=6).contains(&self.rating_decimals) {
            return Err(RankingError::Config(format!(
                "rating_decimals must be 0-6, got {}",
                self.rating_decimals
            )));
        }
        Ok(())
    }
}
