//! Test cricket rankings CLI

use clap::{Parser, Subcommand};
use cricket_rankings::{RankingContext, Result, YearMonth};
use cricket_rankings::report::OutputFormat;

#[derive(Parser)]
#[command(name = "cricket_rankings")]
#[command(about = "Reconstruct test cricket rankings from series results", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "rankings.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the rankings forward, scoring series and filling in missing months
    Propagate {
        /// Last month to produce (YYYY-MM)
        #[arg(long)]
        to: YearMonth,
        /// First month to walk (default: month after the latest block)
        #[arg(long)]
        from: Option<YearMonth>,
        /// Compute and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Points earned by each side of one series
    Points {
        num_matches: u32,
        home_score: u32,
        away_score: u32,
        home_rating: f64,
        away_rating: f64,
    },
    /// Rolling match and point totals for the window ending on a date
    Window {
        /// Reference date (YYYY-MM-DD)
        #[arg(long)]
        at: chrono::NaiveDate,
    },
    /// Convert a scraped series listing (teams,date,num_matches,result) into the series table
    Listing {
        /// Listing CSV
        input: String,
        /// Output path (default: configured series table)
        #[arg(long)]
        output: Option<String>,
    },
    /// Join archived matches with both teams' rankings
    Merge {
        /// First match date (YYYY-MM-DD)
        #[arg(long)]
        from: chrono::NaiveDate,
        /// Last match date (YYYY-MM-DD)
        #[arg(long)]
        to: chrono::NaiveDate,
    },
    /// Print one month's rankings
    Report {
        /// Month (YYYY-MM, default: latest)
        #[arg(long)]
        month: Option<YearMonth>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Compare a reconstructed rankings table against the official one
    Fit {
        /// Reconstructed rankings CSV
        #[arg(long)]
        reconstructed: String,
    },
    /// Write the default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let ranking_context = if std::path::Path::new(&cli.config).exists() {
        match RankingContext::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        RankingContext::default()
    };

    let result = match cli.command {
        Commands::Propagate { to, from, dry_run } => commands::propagate(&ranking_context, from, to, dry_run),
        Commands::Points { num_matches, home_score, away_score, home_rating, away_rating } => {
            commands::points(&ranking_context, num_matches, home_score, away_score, home_rating, away_rating)
        }
        Commands::Window { at } => commands::window(&ranking_context, at),
        Commands::Listing { input, output } => commands::listing(&ranking_context, &input, output),
        Commands::Merge { from, to } => commands::merge(&ranking_context, from, to),
        Commands::Report { month, format } => commands::report(&ranking_context, month, format),
        Commands::Fit { reconstructed } => commands::fit(&ranking_context, &reconstructed, cli.verbose),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use std::path::Path;

    use chrono::NaiveDate;
    use cricket_rankings::data_loader::{self, load_ledger, load_matches, load_rankings, load_series};
    use cricket_rankings::match_index::MatchIndex;
    use cricket_rankings::series_listing::{convert_listing, ListingRow};
    use cricket_rankings::{fit as fit_analysis, merge as match_merge, points as series_points, report as block_report, window as rolling_window};
    use cricket_rankings::{PropagationSummary, RankingError, RankingPropagator};

    // The match archive is optional; without it every series needs an explicit end date
    fn load_index(ctx: &RankingContext) -> Result<Option<MatchIndex>> {
        if !Path::new(&ctx.data.matches_path).exists() {
            return Ok(None);
        }
        Ok(Some(MatchIndex::new(load_matches(&ctx.data.matches_path, ctx)?)))
    }

    pub fn propagate(ctx: &RankingContext, from: Option<YearMonth>, to: YearMonth, dry_run: bool) -> Result<()> {
        let index = load_index(ctx)?;
        let loaded = load_series(&ctx.data.series_path, index.as_ref(), ctx)?;
        let mut rankings = load_rankings(&ctx.data.rankings_path)?;
        let mut ledger = load_ledger(&ctx.data.ledger_path)?;

        let summary = PropagationSummary {
            series_skipped: loaded.skipped,
            ..RankingPropagator::new(ctx).run(&loaded.series, &mut rankings, &mut ledger, from, to)?
        };

        println!("Months walked:     {}", summary.months_walked);
        println!("Blocks emitted:    {}", summary.blocks_emitted);
        println!("Series scored:     {}", summary.series_processed);
        println!("Already in ledger: {}", summary.series_already_recorded);
        println!("No end date:       {}", summary.series_skipped);

        if dry_run {
            println!("Dry run, nothing written");
            return Ok(());
        }

        data_loader::save_rankings(&ctx.data.rankings_path, &rankings)?;
        data_loader::save_ledger(&ctx.data.ledger_path, &ledger)?;
        println!("Wrote {} and {}", ctx.data.rankings_path, ctx.data.ledger_path);
        Ok(())
    }

    pub fn points(ctx: &RankingContext, num_matches: u32, home_score: u32, away_score: u32, home_rating: f64, away_rating: f64) -> Result<()> {
        if home_score + away_score > num_matches {
            return Err(RankingError::Parse(format!(
                "score {}-{} exceeds {} matches",
                home_score, away_score, num_matches
            )));
        }

        let (home, away) = series_points::calc_points(num_matches, home_score, away_score, home_rating, away_rating, ctx);
        println!("Home: {:.1}", home);
        println!("Away: {:.1}", away);
        Ok(())
    }

    pub fn window(ctx: &RankingContext, at: NaiveDate) -> Result<()> {
        let index = load_index(ctx)?;
        let series = load_series(&ctx.data.series_path, index.as_ref(), ctx)?.series;
        let ledger = load_ledger(&ctx.data.ledger_path)?;

        let bounds = rolling_window::WindowBounds::ending_at(at, ctx)?;
        let matches = rolling_window::rolling_matches(at, &series, ctx)?;
        let points = rolling_window::rolling_points(at, &ledger, ctx)?;

        println!("Half weight from {}, full weight from {}, to {}", bounds.start, bounds.mid, bounds.end);
        for (team, played) in &matches {
            let pts = points.get(team).copied().unwrap_or(0.0);
            println!("| {0:20} | Matches {1:5.1} | Points {2:8.1} |", team, played, pts);
        }
        Ok(())
    }

    pub fn listing(ctx: &RankingContext, input: &str, output: Option<String>) -> Result<()> {
        let index = load_index(ctx)?;
        let rows: Vec<ListingRow> = data_loader::read_rows(input)?;
        let series = convert_listing(&rows, index.as_ref(), ctx)?;

        let output = output.unwrap_or_else(|| ctx.data.series_path.clone());
        data_loader::write_rows(&output, &series)?;
        println!("Wrote {} series to {}", series.len(), output);
        Ok(())
    }

    pub fn merge(ctx: &RankingContext, from: NaiveDate, to: NaiveDate) -> Result<()> {
        let index = load_index(ctx)?.ok_or_else(|| {
            RankingError::Config(format!("match archive {} not found", ctx.data.matches_path))
        })?;
        let rankings = load_rankings(&ctx.data.rankings_path)?;

        let rows = match_merge::merge_matches(&index, &rankings, from, to);
        data_loader::write_rows(&ctx.data.merged_path, &rows)?;
        println!("Wrote {} matches to {}", rows.len(), ctx.data.merged_path);
        Ok(())
    }

    pub fn report(ctx: &RankingContext, month: Option<YearMonth>, format: OutputFormat) -> Result<()> {
        let rankings = load_rankings(&ctx.data.rankings_path)?;

        let block = match month {
            Some(m) => rankings.block(m),
            None => rankings.latest_block(),
        };
        let block = block.ok_or_else(|| {
            RankingError::Parse(format!(
                "no rankings for {}",
                month.map(|m| m.to_string()).unwrap_or_else(|| "any month".to_string())
            ))
        })?;

        block_report::output_report(block, format)
    }

    pub fn fit(ctx: &RankingContext, reconstructed: &str, verbose: bool) -> Result<()> {
        let official = load_rankings(&ctx.data.rankings_path)?;
        let rebuilt = load_rankings(reconstructed)?;

        let report = fit_analysis::analyze_fit(&official, &rebuilt, verbose);
        println!("Blocks compared:       {}", report.blocks_compared);
        println!("Rows compared:         {}", report.rows_compared);
        println!("Mean abs. rating error {:.2}", report.mean_abs_rating_error);
        println!("Rank agreement         {:.1}%", report.rank_agreement * 100.0);
        Ok(())
    }

    pub fn init(config_path: &str) -> Result<()> {
        let ctx = RankingContext::default();
        ctx.save(config_path)?;
        println!("Created default config at {}", config_path);
        Ok(())
    }
}
