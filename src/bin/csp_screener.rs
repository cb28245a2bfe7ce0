use csp_screener::analysis::daily_moves::daily_moves;
use csp_screener::config::{Config, ThresholdComparison};
use csp_screener::data_provider::csv_import;
use csp_screener::data_provider::{MarketDataProvider, SnapshotStore};
use csp_screener::services::{CsvReportSink, ReportSink, ScreeningService};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info, warn};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

fn parse_arg<T>(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .value_of(name)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid --{} '{}'", name, raw)))
        .transpose()
}

/// Environment defaults with the `--data-dir` override every subcommand accepts.
fn store_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::from_env()?;
    if let Some(dir) = matches.value_of("data-dir") {
        config = config.with_data_dir(dir);
    }
    Ok(config)
}

fn screen_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = store_config(matches)?;

    if let Some(tickers) = matches.value_of("tickers") {
        config = config.with_tickers(tickers.split(',').map(str::to_string).collect());
    }
    if let Some(dir) = matches.value_of("results-dir") {
        config = config.with_results_dir(dir);
    }
    if let Some(pct) = parse_arg::<f64>(matches, "safety-pct")? {
        config = config.with_safety_pct(pct);
    }
    if let Some(cash) = parse_arg::<f64>(matches, "cash")? {
        config = config.with_cash_on_hand(cash);
    }
    if let Some(days) = parse_arg::<i64>(matches, "min-days")? {
        config = config.with_min_expiry_days(days);
    }
    if let Some(date) = matches.value_of("date") {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{}'", date))?;
        config = config.with_evaluation_date(date);
    }
    if matches.is_present("inclusive") {
        config = config.with_threshold_comparison(ThresholdComparison::Inclusive);
    }

    Ok(config.validate()?)
}

fn data_dir_arg() -> Arg<'static> {
    Arg::with_name("data-dir")
        .long("data-dir")
        .value_name("DIR")
        .help("Snapshot directory (defaults to STOCK_DATA_DIR or ./stock_data)")
        .takes_value(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let app = App::new("CSP Screener")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Screens securities for cash-secured put candidates")
        .subcommand(
            SubCommand::with_name("screen")
                .about("Screen tickers and write a results CSV")
                .arg(
                    Arg::with_name("tickers")
                        .short('t')
                        .long("tickers")
                        .value_name("TICKERS")
                        .help("Comma-separated tickers (defaults to TICKERS or the built-in list)")
                        .takes_value(true),
                )
                .arg(data_dir_arg())
                .arg(
                    Arg::with_name("results-dir")
                        .long("results-dir")
                        .value_name("DIR")
                        .help("Where RESULTS_*.csv is written")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("safety-pct")
                        .short('s')
                        .long("safety-pct")
                        .value_name("PCT")
                        .help("Maximum tolerated share of weeks breaching the threshold")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("cash")
                        .short('c')
                        .long("cash")
                        .value_name("AMOUNT")
                        .help("Cash available to secure puts")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("min-days")
                        .long("min-days")
                        .value_name("DAYS")
                        .help("Minimum calendar days to expiry")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("date")
                        .short('d')
                        .long("date")
                        .value_name("DATE")
                        .help("Evaluation date (YYYY-MM-DD), defaults to today in New York")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("inclusive")
                        .long("inclusive")
                        .help("Count weeks exactly at the threshold as breaches")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("import")
                .about("Import a daily history CSV into the snapshot directory")
                .arg(
                    Arg::with_name("file")
                        .short('f')
                        .long("file")
                        .value_name("CSV")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .required(true)
                        .takes_value(true),
                )
                .arg(data_dir_arg()),
        )
        .subcommand(
            SubCommand::with_name("explore")
                .about("Show the latest stored daily bars of a ticker")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .required(true)
                        .takes_value(true),
                )
                .arg(data_dir_arg())
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Number of most recent records to display")
                        .takes_value(true)
                        .default_value("10"),
                )
                .arg(
                    Arg::with_name("moves")
                        .short('m')
                        .long("moves")
                        .value_name("PCT")
                        .help("Also list every day that moved more than PCT percent")
                        .takes_value(true),
                ),
        );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("screen") {
        let config = Arc::new(screen_config(matches)?);
        info!(
            "Screening {} tickers at {}% safety with {} cash",
            config.tickers.len(),
            config.csp_safety_pct,
            config.cash_on_hand
        );

        let service = ScreeningService::from_snapshot_store(config.clone())?;
        let outcome = service.screen_all(&config.tickers).await;

        for (ticker, e) in &outcome.failures {
            error!("{} failed: {}", ticker, e);
        }
        if outcome.reports.is_empty() {
            warn!("No reports produced, nothing written");
            return Ok(());
        }

        let mut sink = CsvReportSink::new(&config.results_dir);
        for report in outcome.reports {
            sink.accept(report)?;
        }
        let path = sink.finish()?;
        info!("Results saved to {}", path.display());
    } else if let Some(matches) = matches.subcommand_matches("import") {
        let config = store_config(matches)?;
        let file = matches.value_of("file").unwrap_or_default();
        let ticker = matches.value_of("ticker").unwrap_or_default();

        let series = csv_import::import_daily_csv(Path::new(file), ticker)
            .with_context(|| format!("importing {}", file))?;
        let store = SnapshotStore::new(&config.data_dir);
        let path = store.save_daily(&series)?;
        info!(
            "Stored {} daily records for {} ({} to {}) at {}",
            series.len(),
            series.ticker(),
            series.points()[0].date,
            series.last().date,
            path.display()
        );
    } else if let Some(matches) = matches.subcommand_matches("explore") {
        let config = store_config(matches)?;
        let ticker = matches.value_of("ticker").unwrap_or_default();
        let limit = parse_arg::<usize>(matches, "limit")?.unwrap_or(10);

        let store = SnapshotStore::new(&config.data_dir);
        let series = store.fetch_daily_history(ticker).await?;
        info!("{}: {} daily records", series.ticker(), series.len());

        info!("{:-<72}", "");
        info!(
            "{:<12} {:<10} {:<10} {:<10} {:<10} {:<15}",
            "Date", "Open", "High", "Low", "Close", "Volume"
        );
        info!("{:-<72}", "");

        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
        let skip = series.len().saturating_sub(limit);
        for daily in series.points().iter().skip(skip) {
            info!(
                "{:<12} {:<10} {:<10} {:<10} {:<10.2} {:<15}",
                daily.date.to_string(),
                cell(daily.open),
                cell(daily.high),
                cell(daily.low),
                daily.close,
                daily.volume.map_or_else(|| "-".to_string(), |v| v.to_string())
            );
        }
        if skip > 0 {
            info!("... and {} earlier records", skip);
        }

        if let Some(limit_pct) = parse_arg::<f64>(matches, "moves")? {
            let stats = daily_moves(&series, limit_pct);
            info!("{:-<72}", "");
            info!("Total days: {}", stats.total_days);
            info!("Average daily return: {}%", stats.avg_daily_return_pct);
            info!("Average daily move: {}%", stats.avg_daily_move_pct);
            info!(
                "Days moving more than {}%: {}",
                stats.move_limit_pct,
                stats.large_moves.len()
            );
            for (date, pct) in &stats.large_moves {
                info!("{:<12} {:>8.3}%", date.to_string(), pct);
            }
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
