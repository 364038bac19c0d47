#[macro_use]
extern crate log;

use std::{io, path::PathBuf};

use anyhow::Context;
use chrono::{Duration, Local};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use coldbath::{
    GarminConfig, OuraConfig, SourceError,
    baths_csv::{load_cold_baths, write_cold_baths},
    report::{ReportOptions, open_in_browser, render_report, write_report},
    sources::{DateRange, GarminClient, OuraClient, SleepSource, WorkoutSource},
};
use coldbath_algos::{
    BathClassifier, BathDayComparison, BathWindow, MAX_BATH_DURATION, MIN_BATH_DURATION,
    MORNING_END_HOUR, MORNING_START_HOUR, duplicate_dates,
};
use coldbath_types::{ColdBathObservation, SleepMetric, SleepObservation, WorkoutSession};
use dotenv::dotenv;

#[derive(Parser)]
#[command(version, about = "Correlate cold baths with sleep from wearable data")]
pub struct ColdBathCli {
    #[command(flatten)]
    pub oura: OuraConfig,
    #[command(flatten)]
    pub garmin: GarminConfig,
    #[clap(subcommand)]
    pub subcommand: ColdBathCommand,
}

#[derive(Subcommand)]
pub enum ColdBathCommand {
    ///
    /// Print the correlation between cold baths and a sleep metric
    ///
    Correlate {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        baths: BathArgs,
        #[arg(long, default_value = "total")]
        metric: SleepMetric,
    },
    ///
    /// Detect cold baths in the workout history
    ///
    Classify {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, value_enum, default_value_t)]
        source: WorkoutProvider,
        #[command(flatten)]
        window: WindowArgs,
        /// Write the detected bath days to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    ///
    /// Render an HTML report with a sleep chart
    ///
    Report {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        baths: BathArgs,
        #[arg(long, default_value = "total")]
        metric: SleepMetric,
        #[arg(long, default_value = "report.html")]
        output: PathBuf,
        /// Open the report in the default browser
        #[arg(long)]
        open: bool,
    },
    ///
    /// Print shell completions
    ///
    Completions { shell: clap_complete::Shell },
}

#[derive(Args)]
pub struct RangeArgs {
    /// Number of days before today to include
    #[arg(long, default_value_t = 30)]
    pub days: u32,
}

impl RangeArgs {
    fn range(&self) -> anyhow::Result<DateRange> {
        DateRange::last_days(self.days, Local::now().date_naive())
            .with_context(|| format!("--days {} reaches before the supported calendar", self.days))
    }
}

#[derive(Args)]
pub struct BathArgs {
    /// CSV file with a `date` column
    #[arg(long, default_value = "cold_baths.csv")]
    pub baths_csv: PathBuf,
    /// Detect bath days from workouts instead of reading the CSV
    #[arg(long, conflicts_with = "baths_csv")]
    pub from_workouts: bool,
    #[arg(long, value_enum, default_value_t)]
    pub source: WorkoutProvider,
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Args)]
pub struct WindowArgs {
    /// First hour (inclusive) a bath may start
    #[arg(long, default_value_t = MORNING_START_HOUR)]
    pub morning_start: u32,
    /// Hour (exclusive) by which a bath must have started
    #[arg(long, default_value_t = MORNING_END_HOUR)]
    pub morning_end: u32,
    #[arg(long, default_value_t = MIN_BATH_DURATION.num_seconds())]
    pub min_bath_secs: i64,
    #[arg(long, default_value_t = MAX_BATH_DURATION.num_seconds())]
    pub max_bath_secs: i64,
}

impl WindowArgs {
    fn classifier(&self) -> anyhow::Result<BathClassifier> {
        let window = BathWindow {
            start_hour: self.morning_start,
            end_hour: self.morning_end,
            min_duration: Duration::try_seconds(self.min_bath_secs)
                .context("--min-bath-secs out of range")?,
            max_duration: Duration::try_seconds(self.max_bath_secs)
                .context("--max-bath-secs out of range")?,
        };
        Ok(BathClassifier::new(window)?)
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum WorkoutProvider {
    #[default]
    Oura,
    Garmin,
}

/// Workout client chosen on the command line, built before any request is sent.
enum WorkoutClient {
    Oura(OuraClient),
    Garmin(GarminClient),
}

impl WorkoutClient {
    fn new(cli: &ColdBathCli, provider: WorkoutProvider) -> Result<Self, SourceError> {
        Ok(match provider {
            WorkoutProvider::Oura => Self::Oura(OuraClient::new(&cli.oura)?),
            WorkoutProvider::Garmin => Self::Garmin(GarminClient::new(&cli.garmin)?),
        })
    }

    async fn fetch(&self, range: DateRange) -> anyhow::Result<Vec<WorkoutSession>> {
        let sessions = match self {
            Self::Oura(client) => client.fetch_workouts(range).await,
            Self::Garmin(client) => client.fetch_workouts(range).await,
        };
        sessions.context("failed to fetch workouts")
    }
}

/// Where bath days come from. Everything local (CSV, window, credentials) is
/// resolved when the plan is made so configuration errors surface first.
enum BathPlan {
    Csv(Vec<ColdBathObservation>),
    Workouts {
        client: WorkoutClient,
        classifier: BathClassifier,
    },
}

impl BathPlan {
    fn new(cli: &ColdBathCli, args: &BathArgs) -> anyhow::Result<Self> {
        if args.from_workouts {
            return Ok(Self::Workouts {
                classifier: args.window.classifier()?,
                client: WorkoutClient::new(cli, args.source)?,
            });
        }

        let baths = load_cold_baths(&args.baths_csv)
            .with_context(|| format!("failed to load {}", args.baths_csv.display()))?;
        Ok(Self::Csv(baths))
    }

    async fn bath_days(self, range: DateRange) -> anyhow::Result<Vec<ColdBathObservation>> {
        match self {
            Self::Csv(baths) => Ok(baths),
            Self::Workouts { client, classifier } => {
                let sessions = client.fetch(range).await?;
                Ok(classifier.classify(&sessions))
            }
        }
    }
}

/// Fetches sleep and bath days once every client and input has been validated.
async fn collect(
    cli: &ColdBathCli,
    range: &RangeArgs,
    baths: &BathArgs,
) -> anyhow::Result<(DateRange, Vec<SleepObservation>, Vec<ColdBathObservation>)> {
    let range = range.range()?;
    let sleep_client = OuraClient::new(&cli.oura)?;
    let plan = BathPlan::new(cli, baths)?;

    let sleep = sleep_client
        .fetch_sleep(range)
        .await
        .context("failed to fetch sleep data from Oura")?;
    let baths = plan.bath_days(range).await?;
    warn_duplicates(&sleep);

    Ok((range, sleep, baths))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        println!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper_util", log::LevelFilter::Off)
        .init();

    run(ColdBathCli::parse()).await
}

async fn run(cli: ColdBathCli) -> anyhow::Result<()> {
    match &cli.subcommand {
        ColdBathCommand::Correlate {
            range,
            baths,
            metric,
        } => {
            let (_, sleep, baths) = collect(&cli, range, baths).await?;
            let comparison = BathDayComparison::new(&sleep, &baths, *metric);
            println!("{}", comparison);
            Ok(())
        }
        ColdBathCommand::Classify {
            range,
            source,
            window,
            output,
        } => {
            let range = range.range()?;
            let classifier = window.classifier()?;
            let client = WorkoutClient::new(&cli, *source)?;
            let sessions = client.fetch(range).await?;
            let baths = classifier.classify(&sessions);
            info!(
                "{} of {} workouts look like cold baths",
                baths.len(),
                sessions.len()
            );

            for bath in &baths {
                println!("{}", bath.date);
            }

            if let Some(output) = output {
                write_cold_baths(output, &baths)
                    .with_context(|| format!("failed to write {}", output.display()))?;
                info!("bath days written to {}", output.display());
            }
            Ok(())
        }
        ColdBathCommand::Report {
            range,
            baths,
            metric,
            output,
            open,
        } => {
            let (range, sleep, baths) = collect(&cli, range, baths).await?;

            let options = ReportOptions {
                title: format!("Cold baths and sleep, {} to {}", range.start, range.end),
                metric: *metric,
            };
            let html =
                render_report(&sleep, &baths, &options).context("failed to render report")?;
            write_report(output, &html)
                .with_context(|| format!("failed to write {}", output.display()))?;

            if *open {
                open_in_browser(output).context("failed to open report")?;
            }
            Ok(())
        }
        ColdBathCommand::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut ColdBathCli::command(),
                "coldbath",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

fn warn_duplicates(sleep: &[SleepObservation]) {
    let duplicates = duplicate_dates(sleep);
    if !duplicates.is_empty() {
        warn!(
            "{} dates have more than one sleep record, each one is counted: {:?}",
            duplicates.len(),
            duplicates
        );
    }
}
