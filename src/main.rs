use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use nhl_etl::apis::gamelog::{self, GamelogExtractor};
use nhl_etl::apis::teams::{self, TeamFactsExtractor};
use nhl_etl::config::Config;
use nhl_etl::infra::http_client::ReqwestHttp;
use nhl_etl::logging;
use nhl_etl::pipeline::{run_stage, StageRegistry};
use nhl_etl::sink;

#[derive(Parser)]
#[command(name = "nhl_etl")]
#[command(about = "NHL statistics extractor and record-stream transform stages")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./nhl_etl.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a team's gamelog table and emit one record per game
    Gamelog {
        /// Short team name used in the gamelog URL
        team_name: String,
        /// First year of the season
        #[arg(allow_hyphen_values = true)]
        from_year: i32,
        /// Second year of the season
        #[arg(allow_hyphen_values = true)]
        to_year: i32,
        /// Either `regular` or `playoffs`
        game_type: String,
        /// Endpoint template with {team_name}, {years} and {game_type} placeholders
        #[arg(long)]
        endpoint_template: Option<String>,
        #[arg(long)]
        timeout_seconds: Option<u64>,
    },
    /// Fetch team facts from the stats API
    Teams {
        #[arg(long)]
        endpoint_url: Option<String>,
        #[arg(long)]
        timeout_seconds: Option<u64>,
        /// JSON key holding the team collection
        #[arg(long)]
        payload_key: Option<String>,
    },
    /// Run a registered transform stage over a record stream
    Transform {
        /// Stage name, see `stages`
        stage: String,
        /// Input file (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Convert a record stream to CSV using its header for column order
    ToCsv {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List registered transform stages
    Stages,
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Gamelog {
            team_name,
            from_year,
            to_year,
            game_type,
            endpoint_template,
            timeout_seconds,
        } => {
            if let Some(template) = endpoint_template {
                config.gamelog.endpoint_template = template;
            }
            if let Some(seconds) = timeout_seconds {
                config.gamelog.timeout_seconds = seconds;
            }
            config.validate()?;

            let extractor = GamelogExtractor::new(ReqwestHttp, &config.gamelog);
            let extraction = extractor
                .extract_for(&team_name, from_year, to_year, &game_type)
                .with_context(|| format!("extracting gamelog for {team_name} {from_year}-{to_year} {game_type}"))?;
            if extraction.is_mismatch() {
                warn!(team = %team_name, "no gamelog data for the requested season");
            }
            let written = gamelog::write_stream(extraction, open_output(None)?)?;
            info!(team = %team_name, records = written, "gamelog extracted");
        }
        Commands::Teams {
            endpoint_url,
            timeout_seconds,
            payload_key,
        } => {
            if let Some(url) = endpoint_url {
                config.teams.endpoint_url = url;
            }
            if let Some(seconds) = timeout_seconds {
                config.teams.timeout_seconds = seconds;
            }
            if let Some(key) = payload_key {
                config.teams.payload_key = key;
            }
            config.validate()?;

            let extractor = TeamFactsExtractor::new(ReqwestHttp, &config.teams);
            let records = extractor.extract().context("extracting team facts")?;
            teams::write_stream(&records, open_output(None)?)?;
        }
        Commands::Transform {
            stage,
            input,
            output,
        } => {
            let registry = StageRegistry::new();
            let mut stage = registry.build(&stage)?;
            run_stage(
                stage.as_mut(),
                open_input(input.as_deref())?,
                open_output(output.as_deref())?,
            )?;
        }
        Commands::ToCsv { input, output } => {
            sink::write_csv(open_input(input.as_deref())?, open_output(output.as_deref())?)?;
        }
        Commands::Stages => {
            let mut out = open_output(None)?;
            for name in StageRegistry::new().list_stages() {
                writeln!(out, "{name}")?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let _log_guard = logging::init_logging(&config.logging);

    if let Err(e) = run(cli, config) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
