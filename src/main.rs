//! Command-line entry point: turns CSV training plans into workout documents
//! and optionally submits them to the workout service.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

mod convert;
use convert::{ConvertOptions, Conversion, convert_text};
mod csrf;
mod document;
mod estimate;
mod export;
mod plan;
mod row;
mod settings;
use settings::{Settings, SettingsError};
mod sport;
use sport::SportMode;
mod steps;
mod target;
mod tokenizer;
mod upload;
use upload::{SubmitError, WorkoutClient, resolve_token, submit_all};

#[derive(Debug, Parser)]
#[command(
    name = "plan_to_workout",
    version,
    about = "Convert CSV training plans into structured workouts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Plan file to read, or `-` for stdin.
    file: PathBuf,
    /// Dialect preset (`comma` or `semicolon`).
    #[arg(long)]
    preset: Option<String>,
    /// Field delimiter, overriding the preset.
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a plan and print the documents as JSON.
    Convert {
        #[command(flatten)]
        plan: PlanArgs,
        /// Write one JSON file per workout into this directory instead.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Convert a plan and submit each workout to the workout service.
    Upload {
        #[command(flatten)]
        plan: PlanArgs,
        /// CSRF token to submit with.
        #[arg(long, conflicts_with = "page")]
        token: Option<String>,
        /// Saved page markup to read the CSRF token from.
        #[arg(long)]
        page: Option<PathBuf>,
        #[arg(long, env = "PLAN_TO_WORKOUT_ENDPOINT")]
        endpoint: Option<String>,
        /// Minimum pause between submissions.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Print an example plan.
    Template {
        #[arg(long)]
        preset: Option<String>,
        /// Produce a cycling plan with a bike marker row.
        #[arg(long)]
        bike: bool,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn convert_options(
    settings: &Settings,
    args: &PlanArgs,
) -> Result<ConvertOptions, SettingsError> {
    let mut settings = settings.clone();
    if let Some(preset) = &args.preset {
        settings.preset = preset.clone();
    }
    if args.delimiter.is_some() {
        settings.delimiter = args.delimiter;
    }
    settings.convert_options()
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

fn load_plan(settings: &Settings, args: &PlanArgs) -> CliResult<Conversion> {
    let options = convert_options(settings, args)?;
    let text = read_input(&args.file)?;
    let conversion = convert_text(&text, &options)?;
    log::info!("Plan sport: {}", conversion.sport.key());
    for diag in &conversion.diagnostics {
        eprintln!("warning: {diag}");
    }
    if conversion.documents.is_empty() {
        return Err("no workout could be built from the plan".into());
    }
    Ok(conversion)
}

fn run(cli: Cli, settings: &Settings) -> CliResult<()> {
    match cli.command {
        Command::Convert { plan, out_dir } => {
            let conversion = load_plan(settings, &plan)?;
            match out_dir {
                Some(dir) => {
                    for path in export::save_documents(&dir, &conversion.documents)? {
                        println!("{}", path.display());
                    }
                }
                None => {
                    let docs: Vec<_> = conversion.documents.iter().map(|(_, d)| d).collect();
                    println!("{}", serde_json::to_string_pretty(&docs)?);
                }
            }
        }
        Command::Upload {
            plan,
            token,
            page,
            endpoint,
            delay_ms,
        } => {
            let token = match page {
                Some(page) => csrf::extract_token(&std::fs::read_to_string(page)?),
                None => resolve_token(token.as_deref(), settings.csrf_token.as_deref()),
            };
            let endpoint = endpoint.unwrap_or_else(|| settings.endpoint.clone());
            // Without a token nothing is converted or sent.
            let client = WorkoutClient::new(&endpoint, token)?;
            let conversion = load_plan(settings, &plan)?;
            let spacing = Duration::from_millis(delay_ms.unwrap_or(settings.submit_delay_ms));
            let results = submit_all(&client, &conversion.documents, spacing);
            let failed: Vec<&upload::Disposition> =
                results.iter().filter(|d| d.result.is_err()).collect();
            for d in &failed {
                if let Err(e) = &d.result {
                    eprintln!("row {} ({}): {e}", d.row, d.name);
                }
            }
            println!(
                "Submitted {} of {} workouts",
                results.len() - failed.len(),
                results.len()
            );
            if let Some(SubmitError::Unauthorized(_) | SubmitError::Forbidden(_)) =
                failed.first().and_then(|d| d.result.as_ref().err())
            {
                eprintln!("hint: the token may have expired, fetch a fresh page");
            }
        }
        Command::Template { preset, bike } => {
            let dialect = match preset {
                Some(name) => settings::preset(&name)?,
                None => settings.dialect()?,
            };
            let sport = if bike {
                SportMode::Cycling
            } else {
                SportMode::Running
            };
            print!("{}", plan::sample_plan(&dialect, sport)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let settings = Settings::load();
    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert_arguments() {
        let cli = Cli::try_parse_from([
            "plan_to_workout",
            "convert",
            "plan.csv",
            "--preset",
            "semicolon",
            "--out-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Command::Convert { plan, out_dir } => {
                assert_eq!(plan.file, PathBuf::from("plan.csv"));
                assert_eq!(plan.preset.as_deref(), Some("semicolon"));
                assert_eq!(out_dir, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn token_and_page_conflict() {
        let err = Cli::try_parse_from([
            "plan_to_workout",
            "upload",
            "plan.csv",
            "--token",
            "t",
            "--page",
            "page.html",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn flags_override_settings() {
        let settings = Settings {
            preset: "semicolon".into(),
            running_speed_mps: 3.5,
            ..Settings::default()
        };
        let args = PlanArgs {
            file: PathBuf::from("-"),
            preset: None,
            delimiter: Some('|'),
        };
        let options = convert_options(&settings, &args).unwrap();
        assert_eq!(options.dialect.delimiter, '|');
        assert_eq!(options.speeds.running_mps, 3.5);

        let args = PlanArgs {
            file: PathBuf::from("-"),
            preset: Some("bogus".into()),
            delimiter: None,
        };
        assert!(convert_options(&settings, &args).is_err());
    }

    #[test]
    fn load_plan_reads_file_and_rejects_empty_results() {
        let settings = Settings::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Name,Segments,Warmup,Cooldown").unwrap();
        writeln!(file, "MorningRun,1,300,300,Zone5,1200,0,0").unwrap();
        let args = PlanArgs {
            file: file.path().to_path_buf(),
            preset: None,
            delimiter: None,
        };
        let conversion = load_plan(&settings, &args).unwrap();
        assert_eq!(conversion.documents.len(), 1);
        assert_eq!(conversion.documents[0].0, 2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "Only,two").unwrap();
        let args = PlanArgs {
            file: bad.path().to_path_buf(),
            preset: None,
            delimiter: None,
        };
        assert!(load_plan(&settings, &args).is_err());
    }

    #[test]
    fn upload_without_token_stops_before_reading_plan() {
        let _guard = settings::tests::ENV_MUTEX.lock().unwrap();
        unsafe {
            std::env::remove_var(upload::TOKEN_ENV);
        }
        let cli = Cli::try_parse_from([
            "plan_to_workout",
            "upload",
            "does-not-exist.csv",
            "--endpoint",
            "http://localhost/workout",
        ])
        .unwrap();
        let err = run(cli, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("no CSRF token"));
    }
}
