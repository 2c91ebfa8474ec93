// steptrace: step through JikiScript and JavaScript programs frame by frame

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use steptrace::config::{self, Config, LoggingConfig};
use steptrace::exercise::{self, ScenarioResult};
use steptrace::interpreter::Language;
use steptrace::orchestrator::Orchestrator;
use steptrace::ui::App;

const LOG_ENV: &str = "STEPTRACE_LOG";

#[derive(Parser)]
#[command(name = "steptrace")]
#[command(about = "Step through a program's execution frame by frame", version)]
struct Cli {
    /// Program to run
    file: PathBuf,

    /// Source language (guessed from the file extension when omitted)
    #[arg(short, long, value_enum)]
    language: Option<Language>,

    /// Run the program against an exercise's scenarios
    #[arg(short, long)]
    exercise: Option<String>,

    /// Settings file
    #[arg(short, long, default_value = config::DEFAULT_PATH)]
    config: PathBuf,

    /// Print the results instead of opening the terminal UI
    #[arg(long)]
    no_tui: bool,

    /// With --no-tui, print the results as JSON
    #[arg(long, requires = "no_tui")]
    json: bool,
}

fn init_logging(logging: &LoggingConfig, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .with_context(|| format!("invalid log filter {:?}", logging.filter))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // The TUI owns the terminal, so without a log file nothing is written.
    let installed = match (&logging.file, to_stderr) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("could not create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        (None, true) => builder.with_writer(io::stderr).try_init(),
        (None, false) => builder.with_writer(io::sink).try_init(),
    };
    installed.map_err(|error| anyhow::anyhow!(error))
}

fn language_for(path: &Path, requested: Option<Language>) -> Language {
    requested.unwrap_or_else(|| {
        Language::from_extension(path.extension().and_then(|ext| ext.to_str()).unwrap_or(""))
    })
}

fn print_text(result: &ScenarioResult) {
    println!(
        "{} [{}]",
        result.name,
        if result.passed() { "PASS" } else { "FAIL" }
    );
    for frame in result.frames.iter() {
        println!(
            "  {:>9.3}ms  line {:<3} {}",
            frame.time_in_ms(),
            frame.line(),
            frame.generate_description()
        );
        if let Some(error) = frame.error() {
            println!("               {}: {}", error.kind, error.message);
        }
    }
    for line in &result.log_lines {
        println!("  > {}", line.output);
    }
    for expect in result.expects.iter().filter(|expect| !expect.pass) {
        println!("  ✗ {}", expect.error_html);
    }
}

fn run_tui(orchestrator: Orchestrator) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(orchestrator);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    init_logging(&config.logging, cli.no_tui)?;

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("could not read {}", cli.file.display()))?;
    let language = language_for(&cli.file, cli.language);
    info!(file = %cli.file.display(), %language, "loaded program");

    let mut orchestrator = Orchestrator::new(language, source)
        .with_language_features(config.language_features.clone())
        .with_playback(config.playback.auto_play, config.playback.speed);

    if let Some(slug) = &cli.exercise {
        let Some(definition) = exercise::find(slug) else {
            bail!(
                "unknown exercise {:?} (available: {})",
                slug,
                exercise::slugs().join(", ")
            );
        };
        orchestrator = orchestrator.with_exercise(definition);
    }

    if !cli.no_tui {
        return run_tui(orchestrator);
    }

    let results = orchestrator.run_code();
    if cli.json {
        let tests: Vec<_> = results.tests.iter().map(ScenarioResult::to_json).collect();
        println!("{}", serde_json::to_string_pretty(&tests)?);
    } else {
        for result in &results.tests {
            print_text(result);
        }
    }

    if !results.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}
