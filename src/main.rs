use clap::{Parser, Subcommand};
use event_pages::airtable::AirtableClient;
use event_pages::config::{self, Credentials, Project};
use event_pages::records::{RecordFile, RecordSource};
use event_pages::{generate, output, page};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(clap::Args, Clone, Default)]
struct BuildArgs {
    /// Read records from an Airtable-shaped JSON dump instead of the API
    #[arg(long)]
    records_file: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "event-pages")]
#[command(version)]
#[command(about = "Generate static event pages from an Airtable table")]
#[command(long_about = "\
Generate static event pages from an Airtable table

Each run fetches every record of the table, renders the ones not seen
before into events/<slug>.html, and rewrites index.html. Running with no
subcommand is the same as 'build'.

Credentials come from the environment (or a .env file in the project root):

  AIRTABLE_API_KEY     API token
  AIRTABLE_BASE_ID     Base to read (app...)
  AIRTABLE_TABLE_NAME  Table within the base

Project layout:

  ./
  ├── event-pages.toml           # Optional config (see 'gen-config')
  ├── template.html              # Event page template (see 'gen-template')
  ├── processed-records.json     # Records already rendered
  ├── index.html                 # Generated listing
  └── events/
      └── demo-talk.html         # One page per record")]
struct Cli {
    /// Project root holding the template, store, and output
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch records, render new pages, update the store and index (default)
    Build(BuildArgs),
    /// Rewrite index.html from the processed-records store only
    Index,
    /// Print a stock event-pages.toml with all options documented
    GenConfig,
    /// Print a starter template.html using every page field
    GenTemplate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    // Missing .env is the normal case in CI, where the variables are injected.
    dotenvy::from_path(cli.root.join(".env")).ok();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error generating pages: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.unwrap_or(Command::Build(BuildArgs::default())) {
        Command::Build(args) => {
            let project = Project::load(&cli.root)?;
            let source: Box<dyn RecordSource> = match args.records_file {
                Some(path) => Box::new(RecordFile::new(path)),
                None => Box::new(AirtableClient::new(
                    Credentials::from_env()?,
                    &project.config.airtable,
                )?),
            };
            let report = generate::run(source.as_ref(), &project, &generate::system_clock)?;
            output::print_build_output(&report, &source.describe(), &project.root);
        }
        Command::Index => {
            let project = Project::load(&cli.root)?;
            let (index_path, indexed) = generate::rebuild_index(&project)?;
            output::print_index_output(&index_path, indexed, &project.root);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenTemplate => {
            print!("{}", page::STOCK_TEMPLATE);
        }
    }
    Ok(())
}

/// Log to stderr so stdout carries only the end-of-run report.
/// `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
