// mgrid - media library completeness audits
// Checks a Plex inventory against the TVMaze catalog and writes an xlsx report.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mediagrid_cli::audit::{self, AuditOptions};
use mediagrid_cli::exit_codes::EXIT_SUCCESS;
use mediagrid_cli::fetch::{PlexClient, TvMazeClient};
use mediagrid_cli::CliError;
use mediagrid_config::Settings;
use mediagrid_recon::{CatalogId, Lookup, LookupCache};

/// Env var holding the log filter (`warn` when unset).
const LOG_ENV: &str = "MGRID_LOG";

#[derive(Parser)]
#[command(name = "mgrid")]
#[command(about = "Audit a media library against an external catalog")]
#[command(version)]
struct Cli {
    /// Config file (default: MEDIAGRID_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress progress and summary on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServerArgs {
    /// Plex server URL
    #[arg(long, env = "PLEX_URL")]
    server: String,

    /// Plex authentication token
    #[arg(long, env = "PLEX_TOKEN", hide_env_values = true)]
    token: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the completeness workbook
    #[command(after_help = "\
Examples:
  mgrid audit --server http://localhost:32400 --token abc123
  mgrid audit --section 'TV Shows' --output shows.xlsx
  PLEX_URL=http://nas:32400 PLEX_TOKEN=abc123 mgrid audit --json")]
    Audit {
        #[command(flatten)]
        server: ServerArgs,

        /// Library section to include (repeatable; default: all movie and show sections)
        #[arg(long, value_name = "NAME")]
        section: Vec<String>,

        /// Output workbook (default: <file_prefix>_<YYYYMMDD>.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Detail-fetch worker count (default from config)
        #[arg(long)]
        workers: Option<usize>,

        /// Don't register sheets as Excel tables
        #[arg(long)]
        no_table: bool,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// List movie and show library sections
    Sections {
        #[command(flatten)]
        server: ServerArgs,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up one show in the catalog
    #[command(after_help = "\
Examples:
  mgrid lookup 'Breaking Bad'
  mgrid lookup tt0903747
  mgrid lookup tvdb:81189")]
    Lookup {
        /// Title, IMDB id (tt…) or tvdb:<id>
        identifier: String,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    // Ignore a second init (only possible in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Settings::load(cli.config.as_deref())
        .map_err(CliError::from)
        .and_then(|settings| match cli.command {
            Commands::Audit { server, section, output, workers, no_table, json } => {
                let opts = AuditOptions {
                    server: server.server,
                    token: server.token,
                    sections: section,
                    output: audit::resolve_output(output.as_deref(), &settings),
                    workers: workers.unwrap_or(settings.inventory.workers),
                    register_table: settings.report.register_table && !no_table,
                };
                cmd_audit(&settings, &opts, json, cli.quiet)
            }
            Commands::Sections { server, json } => cmd_sections(&settings, &server, json),
            Commands::Lookup { identifier, json } => cmd_lookup(&settings, &identifier, json),
        });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_audit(settings: &Settings, opts: &AuditOptions, json: bool, quiet: bool) -> Result<(), CliError> {
    if opts.workers == 0 {
        return Err(CliError::args("--workers must be at least 1"));
    }

    let report = audit::run_audit(settings, opts)?;

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| CliError::general(e.to_string()))?;
        println!("{out}");
    } else if !quiet {
        audit::print_summary(&report);
    }
    Ok(())
}

fn cmd_sections(settings: &Settings, server: &ServerArgs, json: bool) -> Result<(), CliError> {
    let plex = PlexClient::new(&server.server, &server.token, Duration::from_secs(settings.inventory.timeout_secs))
        .map_err(CliError::connect)?;
    plex.connect().map_err(CliError::connect)?;
    let sections = plex.sections().map_err(CliError::connect)?;

    if json {
        let out = serde_json::to_string_pretty(&sections).map_err(|e| CliError::general(e.to_string()))?;
        println!("{out}");
    } else {
        for s in &sections {
            println!("{}\t{}\t{}", s.key, s.kind.as_str(), s.title);
        }
    }
    Ok(())
}

fn cmd_lookup(settings: &Settings, identifier: &str, json: bool) -> Result<(), CliError> {
    let id = CatalogId::parse(identifier);
    if matches!(&id, CatalogId::Title(t) if t.is_empty()) {
        return Err(CliError::args("identifier must not be empty"));
    }

    let catalog = TvMazeClient::with_base_url(&settings.catalog.base_url, Duration::from_secs(settings.catalog.timeout_secs))
        .map_err(|e| CliError::general(e.to_string()))?;
    // Goes through the cache so a catalog error reads as "not found"
    let cache = LookupCache::new(catalog, 1);

    match cache.get_or_fetch(&id) {
        Lookup::Found(entry) if json => {
            let out = serde_json::to_string_pretty(&*entry).map_err(|e| CliError::general(e.to_string()))?;
            println!("{out}");
        }
        Lookup::Found(entry) => {
            println!("{} (TVMaze #{}): {} seasons", entry.name, entry.catalog_id, entry.total_group_count);
            for (season, episodes) in &entry.group_counts {
                println!("  Season {season}: {episodes} episodes");
            }
        }
        Lookup::NotFound if json => println!("null"),
        Lookup::NotFound => println!("{id}: not found"),
    }
    Ok(())
}
