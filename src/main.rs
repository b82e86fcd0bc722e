use clap::{Parser, Subcommand};
use sortdir::organize::{OrganizeOptions, organize};
use sortdir::scan::{DiscoverOptions, scan};
use sortdir::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Flags that decide which files a run looks at and where results go.
#[derive(clap::Args, Clone)]
struct LocationArgs {
    /// Output directory, relative to the source directory [default: out]
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Also process files whose name starts with a dot
    #[arg(long)]
    include_hidden: bool,
}

#[derive(clap::Args, Clone)]
struct RunArgs {
    #[command(flatten)]
    location: LocationArgs,

    /// Show what would happen without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Keep source file names as they are
    #[arg(long)]
    no_rename: bool,

    /// Build a slideshow from the copied images
    #[arg(long)]
    slideshow: bool,

    /// Slideshow file name inside the output directory (implies --slideshow)
    #[arg(long, value_name = "NAME")]
    slideshow_name: Option<String>,

    /// Print the run report as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "sortdir")]
#[command(about = "Normalize file names and sort copies into per-extension folders")]
#[command(long_about = "\
Normalize file names and sort copies into per-extension folders

Every regular file directly inside the source directory is:

  1. renamed in place to a clean name    My Photo.JPG  →  my_photo.jpg
  2. copied into a folder per extension  out/jpg/my_photo.jpg
  3. listed in out/index.html

Nothing is ever overwritten: collisions get a -1, -2, ... suffix before the
extension. Subdirectories, hidden files and the output directory itself are
left alone.

Settings are read from sortdir.toml in the source directory when present;
command-line flags override it. Run 'sortdir gen-config' to generate a
documented sortdir.toml.")]
#[command(version)]
struct Cli {
    /// Directory to organize
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// More diagnostics on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rename, copy and index the files of the source directory
    Run(RunArgs),
    /// List the files a run would process, without changing anything
    Check(LocationArgs),
    /// Print a stock sortdir.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Execute a command. `Ok(false)` means it completed but some files failed.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Run(args) => {
            let overrides = cli_overrides(&args.location, Some(&args));
            let config = config::load_config(&cli.source, overrides)?;
            let out_dir = config.resolve_out_dir(&cli.source)?;
            tracing::info!(source = %cli.source.display(), out = %out_dir.display(), "configuration loaded");

            let mut options = OrganizeOptions::from_config(&config, out_dir.clone(), args.dry_run);
            options.self_path = self_path();

            if args.json {
                let report = organize(&cli.source, &options, None)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(report.succeeded());
            }

            let (tx, rx) = std::sync::mpsc::channel();
            let dry_run = args.dry_run;
            let printer_out = out_dir.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_event(&event, &printer_out, dry_run) {
                        println!("{}", line);
                    }
                }
            });
            let result = organize(&cli.source, &options, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;
            output::print_summary(&report);
            Ok(report.succeeded())
        }
        Command::Check(location) => {
            let config = config::load_config(&cli.source, cli_overrides(&location, None))?;
            let out_dir = config.resolve_out_dir(&cli.source)?;
            let discovery = scan(
                &cli.source,
                &DiscoverOptions {
                    out_dir: out_dir.clone(),
                    include_hidden: config.include_hidden,
                    self_path: self_path(),
                },
            )?;
            output::print_check_output(&discovery, &out_dir);
            Ok(true)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(true)
        }
    }
}

/// Send diagnostics to stderr, filtered by `RUST_LOG` or the `-v` count.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolved path of this executable, so a copy living in the source
/// directory is never organized away.
fn self_path() -> Option<PathBuf> {
    std::env::current_exe()
        .and_then(|p| p.canonicalize())
        .ok()
}

/// Command-line flags as a TOML layer over the config file.
///
/// Only flags that were actually given end up in the layer, so unset flags
/// never mask a value from `sortdir.toml`.
fn cli_overrides(location: &LocationArgs, run: Option<&RunArgs>) -> Option<toml::Value> {
    let mut table = toml::Table::new();
    if let Some(out) = &location.out {
        table.insert("out_dir".into(), toml::Value::String(path_string(out)));
    }
    if location.include_hidden {
        table.insert("include_hidden".into(), toml::Value::Boolean(true));
    }

    if let Some(run) = run {
        if run.no_rename {
            table.insert("rename".into(), toml::Value::Boolean(false));
        }
        let mut slideshow = toml::Table::new();
        if run.slideshow || run.slideshow_name.is_some() {
            slideshow.insert("enabled".into(), toml::Value::Boolean(true));
        }
        if let Some(name) = &run.slideshow_name {
            slideshow.insert("name".into(), toml::Value::String(name.clone()));
        }
        if !slideshow.is_empty() {
            table.insert("slideshow".into(), toml::Value::Table(slideshow));
        }
    }

    (!table.is_empty()).then_some(toml::Value::Table(table))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
