//! Servlet protocol deployment packager CLI.
//!
//! Works on exploded packages: directories named like archives (`app.war`,
//! `shop.ear`, `util.jar`). `compose` writes the composed package next to the
//! requested output directory and prints a one-line summary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use packager::assemble::{ComposeRequest, CompositionSummary, compose_dirs};
use packager::exit_codes;
use packager::inspect::classify_dir;
use packager::io::config::{CONFIG_FILE, PackagerConfig, load_config, write_config};
use packager::logging;

#[derive(Parser)]
#[command(
    name = "packager",
    version,
    about = "Inject the servlet test runner into deployment packages"
)]
struct Cli {
    /// Config file (missing file means defaults).
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with default values.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the shape of an exploded package: web, library or composite.
    Classify { dir: PathBuf },
    /// Inject the runner into an exploded application package.
    Compose {
        /// Application package directory.
        #[arg(long)]
        app: PathBuf,
        /// Auxiliary library directories, attached as dependencies.
        #[arg(long = "aux")]
        auxiliaries: Vec<PathBuf>,
        /// Directory that receives the composed package.
        #[arg(long)]
        out: PathBuf,
        /// Replace an existing composed package.
        #[arg(short, long)]
        force: bool,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::InitConfig { force } => cmd_init_config(&cli.config, force),
        Command::Classify { dir } => cmd_classify(&cli.config, &dir),
        Command::Compose {
            app,
            auxiliaries,
            out,
            force,
            json,
        } => {
            let request = ComposeRequest {
                application: app,
                auxiliaries,
                output: out,
                config_path: cli.config,
                force,
            };
            cmd_compose(&request, json)
        }
    }
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &PackagerConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("config: {}", path.display());
    Ok(())
}

fn cmd_classify(config: &Path, dir: &Path) -> Result<()> {
    let cfg = load_config(config)?;
    let kind = classify_dir(dir, &cfg)?;
    println!("{kind}");
    Ok(())
}

fn cmd_compose(request: &ComposeRequest, json: bool) -> Result<()> {
    let summary = compose_dirs(request)?;
    if json {
        let payload = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{payload}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &CompositionSummary) {
    println!(
        "compose: package={} input={} output={} entries={} auxiliaries={} path={}",
        summary.package,
        summary.input_kind,
        summary.output_kind,
        summary.entries,
        summary.auxiliaries.len(),
        summary.output.display()
    );
}
