mod cli;
mod git;
mod prune;
mod settings;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use git::{ensure_remote, open_repo, GitRemote};
use prune::{run, Outcome};
use settings::{RunConfig, Settings, SETTINGS_FILE};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let repo = open_repo()?;
    let settings = Settings::load(&repo.path().join(SETTINGS_FILE));
    let config = RunConfig::resolve(&cli, settings);
    let remote = GitRemote::for_repo(&repo, &config.remote);
    ensure_remote(&repo, remote.name())?;

    let outcome = run(&config, &remote, |branches| {
        ui::ask_confirmation(&config.remote, branches)
    })?;

    match &outcome {
        Outcome::NothingToDelete => {
            println!(
                "Nothing to delete: '{}' has no branches besides '{}'.",
                config.remote, config.protected
            );
        }
        Outcome::Previewed(branches) => {
            ui::print_candidates(&config.remote, branches);
            println!("Dry run: {} branch(es) would be deleted.", branches.len());
        }
        Outcome::Aborted => {
            println!("Aborted.");
        }
        Outcome::Completed(tally) => {
            ui::print_summary(tally);
        }
    }

    Ok(ExitCode::from(outcome.exit_status()))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
