use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "prune-remote",
    version,
    about = "Delete every branch on a remote except the protected one"
)]
pub struct Cli {
    /// Show which branches would be deleted without deleting them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,

    /// Remote to prune (default: settings file, then "origin")
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Branch that is never deleted (default: settings file, then "main")
    #[arg(long, value_name = "BRANCH")]
    pub protected: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
