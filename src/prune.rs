use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::git::Remote;
use crate::settings::RunConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Preview,
    Proceed,
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NothingToDelete,
    Previewed(Vec<String>),
    Aborted,
    Completed(Tally),
}

impl Outcome {
    /// Process exit status: 1 when any delete failed, 0 otherwise.
    pub fn exit_status(&self) -> u8 {
        match self {
            Outcome::Completed(tally) if tally.failed > 0 => 1,
            _ => 0,
        }
    }
}

/// Drops the protected branch (exact match, every occurrence) and `HEAD`,
/// keeping the remote's order.
pub fn filter_candidates(branches: Vec<String>, protected: &str) -> Vec<String> {
    branches
        .into_iter()
        .filter(|name| name != protected && name != "HEAD")
        .collect()
}

pub fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// `ask` is only called when neither dry-run nor force decides the run.
/// It returns `None` when the prompt was cancelled.
pub fn decide<F>(config: &RunConfig, ask: F) -> Result<Decision>
where
    F: FnOnce() -> Result<Option<String>>,
{
    if config.dry_run {
        return Ok(Decision::Preview);
    }
    if config.force {
        return Ok(Decision::Proceed);
    }
    match ask()? {
        Some(answer) if is_affirmative(&answer) => Ok(Decision::Proceed),
        _ => Ok(Decision::Abort),
    }
}

/// Deletes each branch in turn. A failed delete is reported and counted,
/// and the loop moves on.
pub fn delete_all<R: Remote + ?Sized>(remote: &R, branches: &[String]) -> Tally {
    let mut tally = Tally::default();
    for branch in branches {
        info!(branch = %branch, "Deleting remote branch");
        match remote.delete_branch(branch) {
            Ok(()) => {
                tally.succeeded += 1;
                println!("✓ {branch}");
            }
            Err(e) => {
                tally.failed += 1;
                warn!(branch = %branch, error = %e, "Failed to delete remote branch");
                eprintln!("✗ {branch}: {e}");
            }
        }
    }
    tally
}

pub fn run<R, F>(config: &RunConfig, remote: &R, ask: F) -> Result<Outcome>
where
    R: Remote + ?Sized,
    F: FnOnce(&[String]) -> Result<Option<String>>,
{
    let listed = remote
        .list_branches()
        .with_context(|| format!("failed to list branches on '{}'", config.remote))?;
    let candidates = filter_candidates(listed, &config.protected);
    debug!(
        protected = %config.protected,
        count = candidates.len(),
        "Filtered deletion candidates"
    );

    if candidates.is_empty() {
        return Ok(Outcome::NothingToDelete);
    }

    match decide(config, || ask(&candidates))? {
        Decision::Preview => Ok(Outcome::Previewed(candidates)),
        Decision::Abort => Ok(Outcome::Aborted),
        Decision::Proceed => Ok(Outcome::Completed(delete_all(remote, &candidates))),
    }
}
