use anyhow::{Context, Result};
use inquire::{InquireError, Text};
use std::io::{self, BufRead, IsTerminal, Write};

use crate::prune::Tally;

pub fn print_candidates(remote: &str, branches: &[String]) {
    println!("Branches on '{}' to delete ({}):", remote, branches.len());
    for branch in branches {
        println!("  •  {branch}");
    }
    println!();
}

/// Asks the user to type `yes`. Esc / Ctrl+C count as a refusal. When stdin
/// is not a terminal the answer is read as one line from it.
pub fn ask_confirmation(remote: &str, branches: &[String]) -> Result<Option<String>> {
    print_candidates(remote, branches);
    let prompt = format!(
        "Delete these {} branches from '{}'? Type 'yes' to continue:",
        branches.len(),
        remote
    );

    if !io::stdin().is_terminal() {
        print!("{prompt} ");
        io::stdout().flush()?;
        return read_answer(io::stdin().lock());
    }

    match Text::new(&prompt).prompt() {
        Ok(answer) => Ok(Some(answer)),
        Err(InquireError::OperationCanceled)
        | Err(InquireError::OperationInterrupted)
        | Err(InquireError::NotTTY) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Reads a single answer line; end of input counts as no answer.
pub fn read_answer<R: BufRead>(mut reader: R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("failed to read confirmation from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

pub fn print_summary(tally: &Tally) {
    println!(
        "\nDone: {} deleted, {} failed.",
        tally.succeeded, tally.failed
    );
    if tally.failed > 0 {
        eprintln!(
            "✗ {} branch(es) could not be deleted; see the errors above.",
            tally.failed
        );
    }
}
