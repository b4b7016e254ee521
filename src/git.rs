use anyhow::{Context, Result};
use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GitCommandError {
    #[error("failed to run `git {op}`: {source}")]
    Spawn {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("`git {op}` failed ({status}): {stderr}")]
    Failed {
        op: &'static str,
        status: ExitStatus,
        stderr: String,
    },
}

/// The two operations the pruner needs from a remote.
pub trait Remote {
    /// Short names of every branch head, in the order the remote lists them.
    fn list_branches(&self) -> Result<Vec<String>, GitCommandError>;
    fn delete_branch(&self, branch: &str) -> Result<(), GitCommandError>;
}

pub fn open_repo() -> Result<Repository> {
    Repository::discover(".").context("not inside a git repository; cd into a project and retry")
}

pub fn ensure_remote(repo: &Repository, name: &str) -> Result<()> {
    repo.find_remote(name).with_context(|| {
        format!("no remote named '{name}'; add one with: git remote add {name} <url>")
    })?;
    Ok(())
}

/// A remote reached through the `git` executable so the user's
/// credential helpers and ssh config apply.
pub struct GitRemote {
    workdir: PathBuf,
    name: String,
}

impl GitRemote {
    pub fn new(workdir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            name: name.into(),
        }
    }

    pub fn for_repo(repo: &Repository, name: &str) -> Self {
        let workdir = repo.workdir().unwrap_or_else(|| repo.path());
        Self::new(workdir, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, op: &'static str, args: &[&str]) -> Result<Output, GitCommandError> {
        debug!(remote = %self.name, ?args, "Running git");
        let output = git_command(&self.workdir)
            .args(args)
            .output()
            .map_err(|source| GitCommandError::Spawn { op, source })?;

        if !output.status.success() {
            return Err(GitCommandError::Failed {
                op,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Remote for GitRemote {
    fn list_branches(&self) -> Result<Vec<String>, GitCommandError> {
        let output = self.run("ls-remote", &["ls-remote", "--heads", &self.name])?;
        let branches = parse_ls_remote(&output.stdout);
        debug!(remote = %self.name, count = branches.len(), "Listed remote heads");
        Ok(branches)
    }

    fn delete_branch(&self, branch: &str) -> Result<(), GitCommandError> {
        let refname = format!("refs/heads/{branch}");
        self.run("push", &["push", &self.name, "--delete", &refname])?;
        Ok(())
    }
}

fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);
    cmd
}

/// Extracts short branch names from `git ls-remote --heads` output
/// (`<sha>\trefs/heads/<name>` per line). Lines that are not valid UTF-8
/// are skipped.
pub fn parse_ls_remote(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == b'\n')
        .filter_map(|line| match std::str::from_utf8(line) {
            Ok(line) => Some(line),
            Err(_) => {
                warn!(
                    line = %String::from_utf8_lossy(line),
                    "Skipping ref with a non UTF-8 name"
                );
                None
            }
        })
        .filter_map(|line| line.split_once('\t'))
        .filter_map(|(_, refname)| refname.trim().strip_prefix("refs/heads/"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Oid, Signature};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Bare remote holding one commit with a head per name, plus a local
    /// repository that has it configured as `origin`.
    struct RemoteFixture {
        _dir: TempDir,
        bare: Repository,
        commit: Oid,
        local: Repository,
    }

    impl RemoteFixture {
        fn new(branches: &[&str]) -> Self {
            let dir = TempDir::new().expect("temp dir");
            let bare = Repository::init_bare(dir.path().join("remote.git")).expect("init bare");
            let commit = seed_commit(&bare);
            for name in branches {
                bare.reference(&format!("refs/heads/{name}"), commit, true, "seed")
                    .expect("create head");
            }

            let local = Repository::init(dir.path().join("local")).expect("init local");
            let url = dir.path().join("remote.git");
            local
                .remote("origin", url.to_str().expect("utf-8 path"))
                .expect("add origin");

            Self {
                _dir: dir,
                bare,
                commit,
                local,
            }
        }

        fn add_ref(&self, refname: &str) {
            self.bare
                .reference(refname, self.commit, true, "seed")
                .expect("create ref");
        }

        fn remote(&self) -> GitRemote {
            GitRemote::for_repo(&self.local, "origin")
        }
    }

    fn seed_commit(repo: &Repository) -> Oid {
        let sig = Signature::now("Prune Test", "prune-test@example.com").expect("signature");
        let tree_id = repo.treebuilder(None).and_then(|b| b.write()).expect("tree");
        let tree = repo.find_tree(tree_id).expect("find tree");
        repo.commit(None, &sig, &sig, "seed", &tree, &[]).expect("commit")
    }

    #[test]
    fn parses_heads_in_listing_order() {
        let out = b"1111\trefs/heads/main\n2222\trefs/heads/feature/x\n3333\trefs/heads/a\n";
        assert_eq!(parse_ls_remote(out), vec!["main", "feature/x", "a"]);
    }

    #[test]
    fn ignores_non_head_refs_and_noise() {
        let out = b"warning: something\n\n1111\tHEAD\n2222\trefs/tags/v1\n3333\trefs/heads/b\r\n";
        assert_eq!(parse_ls_remote(out), vec!["b"]);
    }

    #[test]
    fn skips_names_that_are_not_utf8() {
        let out = b"1111\trefs/heads/ok\n2222\trefs/heads/bad\xff\xfe\n3333\trefs/heads/z\n";
        assert_eq!(parse_ls_remote(out), vec!["ok", "z"]);
    }

    #[test]
    fn ensure_remote_reports_missing_remote() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let err = ensure_remote(&repo, "origin").unwrap_err();
        assert!(err.to_string().contains("no remote named 'origin'"));
    }

    #[test]
    fn lists_and_deletes_against_a_real_remote() {
        if !git_available() {
            eprintln!("Skipping test: git not available");
            return;
        }
        let fixture = RemoteFixture::new(&["main", "a", "b"]);
        let remote = fixture.remote();
        ensure_remote(&fixture.local, remote.name()).unwrap();

        assert_eq!(remote.list_branches().unwrap(), vec!["a", "b", "main"]);

        remote.delete_branch("a").unwrap();
        assert_eq!(remote.list_branches().unwrap(), vec!["b", "main"]);
    }

    #[test]
    fn deletes_a_branch_that_shares_its_name_with_a_tag() {
        if !git_available() {
            eprintln!("Skipping test: git not available");
            return;
        }
        let fixture = RemoteFixture::new(&["main", "v1"]);
        fixture.add_ref("refs/tags/v1");
        let remote = fixture.remote();

        remote.delete_branch("v1").unwrap();
        assert_eq!(remote.list_branches().unwrap(), vec!["main"]);
        assert!(fixture.bare.find_reference("refs/tags/v1").is_ok());
    }

    #[test]
    fn deleting_a_missing_branch_fails() {
        if !git_available() {
            eprintln!("Skipping test: git not available");
            return;
        }
        let fixture = RemoteFixture::new(&["main"]);
        let err = fixture.remote().delete_branch("gone").unwrap_err();
        assert!(matches!(err, GitCommandError::Failed { op: "push", .. }));
    }

    #[test]
    fn listing_an_unreachable_remote_fails() {
        if !git_available() {
            eprintln!("Skipping test: git not available");
            return;
        }
        let fixture = RemoteFixture::new(&["main"]);
        let remote = GitRemote::new(fixture.local.workdir().unwrap(), "nowhere");
        assert!(remote.list_branches().is_err());
    }
}
