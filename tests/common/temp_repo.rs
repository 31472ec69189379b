//! Throwaway upstream repositories built with the git executable

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run git in `dir`, panicking on failure, and return trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Host identifier the binary is expected to put in commit messages
pub fn host_identifier() -> String {
    whoami::fallible::hostname()
        .ok()
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A bare upstream repository with `master` seeded by one commit, plus any
/// number of clones sharing a temp directory.
pub struct TempGitRemote {
    dir: TempDir,
    remote: PathBuf,
}

impl TempGitRemote {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("upstream.git");
        fs::create_dir(&remote).unwrap();
        git(&remote, &["init", "--quiet", "--bare"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        let seed = dir.path().join("seed");
        fs::create_dir(&seed).unwrap();
        git(&seed, &["init", "--quiet"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        configure_identity(&seed);
        fs::write(seed.join("README.md"), "line one\nline two\nline three\n").unwrap();
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "--quiet", "-m", "initial"]);
        git(&seed, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git(&seed, &["push", "--quiet", "origin", "master"]);

        Self { dir, remote }
    }

    /// Path of the bare upstream
    pub fn remote(&self) -> &Path {
        &self.remote
    }

    /// Scratch directory next to the repositories
    pub fn scratch(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Clone upstream into a new working copy named `name`
    pub fn clone_as(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        git(
            self.dir.path(),
            &[
                "clone",
                "--quiet",
                self.remote.to_str().unwrap(),
                path.to_str().unwrap(),
            ],
        );
        configure_identity(&path);
        path
    }

    /// Commits on upstream master, newest first
    pub fn upstream_history(&self) -> Vec<String> {
        history(&self.remote, "master")
    }

    /// Commit subjects on upstream master, newest first
    pub fn upstream_subjects(&self) -> Vec<String> {
        subjects(&self.remote, "master")
    }

    /// Install a `pre-receive` hook upstream that refuses every push
    pub fn reject_pushes(&self) {
        let hook = self.remote.join("hooks").join("pre-receive");
        fs::create_dir_all(hook.parent().unwrap()).unwrap();
        fs::write(&hook, "#!/bin/sh\necho 'pushes are frozen' >&2\nexit 1\n").unwrap();
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Create a standalone repository named `name` with one committed file,
    /// suitable as a submodule source
    pub fn library(&self, name: &str, file: &str, contents: &str) -> PathBuf {
        let path = self.scratch(name);
        git(&path, &["init", "--quiet"]);
        git(&path, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        configure_identity(&path);
        commit_file(&path, file, contents, "library");
        path
    }

    /// Commit a file in `repo` and push it upstream
    pub fn push_commit(&self, repo: &Path, path: &str, contents: &str, message: &str) {
        commit_file(repo, path, contents, message);
        git(repo, &["push", "--quiet", "origin", "HEAD:master"]);
    }
}

/// Write and commit a file without pushing
pub fn commit_file(repo: &Path, path: &str, contents: &str, message: &str) {
    let full = repo.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, contents).unwrap();
    git(repo, &["add", path]);
    git(repo, &["commit", "--quiet", "-m", message]);
}

/// Commit ids reachable from `rev`, newest first
pub fn history(repo: &Path, rev: &str) -> Vec<String> {
    git(repo, &["rev-list", rev])
        .lines()
        .map(String::from)
        .collect()
}

/// Commit subjects reachable from `rev`, newest first
pub fn subjects(repo: &Path, rev: &str) -> Vec<String> {
    git(repo, &["log", "--format=%s", rev])
        .lines()
        .map(String::from)
        .collect()
}
