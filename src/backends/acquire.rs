//! Repository acquisition
//!
//! Turns a caller's source (a local path or a GitHub URL) into a readable root
//! directory. GitHub repositories are shallow-cloned with `git` into a
//! temporary directory that lives as long as the returned `AcquiredRepo`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::core::model::ContextError;
use crate::core::paths::{dir_name, resolve_root};
use crate::core::util::command_exists;

/// Upper bound on a single `git clone`
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Environment variables consulted for a GitHub token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_PAT", "GH_TOKEN"];

static HTTPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://github\.com/([^/]+)/([^/.]+)(?:\.git)?/?$").expect("Invalid HTTPS_RE regex")
});

static SSH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^git@github\.com:([^/]+)/([^/.]+)(?:\.git)?$").expect("Invalid SSH_RE regex")
});

/// A parsed GitHub repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    pub owner: String,
    pub name: String,
    /// Canonical HTTPS clone URL
    pub clone_url: String,
}

/// Parse `https://github.com/OWNER/REPO[.git]` or `git@github.com:OWNER/REPO[.git]`
pub fn parse_github_url(url: &str) -> Result<GitHubRepo, ContextError> {
    let trimmed = url.trim();
    let caps = HTTPS_RE
        .captures(trimmed)
        .or_else(|| SSH_RE.captures(trimmed))
        .ok_or_else(|| ContextError::InvalidRepoUrl {
            url: url.to_string(),
        })?;

    let owner = caps[1].to_string();
    let name = caps[2].to_string();
    let clone_url = format!("https://github.com/{}/{}.git", owner, name);

    Ok(GitHubRepo {
        owner,
        name,
        clone_url,
    })
}

/// Pick a token: the explicit one first, then the environment
pub fn resolve_token(provided: Option<&str>) -> Option<String> {
    resolve_token_with(provided, |key| std::env::var(key).ok())
}

fn resolve_token_with(
    provided: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    provided
        .map(str::to_string)
        .or_else(|| TOKEN_ENV_VARS.iter().find_map(|key| lookup(key)))
        .filter(|token| !token.is_empty())
}

/// Embed a token into an HTTPS GitHub clone URL
pub fn authenticated_url(clone_url: &str, token: Option<&str>) -> String {
    match token {
        Some(token) if clone_url.starts_with("https://github.com/") => clone_url.replacen(
            "https://github.com/",
            &format!("https://{}@github.com/", token),
            1,
        ),
        _ => clone_url.to_string(),
    }
}

fn redact(text: &str, token: Option<&str>) -> String {
    match token {
        Some(token) => text.replace(token, "***"),
        None => text.to_string(),
    }
}

/// Shallow-clone `repo` into `target`
/// Spawn `cmd`, killing it after `timeout`. Stderr is drained on a separate
/// thread while the child runs.
fn wait_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<(ExitStatus, String), ContextError> {
    let mut child = cmd.stderr(Stdio::piped()).spawn()?;

    let drain = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf).ok();
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ContextError::CloneTimedOut {
                        secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(100));
            }
        }
    };

    let stderr = drain
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}

pub fn clone_repository(
    repo: &GitHubRepo,
    target: &Path,
    branch: Option<&str>,
    token: Option<&str>,
    timeout: Duration,
) -> Result<(), ContextError> {
    if !command_exists("git") {
        return Err(ContextError::GitUnavailable);
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone").arg("--quiet").arg("--depth").arg("1");
    if let Some(branch) = branch {
        cmd.arg("--branch").arg(branch);
    }
    cmd.arg(authenticated_url(&repo.clone_url, token))
        .arg(target)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::null());

    info!(owner = %repo.owner, repo = %repo.name, branch = branch.unwrap_or("(default)"), "cloning repository");

    let start = Instant::now();
    let (status, stderr) = wait_with_timeout(&mut cmd, timeout)?;

    if status.success() {
        debug!(target = %target.display(), elapsed_ms = start.elapsed().as_millis() as u64, "clone finished");
        return Ok(());
    }

    let reason = match stderr.trim() {
        "" => format!("git exited with {}", status),
        msg => redact(msg, token),
    };

    Err(ContextError::CloneFailed {
        url: repo.clone_url.clone(),
        reason,
    })
}

/// Where the root directory comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    Local(PathBuf),
    GitHub {
        url: String,
        branch: Option<String>,
        token: Option<String>,
    },
}

/// A readable root directory, kept alive for the duration of an assembly
#[derive(Debug)]
pub struct AcquiredRepo {
    pub root: PathBuf,
    pub name: String,
    /// The URL or local path the root came from
    pub source: String,
    _clone_dir: Option<TempDir>,
}

impl RepoSource {
    pub fn acquire(&self) -> Result<AcquiredRepo, ContextError> {
        match self {
            RepoSource::Local(path) => {
                let root = resolve_root(path)?;
                Ok(AcquiredRepo {
                    name: dir_name(&root),
                    source: root.display().to_string(),
                    root,
                    _clone_dir: None,
                })
            }
            RepoSource::GitHub { url, branch, token } => {
                let repo = parse_github_url(url)?;
                let token = resolve_token(token.as_deref());

                let clone_dir = tempfile::Builder::new()
                    .prefix("repoctx-repo-")
                    .tempdir()?;
                let target = clone_dir.path().join(&repo.name);

                clone_repository(
                    &repo,
                    &target,
                    branch.as_deref(),
                    token.as_deref(),
                    CLONE_TIMEOUT,
                )?;

                Ok(AcquiredRepo {
                    root: resolve_root(&target)?,
                    name: repo.name,
                    source: url.clone(),
                    _clone_dir: Some(clone_dir),
                })
            }
        }
    }
}
