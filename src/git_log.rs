use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

pub const MAX_COMMITS: usize = 10;

// Unit separator keeps subjects containing '|' intact.
const FIELD_SEP: char = '\u{1f}';

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub subject: String,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GitLog {
    pub project_id: String,
    pub commits: Vec<Commit>,
}

fn has_git(dir: &Path) -> bool {
    let git = dir.join(".git");
    git.is_dir() || git.is_file()
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Repository to read history from: `dir` itself, or a child repository
/// when the project directory only groups checkouts. With several child
/// repositories the one named like the project wins, else the first by name.
pub fn find_git_root(dir: &Path, project_name: &str) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    if has_git(dir) {
        return Some(dir.to_path_buf());
    }

    let mut repos: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && has_git(path))
        .collect();
    repos.sort();

    let wanted = slug(project_name);
    let by_name = repos.iter().position(|repo| {
        repo.file_name()
            .map(|n| slug(&n.to_string_lossy()) == wanted)
            .unwrap_or(false)
    });
    match by_name {
        Some(idx) => Some(repos.swap_remove(idx)),
        None => repos.into_iter().next(),
    }
}

pub fn parse_git_log(output: &str) -> Vec<Commit> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, FIELD_SEP);
            let hash = parts.next().unwrap_or_default().trim().to_string();
            let subject = parts.next().unwrap_or_default().trim().to_string();
            let date = parts.next().unwrap_or_default().trim().to_string();
            Commit {
                hash,
                subject,
                date,
            }
        })
        .collect()
}

fn run_git_log(repo: &Path) -> std::io::Result<String> {
    let count = MAX_COMMITS.to_string();
    let output = Command::new("git")
        .args(["log", "-n", count.as_str(), "--format=%h%x1f%s%x1f%ci"])
        .current_dir(repo)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()?;
    if !output.status.success() {
        return Err(std::io::Error::other(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Recent commits of the repository at or below `dir`. Missing directories,
/// directories without a repository and git failures all yield no commits.
pub fn read_git_log(project_id: &str, project_name: &str, dir: &Path) -> GitLog {
    let commits = match find_git_root(dir, project_name) {
        Some(repo) => match run_git_log(&repo) {
            Ok(out) => parse_git_log(&out),
            Err(e) => {
                tracing::warn!(repo = %repo.display(), error = %e, "git log failed");
                Vec::new()
            }
        },
        None => {
            tracing::debug!(dir = %dir.display(), "no git repository for project");
            Vec::new()
        }
    };
    GitLog {
        project_id: project_id.to_string(),
        commits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_hash_subject_and_date() {
        let out = "a1b2c3d\u{1f}Fix | pipe in subject\u{1f}2024-05-01 10:00:00 +0200\n\
                   e4f5a6b\u{1f}Initial commit\u{1f}2024-04-30 09:00:00 +0200\n";
        let commits = parse_git_log(out);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "a1b2c3d");
        assert_eq!(commits[0].subject, "Fix | pipe in subject");
        assert_eq!(commits[0].date, "2024-05-01 10:00:00 +0200");
        assert_eq!(commits[1].subject, "Initial commit");
    }

    #[test]
    fn empty_output_means_no_commits() {
        assert!(parse_git_log("").is_empty());
        assert!(parse_git_log("\n").is_empty());
    }

    #[test]
    fn repository_at_project_dir_is_used_directly() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(
            find_git_root(dir.path(), "hub"),
            Some(dir.path().to_path_buf())
        );
    }

    #[test]
    fn single_child_repository_is_picked() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("app/.git")).unwrap();
        fs::create_dir_all(dir.path().join("notes")).unwrap();
        assert_eq!(
            find_git_root(dir.path(), "whatever"),
            Some(dir.path().join("app"))
        );
    }

    #[test]
    fn child_named_like_project_wins() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("alpha/.git")).unwrap();
        fs::create_dir_all(dir.path().join("project-hub/.git")).unwrap();
        assert_eq!(
            find_git_root(dir.path(), "Project  Hub"),
            Some(dir.path().join("project-hub"))
        );
        assert_eq!(
            find_git_root(dir.path(), "unrelated"),
            Some(dir.path().join("alpha"))
        );
    }

    #[test]
    fn no_repository_yields_empty_log() {
        let dir = tempdir().unwrap();
        assert_eq!(find_git_root(dir.path(), "hub"), None);
        let log = read_git_log("7", "hub", dir.path());
        assert_eq!(log.project_id, "7");
        assert!(log.commits.is_empty());
        assert!(read_git_log("7", "hub", Path::new("/definitely/not/here")).commits.is_empty());
    }
}
