use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

const README_CANDIDATES: [&str; 5] = ["README.md", "Readme.md", "readme.md", "README.txt", "readme.txt"];

/// Maps project paths recorded on the host to where they are mounted when
/// the server runs inside a container.
#[derive(Clone, Debug, Default)]
pub struct ProjectPaths {
    host_root: Option<PathBuf>,
    container_root: Option<PathBuf>,
}

impl ProjectPaths {
    pub fn new(host_root: Option<PathBuf>, container_root: Option<PathBuf>) -> Self {
        Self {
            host_root,
            container_root,
        }
    }

    pub fn resolve(&self, project_path: &str) -> PathBuf {
        let path = Path::new(project_path);
        if let (Some(host), Some(container)) = (&self.host_root, &self.container_root) {
            if let Ok(relative) = path.strip_prefix(host) {
                return container.join(relative);
            }
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReadmeContent {
    pub project_id: String,
    pub content: String,
    /// File name the content came from; `None` when no README was found.
    pub file: Option<String>,
}

impl ReadmeContent {
    pub fn empty(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            content: String::new(),
            file: None,
        }
    }
}

/// First readable README in `dir`; empty content when there is none.
pub fn read_project_readme(project_id: &str, dir: &Path) -> ReadmeContent {
    for name in README_CANDIDATES {
        let candidate = dir.join(name);
        if !candidate.is_file() {
            continue;
        }
        match fs::read_to_string(&candidate) {
            Ok(content) => {
                return ReadmeContent {
                    project_id: project_id.to_string(),
                    content,
                    file: Some(name.to_string()),
                };
            }
            Err(e) => {
                tracing::warn!(path = %candidate.display(), error = %e, "failed to read README");
                break;
            }
        }
    }
    ReadmeContent::empty(project_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn host_paths_are_rewritten_under_container_root() {
        let paths = ProjectPaths::new(Some("/Users/dev/code".into()), Some("/projects".into()));
        assert_eq!(
            paths.resolve("/Users/dev/code/hub"),
            PathBuf::from("/projects/hub")
        );
        assert_eq!(paths.resolve("/srv/other"), PathBuf::from("/srv/other"));
    }

    #[test]
    fn mapping_needs_both_roots() {
        let paths = ProjectPaths::new(Some("/Users/dev/code".into()), None);
        assert_eq!(
            paths.resolve("/Users/dev/code/hub"),
            PathBuf::from("/Users/dev/code/hub")
        );
    }

    #[test]
    fn relative_paths_resolve_against_working_dir() {
        let resolved = ProjectPaths::default().resolve("some/project");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/project"));
    }

    #[test]
    fn readme_candidates_are_tried_in_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "plain").unwrap();
        fs::write(dir.path().join("README.md"), "markdown").unwrap();

        let readme = read_project_readme("1", dir.path());
        assert_eq!(readme.content, "markdown");
        assert_eq!(readme.file.as_deref(), Some("README.md"));
    }

    #[test]
    fn falls_back_to_text_readme() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "plain").unwrap();
        assert_eq!(read_project_readme("1", dir.path()).content, "plain");
    }

    #[test]
    fn missing_directory_gives_empty_content() {
        let readme = read_project_readme("9", Path::new("/definitely/not/here"));
        assert_eq!(readme.content, "");
        assert_eq!(readme.file, None);
        assert_eq!(readme.project_id, "9");
    }
}
