use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::types::Project;

/// Location of the collection relative to the base directory, shared with
/// the Project Hub web app.
pub const DEFAULT_DATA_SUBPATH: &str = "app/data/projects.json";

/// Backing store for the whole project collection. Every call reads or
/// replaces the complete list; there is no partial access.
pub trait ProjectStorage: Send + Sync {
    fn load(&self) -> StoreResult<Vec<Project>>;

    fn save(&self, projects: &[Project]) -> StoreResult<()>;

    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> String;
}

impl<T: ProjectStorage + ?Sized> ProjectStorage for Box<T> {
    fn load(&self) -> StoreResult<Vec<Project>> {
        (**self).load()
    }

    fn save(&self, projects: &[Project]) -> StoreResult<()> {
        (**self).save(projects)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// `projects.json` on disk, pretty-printed with 2-space indentation.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn under_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self::new(base_dir.as_ref().join(DEFAULT_DATA_SUBPATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "projects.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomically(&self, content: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        let written = (|| -> std::io::Result<()> {
            let mut f = File::create(&temp)?;
            f.write_all(content)?;
            f.sync_all()?;
            fs::rename(&temp, &self.path)
        })();
        if written.is_err() {
            let _ = fs::remove_file(&temp);
        }
        written
    }
}

impl ProjectStorage for JsonFileStorage {
    fn load(&self) -> StoreResult<Vec<Project>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no projects file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::read(self.location(), e)),
        };
        let projects: Vec<Project> =
            serde_json::from_str(&contents).map_err(|e| StoreError::read(self.location(), e))?;
        tracing::debug!(path = %self.path.display(), count = projects.len(), "loaded projects");
        Ok(projects)
    }

    fn save(&self, projects: &[Project]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(projects)
            .map_err(|e| StoreError::write(self.location(), e))?;
        self.write_atomically(content.as_bytes())
            .map_err(|e| StoreError::write(self.location(), e))?;
        tracing::debug!(path = %self.path.display(), count = projects.len(), "saved projects");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Volatile storage for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    projects: Mutex<Vec<Project>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
        }
    }
}

impl ProjectStorage for MemoryStorage {
    fn load(&self) -> StoreResult<Vec<Project>> {
        self.projects
            .lock()
            .map(|p| p.clone())
            .map_err(|e| StoreError::read(self.location(), e))
    }

    fn save(&self, projects: &[Project]) -> StoreResult<()> {
        let mut guard = self
            .projects
            .lock()
            .map_err(|e| StoreError::write(self.location(), e))?;
        *guard = projects.to_vec();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
