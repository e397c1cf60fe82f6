use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, Utc};

use crate::error::StoreResult;
use crate::git_log::{GitLog, read_git_log};
use crate::readme::{ProjectPaths, ReadmeContent, read_project_readme};
use crate::storage::ProjectStorage;
use crate::types::{NewProject, Project, ProjectPatch, SearchFilter};

/// Hands out millisecond-timestamp ids that never repeat within a process,
/// even when several projects are added in the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Next id, strictly greater than both the previous one issued and
    /// `floor` (the largest numeric id already in the collection).
    pub fn next_after(&self, floor: u64) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let next = |last: u64| now.max(last.saturating_add(1)).max(floor.saturating_add(1));
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
            .unwrap_or_else(|last| last);
        next(prev).to_string()
    }
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// CRUD access to the project collection. Each operation is a full
/// load → transform → save cycle against the injected storage; nothing is
/// cached between calls.
pub struct ProjectStore<S: ProjectStorage> {
    storage: S,
    ids: IdGenerator,
    paths: ProjectPaths,
}

impl<S: ProjectStorage> ProjectStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_paths(storage, ProjectPaths::default())
    }

    pub fn with_paths(storage: S, paths: ProjectPaths) -> Self {
        Self {
            storage,
            ids: IdGenerator::default(),
            paths,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> StoreResult<Vec<Project>> {
        self.storage.load()
    }

    pub fn save(&self, projects: &[Project]) -> StoreResult<()> {
        self.storage.save(projects)
    }

    pub fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.load()
    }

    pub fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        Ok(self.load()?.into_iter().find(|p| p.has_id(id)))
    }

    pub fn search_projects(&self, filter: &SearchFilter) -> StoreResult<Vec<Project>> {
        let mut projects = self.load()?;
        projects.retain(|p| filter.matches(p));
        Ok(projects)
    }

    pub fn add_project(&self, new: NewProject) -> StoreResult<Project> {
        let mut projects = self.load()?;
        let floor = projects
            .iter()
            .filter_map(|p| p.id.as_u64())
            .max()
            .unwrap_or(0);
        let project = new.into_project(self.ids.next_after(floor), today());
        projects.push(project.clone());
        self.save(&projects)?;
        tracing::info!(id = %project.id, name = %project.name, "added project");
        Ok(project)
    }

    pub fn update_project(&self, id: &str, patch: ProjectPatch) -> StoreResult<Option<Project>> {
        let mut projects = self.load()?;
        let Some(slot) = projects.iter_mut().find(|p| p.has_id(id)) else {
            tracing::debug!(id, "update skipped, project not found");
            return Ok(None);
        };
        patch.apply(slot);
        slot.last_updated = Some(today());
        let updated = slot.clone();
        self.save(&projects)?;
        tracing::info!(id, "updated project");
        Ok(Some(updated))
    }

    pub fn delete_project(&self, id: &str) -> StoreResult<bool> {
        let projects = self.load()?;
        let before = projects.len();
        let remaining: Vec<Project> = projects.into_iter().filter(|p| !p.has_id(id)).collect();
        if remaining.len() == before {
            tracing::debug!(id, "delete skipped, project not found");
            return Ok(false);
        }
        self.save(&remaining)?;
        tracing::info!(id, removed = before - remaining.len(), "deleted project");
        Ok(true)
    }

    /// README of the project's directory, if the project exists. A project
    /// without a path has no README.
    pub fn project_readme(&self, id: &str) -> StoreResult<Option<ReadmeContent>> {
        let Some(project) = self.get_project(id)? else {
            return Ok(None);
        };
        let project_id = project.id.to_string();
        if project.path.trim().is_empty() {
            tracing::debug!(id, "project has no path, skipping README lookup");
            return Ok(Some(ReadmeContent::empty(&project_id)));
        }
        let dir = self.paths.resolve(&project.path);
        Ok(Some(read_project_readme(&project_id, &dir)))
    }

    /// Most recent commits of the project's repository, if the project exists.
    pub fn project_git_log(&self, id: &str) -> StoreResult<Option<GitLog>> {
        let Some(project) = self.get_project(id)? else {
            return Ok(None);
        };
        let project_id = project.id.to_string();
        if project.path.trim().is_empty() {
            return Ok(Some(GitLog {
                project_id,
                commits: Vec::new(),
            }));
        }
        let dir = self.paths.resolve(&project.path);
        Ok(Some(read_git_log(&project_id, &project.name, &dir)))
    }
}
