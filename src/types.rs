use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const STATUS_IN_PROGRESS: &str = "in progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ARCHIVED: &str = "archived";

/// Project id as it appears in the file. Ids written by this server are
/// strings; hand-written files sometimes use numbers, which are kept as
/// numbers on the way back out.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Text(String),
    Number(Number),
}

impl ProjectId {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            ProjectId::Text(s) => s == id,
            ProjectId::Number(n) => n.to_string() == id,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ProjectId::Text(s) => s.parse().ok(),
            ProjectId::Number(n) => n.as_u64(),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Text(s) => f.write_str(s),
            ProjectId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        ProjectId::Text(id)
    }
}

/// A tracked project as stored in `projects.json`.
///
/// Only `id`, `name` and `path` are required. Optional fields that are
/// absent in the file stay absent when the collection is written back, and
/// fields the web dashboard adds on its own (`pinned`, `tags`, `notes`, ...)
/// are kept in `extra`, so records a call does not touch are saved as they
/// were read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn has_id(&self, id: &str) -> bool {
        self.id.matches(id)
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    pub fn tech_stack(&self) -> &[String] {
        self.tech_stack.as_deref().unwrap_or_default()
    }

    pub fn date_created(&self) -> &str {
        self.date_created.as_deref().unwrap_or_default()
    }

    pub fn last_updated(&self) -> &str {
        self.last_updated.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    pub fn uses_tech(&self, tech: &str) -> bool {
        let wanted = tech.to_lowercase();
        self.tech_stack().iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// Input for creating a project.
#[derive(Clone, Debug, Default)]
pub struct NewProject {
    pub name: String,
    pub path: String,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<String>,
    pub readme_preview: Option<String>,
    pub url: Option<String>,
    pub github_url: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn into_project(self, id: String, today: String) -> Project {
        Project {
            id: id.into(),
            name: self.name,
            path: self.path,
            tech_stack: Some(self.tech_stack.unwrap_or_default()),
            date_created: Some(today.clone()),
            last_updated: Some(today),
            readme_preview: Some(self.readme_preview.unwrap_or_default()),
            url: Some(self.url.unwrap_or_default()),
            github_url: Some(self.github_url.unwrap_or_default()),
            status: Some(
                self.status
                    .unwrap_or_else(|| STATUS_IN_PROGRESS.to_string()),
            ),
            extra: Map::new(),
        }
    }
}

/// Partial update: present fields overwrite, absent fields are left alone.
/// `id` and `dateCreated` are not patchable.
#[derive(Clone, Debug, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub path: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<String>,
    pub readme_preview: Option<String>,
    pub url: Option<String>,
    pub github_url: Option<String>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(path) = self.path {
            project.path = path;
        }
        if let Some(tech_stack) = self.tech_stack {
            project.tech_stack = Some(tech_stack);
        }
        if let Some(status) = self.status {
            project.status = Some(status);
        }
        if let Some(readme_preview) = self.readme_preview {
            project.readme_preview = Some(readme_preview);
        }
        if let Some(url) = self.url {
            project.url = Some(url);
        }
        if let Some(github_url) = self.github_url {
            project.github_url = Some(github_url);
        }
    }
}

/// Conjunctive search criteria. Empty strings count as "not supplied".
#[derive(Clone, Debug, Default)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub status: Option<String>,
    pub tech: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(q) = non_empty(&self.query) {
            let q = q.to_lowercase();
            if !project.name.to_lowercase().contains(&q) && !project.path.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(status) = non_empty(&self.status) {
            if project.status().to_lowercase() != status.to_lowercase() {
                return false;
            }
        }
        if let Some(tech) = non_empty(&self.tech) {
            if !project.uses_tech(tech) {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Project {
        NewProject {
            tech_stack: Some(vec!["Rust".into(), "Next.js".into()]),
            ..NewProject::new("Project Hub", "/home/dev/project-hub")
        }
        .into_project("1700000000000".into(), "2024-05-01".into())
    }

    #[test]
    fn numeric_ids_match_string_lookups() {
        let project: Project = serde_json::from_value(json!({
            "id": 1700000000000u64,
            "name": "Hub",
            "path": "/p/hub"
        }))
        .unwrap();
        assert!(project.has_id("1700000000000"));
        assert_eq!(project.id.as_u64(), Some(1700000000000));
        assert!(project.tech_stack().is_empty());
        assert_eq!(project.url(), "");
    }

    #[test]
    fn sparse_records_are_written_back_unchanged() {
        let raw = json!({ "id": 5, "name": "Old", "path": "/p/old" });
        let project: Project = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&project).unwrap(), raw);
    }

    #[test]
    fn non_scalar_ids_are_rejected() {
        let res: Result<Project, _> =
            serde_json::from_value(json!({ "id": ["1"], "name": "Hub", "path": "/p" }));
        assert!(res.is_err());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let res: Result<Project, _> = serde_json::from_value(json!({ "id": "1", "name": "Hub" }));
        assert!(res.is_err());
    }

    #[test]
    fn dashboard_fields_survive_a_round_trip() {
        let raw = json!({
            "id": "1",
            "name": "Hub",
            "path": "/p/hub",
            "techStack": ["rust"],
            "dateCreated": "2024-01-01",
            "lastUpdated": "2024-01-02",
            "readmePreview": "",
            "url": "",
            "githubUrl": "",
            "status": "completed",
            "pinned": true,
            "tags": ["cli"]
        });
        let project: Project = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(project.extra.get("pinned"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&project).unwrap(), raw);
    }

    #[test]
    fn new_project_defaults() {
        let project = NewProject::new("Hub", "/p/hub").into_project("42".into(), "2024-05-01".into());
        assert_eq!(project.status(), STATUS_IN_PROGRESS);
        assert!(project.tech_stack().is_empty());
        assert_eq!(project.date_created(), "2024-05-01");
        assert_eq!(project.last_updated(), "2024-05-01");
        assert_eq!(project.readme_preview.as_deref(), Some(""));
        assert_eq!(project.github_url.as_deref(), Some(""));
        assert_eq!(
            serde_json::to_value(&project).unwrap()["id"],
            json!("42")
        );
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut project = sample();
        ProjectPatch {
            status: Some(STATUS_ARCHIVED.into()),
            url: Some("https://hub.dev".into()),
            ..Default::default()
        }
        .apply(&mut project);

        assert_eq!(project.status(), STATUS_ARCHIVED);
        assert_eq!(project.url(), "https://hub.dev");
        assert_eq!(project.name, "Project Hub");
        assert_eq!(project.tech_stack(), ["Rust", "Next.js"]);
    }

    #[test]
    fn patch_can_clear_fields_with_empty_values() {
        let mut project = sample();
        ProjectPatch {
            tech_stack: Some(vec![]),
            name: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut project);
        assert_eq!(project.tech_stack, Some(vec![]));
        assert_eq!(project.name, "");
    }

    #[test]
    fn query_matches_name_or_path_case_insensitively() {
        let project = sample();
        let by_name = SearchFilter {
            query: Some("HUB".into()),
            ..Default::default()
        };
        let by_path = SearchFilter {
            query: Some("home/DEV".into()),
            ..Default::default()
        };
        let miss = SearchFilter {
            query: Some("scraper".into()),
            ..Default::default()
        };
        assert!(by_name.matches(&project));
        assert!(by_path.matches(&project));
        assert!(!miss.matches(&project));
    }

    #[test]
    fn tech_filter_is_exact_membership() {
        let project = sample();
        let exact = SearchFilter {
            tech: Some("next.JS".into()),
            ..Default::default()
        };
        let partial = SearchFilter {
            tech: Some("next".into()),
            ..Default::default()
        };
        assert!(exact.matches(&project));
        assert!(!partial.matches(&project));
    }

    #[test]
    fn status_filter_is_exact_and_case_insensitive() {
        let project = sample();
        let hit = SearchFilter {
            status: Some("In Progress".into()),
            ..Default::default()
        };
        let prefix = SearchFilter {
            status: Some("in".into()),
            ..Default::default()
        };
        assert!(hit.matches(&project));
        assert!(!prefix.matches(&project));
    }

    #[test]
    fn empty_filters_match_everything() {
        let filter = SearchFilter {
            query: Some(String::new()),
            status: None,
            tech: Some(String::new()),
        };
        assert!(filter.matches(&sample()));
    }
}
