//! Argument types for the MCP tools. Field names are the snake_case
//! parameter names agents call the tools with.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::types::{NewProject, ProjectPatch, SearchFilter};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectIdParams {
    /// Id of the project, as returned by list_projects or add_project.
    pub project_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Case-insensitive substring matched against name or path.
    #[serde(default)]
    pub query: Option<String>,
    /// One of 'in progress', 'completed', 'archived' (case-insensitive).
    #[serde(default)]
    pub status: Option<String>,
    /// Tech stack entry, e.g. 'python' or 'Next.js' (case-insensitive, whole entry).
    #[serde(default)]
    pub tech: Option<String>,
}

impl From<SearchParams> for SearchFilter {
    fn from(params: SearchParams) -> Self {
        SearchFilter {
            query: params.query,
            status: params.status,
            tech: params.tech,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddProjectParams {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub tech_stack: Option<Vec<String>>,
    /// Defaults to 'in progress'.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub readme_preview: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

impl From<AddProjectParams> for NewProject {
    fn from(params: AddProjectParams) -> Self {
        NewProject {
            name: params.name,
            path: params.path,
            tech_stack: params.tech_stack,
            status: params.status,
            readme_preview: params.readme_preview,
            url: params.url,
            github_url: params.github_url,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProjectParams {
    pub project_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub readme_preview: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

impl UpdateProjectParams {
    pub fn into_parts(self) -> (String, ProjectPatch) {
        let patch = ProjectPatch {
            name: self.name,
            path: self.path,
            tech_stack: self.tech_stack,
            status: self.status,
            readme_preview: self.readme_preview,
            url: self.url,
            github_url: self.github_url,
        };
        (self.project_id, patch)
    }
}
