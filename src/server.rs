use std::sync::Arc;

use rmcp::RoleServer;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use serde_json::json;

use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::storage::ProjectStorage;
use crate::store::ProjectStore;
use crate::tools::{AddProjectParams, ProjectIdParams, SearchParams, UpdateProjectParams};

pub type SharedStore = Arc<ProjectStore<Box<dyn ProjectStorage>>>;

const PROJECTS_URI: &str = "projects://all";
const INSTRUCTIONS_URI: &str = "file://instructions";

#[derive(Clone)]
pub struct ProjectHubServer {
    store: SharedStore,
    tool_router: ToolRouter<ProjectHubServer>,
}

#[tool_router]
impl ProjectHubServer {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    pub fn instructions() -> &'static str {
        include_str!("../docs/instructions.md")
    }

    #[tool(
        name = "list_projects",
        description = "List all projects in the tracker. Returns full project objects with id, name, path, techStack, status, etc.",
        annotations(read_only_hint = true)
    )]
    fn list_projects(&self) -> Result<CallToolResult, ErrorData> {
        let projects = self.store.list_projects()?;
        Ok(CallToolResult::structured(json!({ "projects": projects })))
    }

    #[tool(
        name = "get_project",
        description = "Get a single project by its ID. Returns the project object, or null if not found.",
        annotations(read_only_hint = true)
    )]
    fn get_project(
        &self,
        Parameters(params): Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let project = self.store.get_project(&params.project_id)?;
        Ok(CallToolResult::structured(json!({ "project": project })))
    }

    #[tool(
        name = "search_projects",
        description = "Search projects by name/path (query), status ('in progress' | 'completed' | 'archived'), or tech stack entry (e.g. 'python', 'Next.js'). All supplied filters must match.",
        annotations(read_only_hint = true)
    )]
    fn search_projects(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let projects = self.store.search_projects(&params.into())?;
        Ok(CallToolResult::structured(json!({ "projects": projects })))
    }

    #[tool(
        name = "add_project",
        description = "Add a new project. Required: name, path. Optional: tech_stack, status, readme_preview, url, github_url. Returns the created project with id and dates set."
    )]
    fn add_project(
        &self,
        Parameters(params): Parameters<AddProjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let project = self.store.add_project(params.into())?;
        Ok(CallToolResult::structured(json!({ "project": project })))
    }

    #[tool(
        name = "update_project",
        description = "Update an existing project by ID. Only provided fields are updated. Returns the updated project, or null if not found."
    )]
    fn update_project(
        &self,
        Parameters(params): Parameters<UpdateProjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let (id, patch) = params.into_parts();
        let project = self.store.update_project(&id, patch)?;
        Ok(CallToolResult::structured(json!({ "project": project })))
    }

    #[tool(
        name = "delete_project",
        description = "Delete a project by ID. Returns deleted: true if it was removed, false if not found.",
        annotations(destructive_hint = true)
    )]
    fn delete_project(
        &self,
        Parameters(params): Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let deleted = self.store.delete_project(&params.project_id)?;
        Ok(CallToolResult::structured(json!({ "deleted": deleted })))
    }

    #[tool(
        name = "get_project_readme",
        description = "Read the README file from a project's directory. Returns empty content when the directory has no README, or project: null if the ID is unknown.",
        annotations(read_only_hint = true)
    )]
    fn get_project_readme(
        &self,
        Parameters(params): Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.store.project_readme(&params.project_id)? {
            Some(readme) => Ok(CallToolResult::structured(json!(readme))),
            None => Ok(CallToolResult::structured(json!({ "project": null }))),
        }
    }

    #[tool(
        name = "get_project_git_log",
        description = "List the most recent commits (up to 10: hash, subject, date) of a project's git repository. A project directory that only groups checkouts uses the sub-repository named like the project. Returns an empty list without a repository, or project: null if the ID is unknown.",
        annotations(read_only_hint = true)
    )]
    fn get_project_git_log(
        &self,
        Parameters(params): Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.store.project_git_log(&params.project_id)? {
            Some(log) => Ok(CallToolResult::structured(json!(log))),
            None => Ok(CallToolResult::structured(json!({ "project": null }))),
        }
    }
}

impl ProjectHubServer {
    fn resources() -> Vec<Resource> {
        vec![
            RawResource::new(PROJECTS_URI, "All projects").no_annotation(),
            RawResource::new(INSTRUCTIONS_URI, "Project Hub MCP instructions").no_annotation(),
        ]
    }

    fn resource_text(&self, uri: &str) -> Result<String, ErrorData> {
        match uri {
            PROJECTS_URI => {
                let projects = self.store.list_projects()?;
                serde_json::to_string_pretty(&projects)
                    .map_err(|e| ErrorData::internal_error(e.to_string(), None))
            }
            INSTRUCTIONS_URI => Ok(Self::instructions().to_string()),
            _ => Err(ErrorData::resource_not_found(
                "Unknown resource URI",
                Some(json!({ "uri": uri })),
            )),
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for ProjectHubServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: PKG_NAME.to_string(),
                version: PKG_VERSION.to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(Self::instructions().to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: rmcp::service::RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: Self::resources(),
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _ctx: rmcp::service::RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let text = self.resource_text(&request.uri)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
