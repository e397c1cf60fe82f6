use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::readme::ProjectPaths;
use crate::storage::JsonFileStorage;

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the MCP server
    Start(CommandArguments),
    /// Show the resolved data file and how many projects it holds
    Status(StorageArguments),
    /// Print version information
    Version,
    /// Print an MCP client configuration snippet
    Setup(StorageArguments),
}

/// Where the project collection lives.
#[derive(Args, Debug, Clone)]
pub struct StorageArguments {
    /// Base directory of the Project Hub app; data lives in app/data/projects.json below it
    #[arg(long, env = "PROJECT_HUB_BASE_DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Explicit path to projects.json (overrides --base-dir)
    #[arg(long, env = "PROJECT_HUB_DATA_FILE")]
    pub data_file: Option<PathBuf>,
}

impl StorageArguments {
    pub fn data_file(&self) -> PathBuf {
        self.file_storage().path().to_path_buf()
    }

    pub fn file_storage(&self) -> JsonFileStorage {
        match &self.data_file {
            Some(path) => JsonFileStorage::new(path),
            None => JsonFileStorage::under_base_dir(&self.base_dir),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CommandArguments {
    #[command(flatten)]
    pub storage: StorageArguments,

    /// Enable stdio transport
    #[arg(long, env = "MCP_ENABLE_STDIO", default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_stdio: bool,

    /// Enable streamable HTTP transport
    #[arg(long, env = "MCP_ENABLE_HTTP", default_value_t = false, action = clap::ArgAction::Set)]
    pub enable_http: bool,

    /// Streamable HTTP bind address
    #[arg(long, env = "MCP_HTTP_ADDR", default_value = "127.0.0.1:8080")]
    pub http_addr: String,

    /// Project root as seen on the host (paths recorded by the web app)
    #[arg(long, env = "HOST_PROJECTS_ROOT")]
    pub host_projects_root: Option<PathBuf>,

    /// Where the host project root is mounted for this process
    #[arg(long, env = "CONTAINER_PROJECTS_ROOT")]
    pub container_projects_root: Option<PathBuf>,
}

impl CommandArguments {
    pub fn default_settings() -> Self {
        Self {
            storage: StorageArguments {
                base_dir: PathBuf::from("."),
                data_file: None,
            },
            enable_stdio: true,
            enable_http: false,
            http_addr: "127.0.0.1:8080".to_string(),
            host_projects_root: None,
            container_projects_root: None,
        }
    }

    pub fn project_paths(&self) -> ProjectPaths {
        ProjectPaths::new(
            self.host_projects_root.clone(),
            self.container_projects_root.clone(),
        )
    }

    /// Validate CLI/environment-derived arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enable_stdio && !self.enable_http {
            return Err("Enable at least one transport (stdio or http)".to_string());
        }

        if self.enable_http {
            self.http_addr
                .parse::<SocketAddr>()
                .map_err(|e| format!("Invalid MCP_HTTP_ADDR '{}': {e}", self.http_addr))?;
        }

        if self.host_projects_root.is_some() != self.container_projects_root.is_some() {
            return Err(
                "HOST_PROJECTS_ROOT and CONTAINER_PROJECTS_ROOT must be set together".to_string(),
            );
        }
        Ok(())
    }
}
