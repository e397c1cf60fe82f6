mod cli;
mod error;
mod git_log;
mod metadata;
mod readme;
mod server;
mod storage;
mod store;
mod tools;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{ServiceExt, transport::stdio};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, CommandArguments, StorageArguments};
use crate::error::{ServiceError, ServiceResult};
use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::server::{ProjectHubServer, SharedStore};
use crate::storage::ProjectStorage;
use crate::store::ProjectStore;

#[tokio::main]
async fn main() -> ServiceResult<()> {
    // stdout belongs to the stdio transport, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Start(args) => start(args).await,
        Command::Status(args) => status(&args),
        Command::Version => {
            println!("{PKG_NAME} {PKG_VERSION}");
            Ok(())
        }
        Command::Setup(args) => setup(&args),
    }
}

async fn start(args: CommandArguments) -> ServiceResult<()> {
    args.validate().map_err(ServiceError::FromString)?;

    let storage = args.storage.file_storage();
    tracing::info!(data_file = %storage.location(), "Starting Project Hub MCP server");
    let boxed: Box<dyn ProjectStorage> = Box::new(storage);
    let store: SharedStore = Arc::new(ProjectStore::with_paths(boxed, args.project_paths()));

    let shutdown = CancellationToken::new();
    let mut tasks = tokio::task::JoinSet::new();

    if args.enable_stdio {
        let running = ProjectHubServer::new(store.clone())
            .serve(stdio())
            .await
            .map_err(|e| ServiceError::FromString(format!("stdio transport failed: {e}")))?;
        let token = shutdown.clone();
        let last_transport = !args.enable_http;
        tasks.spawn(async move {
            if let Err(e) = running.waiting().await {
                tracing::warn!(error = %e, "stdio session ended with an error");
            }
            tracing::info!("stdio session closed");
            if last_transport {
                token.cancel();
            }
        });
    }

    if args.enable_http {
        let addr: SocketAddr = args
            .http_addr
            .parse()
            .map_err(|e| ServiceError::FromString(format!("{e}")))?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "Streamable HTTP transport listening");
        tasks.spawn(serve_http(listener, store.clone(), shutdown.clone()));
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C, shutting down"),
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
    tasks.shutdown().await;
    Ok(())
}

async fn serve_http(listener: tokio::net::TcpListener, store: SharedStore, shutdown: CancellationToken) {
    let http_service = TowerToHyperService::new(StreamableHttpService::new(
        move || Ok(ProjectHubServer::new(store.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    ));
    loop {
        let stream = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept HTTP connection");
                    continue;
                }
            },
        };
        let io = TokioIo::new(stream);
        let service = http_service.clone();
        tokio::spawn(async move {
            if let Err(e) = Builder::new(TokioExecutor::default())
                .serve_connection(io, service)
                .await
            {
                tracing::debug!(error = %e, "HTTP connection ended with error");
            }
        });
    }
}

fn status(args: &StorageArguments) -> ServiceResult<()> {
    let storage = args.file_storage();
    let exists = storage.path().exists();
    let projects = storage.load()?;
    let report = json!({
        "dataFile": storage.location(),
        "exists": exists,
        "projects": projects.len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn setup(args: &StorageArguments) -> ServiceResult<()> {
    let base_dir = std::path::absolute(&args.base_dir)?;
    let mut env = serde_json::Map::new();
    env.insert("PROJECT_HUB_BASE_DIR".into(), json!(base_dir.display().to_string()));
    if let Some(file) = &args.data_file {
        env.insert(
            "PROJECT_HUB_DATA_FILE".into(),
            json!(std::path::absolute(file)?.display().to_string()),
        );
    }
    let snippet = json!({
        "mcpServers": {
            "project-hub": {
                "command": PKG_NAME,
                "args": ["start"],
                "env": env,
            }
        }
    });
    println!("{}", serde_json::to_string_pretty(&snippet)?);
    Ok(())
}
