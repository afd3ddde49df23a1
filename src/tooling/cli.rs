//! CLI Tooling
//!
//! Command-line interface for the explorer. Data commands go through an
//! [`ExplorerTransport`]: the local store by default, or a running server
//! with `--remote`.

use crate::client::{ExplorerTransport, HttpTransport, LocalTransport};
use crate::config::{ConfigLoader, GroveConfig};
use crate::engine::{MutationEngine, NodeEdit};
use crate::error::ApiError;
use crate::server::{self, AppState};
use crate::tooling::format::{flatten, format_forest_text, format_node_table};
use crate::tree::{Forest, TreeNode};
use crate::types::NodeId;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Grove CLI - hierarchical file/folder explorer
#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Hierarchical file/folder explorer backed by a persistent node store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (holds grove.toml, anchors relative store paths)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Talk to the server at client.base_url instead of opening the store
    #[arg(long)]
    pub remote: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
        /// Route prefix (overrides server.base_path)
        #[arg(long)]
        base_path: Option<String>,
    },
    /// Print the whole forest
    Tree,
    /// List every node in a table
    Nodes,
    /// Print the subtree under a root
    Show { id: String },
    /// Create a root folder
    CreateRoot { name: String },
    /// Add a file or folder under a folder
    Insert {
        parent: String,
        name: String,
        /// Create a file instead of a folder
        #[arg(long)]
        file: bool,
    },
    /// Rename a node and/or set its content
    Rename {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a node and everything under it
    Delete { id: String },
}

/// Short command name for logs.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Serve { .. } => "serve",
        Commands::Tree => "tree",
        Commands::Nodes => "nodes",
        Commands::Show { .. } => "show",
        Commands::CreateRoot { .. } => "create-root",
        Commands::Insert { .. } => "insert",
        Commands::Rename { .. } => "rename",
        Commands::Delete { .. } => "delete",
    }
}

/// CLI context holding the loaded config and the chosen transport
pub struct CliContext {
    config: GroveConfig,
    engine: Option<Arc<MutationEngine>>,
    transport: Arc<dyn ExplorerTransport>,
    format: OutputFormat,
    color: bool,
}

impl CliContext {
    /// Load configuration for `workspace_root`, or from `config_path` when given.
    pub fn load_config(
        workspace_root: &std::path::Path,
        config_path: Option<&std::path::Path>,
    ) -> Result<GroveConfig, ApiError> {
        Ok(match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        })
    }

    /// Open the configured store, or connect to `client.base_url` when `remote`.
    pub fn new(
        config: GroveConfig,
        workspace_root: PathBuf,
        remote: bool,
    ) -> Result<Self, ApiError> {
        let (engine, transport): (Option<Arc<MutationEngine>>, Arc<dyn ExplorerTransport>) =
            if remote {
                let http = HttpTransport::new(&config.client.base_url, config.client.timeout())?;
                info!(base_url = %http.base_url(), "Using remote explorer");
                (None, Arc::new(http))
            } else {
                let store = config.storage.open(&workspace_root)?;
                let engine = Arc::new(MutationEngine::new(store));
                (Some(engine.clone()), Arc::new(LocalTransport::new(engine)))
            };

        Ok(Self {
            config,
            engine,
            transport,
            format: OutputFormat::Text,
            color: false,
        })
    }

    /// Context over an existing engine, used by tests and embedders.
    pub fn with_engine(config: GroveConfig, engine: Arc<MutationEngine>) -> Self {
        Self {
            config,
            transport: Arc::new(LocalTransport::new(engine.clone())),
            engine: Some(engine),
            format: OutputFormat::Text,
            color: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Colorize text output; ignored for JSON.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &GroveConfig {
        &self.config
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Serve { bind, base_path } => self.serve(bind.as_deref(), base_path.as_deref()).await,
            Commands::Tree => {
                let forest = self.transport.fetch_forest().await?;
                self.render_forest(forest)
            }
            Commands::Nodes => {
                let forest = self.transport.fetch_forest().await?.unwrap_or_default();
                match self.format {
                    OutputFormat::Json => {
                        let rows: Vec<_> = flatten(&forest)
                            .into_iter()
                            .map(|row| {
                                json!({
                                    "id": row.id,
                                    "name": row.name,
                                    "isFolder": row.is_folder,
                                    "parentId": row.parent_id,
                                    "depth": row.depth,
                                })
                            })
                            .collect();
                        to_json(&rows)
                    }
                    OutputFormat::Text => Ok(format_node_table(&forest)),
                }
            }
            Commands::Show { id } => {
                let subtree = self.transport.fetch_subtree(&NodeId::from(id.as_str())).await?;
                self.render_subtree(subtree)
            }
            Commands::CreateRoot { name } => {
                let created = self.transport.create_root(name).await?;
                match self.format {
                    OutputFormat::Json => to_json(&created),
                    OutputFormat::Text => Ok(format!("Created root {} [{}]", created.name, created.id)),
                }
            }
            Commands::Insert { parent, name, file } => {
                let forest = self
                    .transport
                    .insert_child(&NodeId::from(parent.as_str()), name, !file)
                    .await?;
                self.render_forest(forest)
            }
            Commands::Rename { id, name, content } => {
                if name.is_none() && content.is_none() {
                    return Err(ApiError::ValidationError(
                        "rename needs --name or --content".to_string(),
                    ));
                }
                let edit = NodeEdit {
                    name: name.clone(),
                    content: content.clone(),
                };
                let forest = self.transport.edit(&NodeId::from(id.as_str()), edit).await?;
                self.render_forest(forest)
            }
            Commands::Delete { id } => {
                let forest = self.transport.delete(&NodeId::from(id.as_str())).await?;
                self.render_forest(forest)
            }
        }
    }

    async fn serve(&self, bind: Option<&str>, base_path: Option<&str>) -> Result<String, ApiError> {
        let engine = self.engine.clone().ok_or_else(|| {
            ApiError::ConfigError("serve runs against the local store; drop --remote".to_string())
        })?;
        let bind = bind.unwrap_or(&self.config.server.bind);
        let base_path = base_path.unwrap_or(&self.config.server.base_path);

        server::serve(bind, Arc::new(AppState::new(engine)), base_path)
            .await
            .map_err(|e| ApiError::Transport(format!("Server on {} failed: {}", bind, e)))?;
        Ok("Server stopped".to_string())
    }

    fn render_forest(&self, forest: Option<Forest>) -> Result<String, ApiError> {
        match self.format {
            OutputFormat::Json => to_json(&forest),
            OutputFormat::Text => Ok(format_forest_text(forest.as_deref(), self.color)),
        }
    }

    fn render_subtree(&self, subtree: TreeNode) -> Result<String, ApiError> {
        match self.format {
            OutputFormat::Json => to_json(&subtree),
            OutputFormat::Text => Ok(format_forest_text(Some(std::slice::from_ref(&subtree)), self.color)),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Transport(format!("Failed to encode output: {}", e)))
}
