use clap::{Args, Parser, Subcommand};
use sharded_docstore::config::ClusterConfig;
use sharded_docstore::document::{DocumentId, generate_sample_documents};
use sharded_docstore::node::handlers::node_router;
use sharded_docstore::node::{HttpConnector, MemoryBackend, MemoryConnector, NodeConnector};
use sharded_docstore::registry::{NodeSpec, StartupPolicy};
use sharded_docstore::storage::handlers::api_router;
use sharded_docstore::storage::{DistributedStore, DropOutcome, insert_batch};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docstore", version, about = "Hash-sharded document store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a storage node backed by memory
    Node {
        #[arg(long, default_value = "127.0.0.1:27017")]
        bind: SocketAddr,
    },
    /// Run the coordinator API in front of the configured nodes
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Insert sample documents, print the distribution, and run two lookups
    Demo {
        #[command(flatten)]
        cluster: ClusterArgs,
        #[arg(long, default_value_t = 100)]
        documents: usize,
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Use in-process nodes instead of HTTP endpoints
        #[arg(long)]
        in_memory: bool,
    },
}

#[derive(Args)]
struct ClusterArgs {
    /// JSON cluster configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Node as name=endpoint; repeat in routing order. Replaces configured nodes.
    #[arg(long = "node")]
    nodes: Vec<NodeSpec>,
    /// Start even if some nodes cannot be reached
    #[arg(long)]
    degraded: bool,
}

impl ClusterArgs {
    fn resolve(&self) -> anyhow::Result<ClusterConfig> {
        let mut config = match &self.config {
            Some(path) => ClusterConfig::from_file(path)?,
            None => ClusterConfig::default(),
        };
        if !self.nodes.is_empty() {
            config.nodes = self.nodes.clone();
        }
        if self.degraded {
            config.startup = StartupPolicy::Degraded;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Node { bind } => run_node(bind).await,
        Command::Serve { bind, cluster } => run_coordinator(bind, cluster.resolve()?).await,
        Command::Demo {
            cluster,
            documents,
            workers,
            in_memory,
        } => run_demo(cluster.resolve()?, documents, workers, in_memory).await,
    }
}

async fn run_node(bind: SocketAddr) -> anyhow::Result<()> {
    let app = node_router(Arc::new(MemoryBackend::new()));

    tracing::info!("Storage node listening on {}", bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_coordinator(bind: SocketAddr, config: ClusterConfig) -> anyhow::Result<()> {
    let connector = HttpConnector::new(config.request_timeout(), config.request_attempts);
    let store = Arc::new(DistributedStore::open(&config, &connector).await?);

    if let Some(interval) = config.health_check_interval() {
        store.registry().clone().spawn_health_checks(interval);
    }

    let app = api_router(store);

    tracing::info!("Coordinator listening on {}", bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_demo(
    config: ClusterConfig,
    documents: usize,
    workers: usize,
    in_memory: bool,
) -> anyhow::Result<()> {
    let connector: Box<dyn NodeConnector> = if in_memory {
        Box::new(MemoryConnector::new())
    } else {
        Box::new(HttpConnector::new(
            config.request_timeout(),
            config.request_attempts,
        ))
    };
    let store = Arc::new(DistributedStore::open(&config, connector.as_ref()).await?);

    // 1. Start from an empty collection:
    for cleared in store.drop_collection().await {
        if let DropOutcome::Failed { error } = &cleared.outcome {
            tracing::warn!("Could not clear {}: {}", cleared.node, error);
        }
    }

    // 2. Insert sample documents:
    let report = insert_batch(store.clone(), generate_sample_documents(documents)?, workers).await;
    println!(
        "Inserted {} of {} documents ({} duplicates, {} skipped, {} failed)",
        report.inserted,
        report.total(),
        report.duplicates,
        report.skipped,
        report.failed
    );

    // 3. Distribution:
    println!("{}", store.compute_stats().await);

    // 4. Lookups:
    for id in [DocumentId::Int(50), DocumentId::Int(999)] {
        let found = store.find(&id).await;
        if found.is_empty() {
            println!("Document {} not found", id);
        }
        for hit in found {
            println!(
                "Document {} found on {}: {}",
                id,
                hit.source_node,
                serde_json::to_string(&hit.document.data)?
            );
        }
    }

    Ok(())
}
