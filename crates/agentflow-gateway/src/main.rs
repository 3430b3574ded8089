use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use agentflow_core::config::AgentFlowConfig;
use agentflow_core::{Agent, AgentNature, EntityTimestamps, Tenant, TenantId};
use agentflow_queue::QueueManager;
use agentflow_pipeline::PipelineTunables;
use agentflow_runtime::AgentRuntimeService;
use agentflow_store::{InMemoryCheckpointStore, InMemorySecretsManager, InMemoryStore, Store};

mod app;
mod auth;
mod dispatch;
mod error;
mod http;

/// Operational startup flags, layered over `agentflow.toml` + `AGENTFLOW_*`
/// env vars (`AgentFlowConfig::load`) — flags win when present.
#[derive(Parser, Debug)]
#[command(name = "agentflow-gateway")]
struct Cli {
    /// Path to agentflow.toml. Defaults to ./agentflow.toml.
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    bind: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentflow_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AgentFlowConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({}), using defaults", e);
        AgentFlowConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let store = Arc::new(InMemoryStore::new());
    let (tenant_id, system_agent_id) = seed_demo_tenant(&store);
    info!(
        %tenant_id,
        %system_agent_id,
        "agentflow: seeded a demo tenant and system agent for local use"
    );

    let tunables = PipelineTunables {
        context_budget_tokens: config.pipeline.context_budget_tokens,
        summary_model: config.pipeline.summary_model.clone(),
        chat_model_name: config.pipeline.default_chat_model.clone(),
    };

    let store: Arc<dyn Store> = store;
    let runtime = Arc::new(
        AgentRuntimeService::new(
            store.clone(),
            Arc::new(InMemoryCheckpointStore::new()),
            Arc::new(InMemorySecretsManager::new()),
        )
        .with_tunables(tunables),
    );
    let queue = Arc::new(QueueManager::new());

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let state = Arc::new(app::AppState::new(config, store, runtime, queue));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("agentflow gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// The core has no tenant/agent-creation endpoints by design (out of scope
/// per spec.md §1) — this binary seeds one demo tenant plus its system and
/// human agents at startup so `POST /threads/` has something to point at.
fn seed_demo_tenant(store: &InMemoryStore) -> (TenantId, agentflow_core::AgentId) {
    let tenant_id = TenantId::new();
    store.seed_tenant(Tenant {
        id: tenant_id.clone(),
        name: "demo".to_string(),
        timestamps: EntityTimestamps::new(),
    });

    let system_agent = Agent {
        id: agentflow_core::AgentId::new(),
        tenant_id: Some(tenant_id.clone()),
        first_name: "Assistant".to_string(),
        second_name: None,
        email: None,
        nature: AgentNature::System,
        origin: None,
        timestamps: EntityTimestamps::new(),
    };
    let system_agent_id = system_agent.id.clone();
    store.seed_agent(system_agent);

    let human_agent = Agent {
        id: agentflow_core::AgentId::new(),
        tenant_id: Some(tenant_id.clone()),
        first_name: "Demo User".to_string(),
        second_name: None,
        email: None,
        nature: AgentNature::Human,
        origin: None,
        timestamps: EntityTimestamps::new(),
    };
    info!(human_agent_id = %human_agent.id, "agentflow: seeded demo human agent");
    store.seed_agent(human_agent);

    (tenant_id, system_agent_id)
}
