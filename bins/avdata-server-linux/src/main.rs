use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use avdata_core::{AccessKind, ConfigError, EventKind, ServiceConfig, TimeSeriesRecord};
use avdata_protocol::{decode_request, encode_response, peek_request_id, ManagementResponse};
use avdata_service::{AssetDataService, ClientSession, ManagementChannel, PushStatus};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Process configuration, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ServerConfig {
    /// Address the management channel listens on.
    bind_addr: SocketAddr,
    /// Application name of the built-in demo session.
    app_name: String,
    /// Registry limits.
    service: ServiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3100)),
            app_name: "avdataDemo".to_string(),
            service: ServiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse configuration from a JSON string.
    fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Config file from the first argument or `AVDATA_CONFIG`.
fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("AVDATA_CONFIG").ok())
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,avdata_service=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Asset data service starting...");

    let config = match config_path() {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            ServerConfig::load(&path)
                .with_context(|| format!("loading configuration from {}", path.display()))?
        }
        None => ServerConfig::default(),
    };
    let service = AssetDataService::new(config.service.clone());

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Management channel listening on {}", config.bind_addr);

    let channel = service.management();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, channel).await {
            tracing::error!("Management channel error: {}", e);
        }
    });

    let demo_service = service.clone();
    let app_name = config.app_name.clone();
    let demo_handle = tokio::spawn(async move {
        if let Err(e) = run_demo_app(demo_service, &app_name).await {
            tracing::error!("Demo application stopped: {}", e);
        }
    });

    tracing::info!("Asset data service ready");
    tracing::info!("Try:");
    tracing::info!(
        r#"   echo '{{"requestId":"1","list":{{"path":"/"}}}}' | nc {}"#,
        config.bind_addr
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = server_handle => {
            tracing::warn!("Management channel stopped");
        }
        _ = demo_handle => {
            tracing::warn!("Demo application stopped");
        }
    }

    tracing::info!(
        "Shutdown complete ({} resources registered)",
        service.resource_count()
    );
    Ok(())
}

/// Accept management connections until the listener fails.
async fn serve(listener: TcpListener, channel: ManagementChannel) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!("Management connection from {}", peer);
        let channel = channel.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, channel).await {
                tracing::warn!("Connection {} closed with error: {}", peer, e);
            }
        });
    }
}

/// Answer line-delimited JSON requests on one connection.
async fn handle_connection(stream: TcpStream, channel: ManagementChannel) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match decode_request(&line) {
            Ok(request) => channel.handle(&request),
            Err(e) => {
                let id = peek_request_id(&line).unwrap_or_default();
                ManagementResponse::failed(&id, 400, e.to_string())
            }
        };

        let mut out = encode_response(&response)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
    }
    Ok(())
}

/// Samples recorded between pushes of the demo uptime series.
const DEMO_SAMPLES_PER_PUSH: usize = 10;

/// Demo application: publishes an uptime Variable on a period taken from a
/// Setting the management side may write, and pushes the uptime history as
/// a time-series record.
async fn run_demo_app(service: AssetDataService, app_name: &str) -> anyhow::Result<()> {
    let session = service.open_session(app_name)?;
    session.create_resource("/demo/uptime", AccessKind::Variable)?;
    session.create_resource("/demo/reportInterval", AccessKind::Setting)?;

    session.add_resource_event_handler("/demo/reportInterval", |event| {
        if event.kind == EventKind::Write {
            tracing::info!("Report interval updated by management side");
        }
    })?;

    let session_request = session.request_session();
    let mut record = session.create_record();
    let result = publish_uptime(&session, &mut record).await;
    session.release_session(session_request);
    result
}

async fn publish_uptime(session: &ClientSession, record: &mut TimeSeriesRecord) -> anyhow::Result<()> {
    let started = tokio::time::Instant::now();
    loop {
        let period = match session.get_int("/demo/reportInterval") {
            Ok(secs) if secs > 0 => Duration::from_secs(secs as u64),
            _ => Duration::from_secs(1),
        };
        tokio::time::sleep(period).await;

        let uptime = started.elapsed().as_secs() as i64;
        session.set_int("/demo/uptime", uptime)?;

        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        record.record_int("demo.uptime", uptime, now)?;
        if record.len() >= DEMO_SAMPLES_PER_PUSH {
            let pushed = session.push_record(record, |status| {
                if status == PushStatus::Failed {
                    tracing::warn!("Uptime history was not delivered");
                }
            });
            if let Err(e) = pushed {
                tracing::warn!("Dropped uptime history: {}", e);
            }
        }
    }
}
