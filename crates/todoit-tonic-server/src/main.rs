#![doc = include_str!("../README.md")]

use clap::Parser;
use futures::Stream;
use todoit_core::proto::{FILE_DESCRIPTOR_SET, to_do_it_server::ToDoItServer};
use todoit_store::{MemoryStore, SqliteStore, Store};
use todoit_tonic_server::server::{
    config::{CliArgs, ServerConfig, StoreBackend},
    service::handler::ToDoService,
    telemetry::{TelemetryProviders, init_telemetry},
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let result = match config.store {
        StoreBackend::Memory => serve(MemoryStore::new(), config).await,
        StoreBackend::Sqlite => {
            let store = SqliteStore::connect(&config.database_url, config.max_connections).await?;
            serve(store, config).await
        }
    };

    providers.shutdown();
    result
}

async fn serve<S: Store>(store: S, config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.server_addr.clone();
    log_startup_info(&addr, &config);
    let service = ToDoService::new(store).with_strict_updates(config.strict_updates);

    if !config.uds {
        let incoming = TcpListenerStream::new(TcpListener::bind(&addr).await?);
        return run_server_with_incoming(service, incoming).await;
    }

    #[cfg(unix)]
    {
        let incoming =
            tokio_stream::wrappers::UnixListenerStream::new(tokio::net::UnixListener::bind(&addr)?);
        let res = run_server_with_incoming(service, incoming).await;
        // The socket file outlives the listener.
        let _ = std::fs::remove_file(&addr);
        res
    }
    #[cfg(not(unix))]
    {
        anyhow::bail!("Unix domain sockets are not supported on this platform")
    }
}

async fn run_server_with_incoming<S, I, IO, IE>(
    service: ToDoService<S>,
    incoming: I,
) -> anyhow::Result<()>
where
    S: Store,
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<ToDoItServer<ToDoService<S>>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_todo_service(service.clone()))
        .serve_with_incoming_shutdown(incoming, shutdown_signal::<S>(health_reporter))
        .await?;

    service.shutdown().await;
    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(addr: &str, config: &ServerConfig) {
    tracing::info!(
        addr,
        uds = config.uds,
        store = ?config.store,
        strict_updates = config.strict_updates,
        "Starting ToDoIt service"
    );
    tracing::debug!(?config, "Resolved server configuration");
}

fn build_todo_service<S: Store>(service: ToDoService<S>) -> ToDoItServer<ToDoService<S>> {
    ToDoItServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

/// Resolves on SIGTERM. Never resolves where the handler is unavailable.
async fn sigterm() {
    #[cfg(unix)]
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
            return;
        }
        Err(e) => tracing::error!(error = %e, "SIGTERM handler unavailable"),
    }
    std::future::pending::<()>().await;
}

/// Waits for Ctrl+C or SIGTERM, then marks the service as not serving.
async fn shutdown_signal<S: Store>(health_reporter: HealthReporter) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    let source = tokio::select! {
        () = ctrl_c => "ctrl-c",
        () = sigterm() => "sigterm",
    };
    tracing::info!(source, "Shutting down");

    health_reporter
        .set_not_serving::<ToDoItServer<ToDoService<S>>>()
        .await;
}
