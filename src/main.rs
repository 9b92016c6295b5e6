//! SuiteHub - venue, event and office-suite reservation service
//!
//! Serves the public reservation and event API, the staff dashboard API and
//! the chat proxy.

use std::env;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use config::LogFormat;
use suitehub::{api, config, db, middleware, services::AuthService, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--fix-database") {
        return fix_database().await;
    }

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("SuiteHub {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must outlive the server so file logs get flushed
    let _log_guard = init_logging(&config);

    info!("SuiteHub starting up");

    ensure_media_root(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    if let Some(ref admin) = config.bootstrap_admin {
        if AuthService::new(&db)
            .ensure_bootstrap_admin(admin)
            .await
            .context("Failed to create bootstrap admin")?
        {
            info!(username = %admin.username, "Bootstrap staff account created");
        }
    }

    if config.chat.api_key.is_none() {
        warn!("No chat API key configured; chat replies will be canned");
    }

    let state = AppState::new(config.clone(), db).context("Failed to build application state")?;

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    if let Some(ref tls_config) = config.server.tls {
        info!("Starting HTTPS server on https://{}", addr);
        info!("TLS certificate: {:?}", tls_config.cert_file);

        let rustls_config = create_rustls_config(tls_config).await?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("Failed to bind to address")?;

        // axum-server keeps ConnectInfo available for the rate limiter
        axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)?
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .context("HTTPS server error")?;
    } else {
        info!("Starting HTTP server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("Failed to bind to address")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("HTTP server error")?;
    }

    Ok(())
}

/// Create RusTLS configuration from TLS config
async fn create_rustls_config(
    tls_config: &config::TlsConfig,
) -> Result<axum_server::tls_rustls::RustlsConfig> {
    use axum_server::tls_rustls::RustlsConfig;
    use rustls::crypto::aws_lc_rs::default_provider;
    use rustls::ServerConfig;

    // Load certificate chain
    let cert_file = std::fs::File::open(&tls_config.cert_file)
        .with_context(|| format!("Failed to open certificate file: {:?}", tls_config.cert_file))?;
    let mut cert_reader = BufReader::new(cert_file);
    let certs: Vec<_> = rustls_pemfile::certs(&mut cert_reader)
        .filter_map(|r| r.ok())
        .collect();

    if certs.is_empty() {
        anyhow::bail!("No certificates found in {:?}", tls_config.cert_file);
    }

    // Load private key
    let key_file = std::fs::File::open(&tls_config.key_file)
        .with_context(|| format!("Failed to open key file: {:?}", tls_config.key_file))?;
    let mut key_reader = BufReader::new(key_file);
    let key = rustls_pemfile::private_key(&mut key_reader)
        .with_context(|| format!("Failed to read private key: {:?}", tls_config.key_file))?
        .ok_or_else(|| anyhow::anyhow!("No private key found in {:?}", tls_config.key_file))?;

    let provider = default_provider();

    // Determine minimum TLS version from config
    let versions: Vec<&'static rustls::SupportedProtocolVersion> =
        match tls_config.min_version.as_str() {
            "1.3" => vec![&rustls::version::TLS13],
            _ => vec![&rustls::version::TLS12, &rustls::version::TLS13],
        };

    info!(min_version = %tls_config.min_version, "TLS configured");

    // Build ServerConfig with specified TLS versions
    let mut server_config = ServerConfig::builder_with_provider(provider.into())
        .with_protocol_versions(&versions)
        .context("Failed to set TLS protocol versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key.into())
        .context("Failed to build TLS server config")?;

    // Enable ALPN for HTTP/1.1 and HTTP/2
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

type BoxedLayer = Box<dyn tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Initialize the logging/tracing infrastructure
///
/// Returns the file writer guard when logs go to a file.
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let log_config = &config.logging;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if matches!(log_config.target, LogTarget::Console | LogTarget::Both) {
        layers.push(format_layer(&log_config.format, std::io::stdout));
    }
    if matches!(log_config.target, LogTarget::File | LogTarget::Both) {
        let (writer, file_guard) = create_file_writer(log_config);
        layers.push(format_layer(&log_config.format, writer));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    guard
}

/// One formatting layer writing to `writer`
fn format_layer<W>(format: &LogFormat, writer: W) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::{fmt, Layer};

    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(writer)
            .boxed(),
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Ensure the upload directory exists
fn ensure_media_root(config: &AppConfig) -> Result<()> {
    let root = &config.media.root;
    if !root.exists() {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create media root {:?}", root))?;
        info!("Created media root: {:?}", root);
    }
    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState) -> Router {
    // Configure CORS for browser clients on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Login, reservation requests and chat share one per-IP budget
    let submission_limit =
        middleware::RateLimitState::new(middleware::submission_rate_limit_config());
    let api_limit = middleware::RateLimitState::new(middleware::api_rate_limit_config());
    middleware::spawn_rate_limit_cleanup(submission_limit.clone());
    middleware::spawn_rate_limit_cleanup(api_limit.clone());

    // Apply global middleware layers:
    // 1. Overall per-IP request budget
    // 2. Security headers (HSTS, CSP, X-Frame-Options, etc.)
    // 3. Compression
    // 4. Request tracing
    // 5. CORS
    api::create_router(state, Some(submission_limit))
        .layer(axum::middleware::from_fn_with_state(
            api_limit,
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
}

/// Print help message
fn print_help() {
    println!(
        r#"SuiteHub {}

USAGE:
    suitehub [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --fix-database          Run all migrations and verify that every required
                            table exists, then exit.

ENVIRONMENT:
    SUITEHUB_CONFIG     Path to configuration file (default: config.yaml)
    DATABASE_URL        SQLite database URL
    JWT_SECRET          Token signing secret (at least 32 characters)
    CHAT_API_KEY        Completion API key; chat answers with a canned reply without it

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by SUITEHUB_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/suitehub/config.yaml
    5. <user config dir>/suitehub/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Run migrations and verify that all required tables exist
async fn fix_database() -> Result<()> {
    println!("SuiteHub Database Repair Tool v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = AppConfig::load().context("Failed to load configuration")?;
    println!("Database URL: {}", config.database.url);
    println!();

    println!("Connecting to database...");
    let pool = db::connect(&config.database, 1).await?;

    println!("Running database migrations...");
    if let Err(e) = db::migrations::run(&pool).await {
        eprintln!("Migration error: {:#}", e);
        return Err(e);
    }
    println!("Migrations completed successfully.");

    println!();
    println!("Verifying database tables...");

    let existing_tables = db::migrations::list_tables(&pool).await?;
    println!("Found {} tables:", existing_tables.len());
    for table in &existing_tables {
        println!("  - {}", table);
    }

    let missing_tables = db::migrations::missing_tables(&pool).await?;
    println!();

    if missing_tables.is_empty() {
        println!("Database repair completed successfully!");
        println!(
            "All {} required tables are present.",
            db::migrations::REQUIRED_TABLES.len()
        );
    } else {
        eprintln!(
            "WARNING: {} missing table(s) after migrations:",
            missing_tables.len()
        );
        for table in &missing_tables {
            eprintln!("  - {}", table);
        }
        return Err(anyhow::anyhow!(
            "Database repair incomplete: {} missing tables",
            missing_tables.len()
        ));
    }

    Ok(())
}
