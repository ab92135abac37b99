use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing::{info, warn};

use database_layer::DatabasePool;
use dentacare_server::{
    create_app,
    store::{ClinicStore, InMemoryStore, PgStore},
    DentaCareServer, ServerSettings,
};
use email_service::{EmailConfig, EmailService};
use error_common::{DentaCareError, Result};
use logger_redacted::init_logging;

/// DentaCare Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "dentacare-server")]
#[command(about = "Dental clinic scheduling and patient records API server")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "dentacare.yaml")]
    config: String,

    /// Server port, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings =
        ServerSettings::load(&args.config).map_err(|e| DentaCareError::ConfigError(e.to_string()))?;
    if let Some(port) = args.port {
        settings.port = port;
    }
    if args.verbose {
        settings.logging = settings.logging.clone().verbose();
    }
    if args.json_logs {
        settings.logging.json = true;
    }

    init_logging(&settings.logging).map_err(|e| DentaCareError::InternalError(e.to_string()))?;
    if !settings.logging.json {
        print_startup_banner();
    }

    info!("🦷 {}", "Starting DentaCare Engine HTTP Server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!("🌐 Bind address: {}", settings.bind_address().bright_yellow());

    let store = open_store(&settings).await?;

    let mut email_config = EmailConfig::from_env().map_err(|e| DentaCareError::EmailError(e.to_string()))?;
    if std::env::var("EMAIL_FROM_NAME").is_err() {
        email_config.from_name = settings.clinic_name.clone();
    }
    let mailer = EmailService::new(email_config).map_err(|e| DentaCareError::EmailError(e.to_string()))?;
    if !mailer.is_enabled() {
        warn!("📭 {}", "Appointment email is disabled; confirmations will not be sent".bright_yellow());
    } else if let Err(e) = mailer.verify_email_config().await {
        warn!("📭 {}", format!("SMTP relay check failed, emails may not be delivered: {}", e).bright_yellow());
    }
    if settings.admin_password.is_none() {
        warn!(
            "🔒 {}",
            "DENTACARE_ADMIN_PASSWORD is not set; admin unlock stays disabled until a password is stored".bright_yellow()
        );
    }

    let addr = settings.bind_address();
    let server = DentaCareServer::new(settings, store, Arc::new(mailer));
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DentaCareError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("🚀 {}", format!("DentaCare Engine server running on http://{}", addr).bright_green());
    info!("📋 {}", format!("Health check available at: http://{}/health", addr).bright_blue());
    info!("📋 {}", format!("API available at: http://{}/api", addr).bright_blue());
    info!("📖 {}", format!("API docs at: http://{}/swagger-ui", addr).bright_blue());

    axum::serve(listener, app)
        .await
        .map_err(|e| DentaCareError::ServerError(format!("HTTP server error: {}", e)))?;

    Ok(())
}

/// Postgres when a database URL is configured, otherwise an in-process store
async fn open_store(settings: &ServerSettings) -> Result<Arc<dyn ClinicStore>> {
    match &settings.database_url {
        Some(url) => {
            info!("🗄️  {}", "Connecting to PostgreSQL...".bright_cyan());
            let pool = DatabasePool::new(url, &settings.database)
                .await
                .map_err(|e| DentaCareError::DatabaseError(e.to_string()))?;
            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| DentaCareError::DatabaseError(e.to_string()))?;
            info!("✅ {}", "Database ready".bright_green());
            Ok(Arc::new(store))
        }
        None => {
            warn!(
                "⚠️  {}",
                "No database_url configured; using the in-memory store, data is lost on restart".bright_yellow()
            );
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                      🦷 DENTACARE ENGINE                     ║".bright_cyan());
    println!("{}", "║              Dental Clinic Scheduling & Records              ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}
