use labdesk::config::Config;
use labdesk::db::ClinicStorage;
use labdesk::router::{LabdeskState, labdesk_router};
use labdesk::service::{Notifier, OtpStore, ReportStore};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        email_configured = cfg.email_configured(),
        chat_configured = cfg.chat_configured(),
        loglevel = %cfg.loglevel
    );

    let storage = ClinicStorage::connect(&cfg.database_url).await?;
    storage.init_schema().await?;

    match (cfg.admin_email.as_deref(), cfg.admin_pass.as_deref()) {
        (Some(email), Some(password)) => {
            let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
            storage.seed_admin(email, &hash).await?;
            info!(%email, "admin credential ensured");
        }
        _ => warn!("ADMIN_EMAIL or ADMIN_PASS not set; skipping admin seed"),
    }

    let notifier = Notifier::spawn(&cfg);
    let reports = ReportStore::new(&cfg.upload_dir, &cfg.pdf_dir)?;
    let otp = Arc::new(OtpStore::new());

    let listen_addr = cfg.listen_addr.clone();
    let state = LabdeskState::new(storage, otp, notifier, reports, cfg);
    let app = labdesk_router(state);

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("HTTP server listening on {}", listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
