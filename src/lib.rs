//! buildtrack provisions homeowner and builder profiles and serves the
//! profile lookups and filters behind the project dashboards.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;

use adapters::outbound::clock::SystemClock;
use adapters::outbound::identity::GoTrueIdentityProvider;
use adapters::outbound::mail::RabbitMqMailer;
use adapters::outbound::persistence::postgres::PgProfileRepository;
use adapters::outbound::telemetry::MetricsTelemetry;
use application::ports::inbound::{CreateUser, LookupUsers, UpdateUser};
use application::ports::outbound::{ProfileRepository, TelemetryPort};
use application::usecases::{
    CreateUserUseCase, LookupUsersUseCase, UpdateUserUseCase,
};
use error::BootstrapError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "buildtrack";
pub const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_AMPQ_VHOST: &str = "/";

/// Use cases shared with the presentation layer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub create_user: Arc<dyn CreateUser>,
    pub update_user: Arc<dyn UpdateUser>,
    pub lookup_users: Arc<dyn LookupUsers>,
}

/// Open the PostgreSQL pool.
async fn connect(cfg: &config::Postgres) -> Result<PgPool, sqlx::Error> {
    let username = cfg.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS);
    let password = cfg.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS);
    let db = cfg.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME);

    let addr = format!("postgres://{username}:{password}@{}/{db}", cfg.address);
    let pool = PgPoolOptions::new()
        .max_connections(cfg.pool_size.unwrap_or(DEFAULT_POOL_SIZE))
        .connect(&addr)
        .await?;

    tracing::info!(hostname = %cfg.address, %db, "postgres connected");
    Ok(pool)
}

/// Wire the adapters into the use cases.
pub async fn build_state(
    config: config::Configuration,
) -> Result<AppState, BootstrapError> {
    let Some(postgres) = &config.postgres else {
        return Err(BootstrapError::MissingEntry("postgres"));
    };
    let pool = connect(postgres).await?;

    // execute migrations scripts on start.
    sqlx::migrate!().run(&pool).await?;

    let Some(identity) = &config.identity else {
        return Err(BootstrapError::MissingEntry("identity"));
    };
    let Some(service_key) = identity.service_key.as_deref() else {
        return Err(BootstrapError::MissingEntry("identity.service_key"));
    };
    let identity = GoTrueIdentityProvider::new(&identity.url, service_key)?;

    // handle mail sender.
    let mailer = match &config.mail {
        Some(cfg) => {
            RabbitMqMailer::new(
                &cfg.address,
                &cfg.username,
                &cfg.password,
                cfg.vhost.as_deref().unwrap_or(DEFAULT_AMPQ_VHOST),
                &cfg.queue,
            )
            .await?
        },
        None => {
            tracing::warn!(
                "missing `mail` entry on `config.yaml` file, \
                 welcome mails disabled"
            );
            RabbitMqMailer::disabled()
        },
    };

    let profile_repo: Arc<dyn ProfileRepository> =
        Arc::new(PgProfileRepository::new(pool));
    let telemetry: Arc<dyn TelemetryPort> = Arc::new(MetricsTelemetry::new());

    let create_user = CreateUserUseCase::new(
        Box::new(identity),
        Arc::clone(&profile_repo),
        Box::new(mailer),
        Arc::clone(&telemetry),
        Box::new(SystemClock::new()),
        config.provisioning_settings(),
    );
    let update_user =
        UpdateUserUseCase::new(Arc::clone(&profile_repo), telemetry);
    let lookup_users = LookupUsersUseCase::new(profile_repo);

    Ok(AppState {
        config: Arc::new(config),
        create_user: Arc::new(create_user),
        update_user: Arc::new(update_user),
        lookup_users: Arc::new(lookup_users),
    })
}

/// Initialize telemetry and the application state from `config.yaml`.
///
/// The returned guard must outlive the state for telemetry to keep
/// exporting.
pub async fn initialize_state()
-> Result<(AppState, telemetry::TelemetryGuard), BootstrapError> {
    // read configuration file.
    let config = config::Configuration::default().read()?;
    let guard = telemetry::init(config.telemetry.as_ref())?;

    let state = build_state(config).await?;
    Ok((state, guard))
}
