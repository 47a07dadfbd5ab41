//! Service wiring: builds the adapters named by [`AppConfig`] and hands
//! back the HTTP state.

use std::sync::Arc;

use thiserror::Error;

use crate::adapters::booklets::{FileBookletSource, HttpBookletSource};
use crate::adapters::http::SurveyAppState;
use crate::adapters::memory::{InMemoryConsentStore, InMemoryResponseRowWriter, InMemoryResponseStore};
use crate::adapters::postgres::{
    PostgresConsentStore, PostgresResponseRowWriter, PostgresResponseStore,
};
use crate::adapters::storage::FileLocalRecordStore;
use crate::adapters::usage_counter::RedisBookletCounter;
use crate::application::handlers::{
    BookletAssigner, ConsentRecorder, PersistencePipeline, SaveResponseRowsHandler, SurveyServices,
};
use crate::config::{AppConfig, DatabaseConfig, RedisConfig, ValidationError};
use crate::ports::{
    BookletSource, ConsentStore, LocalRecordStore, ResponseRowWriter, ResponseStore,
};

/// Errors raised while starting the service.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection timed out")]
    RedisTimeout,

    #[error("Booklet client setup failed: {0}")]
    BookletClient(#[from] reqwest::Error),
}

/// Primary-side stores the service writes through.
pub struct Stores {
    pub consent: Arc<dyn ConsentStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub rows: Arc<dyn ResponseRowWriter>,
}

impl Stores {
    /// Offline stores; nothing outlives the process.
    pub fn in_memory() -> Self {
        Self {
            consent: Arc::new(InMemoryConsentStore::new()),
            responses: Arc::new(InMemoryResponseStore::new()),
            rows: Arc::new(InMemoryResponseRowWriter::new()),
        }
    }

    fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            consent: Arc::new(PostgresConsentStore::new(pool.clone())),
            responses: Arc::new(PostgresResponseStore::new(pool.clone())),
            rows: Arc::new(PostgresResponseRowWriter::new(pool)),
        }
    }
}

/// Builds the application state for `config`.
///
/// Without a database section the primary stores are in-memory; without a
/// redis section the assigner runs without a usage counter.
pub async fn build_state(config: &AppConfig) -> Result<SurveyAppState, StartupError> {
    let stores = match &config.database {
        Some(database) => Stores::postgres(connect_database(database).await?),
        None => {
            tracing::warn!("No database configured, running in offline mode");
            Stores::in_memory()
        }
    };
    assemble(config, stores).await
}

/// Wires `stores` with the rest of the adapters named by `config`.
///
/// Every completed session also goes to `stores.rows` as per-question rows.
pub async fn assemble(config: &AppConfig, stores: Stores) -> Result<SurveyAppState, StartupError> {
    let pool = config.survey.pool()?;
    let local: Arc<dyn LocalRecordStore> =
        Arc::new(FileLocalRecordStore::new(&config.survey.fallback_dir));

    let mut assigner = BookletAssigner::new(pool);
    if let Some(redis) = &config.redis {
        assigner = assigner.with_counter(Arc::new(connect_redis(redis).await?));
    }

    let booklets: Arc<dyn BookletSource> = match &config.survey.booklet_base_url {
        Some(url) => {
            tracing::info!(base_url = %url, "Loading booklets over HTTP");
            Arc::new(HttpBookletSource::new(url.clone(), config.survey.fetch_timeout())?)
        }
        None => {
            tracing::info!(dir = %config.survey.booklets_dir.display(), "Loading booklets from disk");
            Arc::new(FileBookletSource::new(&config.survey.booklets_dir))
        }
    };

    let persistence =
        PersistencePipeline::new(stores.responses, local.clone()).with_row_writer(stores.rows.clone());

    let services = SurveyServices {
        consent: Arc::new(ConsentRecorder::new(stores.consent, local)),
        assigner: Arc::new(assigner),
        booklets,
        persistence: Arc::new(persistence),
    };
    let save_rows = Arc::new(SaveResponseRowsHandler::new(stores.rows, pool));

    Ok(SurveyAppState::new(services, save_rows).with_verbose_errors(config.features.verbose_errors))
}

async fn connect_database(config: &DatabaseConfig) -> Result<sqlx::PgPool, StartupError> {
    let pool = config.pool_options().connect(&config.url).await?;
    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }
    tracing::info!(max_connections = config.max_connections, "Connected to database");
    Ok(pool)
}

async fn connect_redis(config: &RedisConfig) -> Result<RedisBookletCounter, StartupError> {
    let client = redis::Client::open(config.url.as_str())?;
    let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| StartupError::RedisTimeout)??;
    tracing::info!(stats_key = %config.stats_key, "Connected to Redis usage counter");
    Ok(RedisBookletCounter::new(conn).with_stats_key(config.stats_key.clone()))
}
