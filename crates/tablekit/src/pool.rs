//! Pooled table operations.
//!
//! [`TablePool`] owns a `deadpool-postgres` pool and a [`TableOpsConfig`], and
//! hands out a configured [`TableOps`] per checkout. Each checkout holds one
//! pooled connection until the `TableOps` is dropped, so
//! [`TableOps::fetch_last_insert_id`] must be called on the same `TableOps`
//! that ran the insert.

use crate::config::TableOpsConfig;
use crate::error::{TableError, TableResult};
use crate::executor::TableOps;
use crate::log;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

const DEFAULT_MAX_SIZE: usize = 16;

/// Create a `NoTls` pool with default sizing.
pub fn create_pool(database_url: &str) -> TableResult<Pool> {
    create_pool_with_config(database_url, DEFAULT_MAX_SIZE)
}

/// Create a `NoTls` pool holding at most `max_size` connections.
///
/// No connection is opened until the first checkout.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> TableResult<Pool> {
    if max_size == 0 {
        return Err(TableError::Connection("pool max_size must be at least 1".into()));
    }
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| TableError::Connection(e.to_string()))?;
    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| TableError::Pool(e.to_string()))
}

/// A pool that hands out [`TableOps`] sharing one configuration.
///
/// # Example
///
/// ```ignore
/// use tablekit::pool::TablePool;
/// use tablekit::{TableOpsConfig, pairs};
///
/// let pool = TablePool::from_url("postgres://localhost/garage", 8)?
///     .with_config(TableOpsConfig::new().query_timeout(Duration::from_secs(5)));
///
/// let ops = pool.ops().await?;
/// ops.insert("cars", &pairs([("make", "ford")])).await?;
/// let id = ops.fetch_last_insert_id().await;
/// ```
#[derive(Clone)]
pub struct TablePool {
    pool: Pool,
    config: TableOpsConfig,
}

impl TablePool {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            config: TableOpsConfig::default(),
        }
    }

    pub fn from_url(database_url: &str, max_size: usize) -> TableResult<Self> {
        Ok(Self::new(create_pool_with_config(database_url, max_size)?))
    }

    /// Configuration applied to every [`TableOps`] handed out.
    pub fn with_config(mut self, config: TableOpsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TableOpsConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn max_size(&self) -> usize {
        self.pool.status().max_size
    }

    /// Check out a connection and wrap it in configured table operations.
    pub async fn ops(&self) -> TableResult<TableOps<deadpool_postgres::Client>> {
        let client = self.pool.get().await.map_err(|e| {
            tracing::warn!(target: log::TARGET, error = %e, "pool checkout failed");
            TableError::from(e)
        })?;
        Ok(TableOps::new(client).with_config(self.config.clone()))
    }
}
