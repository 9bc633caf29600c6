//! # tablekit
//!
//! Table-operation helpers for PostgreSQL.
//!
//! ## Features
//!
//! - **Composable SQL**: one builder per statement kind in [`qb`], plus the
//!   plain string functions in [`fragment`]
//! - **Sanitized writes**: INSERT/UPDATE values are purified, then escaped
//! - **Display-escaped reads**: returned cells are HTML-escaped for redisplay
//! - **Injected connection**: anything implementing [`Connection`], including
//!   transactions and pooled clients
//! - **Statement logging**: `tracing` events on target `tablekit.sql`
//!
//! ## Table operations
//!
//! ```ignore
//! use tablekit::{JoinChain, OrderSpec, Predicates, TableOps, pairs};
//!
//! let client = tablekit::connect("postgres://localhost/garage").await?;
//! let ops = TableOps::new(client);
//!
//! ops.insert("cars", &pairs([("make", "ford"), ("model", "focus")])).await?;
//! let id = ops.fetch_last_insert_id().await;
//!
//! let rows = ops
//!     .select_where_order(
//!         "cars",
//!         ["make", "model"],
//!         &pairs([("make", "ford")]),
//!         &pairs([("model", "ASC")]),
//!     )
//!     .await?;
//!
//! let chain = JoinChain::new().table("cars", "id").table("owners", "car_id");
//! let rows = ops.select_join(&chain, ["cars.make", "owners.name"], &Predicates::new(), &OrderSpec::new()).await?;
//! ```
//!
//! ## Query builder (qb)
//!
//! ```ignore
//! use tablekit::qb::{self, SqlQb};
//!
//! let q = qb::update("cars").set("model", "ka").filter("id", "7");
//! assert_eq!(q.to_sql()?, "UPDATE cars SET model = $1 WHERE id = $2");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod fragment;
pub mod ident;
pub mod qb;
pub mod reserved;
pub mod row;
pub mod sanitize;
pub mod table;
pub mod types;

mod log;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Connection, connect};
pub use config::TableOpsConfig;
pub use error::{TableError, TableResult};
pub use executor::TableOps;
pub use ident::{IdentQuoting, quote_ident};
pub use qb::{
    BuiltQuery, DeleteQb, InsertQb, SelectQb, SqlQb, SqlValue, StatementKind, Style, UpdateQb,
    ValueBinding,
};
pub use reserved::{escape_identifier_or_literal, is_reserved};
pub use row::Row;
pub use sanitize::{
    FieldSanitizer, NoopPurifier, Purifier, TagStripper, escape_literal, sanitize_cell,
    sanitize_row,
};
pub use table::{Columns, Fields, JoinChain, JoinStep, OrderSpec, Predicates, pairs};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{TablePool, create_pool, create_pool_with_config};
