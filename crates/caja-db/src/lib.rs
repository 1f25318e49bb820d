//! # caja-db: Storage Layer and Workflows for the Caja Back Office
//!
//! This crate owns the SQLite database and the transactional workflows of
//! the back office: sale creation and cancellation, manual stock
//! adjustment, and cash register sessions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Caja Data Flow                              │
//! │                                                                     │
//! │  API host (HTTP server, external)                                   │
//! │       │  authenticated user id + typed request                      │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                    caja-db (THIS CRATE)                     │   │
//! │  │                                                             │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │   │
//! │  │   │   workflow   │   │ repositories │   │  migrations  │   │   │
//! │  │   │              │   │              │   │  (embedded)  │   │   │
//! │  │   │ create_sale  │   │ products     │   │              │   │   │
//! │  │   │ cancel_sale  │   │ sales        │   │ 001_init.sql │   │   │
//! │  │   │ adjust_stock │   │ customers    │   │ ...          │   │   │
//! │  │   │ open/close   │   │ registers    │   │              │   │   │
//! │  │   │ register     │   │ movements    │   │              │   │   │
//! │  │   └──────┬───────┘   └──────┬───────┘   └──────────────┘   │   │
//! │  │          │ one transaction  │ pool reads                   │   │
//! │  │          ▼                  ▼                              │   │
//! │  │   ┌─────────────────────────────────────────┐              │   │
//! │  │   │         Database (SqlitePool)           │              │   │
//! │  │   └─────────────────────────────────────────┘              │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │                                │                                    │
//! │                                ▼                                    │
//! │                         SQLite (WAL mode)                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use caja_db::{Database, DbConfig};
//! use caja_db::workflow::{create_sale, CreateSaleInput};
//!
//! let db = Database::new(DbConfig::new("./caja.db")).await?;
//! let created = create_sale(&db, &user_id, input).await?;
//! println!("sale {} total {}", created.sale.id, created.sale.total_cents);
//! db.close().await;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use workflow::{WorkflowError, WorkflowResult};
