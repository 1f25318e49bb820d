//! # Repository Layer
//!
//! One repository per entity, each a thin wrapper around the connection pool
//! executing parameterized statements. Repositories serve the plain
//! read/CRUD surface; anything that mutates stock or sale state goes through
//! the [`crate::workflow`] module, which runs its statements on a dedicated
//! transaction instead.

pub mod business;
pub mod customer;
pub mod product;
pub mod register;
pub mod sale;
pub mod stock;
