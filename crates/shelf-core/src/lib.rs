//! Core types and trait definitions for the Shelf book tracker.
//!
//! This crate is free of HTTP and database dependencies. The storage
//! backend, the catalog adapter and the API all depend on it.

pub mod book;
pub mod error;
pub mod rating;
pub mod review;
pub mod store;
pub mod user;

pub use error::{Error, Result};
