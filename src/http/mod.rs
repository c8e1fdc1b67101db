//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! POST /generate → dispatch loop → typed result or mapped error status
//! /admin/*       → bearer gate → service administrative surface
//! ```

pub mod server;

pub use server::HttpServer;
