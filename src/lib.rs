//! Searches the arXiv API, keeps each query and its papers in SQLite, and
//! serves the stored data over HTTP as JSON or a PDF report.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod report;
pub mod server;
pub mod services;

pub use app::App;
pub use config::Config;
pub use error::{AppError, Result};
