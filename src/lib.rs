//! School attendance and exam tracking.
//!
//! Students see their monthly attendance grid and exam marks; teachers take
//! attendance per lesson and manage exams and grades.

pub mod app;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod grading;
pub mod grid;
pub mod pages;
pub mod schedule;
pub mod sql;
pub mod store;
pub mod types;

pub use app::{router, AppState};
pub use config::Config;
pub use error::{AppError, AppResult};
