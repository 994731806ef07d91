use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Process configuration, read once from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub bind_addr: String,
	pub schedule_path: Option<PathBuf>,
	pub static_dir: PathBuf,
}

pub const DEFAULT_DATABASE_URL: &str = "sqlite://student_tracker.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STATIC_DIR: &str = "./static";

impl Config {
	pub fn from_env() -> Result<Self> {
		let _ = dotenvy::dotenv();

		let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
		bind_addr
			.parse::<std::net::SocketAddr>()
			.with_context(|| format!("BIND_ADDR is not a socket address: {bind_addr}"))?;

		Ok(Self {
			database_url: env::var("DATABASE_URL")
				.unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
			bind_addr,
			schedule_path: env::var("SCHEDULE_PATH").ok().map(PathBuf::from),
			static_dir: env::var("STATIC_DIR")
				.map(PathBuf::from)
				.unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR)),
		})
	}
}
