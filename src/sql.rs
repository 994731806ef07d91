use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub const TABLE_SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS accounts (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	username TEXT NOT NULL UNIQUE,
	pass_salt TEXT NOT NULL,
	pass_hash TEXT NOT NULL,
	role TEXT NOT NULL,
	CHECK(role IN ('student', 'teacher'))
);

CREATE TABLE IF NOT EXISTS sessions (
	token TEXT NOT NULL PRIMARY KEY,
	account_id INTEGER NOT NULL,
	created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
	FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS modules (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	account_id INTEGER UNIQUE DEFAULT NULL,
	full_name TEXT NOT NULL,
	student_code TEXT NOT NULL UNIQUE,
	FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS teachers (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	account_id INTEGER NOT NULL UNIQUE,
	full_name TEXT NOT NULL,
	FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS attendance_records (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	student_id INTEGER NOT NULL,
	module_id INTEGER NOT NULL,
	date DATE NOT NULL,
	status TEXT NOT NULL,
	CHECK(status IN ('P', 'A')),
	UNIQUE(student_id, module_id, date),
	FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
	FOREIGN KEY(module_id) REFERENCES modules(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS exams (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL,
	date DATE NOT NULL,
	time TEXT NOT NULL,
	place TEXT NOT NULL,
	created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS exam_results (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	exam_id INTEGER NOT NULL,
	student_id INTEGER NOT NULL,
	mark INTEGER DEFAULT NULL,
	UNIQUE(exam_id, student_id),
	FOREIGN KEY(exam_id) REFERENCES exams(id) ON DELETE CASCADE,
	FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE
);

"#;

pub async fn open(url: &str) -> Result<SqlitePool, sqlx::Error> {
	if url == ":memory:" {
		return open_in_memory().await;
	}
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(5)
		.acquire_timeout(Duration::from_secs(3))
		.connect_with(options)
		.await?;
	apply_schema(&pool).await?;
	Ok(pool)
}

// every connection of an in-memory database is its own database, so keep exactly one alive
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await?;
	apply_schema(&pool).await?;
	Ok(pool)
}

pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
	for statement in TABLE_SCHEMA.split(';') {
		let statement = statement.trim();
		if statement.is_empty() {
			continue;
		}
		sqlx::query(statement).execute(pool).await?;
	}
	tracing::debug!("schema applied");
	Ok(())
}
