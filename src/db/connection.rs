use crate::config::PgConfig;
use crate::error::ExportError;
use log::info;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::path::Path;
use std::time::Duration;

pub type SqlitePool = Pool<SqliteConnectionManager>;

/// Opens a single PostgreSQL connection for the whole run.
pub async fn connect_postgres(config: &PgConfig) -> Result<PgConnection, ExportError> {
	info!(
		"Connecting to PostgreSQL database {} at {}:{} as {}",
		config.db_name, config.hostname, config.port, config.user
	);

	let options = PgConnectOptions::new()
		.host(&config.hostname)
		.port(config.port)
		.username(&config.user)
		.password(&config.password)
		.database(&config.db_name);

	let conn = PgConnection::connect_with(&options)
		.await
		.map_err(|e| ExportError::Connection(e.to_string()))?;

	info!("PostgreSQL connection established");
	Ok(conn)
}

/// Opens a read-only pool over an existing SQLite mirror of the database.
pub fn establish_read_only_pool(path: &Path) -> Result<SqlitePool, ExportError> {
	if !path.is_file() {
		return Err(ExportError::Connection(format!(
			"SQLite database not found at {}",
			path.display()
		)));
	}
	info!("Reading SQLite database at: {:?}", path);

	let manager = SqliteConnectionManager::file(path)
		.with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);

	Pool::builder()
		.max_size(1)
		.connection_timeout(Duration::from_secs(5))
		.build(manager)
		.map_err(|e| ExportError::Connection(format!("failed to open SQLite pool: {}", e)))
}
