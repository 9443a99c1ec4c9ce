// src/repositories/sqlite_repo.rs

use super::RecordSource;
use crate::db::connection::{self, SqlitePool};
use crate::db::queries;
use crate::error::ExportError;
use crate::models::analysis::Analysis;
use crate::models::cots::Cots;
use crate::models::cve::{Cve, CvssScore, CvssVersion};
use crate::utils::timestamp::{from_epoch_seconds, normalize_text};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Reads the exported tables from a SQLite mirror.
pub struct SqliteRepository {
	pool: Arc<SqlitePool>,
}

/// SQLite has no temporal type: timestamps are stored as text or as unix seconds.
fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
	let converted = match row.get_ref(idx)? {
		ValueRef::Null => return Ok(None),
		ValueRef::Text(bytes) => {
			let text = std::str::from_utf8(bytes)
				.map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
			normalize_text(text)
				.map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?
		}
		ValueRef::Integer(secs) => from_epoch_seconds(secs)
			.map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))?,
		ValueRef::Real(_) => return Err(rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), Type::Real)),
		ValueRef::Blob(_) => return Err(rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), Type::Blob)),
	};
	Ok(Some(converted))
}

impl SqliteRepository {
	pub fn new(pool: Arc<SqlitePool>) -> Self {
		Self { pool }
	}

	pub fn open(path: &Path) -> Result<Self, ExportError> {
		let pool = connection::establish_read_only_pool(path)?;
		Ok(Self::new(Arc::new(pool)))
	}

	async fn run<T, F>(&self, context: String, work: F) -> Result<T, ExportError>
	where
		T: Send + 'static,
		F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
	{
		let pool = self.pool.clone();
		let blocking_context = context.clone();
		task::spawn_blocking(move || {
			let conn = pool
				.get()
				.map_err(|e| ExportError::Connection(format!("failed to get database connection: {}", e)))?;
			work(&conn).map_err(|e| ExportError::query(blocking_context, e))
		})
		.await
		.map_err(|e| ExportError::query(context, e))?
	}
}

impl RecordSource for SqliteRepository {
	async fn cves(&mut self) -> Result<Vec<Cve>, ExportError> {
		self.run("fetching CVEs".to_string(), |conn| {
			let mut stmt = conn.prepare(queries::SELECT_CVES)?;
			let cve_iter = stmt.query_map([], |row| {
				Ok(Cve {
					id: row.get(0)?,
					name: row.get(1)?,
					cwe: row.get(2)?,
					modified: timestamp(row, 3)?,
					published: timestamp(row, 4)?,
					status: row.get(5)?,
					summary: row.get(6)?,
					cvss3: None,
					cvss2: None,
					cpes: Vec::new(),
				})
			})?;

			cve_iter.collect::<rusqlite::Result<Vec<_>>>()
		})
		.await
	}

	async fn cvss(&mut self, version: CvssVersion, cve_id: i64) -> Result<Option<CvssScore>, ExportError> {
		self.run(format!("fetching {:?} score of CVE {}", version, cve_id), move |conn| {
			conn.query_row(queries::select_cvss(version), params![cve_id], |row| {
				Ok(CvssScore {
					cvss: row.get(0)?,
					exploitability_score: row.get(1)?,
					impact_score: row.get(2)?,
					vector: row.get(3)?,
				})
			})
			.optional()
		})
		.await
	}

	async fn cots_links(&mut self, cve_id: i64) -> Result<Vec<i64>, ExportError> {
		self.run(format!("fetching COTS links of CVE {}", cve_id), move |conn| {
			let mut stmt = conn.prepare(queries::SELECT_COTS_LINKS)?;
			let ids = stmt.query_map(params![cve_id], |row| row.get(0))?;
			ids.collect::<rusqlite::Result<Vec<i64>>>()
		})
		.await
	}

	async fn cots(&mut self) -> Result<Vec<Cots>, ExportError> {
		self.run("fetching COTS".to_string(), |conn| {
			let mut stmt = conn.prepare(queries::SELECT_COTS)?;
			let cots_iter = stmt.query_map([], |row| {
				Ok(Cots {
					id: row.get(0)?,
					name: row.get(1)?,
					version: row.get(2)?,
					created_at: timestamp(row, 3)?,
					updated_at: timestamp(row, 4)?,
					obsolete_at: timestamp(row, 5)?,
					cpe: row.get(6)?,
					to_analyse: row.get(7)?,
				})
			})?;

			cots_iter.collect::<rusqlite::Result<Vec<_>>>()
		})
		.await
	}

	async fn analyses(&mut self) -> Result<Vec<Analysis>, ExportError> {
		self.run("fetching analyses".to_string(), |conn| {
			let mut stmt = conn.prepare(queries::SELECT_ANALYSES)?;
			let analysis_iter = stmt.query_map([], |row| {
				Ok(Analysis {
					id: row.get(0)?,
					created_at: timestamp(row, 1)?,
					updated_at: timestamp(row, 2)?,
					done: row.get(3)?,
					applicable: row.get(4)?,
					justification: row.get(5)?,
					validated: row.get(6)?,
					cots_id: row.get(7)?,
					cve_id: row.get(8)?,
					first_for_id: row.get(9)?,
					last_updater_id: row.get(10)?,
					hidden: row.get(11)?,
				})
			})?;

			analysis_iter.collect::<rusqlite::Result<Vec<_>>>()
		})
		.await
	}
}
