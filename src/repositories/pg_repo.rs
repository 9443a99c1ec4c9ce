// src/repositories/pg_repo.rs

use super::RecordSource;
use crate::config::PgConfig;
use crate::db::{connection, queries};
use crate::error::ExportError;
use crate::models::analysis::Analysis;
use crate::models::cots::Cots;
use crate::models::cve::{Cve, CvssScore, CvssVersion};
use crate::utils::timestamp::{isoformat, isoformat_date, isoformat_offset};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::debug;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Connection, Row, TypeInfo, ValueRef};

pub struct PgRepository {
	conn: PgConnection,
}

/// Decodes any PostgreSQL temporal column into its export text.
fn timestamp(row: &PgRow, column: &str) -> Result<Option<String>, sqlx::Error> {
	let type_name = {
		let raw = row.try_get_raw(column)?;
		if raw.is_null() {
			return Ok(None);
		}
		raw.type_info().name().to_string()
	};

	let text = match type_name.as_str() {
		"TIMESTAMPTZ" => {
			let dt: DateTime<Utc> = row.try_get(column)?;
			isoformat_offset(&dt.fixed_offset())
		}
		"DATE" => {
			let date: NaiveDate = row.try_get(column)?;
			isoformat_date(&date)
		}
		_ => {
			let dt: NaiveDateTime = row.try_get(column)?;
			isoformat(&dt)
		}
	};
	Ok(Some(text))
}

fn cve_from_row(row: &PgRow) -> Result<Cve, sqlx::Error> {
	Ok(Cve {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		cwe: row.try_get("cwe")?,
		modified: timestamp(row, "modified")?,
		published: timestamp(row, "published")?,
		status: row.try_get("status")?,
		summary: row.try_get("summary")?,
		cvss3: None,
		cvss2: None,
		cpes: Vec::new(),
	})
}

fn cots_from_row(row: &PgRow) -> Result<Cots, sqlx::Error> {
	Ok(Cots {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		version: row.try_get("version")?,
		created_at: timestamp(row, "created_at")?,
		updated_at: timestamp(row, "updated_at")?,
		obsolete_at: timestamp(row, "obsolete_at")?,
		cpe: row.try_get("cpe")?,
		to_analyse: row.try_get("to_analyse")?,
	})
}

fn analysis_from_row(row: &PgRow) -> Result<Analysis, sqlx::Error> {
	Ok(Analysis {
		id: row.try_get("id")?,
		created_at: timestamp(row, "created_at")?,
		updated_at: timestamp(row, "updated_at")?,
		done: row.try_get("done")?,
		applicable: row.try_get("applicable")?,
		justification: row.try_get("justification")?,
		validated: row.try_get("validated")?,
		cots_id: row.try_get("cots_id")?,
		cve_id: row.try_get("cve_id")?,
		first_for_id: row.try_get("first_for_id")?,
		last_updater_id: row.try_get("last_updater_id")?,
		hidden: row.try_get("hidden")?,
	})
}

impl PgRepository {
	pub async fn connect(config: &PgConfig) -> Result<Self, ExportError> {
		let conn = connection::connect_postgres(config).await?;
		Ok(Self { conn })
	}

	pub async fn close(self) -> Result<(), ExportError> {
		self.conn
			.close()
			.await
			.map_err(|e| ExportError::Connection(format!("failed to close session: {}", e)))
	}
}

impl RecordSource for PgRepository {
	async fn cves(&mut self) -> Result<Vec<Cve>, ExportError> {
		let rows = sqlx::query(queries::SELECT_CVES)
			.fetch_all(&mut self.conn)
			.await
			.map_err(|e| ExportError::query("fetching CVEs", e))?;
		debug!("Fetched {} CVE rows", rows.len());

		rows.iter()
			.map(cve_from_row)
			.collect::<Result<Vec<_>, _>>()
			.map_err(|e| ExportError::query("decoding CVE rows", e))
	}

	async fn cvss(&mut self, version: CvssVersion, cve_id: i64) -> Result<Option<CvssScore>, ExportError> {
		let row = sqlx::query(queries::select_cvss(version))
			.bind(cve_id)
			.fetch_optional(&mut self.conn)
			.await
			.map_err(|e| ExportError::query(format!("fetching {:?} score of CVE {}", version, cve_id), e))?;

		row.map(|row| -> Result<CvssScore, sqlx::Error> {
			Ok(CvssScore {
				cvss: row.try_get("cvss")?,
				exploitability_score: row.try_get("exploitability_score")?,
				impact_score: row.try_get("impact_score")?,
				vector: row.try_get("vector")?,
			})
		})
		.transpose()
		.map_err(|e| ExportError::query(format!("decoding {:?} score of CVE {}", version, cve_id), e))
	}

	async fn cots_links(&mut self, cve_id: i64) -> Result<Vec<i64>, ExportError> {
		sqlx::query_scalar::<_, i64>(queries::SELECT_COTS_LINKS)
			.bind(cve_id)
			.fetch_all(&mut self.conn)
			.await
			.map_err(|e| ExportError::query(format!("fetching COTS links of CVE {}", cve_id), e))
	}

	async fn cots(&mut self) -> Result<Vec<Cots>, ExportError> {
		let rows = sqlx::query(queries::SELECT_COTS)
			.fetch_all(&mut self.conn)
			.await
			.map_err(|e| ExportError::query("fetching COTS", e))?;
		debug!("Fetched {} COTS rows", rows.len());

		rows.iter()
			.map(cots_from_row)
			.collect::<Result<Vec<_>, _>>()
			.map_err(|e| ExportError::query("decoding COTS rows", e))
	}

	async fn analyses(&mut self) -> Result<Vec<Analysis>, ExportError> {
		let rows = sqlx::query(queries::SELECT_ANALYSES)
			.fetch_all(&mut self.conn)
			.await
			.map_err(|e| ExportError::query("fetching analyses", e))?;
		debug!("Fetched {} analysis rows", rows.len());

		rows.iter()
			.map(analysis_from_row)
			.collect::<Result<Vec<_>, _>>()
			.map_err(|e| ExportError::query("decoding analysis rows", e))
	}
}
