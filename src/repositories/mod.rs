// src/repositories/mod.rs

pub mod pg_repo;
pub mod sqlite_repo;

use crate::config::Backend;
use crate::error::ExportError;
use crate::models::analysis::Analysis;
use crate::models::cots::Cots;
use crate::models::cve::{Cve, CvssScore, CvssVersion};
use log::{info, warn};
use pg_repo::PgRepository;
use sqlite_repo::SqliteRepository;

/// Read-only access to the tables the exporter projects onto disk.
///
/// Every listing is ordered by ascending identifier. CVE rows come back without
/// their scores and links; those are separate per-row lookups.
pub trait RecordSource {
	async fn cves(&mut self) -> Result<Vec<Cve>, ExportError>;

	/// At most one score per version; `None` when the CVE has no mark.
	async fn cvss(&mut self, version: CvssVersion, cve_id: i64) -> Result<Option<CvssScore>, ExportError>;

	/// Identifiers of the COTS linked to a CVE, in database order.
	async fn cots_links(&mut self, cve_id: i64) -> Result<Vec<i64>, ExportError>;

	async fn cots(&mut self) -> Result<Vec<Cots>, ExportError>;

	async fn analyses(&mut self) -> Result<Vec<Analysis>, ExportError>;
}

/// The database session held for a whole run.
pub enum Session {
	Postgres(PgRepository),
	Sqlite(SqliteRepository),
}

impl Session {
	pub async fn open(backend: Backend<'_>) -> Result<Self, ExportError> {
		match backend {
			Backend::Postgres(pg) => Ok(Session::Postgres(PgRepository::connect(pg).await?)),
			Backend::Sqlite(sqlite) => Ok(Session::Sqlite(SqliteRepository::open(&sqlite.path)?)),
		}
	}

	pub async fn close(self) {
		match self {
			Session::Postgres(repo) => match repo.close().await {
				Ok(()) => info!("Database session closed"),
				Err(e) => warn!("{}", e),
			},
			Session::Sqlite(_) => info!("Database session closed"),
		}
	}
}

impl RecordSource for Session {
	async fn cves(&mut self) -> Result<Vec<Cve>, ExportError> {
		match self {
			Session::Postgres(repo) => repo.cves().await,
			Session::Sqlite(repo) => repo.cves().await,
		}
	}

	async fn cvss(&mut self, version: CvssVersion, cve_id: i64) -> Result<Option<CvssScore>, ExportError> {
		match self {
			Session::Postgres(repo) => repo.cvss(version, cve_id).await,
			Session::Sqlite(repo) => repo.cvss(version, cve_id).await,
		}
	}

	async fn cots_links(&mut self, cve_id: i64) -> Result<Vec<i64>, ExportError> {
		match self {
			Session::Postgres(repo) => repo.cots_links(cve_id).await,
			Session::Sqlite(repo) => repo.cots_links(cve_id).await,
		}
	}

	async fn cots(&mut self) -> Result<Vec<Cots>, ExportError> {
		match self {
			Session::Postgres(repo) => repo.cots().await,
			Session::Sqlite(repo) => repo.cots().await,
		}
	}

	async fn analyses(&mut self) -> Result<Vec<Analysis>, ExportError> {
		match self {
			Session::Postgres(repo) => repo.analyses().await,
			Session::Sqlite(repo) => repo.analyses().await,
		}
	}
}
