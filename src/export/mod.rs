// src/export/mod.rs

pub mod writer;

use crate::error::ExportError;
use crate::models::cve::CvssVersion;
use crate::models::{Category, Record};
use crate::repositories::RecordSource;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use writer::WriteOutcome;

/// What one category export did on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
	pub category: Category,
	pub created: usize,
	pub updated: usize,
	pub unchanged: usize,
	pub elapsed: Duration,
}

impl CategoryReport {
	fn new(category: Category) -> Self {
		Self {
			category,
			created: 0,
			updated: 0,
			unchanged: 0,
			elapsed: Duration::ZERO,
		}
	}

	fn record(&mut self, outcome: WriteOutcome) {
		match outcome {
			WriteOutcome::Created => self.created += 1,
			WriteOutcome::Updated => self.updated += 1,
			WriteOutcome::Unchanged => self.unchanged += 1,
		}
	}

	pub fn written(&self) -> usize {
		self.created + self.updated
	}
}

/// Outcome of exporting every category; failures do not stop later categories.
#[derive(Debug, Default)]
pub struct RunSummary {
	pub reports: Vec<CategoryReport>,
	pub failures: Vec<(Category, ExportError)>,
}

impl RunSummary {
	pub fn is_complete(&self) -> bool {
		self.failures.is_empty()
	}

	fn push(&mut self, category: Category, result: Result<CategoryReport, ExportError>) {
		match result {
			Ok(report) => self.reports.push(report),
			Err(e) => {
				error!("Export of {} aborted: {}", category, e);
				self.failures.push((category, e));
			}
		}
	}
}

/// Rejects keys that would not land directly inside the category directory.
fn validate_key(key: &str) -> Result<(), ExportError> {
	let unusable = key.is_empty()
		|| key == "."
		|| key == ".."
		|| key.contains(['/', '\\', '\0']);
	if unusable {
		return Err(ExportError::InvalidKey(key.to_string()));
	}
	Ok(())
}

pub struct Exporter {
	output_dir: PathBuf,
}

impl Exporter {
	pub fn new(output_dir: impl Into<PathBuf>) -> Self {
		Self {
			output_dir: output_dir.into(),
		}
	}

	pub fn output_dir(&self) -> &Path {
		&self.output_dir
	}

	pub fn record_path<R: Record>(&self, record: &R) -> Result<PathBuf, ExportError> {
		let key = record.file_key();
		validate_key(&key)?;
		Ok(self
			.output_dir
			.join(R::CATEGORY.dir_name())
			.join(format!("{}.json", key)))
	}

	fn write<R: Record>(&self, record: &R, report: &mut CategoryReport) -> Result<(), ExportError> {
		let path = self.record_path(record)?;
		let outcome = writer::write_if_changed(&path, record)?;
		if outcome != WriteOutcome::Unchanged {
			debug!("{:?} {:?}", outcome, path);
		}
		report.record(outcome);
		Ok(())
	}

	fn finish(&self, mut report: CategoryReport, started: Instant) -> CategoryReport {
		report.elapsed = started.elapsed();
		info!(
			"Finished exporting {} in {:.2}s: {} created, {} updated, {} unchanged",
			report.category,
			report.elapsed.as_secs_f64(),
			report.created,
			report.updated,
			report.unchanged
		);
		report
	}

	pub async fn export_cves<S: RecordSource>(&self, source: &mut S) -> Result<CategoryReport, ExportError> {
		info!("Fetching CVEs from database");
		let started = Instant::now();
		let mut report = CategoryReport::new(Category::Cves);

		for cve in source.cves().await? {
			let cvss3 = source.cvss(CvssVersion::V3, cve.id).await?;
			let cvss2 = source.cvss(CvssVersion::V2, cve.id).await?;
			let cpes = source.cots_links(cve.id).await?;
			let cve = cve.with_links(cvss3, cvss2, cpes);
			self.write(&cve, &mut report)?;
		}

		Ok(self.finish(report, started))
	}

	pub async fn export_cots<S: RecordSource>(&self, source: &mut S) -> Result<CategoryReport, ExportError> {
		info!("Fetching COTS from database");
		let started = Instant::now();
		let mut report = CategoryReport::new(Category::Cots);

		for cots in source.cots().await? {
			self.write(&cots, &mut report)?;
		}

		Ok(self.finish(report, started))
	}

	pub async fn export_analyses<S: RecordSource>(&self, source: &mut S) -> Result<CategoryReport, ExportError> {
		info!("Fetching analyses from database");
		let started = Instant::now();
		let mut report = CategoryReport::new(Category::Analysis);

		for analysis in source.analyses().await? {
			self.write(&analysis, &mut report)?;
		}

		Ok(self.finish(report, started))
	}

	/// Exports the three categories in order. A failing category is recorded and
	/// the next one still runs.
	pub async fn export_all<S: RecordSource>(&self, source: &mut S) -> RunSummary {
		let mut summary = RunSummary::default();
		summary.push(Category::Cves, self.export_cves(source).await);
		summary.push(Category::Cots, self.export_cots(source).await);
		summary.push(Category::Analysis, self.export_analyses(source).await);
		summary
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::db::schema;
	use crate::repositories::sqlite_repo::SqliteRepository;
	use anyhow::Result;
	use rusqlite::Connection;
	use serde_json::{json, Value};
	use std::fs;
	use std::time::SystemTime;
	use tempfile::{tempdir, TempDir};

	struct Fixture {
		dir: TempDir,
		db_path: PathBuf,
	}

	impl Fixture {
		fn new() -> Result<Self> {
			let dir = tempdir()?;
			let db_path = dir.path().join("mirror.db");
			let conn = Connection::open(&db_path)?;
			schema::create_tables(&conn)?;
			conn.execute_batch(
				"
				INSERT INTO cve (id, name, cwe, modified, published, status, summary) VALUES
					(1, 'CVE-2024-0001', 'CWE-787', '2024-02-01 08:00:00', '2024-01-15 12:00:00', 'ANALYZED', 'Heap overflow'),
					(2, 'CVE-2024-0002', NULL, '2024-02-02 08:00:00', '2024-01-16 12:00:00', 'RECEIVED', 'Path traversal');
				INSERT INTO cvss3_vector (id, value) VALUES (1, 'AV:N/AC:L');
				INSERT INTO cvss3_mark (cve_id, cvss, exploitability_score, impact_score, vector_id) VALUES
					(1, 7.5, 3.9, 3.6, 1);
				INSERT INTO cots (id, name, version, created_at, updated_at, obsolete_at, cpe, to_analyse) VALUES
					(2, 'libxml2', '2.9.14', '2023-06-01 00:00:00', '2023-06-02 00:00:00', NULL, 'cpe:2.3:a:xmlsoft:libxml2:2.9.14', 0),
					(5, 'openssl', '3.0.2', '2023-06-01 00:00:00', '2023-06-03 00:00:00', '2024-01-01 00:00:00', 'cpe:2.3:a:openssl:openssl:3.0.2', 1);
				INSERT INTO cots_cves (cots_id, cves_id) VALUES (5, 1), (2, 1);
				INSERT INTO applicability_analysis
					(id, created_at, updated_at, done, applicable, justification, validated, cots_id, cve_id, first_for_id, last_updater_id, hidden)
				VALUES
					(9, '2024-03-01 10:00:00', '2024-03-02 10:00:00', 1, 0, 'Feature disabled', 1, 5, 1, NULL, 42, 0);
				",
			)?;
			Ok(Self { dir, db_path })
		}

		fn out(&self) -> PathBuf {
			self.dir.path().join("snapshot")
		}

		fn exporter(&self) -> Exporter {
			Exporter::new(self.out())
		}

		fn repo(&self) -> Result<SqliteRepository> {
			Ok(SqliteRepository::open(&self.db_path)?)
		}

		fn execute(&self, sql: &str) -> Result<()> {
			Connection::open(&self.db_path)?.execute_batch(sql)?;
			Ok(())
		}

		fn read(&self, relative: &str) -> Result<Value> {
			Ok(serde_json::from_slice(&fs::read(self.out().join(relative))?)?)
		}

		fn modified(&self, relative: &str) -> Result<SystemTime> {
			Ok(fs::metadata(self.out().join(relative))?.modified()?)
		}
	}

	const FILES: [&str; 5] = [
		"cves/CVE-2024-0001.json",
		"cves/CVE-2024-0002.json",
		"cots/2.json",
		"cots/5.json",
		"analysis/9.json",
	];

	#[tokio::test]
	async fn test_cve_scenario_file_contents() -> Result<()> {
		let fixture = Fixture::new()?;
		let report = fixture.exporter().export_cves(&mut fixture.repo()?).await?;
		assert_eq!(report.created, 2);

		let cve = fixture.read("cves/CVE-2024-0001.json")?;
		assert_eq!(
			cve,
			json!({
				"id": 1,
				"name": "CVE-2024-0001",
				"cwe": "CWE-787",
				"modified": "2024-02-01T08:00:00",
				"published": "2024-01-15T12:00:00",
				"status": "ANALYZED",
				"summary": "Heap overflow",
				"cvss3": {
					"cvss": 7.5,
					"exploitability_score": 3.9,
					"impact_score": 3.6,
					"vector": "AV:N/AC:L"
				},
				"cvss2": null,
				"cpes": [2, 5]
			})
		);

		// Joined fields are present even with nothing to join.
		let bare = fixture.read("cves/CVE-2024-0002.json")?;
		assert!(bare["cvss3"].is_null());
		assert!(bare["cvss2"].is_null());
		assert_eq!(bare["cpes"], json!([]));
		Ok(())
	}

	#[tokio::test]
	async fn test_cots_and_analysis_fields() -> Result<()> {
		let fixture = Fixture::new()?;
		let exporter = fixture.exporter();
		let mut repo = fixture.repo()?;
		exporter.export_cots(&mut repo).await?;
		exporter.export_analyses(&mut repo).await?;

		assert_eq!(
			fixture.read("cots/5.json")?,
			json!({
				"id": 5,
				"name": "openssl",
				"version": "3.0.2",
				"created_at": "2023-06-01T00:00:00",
				"updated_at": "2023-06-03T00:00:00",
				"obsolete_at": "2024-01-01T00:00:00",
				"cpe": "cpe:2.3:a:openssl:openssl:3.0.2",
				"to_analyse": true
			})
		);
		assert_eq!(
			fixture.read("analysis/9.json")?,
			json!({
				"id": 9,
				"created_at": "2024-03-01T10:00:00",
				"updated_at": "2024-03-02T10:00:00",
				"done": true,
				"applicable": false,
				"justification": "Feature disabled",
				"validated": true,
				"cots_id": 5,
				"cve_id": 1,
				"first_for_id": null,
				"last_updater_id": 42,
				"hidden": false
			})
		);
		Ok(())
	}

	#[tokio::test]
	async fn test_second_run_touches_nothing() -> Result<()> {
		let fixture = Fixture::new()?;
		let exporter = fixture.exporter();

		let first = exporter.export_all(&mut fixture.repo()?).await;
		assert!(first.is_complete());
		let before: Vec<(Vec<u8>, SystemTime)> = FILES
			.iter()
			.map(|f| -> Result<(Vec<u8>, SystemTime)> {
				Ok((fs::read(fixture.out().join(f))?, fixture.modified(f)?))
			})
			.collect::<Result<_>>()?;

		let second = exporter.export_all(&mut fixture.repo()?).await;
		assert!(second.is_complete());
		assert!(second.reports.iter().all(|r| r.written() == 0));
		assert_eq!(second.reports.iter().map(|r| r.unchanged).sum::<usize>(), FILES.len());

		for (file, (content, mtime)) in FILES.iter().zip(before) {
			assert_eq!(fs::read(fixture.out().join(file))?, content);
			assert_eq!(fixture.modified(file)?, mtime);
		}
		Ok(())
	}

	#[tokio::test]
	async fn test_only_changed_record_is_rewritten() -> Result<()> {
		let fixture = Fixture::new()?;
		let exporter = fixture.exporter();
		exporter.export_all(&mut fixture.repo()?).await;
		let sibling = fixture.modified("cves/CVE-2024-0002.json")?;

		fixture.execute("UPDATE cve SET summary = 'Heap overflow in parser' WHERE id = 1")?;
		let summary = exporter.export_all(&mut fixture.repo()?).await;

		let cves = &summary.reports[0];
		assert_eq!(cves.category, Category::Cves);
		assert_eq!((cves.created, cves.updated, cves.unchanged), (0, 1, 1));
		assert_eq!(fixture.read("cves/CVE-2024-0001.json")?["summary"], "Heap overflow in parser");
		assert_eq!(fixture.modified("cves/CVE-2024-0002.json")?, sibling);
		assert!(summary.reports[1..].iter().all(|r| r.written() == 0));
		Ok(())
	}

	#[tokio::test]
	async fn test_corrupt_file_aborts_only_its_category() -> Result<()> {
		let fixture = Fixture::new()?;
		let cves_dir = fixture.out().join("cves");
		fs::create_dir_all(&cves_dir)?;
		fs::write(cves_dir.join("CVE-2024-0001.json"), "not json")?;

		let summary = fixture.exporter().export_all(&mut fixture.repo()?).await;
		assert!(!summary.is_complete());
		assert_eq!(summary.failures.len(), 1);
		assert!(matches!(
			summary.failures[0],
			(Category::Cves, ExportError::StorageCorruption { .. })
		));
		// Later categories still ran.
		assert_eq!(summary.reports.len(), 2);
		assert!(fixture.out().join("cots/2.json").is_file());
		assert!(fixture.out().join("analysis/9.json").is_file());
		Ok(())
	}

	#[tokio::test]
	async fn test_unsafe_names_are_rejected() -> Result<()> {
		let fixture = Fixture::new()?;
		fixture.execute("INSERT INTO cve (id, name) VALUES (3, '../escape')")?;

		let result = fixture.exporter().export_cves(&mut fixture.repo()?).await;
		assert!(matches!(result, Err(ExportError::InvalidKey(ref key)) if key == "../escape"));
		assert!(!fixture.out().join("escape.json").exists());
		Ok(())
	}

	#[test]
	fn test_validate_key() {
		assert!(validate_key("CVE-2021-44228").is_ok());
		assert!(validate_key("17").is_ok());
		assert!(validate_key("CVE-2024..1").is_ok());
		for bad in ["", ".", "..", "a/b", "a\\b", "a\0b"] {
			assert!(validate_key(bad).is_err(), "{:?} should be rejected", bad);
		}
	}
}
