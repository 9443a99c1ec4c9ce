use rusqlite::Connection;
use anyhow::{Result, Context};

/// Creates the exported tables in a SQLite mirror. The production database is
/// only ever read; this layout is what the SQLite backend expects to find.
/// Links are plain integer columns: a mirror may hold marks whose vector row or
/// link rows whose product was never copied, and those must still load.
pub fn create_tables(conn: &Connection) -> Result<()> {
	conn.execute_batch(
		"
		CREATE TABLE IF NOT EXISTS cve (
			id INTEGER PRIMARY KEY,
			name TEXT UNIQUE NOT NULL,
			cwe TEXT,
			modified TIMESTAMP,
			published TIMESTAMP,
			status TEXT,
			summary TEXT
		);

		CREATE TABLE IF NOT EXISTS cvss3_vector (
			id INTEGER PRIMARY KEY,
			value TEXT NOT NULL
		);

		CREATE TABLE IF NOT EXISTS cvss3_mark (
			id INTEGER PRIMARY KEY,
			cve_id INTEGER NOT NULL,
			cvss REAL,
			exploitability_score REAL,
			impact_score REAL,
			vector_id INTEGER
		);

		CREATE TABLE IF NOT EXISTS cvss2_vector (
			id INTEGER PRIMARY KEY,
			value TEXT NOT NULL
		);

		CREATE TABLE IF NOT EXISTS cvss2_mark (
			id INTEGER PRIMARY KEY,
			cve_id INTEGER NOT NULL,
			cvss REAL,
			exploitability_score REAL,
			impact_score REAL,
			vector_id INTEGER
		);

		CREATE TABLE IF NOT EXISTS cots (
			id INTEGER PRIMARY KEY,
			name TEXT,
			version TEXT,
			created_at TIMESTAMP,
			updated_at TIMESTAMP,
			obsolete_at TIMESTAMP,
			cpe TEXT,
			to_analyse BOOLEAN
		);

		CREATE TABLE IF NOT EXISTS cots_cves (
			cots_id INTEGER NOT NULL,
			cves_id INTEGER NOT NULL
		);

		CREATE TABLE IF NOT EXISTS applicability_analysis (
			id INTEGER PRIMARY KEY,
			created_at TIMESTAMP,
			updated_at TIMESTAMP,
			done BOOLEAN,
			applicable BOOLEAN,
			justification TEXT,
			validated BOOLEAN,
			cots_id INTEGER,
			cve_id INTEGER,
			first_for_id INTEGER,
			last_updater_id INTEGER,
			hidden BOOLEAN
		);

		CREATE INDEX IF NOT EXISTS idx_cots_cves_cve ON cots_cves(cves_id);
		"
	).context("Failed to create tables")?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_dangling_links_are_accepted() -> Result<()> {
		let conn = Connection::open_in_memory()?;
		create_tables(&conn)?;
		conn.execute_batch(
			"INSERT INTO cvss2_mark (cve_id, cvss, vector_id) VALUES (20, 5.0, 99);
			 INSERT INTO cots_cves (cots_id, cves_id) VALUES (7, 20);",
		)?;

		let links: i64 = conn.query_row("SELECT COUNT(*) FROM cots_cves", [], |row| row.get(0))?;
		assert_eq!(links, 1);
		Ok(())
	}
}
