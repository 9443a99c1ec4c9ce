//! SQL shared by the PostgreSQL and SQLite backends.
//!
//! Numeric columns are cast so both backends decode them as `BIGINT` and
//! `DOUBLE PRECISION` whatever the declared column width. Parameters use `$1`,
//! which SQLite binds by position as well.

use crate::models::cve::CvssVersion;

pub const SELECT_CVES: &str = "
	SELECT
		CAST(id AS BIGINT) AS id,
		name,
		cwe,
		modified,
		published,
		status,
		summary
	FROM cve
	ORDER BY id ASC";

const SELECT_CVSS3: &str = "
	SELECT
		CAST(cvss3_mark.cvss AS DOUBLE PRECISION) AS cvss,
		CAST(cvss3_mark.exploitability_score AS DOUBLE PRECISION) AS exploitability_score,
		CAST(cvss3_mark.impact_score AS DOUBLE PRECISION) AS impact_score,
		cvss3_vector.value AS vector
	FROM cvss3_mark
	LEFT JOIN cvss3_vector ON cvss3_mark.vector_id = cvss3_vector.id
	WHERE cvss3_mark.cve_id = $1";

const SELECT_CVSS2: &str = "
	SELECT
		CAST(cvss2_mark.cvss AS DOUBLE PRECISION) AS cvss,
		CAST(cvss2_mark.exploitability_score AS DOUBLE PRECISION) AS exploitability_score,
		CAST(cvss2_mark.impact_score AS DOUBLE PRECISION) AS impact_score,
		cvss2_vector.value AS vector
	FROM cvss2_mark
	LEFT JOIN cvss2_vector ON cvss2_mark.vector_id = cvss2_vector.id
	WHERE cvss2_mark.cve_id = $1";

pub const SELECT_COTS_LINKS: &str = "
	SELECT CAST(cots_id AS BIGINT) AS id
	FROM cots_cves
	WHERE cves_id = $1";

pub const SELECT_COTS: &str = "
	SELECT
		CAST(id AS BIGINT) AS id,
		name,
		version,
		created_at,
		updated_at,
		obsolete_at,
		cpe,
		to_analyse
	FROM cots
	ORDER BY id ASC";

pub const SELECT_ANALYSES: &str = "
	SELECT
		CAST(id AS BIGINT) AS id,
		created_at,
		updated_at,
		done,
		applicable,
		justification,
		validated,
		CAST(cots_id AS BIGINT) AS cots_id,
		CAST(cve_id AS BIGINT) AS cve_id,
		CAST(first_for_id AS BIGINT) AS first_for_id,
		CAST(last_updater_id AS BIGINT) AS last_updater_id,
		hidden
	FROM applicability_analysis
	ORDER BY id ASC";

pub fn select_cvss(version: CvssVersion) -> &'static str {
	match version {
		CvssVersion::V3 => SELECT_CVSS3,
		CvssVersion::V2 => SELECT_CVSS2,
	}
}
