// src/models/cve.rs

use super::{Category, Record};
use serde::{Deserialize, Serialize};

/// Which severity-score table pair a lookup goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvssVersion {
	V3,
	V2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvssScore {
	pub cvss: Option<f64>,
	pub exploitability_score: Option<f64>,
	pub impact_score: Option<f64>,
	pub vector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cve {
	pub id: i64,
	pub name: String,
	pub cwe: Option<String>,
	pub modified: Option<String>,
	pub published: Option<String>,
	pub status: Option<String>,
	pub summary: Option<String>,
	pub cvss3: Option<CvssScore>,
	pub cvss2: Option<CvssScore>,
	pub cpes: Vec<i64>,
}

impl Cve {
	/// Attaches the joined score and product-link data. Links are kept ascending
	/// whatever order the database returned them in.
	pub fn with_links(
		mut self,
		cvss3: Option<CvssScore>,
		cvss2: Option<CvssScore>,
		mut cpes: Vec<i64>,
	) -> Self {
		cpes.sort_unstable();
		self.cvss3 = cvss3;
		self.cvss2 = cvss2;
		self.cpes = cpes;
		self
	}
}

impl Record for Cve {
	const CATEGORY: Category = Category::Cves;

	fn file_key(&self) -> String {
		self.name.clone()
	}
}
