// src/models/analysis.rs

use super::{Category, Record};
use serde::{Deserialize, Serialize};

/// Whether a given CVE applies to a given COTS product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
	pub id: i64,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
	pub done: Option<bool>,
	pub applicable: Option<bool>,
	pub justification: Option<String>,
	pub validated: Option<bool>,
	pub cots_id: Option<i64>,
	pub cve_id: Option<i64>,
	pub first_for_id: Option<i64>,
	pub last_updater_id: Option<i64>,
	pub hidden: Option<bool>,
}

impl Record for Analysis {
	const CATEGORY: Category = Category::Analysis;

	fn file_key(&self) -> String {
		self.id.to_string()
	}
}
