// src/models/cots.rs

use super::{Category, Record};
use serde::{Deserialize, Serialize};

/// A tracked commercial-off-the-shelf product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cots {
	pub id: i64,
	pub name: Option<String>,
	pub version: Option<String>,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
	pub obsolete_at: Option<String>,
	pub cpe: Option<String>,
	pub to_analyse: Option<bool>,
}

impl Record for Cots {
	const CATEGORY: Category = Category::Cots;

	fn file_key(&self) -> String {
		self.id.to_string()
	}
}
