// src/models/mod.rs

pub mod analysis;
pub mod cots;
pub mod cve;

use serde::Serialize;
use std::fmt;

/// The three exported record kinds, each owning one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	Cves,
	Cots,
	Analysis,
}

impl Category {
	pub const ALL: [Category; 3] = [Category::Cves, Category::Cots, Category::Analysis];

	pub fn dir_name(&self) -> &'static str {
		match self {
			Category::Cves => "cves",
			Category::Cots => "cots",
			Category::Analysis => "analysis",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Category::Cves => write!(f, "CVEs"),
			Category::Cots => write!(f, "COTS"),
			Category::Analysis => write!(f, "analyses"),
		}
	}
}

/// A row shaped for export: its category decides the directory, its key the file name.
pub trait Record: Serialize {
	const CATEGORY: Category;

	fn file_key(&self) -> String;
}
