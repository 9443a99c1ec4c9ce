// src/error.rs

use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop an export run or one of its categories.
#[derive(Error, Debug)]
pub enum ExportError {
	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("Database connection failed: {0}")]
	Connection(String),

	#[error("Query failed while {context}: {message}")]
	Query { context: String, message: String },

	#[error("Stored JSON at {path:?} is unreadable: {message}")]
	StorageCorruption { path: PathBuf, message: String },

	#[error("Filesystem error at {path:?}: {source}")]
	Storage {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Record key {0:?} cannot be used as a file name")]
	InvalidKey(String),

	#[error("Failed to serialize record: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Failed to run {program}: {source}")]
	Publish {
		program: String,
		#[source]
		source: std::io::Error,
	},
}

impl ExportError {
	pub fn query<E: Display>(context: impl Into<String>, err: E) -> Self {
		Self::Query {
			context: context.into(),
			message: err.to_string(),
		}
	}

	pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Storage {
			path: path.into(),
			source,
		}
	}
}
