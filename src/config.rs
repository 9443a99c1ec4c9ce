// src/config.rs

use crate::error::ExportError;
use clap::Parser;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const PASSWORD_ENV: &str = "VULNDB_EXPORT_DB_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "vulnerability-db-export")]
#[command(version, about = "Export the vulnerability database into git-tracked JSON files", long_about = None)]
pub struct Args {
	/// YAML file holding the database connection parameters
	#[arg(long, env = "VULNDB_EXPORT_CONFIG", default_value = "./conf.yaml")]
	pub config: PathBuf,

	/// Root directory for cves/, cots/ and analysis/ (overrides export.outputDir)
	#[arg(long)]
	pub output_dir: Option<PathBuf>,

	/// Write the JSON files but skip git add/commit/push
	#[arg(long)]
	pub no_publish: bool,

	/// Log per-record progress (ignored when RUST_LOG is set)
	#[arg(short, long)]
	pub verbose: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub db: DbConfig,
	#[serde(default)]
	pub export: ExportConfig,
	#[serde(default)]
	pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
	pub pg: Option<PgConfig>,
	pub sqlite: Option<SqliteConfig>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PgConfig {
	pub db_name: String,
	pub user: String,
	#[serde(default)]
	pub password: String,
	pub hostname: String,
	#[serde(default = "default_pg_port")]
	pub port: u16,
}

impl fmt::Debug for PgConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PgConfig")
			.field("db_name", &self.db_name)
			.field("user", &self.user)
			.field("password", &"***")
			.field("hostname", &self.hostname)
			.field("port", &self.port)
			.finish()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
	pub path: PathBuf,
}

/// The database backend selected by the `db` section.
#[derive(Debug, Clone, Copy)]
pub enum Backend<'a> {
	Postgres(&'a PgConfig),
	Sqlite(&'a SqliteConfig),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
	#[serde(default = "default_output_dir")]
	pub output_dir: PathBuf,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			output_dir: default_output_dir(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,
	#[serde(default = "default_commit_message")]
	pub commit_message: String,
	#[serde(default = "default_true")]
	pub push: bool,
	#[serde(default = "default_git_binary")]
	pub git_binary: String,
}

impl Default for PublishConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			commit_message: default_commit_message(),
			push: true,
			git_binary: default_git_binary(),
		}
	}
}

fn default_pg_port() -> u16 {
	5432
}

fn default_output_dir() -> PathBuf {
	PathBuf::from(".")
}

fn default_true() -> bool {
	true
}

fn default_commit_message() -> String {
	"automatic run".to_string()
}

fn default_git_binary() -> String {
	"git".to_string()
}

impl Config {
	pub fn load(path: &Path) -> Result<Self, ExportError> {
		let raw = std::fs::read_to_string(path).map_err(|e| {
			ExportError::Configuration(format!("cannot read {}: {}", path.display(), e))
		})?;
		Self::from_yaml(&raw)
	}

	pub fn from_yaml(raw: &str) -> Result<Self, ExportError> {
		let config: Config = serde_yaml::from_str(raw)
			.map_err(|e| ExportError::Configuration(format!("malformed YAML: {}", e)))?;
		config.backend()?;
		Ok(config)
	}

	pub fn backend(&self) -> Result<Backend<'_>, ExportError> {
		match (&self.db.pg, &self.db.sqlite) {
			(Some(pg), None) => Ok(Backend::Postgres(pg)),
			(None, Some(sqlite)) => Ok(Backend::Sqlite(sqlite)),
			(Some(_), Some(_)) => Err(ExportError::Configuration(
				"db.pg and db.sqlite are mutually exclusive".to_string(),
			)),
			(None, None) => Err(ExportError::Configuration(
				"one of db.pg or db.sqlite is required".to_string(),
			)),
		}
	}

	/// Replaces the PostgreSQL password when an override is given.
	pub fn with_password_override(mut self, password: Option<String>) -> Self {
		if let (Some(pg), Some(password)) = (self.db.pg.as_mut(), password) {
			pg.password = password;
		}
		self
	}

	/// Applies CLI flags on top of the file values.
	pub fn with_args(mut self, args: &Args) -> Self {
		if let Some(dir) = &args.output_dir {
			self.export.output_dir = dir.clone();
		}
		if args.no_publish {
			self.publish.enabled = false;
		}
		self
	}
}
