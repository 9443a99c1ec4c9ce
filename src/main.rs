// src/main.rs

mod config;
mod db;
mod error;
mod export;
mod models;
mod repositories;
mod utils;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Args, Config, PublishConfig, PASSWORD_ENV};
use export::{Exporter, RunSummary};
use log::{info, warn};
use repositories::Session;
use utils::git::GitPublisher;

/// Decides whether the snapshot gets committed. A run with a failed category
/// is an error so that nothing partial is published and the process exits
/// non-zero.
fn should_publish(summary: &RunSummary, publish: &PublishConfig) -> Result<bool> {
	if !summary.is_complete() {
		let failed: Vec<String> = summary.failures.iter().map(|(c, _)| c.to_string()).collect();
		bail!("Export of {} failed, snapshot not published", failed.join(", "));
	}
	Ok(publish.enabled)
}

struct App {
	config: Config,
}

impl App {
	fn new(args: Args) -> Result<Self> {
		utils::logger::init(args.verbose);
		info!("Starting vulnerability database export");

		let config = Config::load(&args.config)
			.with_context(|| format!("Failed to load configuration from {:?}", args.config))?
			.with_password_override(std::env::var(PASSWORD_ENV).ok())
			.with_args(&args);

		Ok(App { config })
	}

	async fn export(&self) -> Result<RunSummary> {
		let backend = self.config.backend()?;
		let mut session = Session::open(backend)
			.await
			.context("Failed to open database session")?;

		let exporter = Exporter::new(&self.config.export.output_dir);
		info!("Writing snapshot under {:?}", exporter.output_dir());
		let summary = exporter.export_all(&mut session).await;

		session.close().await;
		Ok(summary)
	}

	async fn publish(&self) -> Result<()> {
		let publisher = GitPublisher::new(&self.config.publish, &self.config.export.output_dir);
		let report = publisher
			.publish()
			.await
			.context("Failed to publish snapshot")?;

		if !report.succeeded() {
			warn!("Snapshot written but not every git step succeeded: {:?}", report.steps);
		}
		Ok(())
	}

	async fn run(&self) -> Result<()> {
		let summary = self.export().await?;

		let written: usize = summary.reports.iter().map(|r| r.written()).sum();
		info!("Conversion done, {} files created or updated", written);

		if should_publish(&summary, &self.config.publish)? {
			self.publish().await?;
		} else {
			info!("Publishing disabled, leaving changes uncommitted");
		}
		Ok(())
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let app = App::new(Args::parse())?;
	app.run().await
}
