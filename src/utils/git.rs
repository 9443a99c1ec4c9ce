// src/utils/git.rs

use crate::config::PublishConfig;
use crate::error::ExportError;
use crate::models::Category;
use log::{info, warn};
use std::path::PathBuf;
use tokio::process::Command;

/// Result of one git invocation. A failed step does not stop the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
	pub step: &'static str,
	pub success: bool,
	pub code: Option<i32>,
}

#[derive(Debug, Default, Clone)]
pub struct PublishReport {
	pub steps: Vec<StepOutcome>,
}

impl PublishReport {
	pub fn succeeded(&self) -> bool {
		self.steps.iter().all(|s| s.success)
	}
}

/// Stages the exported directories, commits and pushes from the snapshot root.
pub struct GitPublisher {
	program: String,
	workdir: PathBuf,
	commit_message: String,
	push: bool,
}

impl GitPublisher {
	pub fn new(config: &PublishConfig, workdir: impl Into<PathBuf>) -> Self {
		Self {
			program: config.git_binary.clone(),
			workdir: workdir.into(),
			commit_message: config.commit_message.clone(),
			push: config.push,
		}
	}

	async fn run_step(&self, step: &'static str, args: &[&str]) -> Result<StepOutcome, ExportError> {
		let output = Command::new(&self.program)
			.args(args)
			.current_dir(&self.workdir)
			.output()
			.await
			.map_err(|e| ExportError::Publish {
				program: self.program.clone(),
				source: e,
			})?;

		let outcome = StepOutcome {
			step,
			success: output.status.success(),
			code: output.status.code(),
		};
		if outcome.success {
			info!("git {} succeeded", step);
		} else {
			warn!(
				"git {} exited with {:?}: {}",
				step,
				outcome.code,
				String::from_utf8_lossy(&output.stderr).trim()
			);
		}
		Ok(outcome)
	}

	pub async fn publish(&self) -> Result<PublishReport, ExportError> {
		info!("Committing and pushing snapshot from {:?}", self.workdir);
		let mut report = PublishReport::default();

		// Pathspecs that match nothing make `git add` reject the whole command.
		let dirs: Vec<&str> = Category::ALL
			.iter()
			.map(Category::dir_name)
			.filter(|dir| self.workdir.join(dir).is_dir())
			.collect();
		if dirs.is_empty() {
			warn!("No exported directories under {:?}, nothing to stage", self.workdir);
		} else {
			let mut args = vec!["add", "--"];
			args.extend(dirs);
			report.steps.push(self.run_step("add", &args).await?);
		}

		report
			.steps
			.push(self.run_step("commit", &["commit", "-m", &self.commit_message]).await?);

		if self.push {
			report.steps.push(self.run_step("push", &["push"]).await?);
		}

		Ok(report)
	}
}
