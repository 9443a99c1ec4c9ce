// src/utils/logger.rs

use env_logger::{Builder, Env};

/// Filter applied when `RUST_LOG` is unset. Verbose runs show per-record
/// debug lines from the exporter only; database driver chatter stays at `info`.
pub fn default_filter(verbose: bool) -> String {
	if verbose {
		format!("info,{}=debug", env!("CARGO_CRATE_NAME"))
	} else {
		"info".to_string()
	}
}

pub fn init(verbose: bool) {
	Builder::from_env(Env::default().default_filter_or(default_filter(verbose)))
		.format_timestamp_millis()
		.format_module_path(true)
		.format_target(false)
		.init();
}
