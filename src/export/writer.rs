// src/export/writer.rs

//! Create-or-compare-and-overwrite for one JSON file.

use crate::error::ExportError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Mode requested for new snapshot files; the process umask still applies.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	Created,
	Updated,
	Unchanged,
}

/// Pretty JSON with a four-space indent, fields in declaration order.
pub fn render<T: Serialize>(record: &T) -> Result<Vec<u8>, ExportError> {
	let mut out = Vec::new();
	let formatter = PrettyFormatter::with_indent(b"    ");
	let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
	record.serialize(&mut serializer)?;
	Ok(out)
}

/// Writes `record` to `path` unless the stored file already holds a structurally
/// equal JSON value. A missing file counts as no prior content. New content is
/// renamed into place from a sibling temporary file.
pub fn write_if_changed<T: Serialize>(path: &Path, record: &T) -> Result<WriteOutcome, ExportError> {
	let fresh = serde_json::to_value(record)?;

	let mut previous = None;
	let outcome = match fs::read(path) {
		Ok(bytes) => {
			let stored: Value = serde_json::from_slice(&bytes).map_err(|e| ExportError::StorageCorruption {
				path: path.to_path_buf(),
				message: e.to_string(),
			})?;
			if stored == fresh {
				return Ok(WriteOutcome::Unchanged);
			}
			previous = Some(fs::metadata(path).map_err(|e| ExportError::storage(path, e))?.permissions());
			WriteOutcome::Updated
		}
		Err(e) if e.kind() == ErrorKind::NotFound => WriteOutcome::Created,
		Err(e) => return Err(ExportError::storage(path, e)),
	};

	let dir = path
		.parent()
		.filter(|p| !p.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));
	fs::create_dir_all(dir).map_err(|e| ExportError::storage(dir, e))?;

	let mut tmp = temp_file_in(dir, previous).map_err(|e| ExportError::storage(dir, e))?;
	tmp.write_all(&render(record)?).map_err(|e| ExportError::storage(tmp.path(), e))?;
	tmp.as_file().sync_all().map_err(|e| ExportError::storage(tmp.path(), e))?;
	tmp.persist(path).map_err(|e| ExportError::storage(path, e.error))?;

	Ok(outcome)
}

/// Temporary sibling that will replace the target. It takes the target's
/// permissions when one exists, otherwise those of a plainly created file.
fn temp_file_in(dir: &Path, previous: Option<fs::Permissions>) -> std::io::Result<NamedTempFile> {
	let mut builder = tempfile::Builder::new();
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		builder.permissions(fs::Permissions::from_mode(NEW_FILE_MODE));
	}
	let tmp = builder.tempfile_in(dir)?;
	if let Some(permissions) = previous {
		fs::set_permissions(tmp.path(), permissions)?;
	}
	Ok(tmp)
}
