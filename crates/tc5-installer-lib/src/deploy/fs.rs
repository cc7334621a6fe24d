//! Filesystem primitives used by the installation.
//!
//! Copies are plain content-and-structure copies: permissions, timestamps and
//! extended attributes are not carried over and symbolic links are followed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{InstallError, Result};
use crate::layout::Preservable;

/// Converts an error of the directory walk to an [`InstallError`].
fn walk_error(root: &Path, err: walkdir::Error) -> InstallError {
	let path = err.path().unwrap_or(root).to_path_buf();

	InstallError::Io {
		action: "read directory",
		path,
		source: err.into(),
	}
}

/// Resolves `path` to an absolute path without symbolic links.
///
/// Components which do not exist yet are appended to the deepest existing
/// ancestor as they are.
fn resolve(path: &Path) -> Result<PathBuf> {
	let mut missing = Vec::new();
	let mut existing = path;

	loop {
		match fs::canonicalize(existing) {
			Ok(mut resolved) => {
				resolved.extend(missing.iter().rev());
				return Ok(resolved);
			}
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
					return Err(InstallError::io("resolve path", path)(err));
				};

				missing.push(name);
				existing = if parent.as_os_str().is_empty() {
					Path::new(".")
				} else {
					parent
				};
			}
			Err(err) => return Err(InstallError::io("resolve path", path)(err)),
		}
	}
}

/// Ensures that copying `source` into `destination` does not write into
/// `source` itself.
///
/// # Errors
///
/// Errors with [`InstallError::OverlappingDirectories`] if both are the same
/// directory or `destination` lies below `source`.
fn ensure_disjoint(source: &Path, destination: &Path) -> Result<()> {
	let same = destination.exists()
		&& same_file::is_same_file(source, destination)
			.map_err(InstallError::io("compare directory", destination))?;

	if same || resolve(destination)?.starts_with(resolve(source)?) {
		return Err(InstallError::overlapping(source, destination));
	}

	Ok(())
}

/// Recursively removes the directory at `path`.
///
/// Removing a directory which does not exist succeeds.
pub fn remove_directory(path: &Path) -> Result<()> {
	match fs::remove_dir_all(path) {
		Ok(()) => {
			log::debug!("Removed directory {}", path.display());
			Ok(())
		}
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(err) => Err(InstallError::io("remove directory", path)(err)),
	}
}

/// Recursively copies the content of `source` into `destination`.
///
/// `destination` and any missing subdirectories are created. Existing files
/// are overwritten, other existing content of `destination` is left as is.
///
/// # Errors
///
/// Errors with [`InstallError::SourceNotFound`] if `source` is not a directory
/// and with [`InstallError::OverlappingDirectories`] if `destination` is
/// `source` or lies inside of it. Nothing is written in both cases.
pub fn copy_directory(source: &Path, destination: &Path) -> Result<()> {
	if !source.is_dir() {
		return Err(InstallError::source_not_found(source));
	}

	ensure_disjoint(source, destination)?;

	fs::create_dir_all(destination).map_err(InstallError::io("create directory", destination))?;

	for dent in WalkDir::new(source)
		.min_depth(1)
		.follow_links(true)
		.sort_by_file_name()
	{
		let dent = dent.map_err(|err| walk_error(source, err))?;

		// All entries yielded by the walk are below `source`.
		let Ok(relative) = dent.path().strip_prefix(source) else {
			continue;
		};
		let target = destination.join(relative);

		if dent.file_type().is_dir() {
			fs::create_dir_all(&target).map_err(InstallError::io("create directory", &target))?;
		} else {
			log::trace!("Copying {} to {}", dent.path().display(), target.display());
			fs::copy(dent.path(), &target).map_err(InstallError::io("copy file", dent.path()))?;
		}
	}

	Ok(())
}

/// Copies `source` into `destination` like [`copy_directory`], reporting the
/// name of every top level file and directory to `progress` before it is
/// copied.
///
/// Files are copied first, then directories. Fails like [`copy_directory`]
/// before anything is written.
pub fn copy_directory_reporting<F>(source: &Path, destination: &Path, mut progress: F) -> Result<()>
where
	F: FnMut(&str),
{
	if !source.is_dir() {
		return Err(InstallError::source_not_found(source));
	}

	ensure_disjoint(source, destination)?;

	fs::create_dir_all(destination).map_err(InstallError::io("create directory", destination))?;

	let mut files = Vec::new();
	let mut directories = Vec::new();

	for dent in WalkDir::new(source)
		.min_depth(1)
		.max_depth(1)
		.follow_links(true)
		.sort_by_file_name()
	{
		let dent = dent.map_err(|err| walk_error(source, err))?;

		if dent.file_type().is_dir() {
			directories.push(dent);
		} else {
			files.push(dent);
		}
	}

	for file in files {
		let name = file.file_name().to_string_lossy();
		progress(&format!("Copying file: {}", name));

		let target = destination.join(file.file_name());
		fs::copy(file.path(), &target).map_err(InstallError::io("copy file", file.path()))?;
	}

	for directory in directories {
		let name = directory.file_name().to_string_lossy();
		progress(&format!("Copying directory: {}", name));

		copy_directory(directory.path(), &destination.join(directory.file_name()))?;
	}

	Ok(())
}

/// Copies `<target>/<dir>` to `<target>/<dir>_backup`.
///
/// A backup left over from an earlier run is removed first. If `<target>/<dir>`
/// does not exist nothing is done.
pub fn backup_directory(target: &Path, dir: Preservable) -> Result<()> {
	let source = dir.path_in(target);
	let backup = dir.backup_path_in(target);

	if !source.is_dir() {
		log::debug!("Nothing to back up at {}", source.display());
		return Ok(());
	}

	remove_directory(&backup)?;
	copy_directory(&source, &backup)?;

	log::info!("Backed up {} to {}", source.display(), backup.display());

	Ok(())
}

/// Moves `<target>/<dir>_backup` back to `<target>/<dir>`, replacing whatever
/// is there.
///
/// If no backup exists nothing is done.
pub fn restore_directory(target: &Path, dir: Preservable) -> Result<()> {
	let backup = dir.backup_path_in(target);
	let restored = dir.path_in(target);

	if !backup.is_dir() {
		log::debug!("No backup to restore at {}", backup.display());
		return Ok(());
	}

	remove_directory(&restored)?;
	fs::rename(&backup, &restored).map_err(InstallError::io("move backup", &backup))?;

	log::info!("Restored {} from {}", restored.display(), backup.display());

	Ok(())
}
