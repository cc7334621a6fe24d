//! Inspection of source and target folders before an installation.
//!
//! The result of an analysis is a [`DeploymentInfo`], a snapshot of the
//! filesystem at the time of the call. It is never updated afterwards; if the
//! folders change before the installation runs, the installation acts on the
//! stale snapshot.
//!
//! All operations in here are infallible. Any error while accessing the
//! filesystem results in the conservative answer (not valid, empty, absent).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::{DeploymentStructure, Preservable};

/// Capability to ask the hosting environment for a folder.
///
/// This is implemented by whatever front end drives the installation (a
/// dialog, a terminal prompt, ...).
pub trait FolderPicker {
	/// Asks for a folder with the given dialog `title`.
	///
	/// Returns `None` if the user cancelled the selection.
	fn pick_folder(&self, title: &str) -> Option<PathBuf>;
}

impl<F> FolderPicker for F
where
	F: Fn(&str) -> Option<PathBuf>,
{
	fn pick_folder(&self, title: &str) -> Option<PathBuf> {
		self(title)
	}
}

/// A [`FolderPicker`] for environments without any way to select a folder.
///
/// Every selection is treated as cancelled.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoFolderPicker;

impl FolderPicker for NoFolderPicker {
	fn pick_folder(&self, _: &str) -> Option<PathBuf> {
		None
	}
}

/// Path validation and analysis used to prepare an installation.
pub trait PathService {
	/// Checks if `path` contains the required deployment structure.
	///
	/// Returns `false` if the path is empty, does not exist or can not be
	/// accessed.
	fn is_valid_deployment_source(&self, path: &Path) -> bool;

	/// Checks if the directory at `path` has no entries.
	///
	/// A directory which does not exist is considered empty.
	fn is_directory_empty(&self, path: &Path) -> bool;

	/// Analyzes the `source` and `target` folders and returns a snapshot of
	/// the result.
	fn analyze_deployment(&self, source: &Path, target: &Path) -> DeploymentInfo;

	/// Validates `path` as source folder and describes why it is unusable.
	fn validate_source(&self, path: &Path) -> SourceValidation;

	/// Asks the hosting environment for a folder.
	///
	/// Returns `None` if no folder selection is available or the selection
	/// was cancelled.
	fn select_folder(&self, title: &str) -> Option<PathBuf>;
}

/// [`PathService`] backed by the local filesystem.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsPathService<P = NoFolderPicker> {
	/// Used by [`PathService::select_folder`].
	picker: P,
}

impl FsPathService {
	/// Creates a new instance without folder selection.
	pub const fn new() -> Self {
		Self {
			picker: NoFolderPicker,
		}
	}
}

impl<P: FolderPicker> FsPathService<P> {
	/// Creates a new instance which delegates folder selection to `picker`.
	pub const fn with_picker(picker: P) -> Self {
		Self { picker }
	}
}

/// Checks if a path is empty or only consists of whitespace.
fn is_blank(path: &Path) -> bool {
	path.as_os_str().to_string_lossy().trim().is_empty()
}

impl<P: FolderPicker> PathService for FsPathService<P> {
	fn is_valid_deployment_source(&self, path: &Path) -> bool {
		if is_blank(path) || !path.is_dir() {
			return false;
		}

		DeploymentStructure::is_satisfied_by(path)
	}

	fn is_directory_empty(&self, path: &Path) -> bool {
		if !path.is_dir() {
			return true;
		}

		match std::fs::read_dir(path) {
			Ok(mut entries) => entries.next().is_none(),
			Err(err) => {
				log::warn!("Failed to read directory {}: {}", path.display(), err);
				true
			}
		}
	}

	fn analyze_deployment(&self, source: &Path, target: &Path) -> DeploymentInfo {
		let info = DeploymentInfo {
			source_path: source.to_path_buf(),
			target_path: target.to_path_buf(),
			is_source_empty: self.is_directory_empty(source),
			is_target_empty: self.is_directory_empty(target),
			has_logs_directory: Preservable::Logs.path_in(target).is_dir(),
			has_data_directory: Preservable::Data.path_in(target).is_dir(),
			// The target, not the source: it may already host an installation.
			has_deployment_directory: self.is_valid_deployment_source(target),
		};

		log::debug!("Analyzed deployment:\n{:#?}", info);

		info
	}

	fn validate_source(&self, path: &Path) -> SourceValidation {
		if is_blank(path) || !path.is_dir() {
			return SourceValidation::Missing;
		}

		if self.is_directory_empty(path) {
			return SourceValidation::Empty;
		}

		let missing = DeploymentStructure::missing_entries(path);
		if missing.is_empty() {
			SourceValidation::Valid
		} else {
			SourceValidation::MissingEntries(missing.into_iter().map(String::from).collect())
		}
	}

	fn select_folder(&self, title: &str) -> Option<PathBuf> {
		self.picker.pick_folder(title)
	}
}

/// Outcome of validating a source folder.
///
/// Everything except [`SourceValidation::Valid`] is a warning for the user; it
/// does not prevent an installation from being attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceValidation {
	/// The folder contains the complete deployment structure.
	Valid,

	/// The path is empty or the folder does not exist.
	Missing,

	/// The folder exists but has no entries.
	Empty,

	/// The folder lacks the named required entries.
	MissingEntries(Vec<String>),
}

impl SourceValidation {
	/// Checks if the folder is a valid deployment source.
	pub const fn is_valid(&self) -> bool {
		matches!(self, Self::Valid)
	}
}

impl fmt::Display for SourceValidation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Valid => f.write_str("Valid deployment source selected"),
			Self::Missing => f.write_str("Source directory does not exist!"),
			Self::Empty => f.write_str("Source directory is empty!"),
			Self::MissingEntries(missing) => write!(
				f,
				"Source directory doesn't contain expected deployment structure (bin, conf, \
				 docs, FabLink folders and launcher files). Missing: {}",
				missing.join(", ")
			),
		}
	}
}

/// Snapshot of a source/target folder pair taken by
/// [`PathService::analyze_deployment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInfo {
	/// Folder the deployment is installed from.
	source_path: PathBuf,

	/// Folder the deployment is installed into.
	target_path: PathBuf,

	/// If the source folder was empty or absent.
	is_source_empty: bool,

	/// If the target folder was empty or absent.
	is_target_empty: bool,

	/// If the target had a `logs` directory.
	has_logs_directory: bool,

	/// If the target had a `data` directory.
	has_data_directory: bool,

	/// If the target itself already satisfied the deployment structure.
	has_deployment_directory: bool,
}

impl DeploymentInfo {
	/// Starts building a snapshot by hand.
	///
	/// All flags default to `false`.
	pub fn build<S: Into<PathBuf>, T: Into<PathBuf>>(source: S, target: T) -> DeploymentInfoBuilder {
		DeploymentInfoBuilder(Self {
			source_path: source.into(),
			target_path: target.into(),
			is_source_empty: false,
			is_target_empty: false,
			has_logs_directory: false,
			has_data_directory: false,
			has_deployment_directory: false,
		})
	}

	/// Returns the source folder.
	pub fn source_path(&self) -> &Path {
		&self.source_path
	}

	/// Returns the target folder.
	pub fn target_path(&self) -> &Path {
		&self.target_path
	}

	/// Returns if the source folder was empty or absent.
	pub const fn is_source_empty(&self) -> bool {
		self.is_source_empty
	}

	/// Returns if the target folder was empty or absent.
	pub const fn is_target_empty(&self) -> bool {
		self.is_target_empty
	}

	/// Returns if the target had a `logs` directory.
	pub const fn has_logs_directory(&self) -> bool {
		self.has_logs_directory
	}

	/// Returns if the target had a `data` directory.
	pub const fn has_data_directory(&self) -> bool {
		self.has_data_directory
	}

	/// Returns if the target already hosted a deployment.
	pub const fn has_deployment_directory(&self) -> bool {
		self.has_deployment_directory
	}

	/// Returns if the target had the given preservable directory.
	pub const fn has_directory(&self, dir: Preservable) -> bool {
		match dir {
			Preservable::Logs => self.has_logs_directory,
			Preservable::Data => self.has_data_directory,
		}
	}

	/// Describes the existing content of the target which the user can choose
	/// to keep.
	///
	/// Returns `None` if the target has nothing to keep.
	pub fn target_summary(&self) -> Option<String> {
		let parts: Vec<_> = [
			(self.has_logs_directory, "logs directory"),
			(self.has_data_directory, "data directory"),
			(self.has_deployment_directory, "existing deployment"),
		]
		.into_iter()
		.filter_map(|(present, part)| present.then_some(part))
		.collect();

		if parts.is_empty() {
			None
		} else {
			Some(format!("Target contains {}", parts.join(" and ")))
		}
	}
}

/// Builder for a [`DeploymentInfo`] which was not obtained by analysis.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInfoBuilder(DeploymentInfo);

impl DeploymentInfoBuilder {
	/// Sets if the source folder is empty.
	pub fn source_empty(mut self, value: bool) -> Self {
		self.0.is_source_empty = value;
		self
	}

	/// Sets if the target folder is empty.
	pub fn target_empty(mut self, value: bool) -> Self {
		self.0.is_target_empty = value;
		self
	}

	/// Sets if the target has a `logs` directory.
	pub fn logs_directory(mut self, value: bool) -> Self {
		self.0.has_logs_directory = value;
		self
	}

	/// Sets if the target has a `data` directory.
	pub fn data_directory(mut self, value: bool) -> Self {
		self.0.has_data_directory = value;
		self
	}

	/// Sets if the target already hosts a deployment.
	pub fn deployment_directory(mut self, value: bool) -> Self {
		self.0.has_deployment_directory = value;
		self
	}

	/// Finishes the snapshot.
	pub fn finish(self) -> DeploymentInfo {
		self.0
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use color_eyre::Result;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::tests::{create_deployment, setup_test_env};

	#[test]
	fn absent_directory_is_empty() -> Result<()> {
		setup_test_env();

		let dir = tempfile::tempdir()?;
		let service = FsPathService::new();

		assert!(service.is_directory_empty(&dir.path().join("does-not-exist")));
		assert!(service.is_directory_empty(dir.path()));

		fs::create_dir(dir.path().join("sub"))?;
		assert!(!service.is_directory_empty(dir.path()));

		Ok(())
	}

	#[test]
	fn directory_with_file_is_not_empty() -> Result<()> {
		setup_test_env();

		let dir = tempfile::tempdir()?;
		fs::write(dir.path().join("a.txt"), "a")?;

		assert!(!FsPathService::new().is_directory_empty(dir.path()));

		Ok(())
	}

	#[test]
	fn source_fails_closed() -> Result<()> {
		setup_test_env();

		let service = FsPathService::new();
		assert!(!service.is_valid_deployment_source(Path::new("")));
		assert!(!service.is_valid_deployment_source(Path::new("   ")));

		let dir = tempfile::tempdir()?;
		assert!(!service.is_valid_deployment_source(&dir.path().join("missing")));
		assert!(!service.is_valid_deployment_source(dir.path()));

		create_deployment(dir.path());
		assert!(service.is_valid_deployment_source(dir.path()));

		Ok(())
	}

	#[test]
	fn validate_source() -> Result<()> {
		setup_test_env();

		let service = FsPathService::new();
		let dir = tempfile::tempdir()?;

		assert_eq!(
			service.validate_source(&dir.path().join("missing")),
			SourceValidation::Missing
		);
		assert_eq!(service.validate_source(dir.path()), SourceValidation::Empty);

		create_deployment(dir.path());
		fs::remove_dir(dir.path().join("FabLink"))?;
		fs::remove_file(dir.path().join("launcher_X64.bat"))?;

		assert_eq!(
			service.validate_source(dir.path()),
			SourceValidation::MissingEntries(vec!["FabLink".into(), "launcher_X64.bat".into()])
		);

		create_deployment(dir.path());
		assert!(service.validate_source(dir.path()).is_valid());

		Ok(())
	}

	#[test]
	fn analyze_checks_target_for_deployment() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		let target = tempfile::tempdir()?;
		create_deployment(source.path());
		fs::create_dir(target.path().join("logs"))?;

		let service = FsPathService::new();
		let info = service.analyze_deployment(source.path(), target.path());

		assert!(!info.is_source_empty());
		assert!(!info.is_target_empty());
		assert!(info.has_logs_directory());
		assert!(!info.has_data_directory());
		assert!(!info.has_deployment_directory());

		create_deployment(target.path());
		fs::create_dir(target.path().join("data"))?;

		let info = service.analyze_deployment(source.path(), target.path());
		assert!(info.has_data_directory());
		assert!(info.has_deployment_directory());

		Ok(())
	}

	#[test]
	fn analyze_missing_folders() -> Result<()> {
		setup_test_env();

		let dir = tempfile::tempdir()?;
		let info = FsPathService::new()
			.analyze_deployment(&dir.path().join("source"), &dir.path().join("target"));

		assert_eq!(
			info,
			DeploymentInfo::build(dir.path().join("source"), dir.path().join("target"))
				.source_empty(true)
				.target_empty(true)
				.finish()
		);

		Ok(())
	}

	#[test]
	fn logs_file_is_not_a_logs_directory() -> Result<()> {
		setup_test_env();

		let dir = tempfile::tempdir()?;
		fs::write(dir.path().join("logs"), "")?;

		let info = FsPathService::new().analyze_deployment(dir.path(), dir.path());
		assert!(!info.has_logs_directory());

		Ok(())
	}

	#[test]
	fn target_summary() {
		let info = DeploymentInfo::build("/src", "/dst").finish();
		assert_eq!(info.target_summary(), None);

		let info = DeploymentInfo::build("/src", "/dst")
			.data_directory(true)
			.finish();
		assert_eq!(
			info.target_summary().as_deref(),
			Some("Target contains data directory")
		);

		let info = DeploymentInfo::build("/src", "/dst")
			.logs_directory(true)
			.data_directory(true)
			.deployment_directory(true)
			.finish();
		assert_eq!(
			info.target_summary().as_deref(),
			Some("Target contains logs directory and data directory and existing deployment")
		);
	}

	#[test]
	fn select_folder_delegates() {
		assert_eq!(FsPathService::new().select_folder("Select Source Folder"), None);

		let service = FsPathService::with_picker(|title: &str| {
			(title == "Select Source Folder").then(|| PathBuf::from("/media/tc5"))
		});
		assert_eq!(
			service.select_folder("Select Source Folder"),
			Some(PathBuf::from("/media/tc5"))
		);
		assert_eq!(service.select_folder("Select Target Installation Folder"), None);
	}
}
