//! The on-disk shape of a TC5 deployment.
//!
//! A folder is considered a deployment if the following entries exist directly
//! below it:
//!
//! ```text
//! root/
//! + bin/
//! + conf/
//! + docs/
//! + FabLink/
//! + launcher_X64.bat
//! + launcher_X64_Simulation.bat
//! ```
//!
//! The same structure is used to validate a source folder and to detect an
//! already installed deployment inside a target folder.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Static description of the expected deployment structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentStructure;

impl DeploymentStructure {
	/// Folders which must exist directly below the deployment root.
	pub const REQUIRED_SUBFOLDERS: [&'static str; 4] = ["bin", "conf", "docs", "FabLink"];

	/// Files which must exist directly below the deployment root.
	pub const REQUIRED_FILES: [&'static str; 2] =
		["launcher_X64.bat", "launcher_X64_Simulation.bat"];

	/// Directories with user generated content which can survive a reinstall.
	pub const PRESERVABLE_DIRECTORIES: [Preservable; 2] = [Preservable::Logs, Preservable::Data];

	/// Returns the names of all required entries which are missing below
	/// `root`.
	///
	/// Any error while accessing an entry counts as missing.
	pub fn missing_entries(root: &Path) -> Vec<&'static str> {
		let folders = Self::REQUIRED_SUBFOLDERS
			.iter()
			.filter(|name| !root.join(name).is_dir());

		let files = Self::REQUIRED_FILES
			.iter()
			.filter(|name| !root.join(name).is_file());

		folders.chain(files).copied().collect()
	}

	/// Checks if `root` contains all required folders and files.
	pub fn is_satisfied_by(root: &Path) -> bool {
		Self::REQUIRED_SUBFOLDERS
			.iter()
			.all(|name| root.join(name).is_dir())
			&& Self::REQUIRED_FILES
				.iter()
				.all(|name| root.join(name).is_file())
	}
}

/// A directory below the target whose content is owned by the user and not by
/// the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preservable {
	/// The `logs` directory.
	Logs,

	/// The `data` directory.
	Data,
}

impl Preservable {
	/// Returns the directory name.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Logs => "logs",
			Self::Data => "data",
		}
	}

	/// Returns the name of the transient backup directory (`<name>_backup`).
	pub const fn backup_name(self) -> &'static str {
		match self {
			Self::Logs => "logs_backup",
			Self::Data => "data_backup",
		}
	}

	/// Returns the absolute path of the directory below `target`.
	pub fn path_in(self, target: &Path) -> PathBuf {
		target.join(self.name())
	}

	/// Returns the absolute path of the backup directory below `target`.
	pub fn backup_path_in(self, target: &Path) -> PathBuf {
		target.join(self.backup_name())
	}
}

impl fmt::Display for Preservable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
