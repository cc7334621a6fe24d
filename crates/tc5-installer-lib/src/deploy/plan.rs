//! Ordering of the installation steps.
//!
//! The plan only depends on the [`DeploymentInfo`] snapshot and the
//! [`InstallOptions`], which means the order can be checked without touching
//! the filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::InstallState;
use super::InstallOptions;
use crate::analyze::DeploymentInfo;
use crate::layout::{DeploymentStructure, Preservable};

/// A single unit of work of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
	/// Announces the start of the installation.
	Prepare,

	/// Copies `<target>/<dir>` to `<target>/<dir>_backup`.
	Backup(Preservable),

	/// Copies the source folder into the target folder.
	Copy,

	/// Leaves the already installed deployment untouched.
	KeepExisting,

	/// Announces the cleanup.
	Cleanup,

	/// Deletes `<target>/<dir>`.
	Remove(Preservable),

	/// Moves `<target>/<dir>_backup` to `<target>/<dir>`.
	Restore(Preservable),

	/// Announces the end of the installation.
	Complete,
}

impl Step {
	/// Returns the state the installation is in while executing this step.
	pub const fn state(self) -> InstallState {
		match self {
			Self::Prepare => InstallState::Idle,
			Self::Backup(_) => InstallState::BackingUp,
			Self::Copy => InstallState::Copying,
			Self::KeepExisting => InstallState::Skipping,
			Self::Cleanup | Self::Remove(_) => InstallState::CleaningUp,
			Self::Restore(_) => InstallState::Restoring,
			Self::Complete => InstallState::Done,
		}
	}

	/// Returns the progress message announced before the step runs.
	pub const fn message(self) -> &'static str {
		match self {
			Self::Prepare => "⏳ Preparing installation...",
			Self::Backup(Preservable::Logs) => "Backing up logs directory...",
			Self::Backup(Preservable::Data) => "Backing up data directory...",
			Self::Copy => "📦 Installing files...",
			Self::KeepExisting => {
				"Keeping existing deployment as requested. Skipping overwrite of deployment files..."
			}
			Self::Cleanup => "🧹 Post-install cleanup...",
			Self::Remove(Preservable::Logs) => "Removing logs directory...",
			Self::Remove(Preservable::Data) => "Removing data directory...",
			Self::Restore(Preservable::Logs) => "Restoring logs directory...",
			Self::Restore(Preservable::Data) => "Restoring data directory...",
			Self::Complete => "✅ Installation steps completed.",
		}
	}

	/// Checks if a failure of this step abandons the rest of the installation.
	///
	/// A failed backup must not be followed by a restore, as that would replace
	/// the user's directory with an incomplete copy. A failed restore leaves the
	/// backup on disk. A failed removal only leaves stale content behind.
	pub const fn aborts_on_failure(self) -> bool {
		!matches!(self, Self::Remove(_))
	}
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Prepare => f.write_str("prepare"),
			Self::Backup(dir) => write!(f, "backup {}", dir),
			Self::Copy => f.write_str("copy deployment"),
			Self::KeepExisting => f.write_str("keep existing deployment"),
			Self::Cleanup => f.write_str("cleanup"),
			Self::Remove(dir) => write!(f, "remove {}", dir),
			Self::Restore(dir) => write!(f, "restore {}", dir),
			Self::Complete => f.write_str("complete"),
		}
	}
}

/// The ordered steps of one installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstallPlan {
	/// Steps in execution order.
	steps: Vec<Step>,
}

impl InstallPlan {
	/// Derives the steps for installing `info` with the given `options`.
	///
	/// The copy always happens before the cleanup and restore, so whatever
	/// `logs`/`data` content the fresh copy brings along is either removed or
	/// replaced by the backed up content afterwards.
	pub fn new(info: &DeploymentInfo, options: &InstallOptions) -> Self {
		let dirs = DeploymentStructure::PRESERVABLE_DIRECTORIES;
		let present = |dir: Preservable| info.has_directory(dir);

		let mut steps = vec![Step::Prepare];

		steps.extend(
			dirs.into_iter()
				.filter(|&dir| present(dir) && options.preserves(dir))
				.map(Step::Backup),
		);

		if options.keep_deployment && info.has_deployment_directory() {
			steps.push(Step::KeepExisting);
		} else {
			steps.push(Step::Copy);
		}

		steps.push(Step::Cleanup);

		steps.extend(
			dirs.into_iter()
				.filter(|&dir| present(dir) && !options.preserves(dir))
				.map(Step::Remove),
		);

		steps.extend(
			dirs.into_iter()
				.filter(|&dir| present(dir) && options.preserves(dir))
				.map(Step::Restore),
		);

		steps.push(Step::Complete);

		Self { steps }
	}

	/// Returns the steps in execution order.
	pub fn steps(&self) -> &[Step] {
		&self.steps
	}
}

impl IntoIterator for InstallPlan {
	type Item = Step;
	type IntoIter = std::vec::IntoIter<Step>;

	fn into_iter(self) -> Self::IntoIter {
		self.steps.into_iter()
	}
}
