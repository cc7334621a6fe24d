//! Installation of a deployment into a target folder.
//!
//! General flow for a target which already holds user content:
//!
//! ```text
//! backup logs/data -> copy deployment (or keep it) -> cleanup -> restore logs/data
//! ```
//!
//! The backup/restore pair always wins over whatever the fresh copy placed in
//! `logs`/`data`.

pub mod executor;
pub mod fs;
pub mod installation;
pub mod plan;
pub mod state;

use serde::{Deserialize, Serialize};

use crate::layout::Preservable;

pub use executor::{install_deployment, Installer};
pub use installation::{Installation, InstallStatus, StepRecord, StepStatus};
pub use plan::{InstallPlan, Step};
pub use state::InstallState;

/// Configuration options for the [`Installer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallOptions {
	/// Keeps the content of an existing `logs` directory.
	pub preserve_logs: bool,

	/// Keeps the content of an existing `data` directory.
	pub preserve_data: bool,

	/// Leaves an already installed deployment untouched instead of copying
	/// the source over it.
	pub keep_deployment: bool,
}

impl InstallOptions {
	/// Checks if the given directory should survive the installation.
	pub const fn preserves(&self, dir: Preservable) -> bool {
		match dir {
			Preservable::Logs => self.preserve_logs,
			Preservable::Data => self.preserve_data,
		}
	}
}

impl Default for InstallOptions {
	/// User content is kept, the deployment itself is replaced.
	fn default() -> Self {
		Self {
			preserve_logs: true,
			preserve_data: true,
			keep_deployment: false,
		}
	}
}
