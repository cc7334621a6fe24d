//! Errors which can occur while installing a deployment.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::deploy::state::InstallState;

/// An enum of errors which can occur during an installation.
#[derive(Error, Debug)]
pub enum InstallError {
	/// The source directory of a copy does not exist.
	#[error("Source directory does not exist: {}", .path.display())]
	SourceNotFound {
		/// The missing directory.
		path: PathBuf,
	},

	/// A filesystem operation failed.
	#[error("Failed to {action} `{}`: {source}", .path.display())]
	Io {
		/// Short description of what was attempted (e.g. `remove directory`).
		action: &'static str,

		/// The path the operation was attempted on.
		path: PathBuf,

		/// The underlying error.
		#[source]
		source: std::io::Error,
	},

	/// The destination of a copy is the source itself or lies inside of it.
	#[error(
		"Can not copy `{}` into `{}`: the destination is the source or inside of it",
		.source_path.display(),
		.destination.display()
	)]
	OverlappingDirectories {
		/// The directory which was to be copied.
		source_path: PathBuf,

		/// The directory which was to be written to.
		destination: PathBuf,
	},

	/// A step was attempted in an order the installation does not allow.
	#[error("Invalid installation state transition from {from} to {to}")]
	InvalidTransition {
		/// The state the installation was in.
		from: InstallState,

		/// The state which was requested.
		to: InstallState,
	},
}

impl InstallError {
	/// Creates a [`InstallError::SourceNotFound`].
	pub fn source_not_found<P: Into<PathBuf>>(path: P) -> Self {
		Self::SourceNotFound { path: path.into() }
	}

	/// Returns a function which wraps an [`std::io::Error`] with the attempted
	/// `action` and `path`.
	pub fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
		move |source| Self::Io {
			action,
			path: path.to_path_buf(),
			source,
		}
	}

	/// Creates a [`InstallError::OverlappingDirectories`].
	pub fn overlapping<P: Into<PathBuf>, Q: Into<PathBuf>>(source: P, destination: Q) -> Self {
		Self::OverlappingDirectories {
			source_path: source.into(),
			destination: destination.into(),
		}
	}

	/// Checks if this is the "not found" condition of a missing copy source.
	pub const fn is_not_found(&self) -> bool {
		matches!(self, Self::SourceNotFound { .. })
	}
}

/// Result type with [`InstallError`] as the error.
pub type Result<T, E = InstallError> = std::result::Result<T, E>;
