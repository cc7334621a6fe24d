//! The phases an installation moves through.
//!
//! ```text
//! Idle -> BackingUp -> Copying|Skipping -> CleaningUp -> Restoring -> Done
//!   \__________\_____________\________________\_____________\_______-> Failed
//! ```
//!
//! Phases may be left out (e.g. nothing to back up) and a phase may repeat
//! (backing up `logs` and then `data`), but the installation never moves
//! backwards. `Done` and `Failed` are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InstallError, Result};

/// State of a running installation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallState {
	/// Nothing was touched yet.
	#[default]
	Idle,

	/// Preserved directories are copied to their backup location.
	BackingUp,

	/// The deployment is copied from the source into the target.
	Copying,

	/// The existing deployment is kept and the copy is skipped.
	Skipping,

	/// Directories which should not survive are removed.
	CleaningUp,

	/// Backups are moved back into place.
	Restoring,

	/// All steps were executed.
	Done,

	/// A step failed and the remaining steps were abandoned.
	Failed,
}

impl InstallState {
	/// Position in the ordered sequence of phases. `Failed` is outside of it.
	const fn order(self) -> Option<u8> {
		match self {
			Self::Idle => Some(0),
			Self::BackingUp => Some(1),
			Self::Copying | Self::Skipping => Some(2),
			Self::CleaningUp => Some(3),
			Self::Restoring => Some(4),
			Self::Done => Some(5),
			Self::Failed => None,
		}
	}

	/// Checks if no further transition is possible.
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Done | Self::Failed)
	}

	/// Checks if `self` may be followed by `next`.
	pub fn can_transition(self, next: Self) -> bool {
		if self.is_terminal() {
			return false;
		}

		if next == Self::Failed || next == self {
			return true;
		}

		match (self.order(), next.order()) {
			(Some(current), Some(next)) => next > current,
			_ => false,
		}
	}

	/// Moves from `self` to `next`.
	///
	/// # Errors
	///
	/// Errors if the transition would move the installation backwards, switch
	/// between copying and skipping or leave a terminal state.
	pub fn transition(self, next: Self) -> Result<Self> {
		if self.can_transition(next) {
			log::trace!("Installation state: {} -> {}", self, next);
			Ok(next)
		} else {
			Err(InstallError::InvalidTransition {
				from: self,
				to: next,
			})
		}
	}
}

impl fmt::Display for InstallState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Idle => "idle",
			Self::BackingUp => "backing up",
			Self::Copying => "copying",
			Self::Skipping => "skipping",
			Self::CleaningUp => "cleaning up",
			Self::Restoring => "restoring",
			Self::Done => "done",
			Self::Failed => "failed",
		};

		f.write_str(name)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::InstallState::{self, *};

	#[test]
	fn starts_idle() {
		assert_eq!(InstallState::default(), Idle);
		assert!(!Idle.is_terminal());
	}

	#[test]
	fn forward_transitions() {
		let path = [Idle, BackingUp, BackingUp, Copying, CleaningUp, Restoring, Done];

		let mut state = Idle;
		for next in path {
			state = state.transition(next).unwrap();
		}

		assert_eq!(state, Done);
	}

	#[test]
	fn phases_can_be_left_out() {
		assert!(Idle.can_transition(Skipping));
		assert!(Idle.can_transition(Done));
		assert!(BackingUp.can_transition(Restoring));
	}

	#[test]
	fn backwards_is_rejected() {
		assert!(!Copying.can_transition(BackingUp));
		assert!(!Restoring.can_transition(CleaningUp));
		assert!(!CleaningUp.can_transition(Idle));

		let err = Restoring.transition(BackingUp).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Invalid installation state transition from restoring to backing up"
		);
	}

	#[test]
	fn copy_and_skip_are_exclusive() {
		assert!(!Copying.can_transition(Skipping));
		assert!(!Skipping.can_transition(Copying));
	}

	#[test]
	fn failure_from_any_running_state() {
		for state in [Idle, BackingUp, Copying, Skipping, CleaningUp, Restoring] {
			assert_eq!(state.transition(Failed).unwrap(), Failed);
		}
	}

	#[test]
	fn terminal_states_are_final() {
		for next in [Idle, BackingUp, Copying, Restoring, Done, Failed] {
			assert!(!Done.can_transition(next));
			assert!(!Failed.can_transition(next));
		}
	}
}
