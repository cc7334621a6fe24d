//! Statistics and information about the final state of an installation.

use std::borrow::Cow;
use std::fmt;
use std::time::{Duration, SystemTime, SystemTimeError};

use serde::{Deserialize, Serialize};

use super::plan::Step;
use super::state::InstallState;

/// Contains the status of a single installation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
	/// The step was executed successfully.
	Success,
	/// The step failed.
	Failed(Cow<'static, str>),
	/// The step intentionally did nothing.
	Skipped(Cow<'static, str>),
}

impl StepStatus {
	/// Marks the step as successful.
	pub const fn success() -> Self {
		Self::Success
	}

	/// Marks the step as failed.
	pub fn failed<S: Into<Cow<'static, str>>>(reason: S) -> Self {
		Self::Failed(reason.into())
	}

	/// Indicates that the step was skipped.
	pub fn skipped<S: Into<Cow<'static, str>>>(reason: S) -> Self {
		Self::Skipped(reason.into())
	}

	/// Checks if the step was successful.
	pub fn is_success(&self) -> bool {
		self == &Self::Success
	}

	/// Checks if the step has failed.
	pub const fn is_failed(&self) -> bool {
		matches!(self, &Self::Failed(_))
	}

	/// Checks if the step was skipped.
	pub const fn is_skipped(&self) -> bool {
		matches!(self, &Self::Skipped(_))
	}
}

impl fmt::Display for StepStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Success => f.write_str("Success"),
			Self::Failed(reason) => write!(f, "Failed: {}", reason),
			Self::Skipped(reason) => write!(f, "Skipped: {}", reason),
		}
	}
}

impl<E> From<E> for StepStatus
where
	E: std::error::Error,
{
	fn from(value: E) -> Self {
		Self::failed(value.to_string())
	}
}

/// A step together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
	/// The executed step.
	pub step: Step,

	/// Outcome of the step.
	pub status: StepStatus,
}

/// Describes the status of a whole installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallStatus {
	/// All steps succeeded.
	Success,
	/// The installation has failed.
	Failed(Cow<'static, str>),
}

impl InstallStatus {
	/// Returns success.
	pub const fn success() -> Self {
		Self::Success
	}

	/// Returns a failure.
	pub fn failed<S: Into<Cow<'static, str>>>(reason: S) -> Self {
		Self::Failed(reason.into())
	}

	/// Checks if the installation was successful.
	pub fn is_success(&self) -> bool {
		self == &Self::Success
	}

	/// Checks if the installation has failed.
	pub const fn is_failed(&self) -> bool {
		matches!(self, &Self::Failed(_))
	}
}

impl fmt::Display for InstallStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Success => f.write_str("Success"),
			Self::Failed(reason) => write!(f, "Failed: {}", reason),
		}
	}
}

/// Describes a finished installation.
///
/// Steps are recorded in the order they were executed. Steps which were not
/// reached because an earlier step failed are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
	/// The time the installation was started.
	time_start: SystemTime,
	/// The time the installation was finished.
	time_end: SystemTime,
	/// The state the installation ended in.
	state: InstallState,
	/// The overall status.
	status: InstallStatus,
	/// The executed steps.
	steps: Vec<StepRecord>,
}

impl Installation {
	/// Returns the time the installation was started.
	pub const fn time_start(&self) -> &SystemTime {
		&self.time_start
	}

	/// Returns the time the installation was finished.
	pub const fn time_end(&self) -> &SystemTime {
		&self.time_end
	}

	/// Returns the duration the installation took.
	pub fn duration(&self) -> Result<Duration, SystemTimeError> {
		self.time_end.duration_since(self.time_start)
	}

	/// Returns the state the installation ended in.
	///
	/// This is [`InstallState::Done`] if every step was attempted, even if a
	/// non critical step failed.
	pub const fn state(&self) -> InstallState {
		self.state
	}

	/// Returns the overall status.
	pub const fn status(&self) -> &InstallStatus {
		&self.status
	}

	/// Returns the executed steps.
	pub fn steps(&self) -> &[StepRecord] {
		&self.steps
	}

	/// Returns the status of `step` if it was executed.
	pub fn step_status(&self, step: Step) -> Option<&StepStatus> {
		self.steps
			.iter()
			.find(|record| record.step == step)
			.map(|record| &record.status)
	}

	/// Builds an installation report.
	pub fn build() -> InstallationBuilder {
		InstallationBuilder::default()
	}
}

/// Collects step outcomes while an installation runs.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationBuilder {
	/// The time the installation was started.
	time_start: SystemTime,
	/// The executed steps.
	steps: Vec<StepRecord>,
}

impl InstallationBuilder {
	/// Records the outcome of a step.
	pub fn add_step<S: Into<StepStatus>>(&mut self, step: Step, status: S) -> &mut Self {
		self.steps.push(StepRecord {
			step,
			status: status.into(),
		});
		self
	}

	/// Finishes an installation which attempted all steps.
	///
	/// The status is failed if any recorded step has failed.
	pub fn finish(self) -> Installation {
		let failed_steps = self
			.steps
			.iter()
			.filter(|record| record.status.is_failed())
			.count();

		let status = if failed_steps > 0 {
			InstallStatus::failed(format!("{} installation steps failed", failed_steps))
		} else {
			InstallStatus::Success
		};

		Installation {
			time_start: self.time_start,
			time_end: SystemTime::now(),
			state: InstallState::Done,
			status,
			steps: self.steps,
		}
	}

	/// Finishes an installation which was abandoned.
	pub fn failed<S: Into<Cow<'static, str>>>(self, reason: S) -> Installation {
		Installation {
			time_start: self.time_start,
			time_end: SystemTime::now(),
			state: InstallState::Failed,
			status: InstallStatus::Failed(reason.into()),
			steps: self.steps,
		}
	}
}

impl Default for InstallationBuilder {
	fn default() -> Self {
		Self {
			time_start: SystemTime::now(),
			steps: Vec::new(),
		}
	}
}
