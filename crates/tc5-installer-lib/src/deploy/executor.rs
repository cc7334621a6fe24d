//! Everything needed to run an installation.

use std::thread::{self, JoinHandle};

use super::fs;
use super::installation::{Installation, InstallationBuilder, StepStatus};
use super::plan::{InstallPlan, Step};
use super::state::InstallState;
use super::InstallOptions;
use crate::analyze::DeploymentInfo;
use crate::error::{InstallError, Result};

/// Responsible for installing a deployment described by a
/// [`DeploymentInfo`].
///
/// This includes backing up the preserved directories, copying (or keeping)
/// the deployment, removing what should not survive and restoring the backups.
/// Every step is narrated to the progress function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Installer<F> {
	/// Configuration options.
	options: InstallOptions,

	/// Receives a human readable message for every step, in execution order.
	on_progress: F,
}

impl<F> Installer<F>
where
	F: FnMut(&str),
{
	/// Creates a new instance.
	pub const fn new(options: InstallOptions, on_progress: F) -> Self {
		Self {
			options,
			on_progress,
		}
	}

	/// Returns the configured options.
	pub const fn options(&self) -> &InstallOptions {
		&self.options
	}

	/// Logs `message` and passes it to the progress function.
	fn report(&mut self, message: &str) {
		log::info!("{}", message);
		(self.on_progress)(message);
	}

	/// Installs the deployment described by `info`.
	///
	/// The snapshot is trusted as is; the folders are not analyzed again.
	/// Completed steps are never rolled back. Failures are recorded in the
	/// returned [`Installation`] instead of being returned as error.
	pub fn install(mut self, info: &DeploymentInfo) -> Installation {
		let plan = InstallPlan::new(info, &self.options);
		log::debug!("Installation plan: {:?}", plan.steps());

		let mut builder = Installation::build();
		let mut state = InstallState::Idle;
		let mut failed_steps = 0_usize;

		for step in plan {
			state = match state.transition(step.state()) {
				Ok(state) => state,
				Err(err) => return self.abandon(builder, step, err),
			};

			if step == Step::Complete && failed_steps > 0 {
				self.report(&format!(
					"❌ Installation steps completed with {} failed step(s).",
					failed_steps
				));
			} else {
				self.report(step.message());
			}

			match self.execute(step, info) {
				Ok(status) => {
					builder.add_step(step, status);
				}
				Err(err) if step.aborts_on_failure() => return self.abandon(builder, step, err),
				Err(err) => {
					log::error!("Step `{}` failed ({})", step, err);
					self.report(&format!("⚠️ {}", err));
					failed_steps += 1;
					builder.add_step(step, err);
				}
			}
		}

		builder.finish()
	}

	/// Records the failed `step` and finishes the installation as failed.
	fn abandon(mut self, mut builder: InstallationBuilder, step: Step, err: InstallError) -> Installation {
		log::error!("Step `{}` failed, abandoning installation ({})", step, err);
		self.report(&format!("Error during deployment copy: {}", err));

		let reason = err.to_string();
		builder.add_step(step, err);
		builder.failed(reason)
	}

	/// Executes a single step.
	fn execute(&mut self, step: Step, info: &DeploymentInfo) -> Result<StepStatus> {
		let target = info.target_path();

		match step {
			Step::Prepare | Step::Cleanup | Step::Complete => {}
			Step::Backup(dir) => fs::backup_directory(target, dir)?,
			Step::Copy => {
				fs::copy_directory_reporting(info.source_path(), target, |msg| self.report(msg))?
			}
			Step::KeepExisting => {
				return Ok(StepStatus::skipped("Existing deployment kept as requested"))
			}
			Step::Remove(dir) => fs::remove_directory(&dir.path_in(target))?,
			Step::Restore(dir) => fs::restore_directory(target, dir)?,
		}

		Ok(StepStatus::Success)
	}
}

impl<F> Installer<F>
where
	F: FnMut(&str) + Send + 'static,
{
	/// Runs [`Installer::install`] on a separate thread.
	///
	/// The progress function is called from that thread.
	///
	/// # Errors
	///
	/// Errors if the thread could not be spawned.
	pub fn spawn(self, info: DeploymentInfo) -> Result<JoinHandle<Installation>> {
		let target = info.target_path().to_path_buf();

		thread::Builder::new()
			.name(String::from("tc5-install"))
			.spawn(move || self.install(&info))
			.map_err(InstallError::io("spawn installation thread for", &target))
	}
}

/// Installs the deployment described by `info`.
///
/// This is a shorthand for [`Installer::install`] which only reports whether
/// the installation succeeded. Details, including the reason of a failure, are
/// passed to `on_progress`.
pub fn install_deployment<F>(
	info: &DeploymentInfo,
	preserve_logs: bool,
	preserve_data: bool,
	keep_deployment: bool,
	on_progress: F,
) -> bool
where
	F: FnMut(&str),
{
	let options = InstallOptions {
		preserve_logs,
		preserve_data,
		keep_deployment,
	};

	let installation = Installer::new(options, on_progress).install(info);
	log::debug!("Installation:\n{:#?}", installation);

	installation.status().is_success()
}

#[cfg(test)]
mod tests {
	use std::sync::mpsc;

	use color_eyre::Result;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::deploy::InstallStatus;
	use crate::layout::Preservable;
	use crate::tests::setup_test_env;

	#[test]
	fn narrates_steps_in_order() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		let target = tempfile::tempdir()?;
		std::fs::write(source.path().join("launcher_X64.bat"), "@echo off")?;
		std::fs::create_dir(source.path().join("bin"))?;
		std::fs::create_dir(target.path().join("logs"))?;

		let info = DeploymentInfo::build(source.path(), target.path())
			.logs_directory(true)
			.finish();

		let mut messages = Vec::new();
		let installation = Installer::new(InstallOptions::default(), |msg: &str| {
			messages.push(msg.to_string())
		})
		.install(&info);

		assert!(installation.status().is_success());
		assert_eq!(
			messages,
			vec![
				"⏳ Preparing installation...",
				"Backing up logs directory...",
				"📦 Installing files...",
				"Copying file: launcher_X64.bat",
				"Copying directory: bin",
				"🧹 Post-install cleanup...",
				"Restoring logs directory...",
				"✅ Installation steps completed.",
			]
		);

		Ok(())
	}

	#[test]
	fn keep_existing_is_recorded_as_skipped() -> Result<()> {
		setup_test_env();

		let dir = tempfile::tempdir()?;
		let info = DeploymentInfo::build(dir.path().join("missing"), dir.path())
			.deployment_directory(true)
			.finish();

		let options = InstallOptions {
			keep_deployment: true,
			..Default::default()
		};
		let installation = Installer::new(options, |_: &str| {}).install(&info);

		assert!(installation.status().is_success());
		assert!(installation
			.step_status(Step::KeepExisting)
			.is_some_and(StepStatus::is_skipped));
		assert_eq!(installation.step_status(Step::Copy), None);

		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn failed_backup_aborts_before_copy() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		std::fs::write(source.path().join("new.txt"), "new")?;

		let target = tempfile::tempdir()?;
		let logs = target.path().join("logs");
		std::fs::create_dir(&logs)?;
		std::fs::write(logs.join("old.log"), "old")?;

		// A file where the backup directory goes can not be removed as a
		// directory, which makes the backup fail.
		std::fs::write(target.path().join("logs_backup"), "in the way")?;

		let info = DeploymentInfo::build(source.path(), target.path())
			.logs_directory(true)
			.finish();

		let mut messages = Vec::new();
		let installation = Installer::new(InstallOptions::default(), |msg: &str| {
			messages.push(msg.to_string())
		})
		.install(&info);

		assert_eq!(installation.state(), InstallState::Failed);
		assert!(installation
			.step_status(Step::Backup(Preservable::Logs))
			.is_some_and(StepStatus::is_failed));
		assert_eq!(installation.step_status(Step::Copy), None);
		assert!(!target.path().join("new.txt").exists());
		assert_eq!(std::fs::read_to_string(logs.join("old.log"))?, "old");
		assert!(messages
			.last()
			.is_some_and(|msg| msg.starts_with("Error during deployment copy:")));

		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn failed_removal_continues_and_fails() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		std::fs::write(source.path().join("launcher_X64.bat"), "@echo new")?;

		let target = tempfile::tempdir()?;
		let logs = target.path().join("logs");
		std::fs::create_dir(&logs)?;

		let info = DeploymentInfo::build(source.path(), target.path())
			.logs_directory(true)
			.finish();

		// The directory turns into a file after the analysis, which can not be
		// removed as a directory.
		std::fs::remove_dir(&logs)?;
		std::fs::write(&logs, "not a directory")?;

		let options = InstallOptions {
			preserve_logs: false,
			..Default::default()
		};

		let mut messages = Vec::new();
		let installation = Installer::new(options, |msg: &str| messages.push(msg.to_string()))
			.install(&info);

		assert_eq!(installation.state(), InstallState::Done);
		assert_eq!(
			installation.status(),
			&InstallStatus::failed("1 installation steps failed")
		);
		assert!(installation
			.step_status(Step::Remove(Preservable::Logs))
			.is_some_and(StepStatus::is_failed));
		assert_eq!(
			installation.step_status(Step::Complete),
			Some(&StepStatus::Success)
		);
		assert_eq!(
			std::fs::read_to_string(target.path().join("launcher_X64.bat"))?,
			"@echo new"
		);

		let removal = messages
			.iter()
			.position(|msg| msg == "Removing logs directory...")
			.expect("removal was not reported");
		assert!(messages[removal + 1].starts_with("⚠️ Failed to remove directory"));
		assert_eq!(
			messages.last().map(String::as_str),
			Some("❌ Installation steps completed with 1 failed step(s).")
		);

		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn failed_removal_returns_false() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		let target = tempfile::tempdir()?;
		let logs = target.path().join("logs");
		std::fs::create_dir(&logs)?;

		let info = DeploymentInfo::build(source.path(), target.path())
			.logs_directory(true)
			.finish();

		std::fs::remove_dir(&logs)?;
		std::fs::write(&logs, "not a directory")?;

		assert!(!install_deployment(&info, false, true, false, |_| {}));

		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn failed_restore_aborts_and_keeps_backup() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		std::fs::write(source.path().join("launcher_X64.bat"), "@echo new")?;

		let target = tempfile::tempdir()?;
		let logs = target.path().join("logs");
		std::fs::create_dir(&logs)?;
		std::fs::write(logs.join("old.log"), "old")?;

		let info = DeploymentInfo::build(source.path(), target.path())
			.logs_directory(true)
			.data_directory(true)
			.finish();

		// Right before the restore runs a file takes the place of the logs
		// directory, which makes replacing it fail.
		let mut messages = Vec::new();
		let installation = Installer::new(InstallOptions::default(), |msg: &str| {
			if msg == "Restoring logs directory..." {
				let _ = std::fs::remove_dir_all(&logs);
				let _ = std::fs::write(&logs, "in the way");
			}
			messages.push(msg.to_string());
		})
		.install(&info);

		assert_eq!(installation.state(), InstallState::Failed);
		assert!(installation
			.step_status(Step::Restore(Preservable::Logs))
			.is_some_and(StepStatus::is_failed));
		assert_eq!(installation.step_status(Step::Restore(Preservable::Data)), None);
		assert_eq!(installation.step_status(Step::Complete), None);
		assert_eq!(
			std::fs::read_to_string(target.path().join("logs_backup/old.log"))?,
			"old"
		);
		assert!(messages
			.last()
			.is_some_and(|msg| msg.starts_with("Error during deployment copy:")));
		assert!(!messages.iter().any(|msg| msg.starts_with("✅")));

		Ok(())
	}

	#[test]
	fn same_source_and_target_is_refused() -> Result<()> {
		setup_test_env();

		let dir = tempfile::tempdir()?;
		crate::tests::create_deployment(dir.path());
		std::fs::write(dir.path().join("bin/tc5.exe"), "tc5")?;

		let info = DeploymentInfo::build(dir.path(), dir.path())
			.deployment_directory(true)
			.finish();

		let mut messages = Vec::new();
		let ok = install_deployment(&info, true, true, false, |msg| messages.push(msg.to_string()));

		assert!(!ok);
		assert_eq!(
			std::fs::read_to_string(dir.path().join("launcher_X64.bat"))?,
			"@echo off\r\n"
		);
		assert_eq!(std::fs::read_to_string(dir.path().join("bin/tc5.exe"))?, "tc5");
		assert!(messages
			.last()
			.is_some_and(|msg| msg.starts_with("Error during deployment copy:")));

		Ok(())
	}

	#[test]
	fn spawn_reports_from_worker_thread() -> Result<()> {
		setup_test_env();

		let source = tempfile::tempdir()?;
		let target = tempfile::tempdir()?;
		std::fs::write(source.path().join("a.txt"), "a")?;

		let info = DeploymentInfo::build(source.path(), target.path().join("install")).finish();

		let (tx, rx) = mpsc::channel();
		let handle = Installer::new(InstallOptions::default(), move |msg: &str| {
			let _ = tx.send(msg.to_string());
		})
		.spawn(info)?;

		let installation = handle.join().expect("installation thread panicked");
		let messages: Vec<String> = rx.iter().collect();

		assert!(installation.status().is_success());
		assert_eq!(messages.first().map(String::as_str), Some("⏳ Preparing installation..."));
		assert_eq!(messages.last().map(String::as_str), Some("✅ Installation steps completed."));
		assert_eq!(
			std::fs::read_to_string(target.path().join("install/a.txt"))?,
			"a"
		);

		Ok(())
	}
}
