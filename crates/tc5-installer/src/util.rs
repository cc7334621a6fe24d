//! Various utility functions.

use std::io::Write as _;
use std::path::PathBuf;

use color_eyre::owo_colors::OwoColorize;
use color_eyre::Result;
use tc5_installer_lib::analyze::{DeploymentInfo, SourceValidation};
use tc5_installer_lib::deploy::{InstallPlan, InstallStatus, Installation, StepStatus};

/// Folder picker for the terminal.
///
/// Prints the `title` and reads a path from stdin. `~` and environment
/// variables in the answer are expanded. An empty answer cancels the
/// selection.
pub fn prompt_folder(title: &str) -> Option<PathBuf> {
	let mut stdout = std::io::stdout();
	let mut line = String::new();

	let read = write!(stdout, "{}: ", title)
		.and_then(|_| stdout.flush())
		.and_then(|_| std::io::stdin().read_line(&mut line));

	if let Err(err) = read {
		log::error!("Failed to read folder from the terminal: {}", err);
		return None;
	}

	parse_folder(&line)
}

/// Turns a line entered by the user into a folder path.
fn parse_folder(line: &str) -> Option<PathBuf> {
	let line = line.trim();

	if line.is_empty() {
		return None;
	}

	match shellexpand::full(line) {
		Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
		Err(err) => {
			log::warn!("Failed to expand `{}` ({}), using it as is", line, err);
			Some(PathBuf::from(line))
		}
	}
}

/// Asks the user to answer `question` with yes (`y`) or no (`n`) via the
/// command line ([`std::io::stdout`]/[`std::io::stdin`]). If an invalid answer
/// is given it will ask again until a valid answer is given.
pub fn ask_user_confirm(question: &str) -> Result<bool> {
	let stdin = std::io::stdin();
	let mut stdout = std::io::stdout();
	let mut line = String::new();

	loop {
		write!(stdout, "{} [y/N]: ", question)?;
		stdout.flush()?;

		line.clear();
		stdin.read_line(&mut line)?;
		line.make_ascii_lowercase();

		match line.trim() {
			"y" | "yes" => return Ok(true),
			"" | "n" | "no" => return Ok(false),
			_ => continue,
		}
	}
}

/// Prints the validation result of the source folder.
///
/// Invalid sources are only warned about; they do not block an installation.
pub fn print_validation(validation: &SourceValidation) {
	if validation.is_valid() {
		println!("✅ {}", validation);
	} else {
		log::warn!("Source validation: {}", validation);
		println!("{} {}", "⚠️".yellow(), validation.yellow());
	}
}

/// Prints the analyzed state of the target folder and the steps an
/// installation would execute.
pub fn print_analysis(info: &DeploymentInfo, plan: &InstallPlan) {
	println!("Source: {}", info.source_path().display());
	println!("Target: {}", info.target_path().display());

	if info.is_target_empty() {
		println!("Target is empty");
	} else if let Some(summary) = info.target_summary() {
		println!("{}", summary.yellow());
	}

	println!("Planned steps:");
	for step in plan.steps() {
		println!("\t{}", step.bright_black());
	}
}

/// Prints the finished state of the installation.
///
/// This includes every executed step with its status, the final status and
/// the total time the installation took.
pub fn print_installation(installation: &Installation) {
	let mut out = String::from("Steps:");

	for record in installation.steps() {
		let status = match &record.status {
			StepStatus::Success => "SUCCESS".green().to_string(),
			StepStatus::Skipped(reason) => format!("{} ({})", "SKIPPED".yellow(), reason),
			StepStatus::Failed(reason) => format!("{} ({})", "FAILED".red(), reason),
		};

		out.push_str(&format!("\n\t{:<24} {}", record.step.to_string(), status));
	}

	match installation.status() {
		InstallStatus::Success => {
			out.push_str(&format!("\nStatus: {}", "SUCCESS".green()));
		}
		InstallStatus::Failed(reason) => {
			out.push_str(&format!("\nStatus: {}\n\t{}", "FAILED".red(), reason));
		}
	};

	match installation.duration() {
		Ok(elapsed) => out.push_str(&format!("\nTime  : {:?}", elapsed)),
		Err(err) => log::warn!("Failed to get duration from installation: {}", err),
	}

	println!("{}", out);
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_answer_cancels() {
		assert_eq!(parse_folder(""), None);
		assert_eq!(parse_folder("  \n"), None);
	}

	#[test]
	fn answer_is_trimmed() {
		assert_eq!(
			parse_folder("  /opt/tc5 \n"),
			Some(PathBuf::from("/opt/tc5"))
		);
	}
}
