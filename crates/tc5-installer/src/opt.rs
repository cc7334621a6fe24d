//! All code related to command line argument parsing.

// We allow missing documentation for this module, as any documentation put on
// the cli struct will appear in the help message which, in most cases, is not
// what we want.
#![allow(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tc5_installer_lib::deploy::InstallOptions;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opts {
	#[command(flatten)]
	pub shared: Shared,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Args)]
pub struct Shared {
	/// Runs with specified level of verbosity which affects the log level.
	///
	/// The level can be set by repeating the flag `n` times (e.g. `-vv` for 2).
	/// Levels:
	///     1 - `Info`;
	///     2 - `Debug`;
	///     3 - `Trace`.
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,

	/// Only logs errors.
	#[arg(short, long, global = true)]
	pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	Install(Install),
	Analyze(Analyze),
	Man(Man),
	Completions(Completions),
}

#[derive(Debug, Args)]
pub struct Folders {
	/// Folder containing the prebuilt deployment.
	///
	/// If neither this nor the environment variable is given, the folder is
	/// asked for interactively.
	#[arg(short, long, env = super::TC5_SOURCE_ENVVAR)]
	pub source: Option<PathBuf>,

	/// Folder to install the deployment into.
	///
	/// If neither this nor the environment variable is given, the folder is
	/// asked for interactively.
	#[arg(short, long, env = super::TC5_TARGET_ENVVAR)]
	pub target: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct Preservation {
	/// Deletes an existing `logs` directory instead of keeping its content.
	#[arg(long)]
	pub discard_logs: bool,

	/// Deletes an existing `data` directory instead of keeping its content.
	#[arg(long)]
	pub discard_data: bool,

	/// Keeps an already installed deployment instead of overwriting it.
	///
	/// Only has an effect if the target already contains a complete
	/// deployment. `logs` and `data` are still handled.
	#[arg(short, long)]
	pub keep_deployment: bool,
}

impl From<Preservation> for InstallOptions {
	fn from(value: Preservation) -> Self {
		Self {
			preserve_logs: !value.discard_logs,
			preserve_data: !value.discard_data,
			keep_deployment: value.keep_deployment,
		}
	}
}

#[derive(Debug, Args)]
pub struct OutputShared {
	/// Writes a report in the json format to the given file.
	///
	/// The file must not exist.
	#[arg(long)]
	pub json_output: Option<PathBuf>,

	/// Writes a report in the yaml format to the given file.
	///
	/// The file must not exist.
	#[arg(long)]
	pub yaml_output: Option<PathBuf>,
}

/// Installs a deployment from the source into the target folder.
///
/// Existing `logs` and `data` directories in the target are kept by default.
#[derive(Debug, Parser)]
pub struct Install {
	#[command(flatten)]
	pub folders: Folders,

	#[command(flatten)]
	pub preservation: Preservation,

	/// Does not ask for confirmation before installing.
	#[arg(short, long)]
	pub yes: bool,

	#[command(flatten)]
	pub output: OutputShared,
}

/// Analyzes the source and target folders and shows what an installation
/// would do, without changing anything.
#[derive(Debug, Parser)]
pub struct Analyze {
	#[command(flatten)]
	pub folders: Folders,

	#[command(flatten)]
	pub preservation: Preservation,

	#[command(flatten)]
	pub output: OutputShared,
}

/// Generates the man page.
#[derive(Debug, Parser)]
pub struct Man {
	/// Directory the man page is written to.
	#[arg(short, long, default_value = ".")]
	pub output: PathBuf,
}

/// Generates shell completions.
#[derive(Debug, Parser)]
pub struct Completions {
	/// Shell to generate the completions for.
	#[arg(value_enum)]
	pub shell: clap_complete::Shell,

	/// Directory the completions are written to.
	#[arg(short, long, default_value = ".")]
	pub output: PathBuf,
}
