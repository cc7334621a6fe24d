//! tc5-installer - Installs a prebuilt TC5 deployment
//!
//! Copies a deployment from a source folder into a target folder. User
//! generated `logs` and `data` directories which already exist in the target
//! survive the reinstall, and an existing deployment can optionally be kept.
//!
//! ## Usage
//!
//! ```sh
//! # install, keeping logs and data of a previous installation
//! tc5-installer install --source /media/tc5 --target /opt/tc5
//!
//! # reinstall from scratch, only keeping the data
//! tc5-installer install -s /media/tc5 -t /opt/tc5 --discard-logs
//!
//! # show what an installation would do
//! tc5-installer analyze -s /media/tc5 -t /opt/tc5
//! ```
//!
//! ### Source Folder
//!
//! The source folder must contain the folders `bin`, `conf`, `docs`,
//! `FabLink` and the files `launcher_X64.bat`, `launcher_X64_Simulation.bat`.
//! A source missing any of them is warned about but can still be installed.
//!
//! The folders are searched in the following order:
//!
//! 1. CLI arguments `-s`/`--source` and `-t`/`--target`
//! 2. Environment variables `TC5_SOURCE` and `TC5_TARGET`
//! 3. Interactive prompt

#![allow(rustdoc::private_intra_doc_links)]
#![deny(
	dead_code,
	deprecated_in_future,
	exported_private_dependencies,
	future_incompatible,
	missing_copy_implementations,
	rustdoc::missing_crate_level_docs,
	rustdoc::broken_intra_doc_links,
	missing_docs,
	clippy::missing_docs_in_private_items,
	missing_debug_implementations,
	rust_2018_compatibility,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unsafe_code,
	unstable_features,
	unused_import_braces,
	unused_qualifications,

	// clippy attributes
	clippy::missing_const_for_fn,
	clippy::redundant_pub_crate,
	clippy::use_self
)]

mod opt;
mod util;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{eyre, WrapErr as _};
use color_eyre::Result;
use serde::Serialize;
use tc5_installer_lib::analyze::{FsPathService, PathService};
use tc5_installer_lib::deploy::{InstallOptions, InstallPlan, Installer};

/// Name of this binary.
const BINARY_NAME: &str = env!("CARGO_BIN_NAME");

/// Name of the environment variable which defines the default source path.
pub const TC5_SOURCE_ENVVAR: &str = "TC5_SOURCE";

/// Name of the environment variable which defines the default target path.
pub const TC5_TARGET_ENVVAR: &str = "TC5_TARGET";

/// Title used when asking for the source folder.
const SELECT_SOURCE_TITLE: &str = "Select Source Deployment Folder";

/// Title used when asking for the target folder.
const SELECT_TARGET_TITLE: &str = "Select Target Installation Folder";

/// Entry point for `tc5-installer`.
fn main() -> Result<()> {
	color_eyre::install()?;

	let opts = opt::Opts::parse();

	let log_level = if opts.shared.quiet {
		log::Level::Error
	} else {
		match opts.shared.verbose {
			// Default if no value for `verbose` is given
			0 => log::Level::Warn,
			1 => log::Level::Info,
			2 => log::Level::Debug,
			_ => log::Level::Trace,
		}
	};

	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level.as_str()))
		.init();

	log::debug!("Parsed Opts:\n{:#?}", opts);

	handle_commands(opts)
}

/// Gets the parsed command line arguments and evaluates them.
fn handle_commands(opts: opt::Opts) -> Result<()> {
	let opt::Opts { shared, command } = opts;

	match command {
		opt::Command::Install(c) => handle_command_install(shared, c),
		opt::Command::Analyze(c) => handle_command_analyze(shared, c),
		opt::Command::Man(c) => handle_command_man(shared, c),
		opt::Command::Completions(c) => handle_command_completions(shared, c),
	}
}

/// Resolves the source and target folder, asking the user for any folder
/// not given on the command line or in the environment.
fn resolve_folders<S: PathService>(
	service: &S,
	opt::Folders { source, target }: opt::Folders,
) -> Result<(PathBuf, PathBuf)> {
	let source = source
		.or_else(|| service.select_folder(SELECT_SOURCE_TITLE))
		.ok_or_else(|| {
			eyre!(
				"No source folder selected. Use `-s/--source` or the environment variable `{}`",
				TC5_SOURCE_ENVVAR
			)
		})?;

	let target = target
		.or_else(|| service.select_folder(SELECT_TARGET_TITLE))
		.ok_or_else(|| {
			eyre!(
				"No target folder selected. Use `-t/--target` or the environment variable `{}`",
				TC5_TARGET_ENVVAR
			)
		})?;

	Ok((source, target))
}

/// Handles the writting of a report to output files/formats.
fn handle_output<T: Serialize>(
	opt::OutputShared {
		json_output,
		yaml_output,
	}: opt::OutputShared,
	report: &T,
) {
	/// Creates a new file. Fails if the file exists.
	fn create_file(path: &Path) -> std::io::Result<File> {
		OpenOptions::new().create_new(true).write(true).open(path)
	}

	'json: {
		if let Some(json_path) = json_output {
			let mut file = match create_file(&json_path) {
				Ok(file) => file,
				Err(err) => {
					log::error!("Failed to create json output file: {err}");
					break 'json;
				}
			};

			if let Err(err) = serde_json::to_writer_pretty(&mut file, report) {
				log::error!("Failed to write report to json output file: {err}");
				break 'json;
			}
		}
	}

	'yaml: {
		if let Some(yaml_path) = yaml_output {
			let mut file = match create_file(&yaml_path) {
				Ok(file) => file,
				Err(err) => {
					log::error!("Failed to create yaml output file: {err}");
					break 'yaml;
				}
			};

			if let Err(err) = serde_yaml::to_writer(&mut file, report) {
				log::error!("Failed to write report to yaml output file: {err}");
				break 'yaml;
			}
		}
	}
}

/// Handles the `install` command processing.
fn handle_command_install(
	_: opt::Shared,
	opt::Install {
		folders,
		preservation,
		yes,
		output,
	}: opt::Install,
) -> Result<()> {
	let service = FsPathService::with_picker(util::prompt_folder);
	let (source, target) = resolve_folders(&service, folders)?;

	util::print_validation(&service.validate_source(&source));

	let info = service.analyze_deployment(&source, &target);
	let options = InstallOptions::from(preservation);
	util::print_analysis(&info, &InstallPlan::new(&info, &options));

	if !yes && !util::ask_user_confirm("Proceed with the installation?")? {
		log::info!("Installation cancelled by the user");
		return Ok(());
	}

	let installation = Installer::new(options, |msg: &str| println!("{}", msg))
		.spawn(info)
		.wrap_err("Failed to start the installation")?
		.join()
		.map_err(|_| eyre!("Installation thread panicked"))?;

	log::debug!("Installation:\n{:#?}", installation);
	util::print_installation(&installation);

	handle_output(output, &installation);

	if installation.status().is_failed() {
		Err(eyre!(
			"❌ Installation failed. Check the progress messages for details."
		))
	} else {
		println!("🎉 Installation completed successfully!");
		Ok(())
	}
}

/// Handles the `analyze` command processing.
///
/// This shows the same information as `install` without changing anything.
fn handle_command_analyze(
	_: opt::Shared,
	opt::Analyze {
		folders,
		preservation,
		output,
	}: opt::Analyze,
) -> Result<()> {
	let service = FsPathService::with_picker(util::prompt_folder);
	let (source, target) = resolve_folders(&service, folders)?;

	util::print_validation(&service.validate_source(&source));

	let info = service.analyze_deployment(&source, &target);
	util::print_analysis(&info, &InstallPlan::new(&info, &preservation.into()));

	handle_output(output, &info);

	Ok(())
}

/// Handles the `man` command processing.
fn handle_command_man(_: opt::Shared, opt::Man { output }: opt::Man) -> Result<()> {
	let output = output.join(format!("{}.1", BINARY_NAME));

	let man = clap_mangen::Man::new(opt::Opts::command());
	let mut buffer: Vec<u8> = Default::default();
	man.render(&mut buffer)?;

	std::fs::write(output, buffer)?;

	Ok(())
}

/// Handles the `completions` command processing.
fn handle_command_completions(
	_: opt::Shared,
	opt::Completions { shell, output }: opt::Completions,
) -> Result<()> {
	clap_complete::generate_to(shell, &mut opt::Opts::command(), BINARY_NAME, output)?;

	Ok(())
}
