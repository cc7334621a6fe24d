#![allow(rustdoc::private_intra_doc_links)]
#![deny(
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
)]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_alias))]

//! This is the library powering `tc5-installer`, which installs a prebuilt
//! TC5 deployment from a source folder into a target folder.
//!
//! The main parts are:
//!
//! - [Path analysis](`analyze`): validates a source folder and takes a
//!   [snapshot](`analyze::DeploymentInfo`) of the target folder.
//! - [Installation](`deploy`): backs up `logs`/`data`, copies (or keeps) the
//!   deployment, cleans up and restores the preserved directories.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use tc5_installer_lib::analyze::{FsPathService, PathService as _};
//! use tc5_installer_lib::deploy::install_deployment;
//!
//! let info = FsPathService::new().analyze_deployment(Path::new("/media/tc5"), Path::new("/opt/tc5"));
//! let ok = install_deployment(&info, true, true, false, |msg| println!("{msg}"));
//! assert!(ok);
//! ```

pub mod analyze;
pub mod deploy;
pub mod error;
pub mod layout;
