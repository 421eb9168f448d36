#![forbid(unsafe_code)]

//! Mode dispatch. `--version` beats `--info` beats `--query`; no flag means adjust.

use clap::{error::ErrorKind, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;

#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
struct Args {
	/// Don't adjust, instead print version and exit
	#[arg(long)]
	version: bool,
	/// Don't adjust, instead print driver info and exit
	#[arg(long)]
	info: bool,
	/// Don't adjust, instead print the current state of settings for this application
	#[arg(long)]
	query: bool,
	/// Name/ID of the application to adjust
	app_id: Option<String>,
}

/// One process execution, resolved from argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
	/// `--version`
	Version,
	/// `--info`
	Info,
	/// `--query <app_id>`
	Query {
		/// Target application.
		app_id: String,
	},
	/// `<app_id>` with the request on stdin.
	Adjust {
		/// Target application.
		app_id: String,
	},
}

impl Invocation {
	/// Parse `args` (argv[0] included). A missing or blank `app_id` in query or
	/// adjust mode is a usage error; `--help` also comes back as a clap error
	/// whose `exit()` prints to stdout with status 0.
	pub fn try_parse_from<I, T>(name: &str, about: &str, args: I) -> Result<Self, clap::Error>
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString> + Clone,
	{
		let mut cmd = Args::command().name(name.to_owned()).about(about.to_owned());
		let matches = cmd.try_get_matches_from_mut(args)?;
		let args = Args::from_arg_matches(&matches)?;

		if args.version {
			return Ok(Self::Version);
		}
		if args.info {
			return Ok(Self::Info);
		}
		let Some(app_id) = args.app_id.filter(|a| !a.trim().is_empty()) else {
			return Err(cmd.error(ErrorKind::MissingRequiredArgument, "Missing required param app_id"));
		};
		if args.query {
			Ok(Self::Query { app_id })
		} else {
			Ok(Self::Adjust { app_id })
		}
	}

	/// Target application, for query and adjust.
	pub fn app_id(&self) -> Option<&str> {
		match self {
			Self::Query { app_id } | Self::Adjust { app_id } => Some(app_id),
			Self::Version | Self::Info => None,
		}
	}

	/// Lowercase mode name, used in log spans.
	pub fn mode(&self) -> &'static str {
		match self {
			Self::Version => "version",
			Self::Info => "info",
			Self::Query { .. } => "query",
			Self::Adjust { .. } => "adjust",
		}
	}
}
