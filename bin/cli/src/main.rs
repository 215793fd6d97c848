// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::{Parser, ValueEnum};

use crate::config::Config;
use crate::error::SetupError;

mod config;
mod connect;
mod error;
mod log;
mod runner;

const LOGS_DIRECTORY: &str = "./logs";
const METADATA_DIRECTORY: &str = "./metadata";
const LOG_FILE: &str = "./logs/tributary.log";
const CONFIG_FILE: &str = "configs/config.json";

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "Incremental, checkpointed data replication", long_about = None)]
#[command(version)]
#[command(override_usage = "tributary [--env {dev, staging, prod}]")]
struct Args {
	/// Deployment environment the configuration is resolved against
	#[arg(long, value_enum)]
	env: Env,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Env {
	Dev,
	Staging,
	Prod,
}

impl Env {
	pub fn as_str(&self) -> &'static str {
		match self {
			Env::Dev => "dev",
			Env::Staging => "staging",
			Env::Prod => "prod",
		}
	}
}

fn main() {
	let args = Args::parse();

	if let Err(error) = run(args.env) {
		eprintln!("{error}");
		std::process::exit(1);
	}
}

fn run(env: Env) -> Result<(), SetupError> {
	ensure_directory(LOGS_DIRECTORY)?;
	ensure_directory(METADATA_DIRECTORY)?;
	log::init(LOG_FILE)?;

	let config = Config::from_path(CONFIG_FILE)?;

	if env == Env::Prod && !confirm_prod()? {
		return Ok(());
	}

	runner::run(&config, env)
}

fn ensure_directory(path: &str) -> Result<(), SetupError> {
	if Path::new(path).is_dir() {
		return Ok(());
	}
	fs::create_dir_all(path)
		.map_err(|error| SetupError::Directory { path: path.to_string(), reason: error.to_string() })
}

fn confirm_prod() -> Result<bool, SetupError> {
	print!("environment is 'prod', continue? [y/n] ");
	io::stdout().flush().ok();

	let mut answer = String::new();
	io::stdin()
		.lock()
		.read_line(&mut answer)
		.map_err(|error| SetupError::Prompt { reason: error.to_string() })?;

	Ok(matches!(answer.trim(), "y" | "Y"))
}
