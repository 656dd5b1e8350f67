use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flowpatch::Config;

#[derive(Parser)]
#[command(version, about)]
struct Args {
	input: Option<PathBuf>,

	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_logging(args.verbose);

	let (source, path) = match read_input(args.input.as_deref()) {
		Ok(value) => value,
		Err(e) => {
			eprintln!("error: {e}");
			return ExitCode::FAILURE;
		}
	};

	let config = Config::from_env();
	match flowpatch::compile(&source, path.as_deref(), &config) {
		Ok(patch) => {
			print!("{patch}");
			ExitCode::SUCCESS
		}
		Err(e) => {
			eprintln!("error: {e}");
			ExitCode::FAILURE
		}
	}
}

fn read_input(input: Option<&std::path::Path>) -> std::io::Result<(String, Option<PathBuf>)> {
	match input {
		Some(path) => {
			let source = std::fs::read_to_string(path)?;
			Ok((source, Some(path.to_path_buf())))
		}
		None => {
			let mut source = String::new();
			std::io::stdin().read_to_string(&mut source)?;
			Ok((source, None))
		}
	}
}

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
