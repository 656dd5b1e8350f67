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

	let patch = match read_input(args.input.as_deref()) {
		Ok(text) => text,
		Err(e) => {
			eprintln!("error: {e}");
			return ExitCode::FAILURE;
		}
	};

	let config = Config::from_env();
	print!("{}", flowpatch::autoformat::autoformat(&patch, &config.dot_bin));
	ExitCode::SUCCESS
}

fn read_input(input: Option<&std::path::Path>) -> std::io::Result<String> {
	match input {
		Some(path) => std::fs::read_to_string(path),
		None => {
			let mut source = String::new();
			std::io::stdin().read_to_string(&mut source)?;
			Ok(source)
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
