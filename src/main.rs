use clap::{Arg, ArgMatches, Command};
use std::io::IsTerminal;
use std::process;

use filesync::config::{config_path, ProfileStore, CONFIG_ENV};
use filesync::logging::*;
use filesync::progress::ProgressMode;
use filesync::session::{run_client, run_server, ConsoleOperator, SessionOutcome};
use filesync::SyncError;

const SERVER_MODE: &str = "server";
const CLIENT_MODE: &str = "client";

fn command() -> Command {
	Command::new("filesync")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Encrypted one-shot directory sync between a server and a client")
		.arg(Arg::new("mode").value_name("MODE").help("server or client"))
		.arg(Arg::new("profile").value_name("PROFILE").help("Profile id from the config file"))
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help(format!("Config file (default: ${} or ./filesync.json)", CONFIG_ENV)),
		)
}

fn run(matches: &ArgMatches) -> Result<SessionOutcome, SyncError> {
	let (Some(mode), Some(profile_id)) =
		(matches.get_one::<String>("mode"), matches.get_one::<String>("profile"))
	else {
		return Err(SyncError::MissingArguments);
	};
	if mode != SERVER_MODE && mode != CLIENT_MODE {
		return Err(SyncError::InvalidMode { mode: mode.clone() });
	}

	let path = config_path(matches.get_one::<String>("config").map(|s| s.as_str()));
	let mut store = ProfileStore::load(&path)?;
	let profile = store.resolve(profile_id)?;

	let progress =
		if std::io::stderr().is_terminal() { ProgressMode::Visible } else { ProgressMode::Hidden };

	let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
	runtime.block_on(async {
		if mode == SERVER_MODE {
			run_server(&profile, progress).await
		} else {
			let mut operator = ConsoleOperator::stdio();
			run_client(&profile, &mut operator, progress).await
		}
	})
}

fn main() {
	let matches = match command().try_get_matches() {
		Ok(m) => m,
		Err(e) => {
			let code = if e.use_stderr() { -1 } else { 0 };
			let _ = e.print();
			process::exit(code);
		}
	};

	init_tracing();

	match run(&matches) {
		Ok(SessionOutcome::Completed(_)) => {}
		Ok(SessionOutcome::Cancelled) => info!("Session cancelled"),
		Err(e) => {
			if matches!(e, SyncError::MissingArguments | SyncError::InvalidMode { .. }) {
				let _ = command().print_help();
			}
			error!("{}", e);
			process::exit(e.exit_code());
		}
	}
}

// vim: ts=4
