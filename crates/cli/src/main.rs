use barscan_cli::cli::Cli;
use barscan_cli::commands::{self, Outcome};
use barscan_cli::logging;
use barscan_cli::output::{ResultBuilder, print_result};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();
	match commands::dispatch(cli).await {
		Ok(Outcome::Success) => {}
		Ok(Outcome::NoResult) => std::process::exit(2),
		Err(err) => {
			let result = ResultBuilder::<()>::new(command).error(err.code(), err.to_string()).build();
			print_result(&result, format);
			error!(target: "barscan", error = %err, "command failed");
			std::process::exit(1);
		}
	}
}
