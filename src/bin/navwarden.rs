use clap::Parser;
use colored::Colorize;
use navwarden_core::cli::{self, logger, Cli};
use navwarden_core::exit::NavWardenExit;

fn main() -> NavWardenExit {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    let result = if let Some(cmd) = cli.command {
        cli::dispatch::execute(&cli.root, cmd)
    } else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        Ok(NavWardenExit::Success)
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red(), e);
            NavWardenExit::Error
        }
    }
}
