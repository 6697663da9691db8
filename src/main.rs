use clap::Parser;
use tracing::error;

use urlinspect::{cli, utils, Args, TerminalSink};

fn main() {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    match cli::run(&args, &mut TerminalSink::new()) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!(action = "run", component = "main", error = %e, "Inspection failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
