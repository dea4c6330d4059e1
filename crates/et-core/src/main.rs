//! et-core binary entry point.

use clap::Parser;
use et_core::cli::{run, Cli};
use et_core::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);
    let code = run(&cli);
    std::process::exit(code.as_i32());
}
