use clap::Parser;
use gorktrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
