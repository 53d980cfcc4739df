use clap::Parser;
use exectasks::cli::commands::Cli;
use exectasks::cli::handlers;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
