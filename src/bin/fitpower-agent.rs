use std::env;

use fitpower_agent::cli::{self, CliArgs};

#[tokio::main]
async fn main() -> fitpower_agent::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        cli::print_usage();
        std::process::exit(0);
    }

    let args = match CliArgs::parse(args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            cli::print_usage();
            std::process::exit(1);
        }
    };

    cli::run(args).await
}
