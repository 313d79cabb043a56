//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
    if let Err(err) = busline_cli::run() {
        eprintln!("busline: {err}");
        std::process::exit(1);
    }
}
