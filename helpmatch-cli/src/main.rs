//! Entry point for the `helpmatch` command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;

fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    helpmatch_cli::run()?;
    Ok(())
}
