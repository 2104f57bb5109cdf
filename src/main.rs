pub mod args;
pub mod stv;

use clap::Parser;

use env_logger::Env;

use crate::args::Args;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let env = Env::new().default_filter_or({
        if args.verbose {
            "debug"
        } else {
            "info"
        }
    });
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
    log::info!("this is stvcount version {}", VERSION.unwrap_or("unknown"));

    stv::run(args)
}
