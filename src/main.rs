use clap::Parser as _;
use gras_curve_tools::commands;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(clap::Parser)]
#[clap(version, about, author)]
enum Commands {
    Zones(commands::zones::Args),
    Curve(commands::curve::Args),
    Edit(commands::edit::Args),
}

fn end<E: std::error::Error>(r: Result<(), E>) {
    std::process::exit(match r {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(e) = cause {
                eprintln!("  because: {e}");
                cause = e.source();
            }
            1
        }
    });
}

fn main() {
    let filter_description = std::env::var("GRAS_CURVE_TOOLS_LOG").unwrap_or_default();
    let filter = filter_description
        .parse::<tracing_subscriber::filter::targets::Targets>()
        .expect("could not parse GRAS_CURVE_TOOLS_LOG as a tracing filter");
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    match Commands::parse() {
        Commands::Zones(args) => end(commands::zones::run(args)),
        Commands::Curve(args) => end(commands::curve::run(args)),
        Commands::Edit(args) => end(commands::edit::run(args)),
    }
}
