use clap::Parser;
use subtrack::cli::Cli;

fn main() -> anyhow::Result<()> {
    subtrack::init_tracing();
    let cli = Cli::parse();
    cli.run()
}
