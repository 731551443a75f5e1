use anyhow::Result;
use clap::Parser;

use eventdesk::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    eventdesk::init_logger();
    eventdesk::run(cli)
}
