use clap::Parser;

use vivino_harvest_lib::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    vivino_harvest_lib::run(Cli::parse()).await
}
