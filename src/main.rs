//
// main.rs
// bids-batch
//
// Entry point: installs the console subscriber and hands off execution to the
// CLI layer.
//

use bids_batch::cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();
    cli::run()
}
