//! Metrix CLI entry point.

use metrix::cli::{self, Cli};
use metrix::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    cli::execute(cli).await
}
