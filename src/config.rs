use clap::Parser;
use std::path::{Path, PathBuf};

/// Trait for reading configuration parameters
pub trait Config {
    fn input_path(&self) -> &Path;
    fn history(&self) -> bool;
}

/// CLI configuration
#[derive(Parser, Debug)]
#[command(
    name = "bank-ledger",
    about = "Replays customer, account and money-movement operations from CSV against a fresh ledger",
    version
)]
pub struct CliConfig {
    /// Path to the input CSV file containing ledger operations
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Print every transaction instead of the final account balances
    #[arg(long)]
    history: bool,
}

impl Config for CliConfig {
    fn input_path(&self) -> &Path {
        &self.input_file
    }

    fn history(&self) -> bool {
        self.history
    }
}
