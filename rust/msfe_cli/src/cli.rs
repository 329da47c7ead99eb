use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the expected ion catalogue (will over-write the config file)
    #[arg(short = 'k', long)]
    pub catalogue: Option<PathBuf>,

    /// NDJSON run files, one scan per line (will over-write the config file)
    #[arg(short, long, num_args = 1..)]
    pub runs: Vec<PathBuf>,

    /// Path to the feature matrix the runs get appended to
    #[arg(short, long)]
    pub feature_matrix: Option<PathBuf>,
}
