mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use msfe::{
    Catalogue,
    FeatureExtractor,
    ScanCategory,
};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use errors::CliError;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();

    let conf = std::fs::File::open(&args.config).map_err(|e| CliError::io(e, &args.config))?;
    let config: Config =
        serde_json::from_reader(std::io::BufReader::new(conf)).map_err(|e| {
            CliError::ParseError { msg: e.to_string() }
        })?;
    let config = config.with_cli_args(args)?;
    info!("Parsed configuration: {:#?}", config);

    let (Some(input), Some(output)) = (config.input, config.output) else {
        return Err(CliError::Config {
            source: "Incomplete configuration".to_string(),
        });
    };

    let st = std::time::Instant::now();
    let catalogue = Catalogue::from_file(&input.catalogue)?;
    info!(
        "Loading catalogue {} took {:?}",
        input.catalogue.display(),
        st.elapsed()
    );

    let extractor = FeatureExtractor::try_new(config.analysis.extraction, catalogue)?;
    for category in [ScanCategory::Normal, ScanCategory::ChemicalNoise] {
        let n = extractor
            .catalogue()
            .ions_for(category)
            .map(|x| x.len())
            .unwrap_or(0);
        info!("{} expected ions for {} scans", n, category.name());
    }
    processing::main_loop(
        &input.runs,
        &extractor,
        &config.analysis.selection,
        &output.feature_matrix,
    )
}
