use clap::Parser;
use log::{error, info};
use std::process;
use taebsm_core::cli::{Cli, OutputFormat};
use taebsm_core::{BatchPipeline, ProcessingReport, TextReport, WorkspaceLayout};

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let config = cli.pipeline_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let layout = WorkspaceLayout::new(&cli.root);
    if let Err(e) = layout.bootstrap() {
        error!("Failed to prepare {}: {}", layout.root.display(), e);
        eprintln!("Error: Failed to prepare {}: {}", layout.root.display(), e);
        process::exit(1);
    }

    info!(
        "Voxel size {} mm, frac {}, BET {}, dof {}, atlas {}",
        config.voxel_size, config.frac, config.bet_mode, config.dof, config.atlas
    );

    let fsl = cli.fsl_options(&config);
    let pipeline = BatchPipeline::new(layout, config).with_fsl(fsl);

    let report = match pipeline.process_batch() {
        Ok(report) => report,
        Err(e) => {
            error!("Batch aborted: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    output_report(&report, cli.format);
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn output_report(report: &ProcessingReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(report));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = report;
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
