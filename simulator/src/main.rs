use anyhow::Context;
use clap::Parser;
use framescope::prelude::DEFAULT_ENDPOINT;
use service::bridge::{default_bind_address, DetectionService};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod service;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Stand-in detection service and headless upload driver")]
struct Args {
    /// Upload this video through the client lifecycle and print the results
    #[arg(long)]
    upload: Option<PathBuf>,
    /// Host the stand-in detection service until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, default_value_t = default_bind_address().port())]
    port: u16,
    /// Frames the stand-in service reports per video
    #[arg(long, default_value_t = 12)]
    frames: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print the upload result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn print_report(result: &WorkflowResult) {
    let session = &result.session;
    println!(
        "Upload -> status {}, progress {}%, {}",
        session.status, session.progress_percent, session.result_summary
    );
    println!(
        "Accuracy {} | false positives {} | accuracy gain {}",
        session.accuracy_label(),
        session.false_positives_label(),
        session.accuracy_gain_label()
    );

    match &result.stats {
        Some(stats) => {
            let average = stats
                .average_confidence
                .map(|avg| format!("{avg:.2}"))
                .unwrap_or_else(|| "N/A".into());
            println!(
                "Total detections {} | average confidence {} | frames analyzed {}",
                stats.total_detections, average, stats.frames_analyzed
            );
            for (label, count) in stats.class_frequency.iter() {
                println!("  {label:<16} {count}");
            }
        }
        None => println!("No detection data available."),
    }

    let transfers = &result.transfers;
    println!(
        "Transfers: {} succeeded, {} failed, {} superseded",
        transfers.succeeded, transfers.failed, transfers.stale
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.endpoint, args.port, args.frames, args.seed)
    };

    if !args.serve && args.upload.is_none() {
        anyhow::bail!("nothing to do: pass --serve, --upload <VIDEO>, or both");
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    runtime.block_on(async {
        let service = if args.serve {
            let service = DetectionService::new(workflow_config.to_generator_config());
            service.spawn(workflow_config.bind_address)?;
            Some(service)
        } else {
            None
        };

        if let Some(video) = args.upload.as_deref() {
            let runner = Runner::new(workflow_config.clone());
            let result = runner.execute(video).await?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("encoding upload result")?
                );
            } else {
                print_report(&result);
            }
        }

        if let Some(service) = service {
            log::info!("detection service running (Ctrl+C to stop)...");
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            let ledger = service.ledger();
            log::info!(
                "served {} uploads, rejected {}, last video {:?}",
                ledger.uploads,
                ledger.rejected,
                ledger.last_video
            );
        }
        Ok::<(), anyhow::Error>(())
    })
}
