use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

use gotid_fusion::config::FusionConfig;
use gotid_fusion::intake::{AiSubmission, AnprSubmission, ScanSubmission};
use gotid_fusion::telemetry::{init_telemetry, TelemetryConfig};
use gotid_fusion::{FusionEngine, FusionInput, RegistryVehicle, ScanOutcome, ScanPipeline};

fn print_help() {
    eprintln!(
        "\
gotid-fusion

USAGE:
  gotid-fusion <command> [options]

COMMANDS:
  decide                          Run the fusion engine on one input document
  simulate                        Replay a scenario through the in-memory pipeline

decide OPTIONS:
  --input <path|->                (default: -) FusionInput JSON
  --pretty                        Pretty-print the result

simulate OPTIONS:
  --scenario <path|->             (required) Scenario JSON with vehicles, anpr, ai, scans
  --recent <n>                    (optional) Also print the n most recent fusion records
  --metrics                       Also print verdict and label counters
  --pretty                        Pretty-print output

ENV:
  FUSION_CORRELATION_WINDOW_SECS / FUSION_UUID_MISSING_DEDUP_SECS
  FUSION_ASSUME_ENROLLED / FUSION_MAX_COUNTER
  LOG_LEVEL / RUST_LOG / LOG_JSON
"
    );
}

/// Scenario replayed by `simulate`. Camera reads are ingested before scans.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Scenario {
    vehicles: Vec<RegistryVehicle>,
    anpr: Vec<AnprSubmission>,
    ai: Vec<AiSubmission>,
    scans: Vec<ScanSubmission>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ScanReport {
    Fused(Box<ScanOutcome>),
    Rejected { index: usize, error: String },
}

async fn read_source(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(source)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {source}: {e}"))
}

fn render<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn next_value(args: &mut VecDeque<String>, flag: &str) -> anyhow::Result<String> {
    args.pop_front()
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry(&TelemetryConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    let config = FusionConfig::from_env();

    match command.as_str() {
        "decide" => {
            let mut input = "-".to_string();
            let mut pretty = false;

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--input" => input = next_value(&mut args, "--input")?,
                    "--pretty" => pretty = true,
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let raw = read_source(&input).await?;
            let fusion_input: FusionInput = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("invalid fusion input: {e}"))?;

            let result = FusionEngine::new(config.policy()).decide(&fusion_input);
            println!("{}", render(&result, pretty)?);
            Ok(())
        }
        "simulate" => {
            let mut scenario_path: Option<String> = None;
            let mut recent: Option<i64> = None;
            let mut show_metrics = false;
            let mut pretty = false;

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--scenario" => scenario_path = Some(next_value(&mut args, "--scenario")?),
                    "--recent" => {
                        let raw = next_value(&mut args, "--recent")?;
                        recent = Some(
                            raw.parse()
                                .map_err(|_| anyhow::anyhow!("invalid --recent: {raw}"))?,
                        );
                    }
                    "--metrics" => show_metrics = true,
                    "--pretty" => pretty = true,
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let scenario_path =
                scenario_path.ok_or_else(|| anyhow::anyhow!("--scenario is required"))?;
            let raw = read_source(&scenario_path).await?;
            let scenario: Scenario = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("invalid scenario: {e}"))?;

            let pipeline = ScanPipeline::in_memory(config);

            for vehicle in scenario.vehicles {
                pipeline.enroll(vehicle).await?;
            }
            for read in scenario.anpr {
                pipeline.ingest_anpr(read).await?;
            }
            for read in scenario.ai {
                pipeline.ingest_ai(read).await?;
            }

            for (index, scan) in scenario.scans.into_iter().enumerate() {
                let report = match pipeline.submit_scan(scan).await {
                    Ok(outcome) => ScanReport::Fused(Box::new(outcome)),
                    Err(err) if err.is_client_error() => ScanReport::Rejected {
                        index,
                        error: err.to_string(),
                    },
                    Err(err) => return Err(err.into()),
                };
                println!("{}", render(&report, pretty)?);
            }

            if let Some(limit) = recent {
                let records = pipeline.recent_fusions(Some(limit)).await?;
                println!("{}", render(&records, pretty)?);
            }

            if show_metrics {
                let metrics = pipeline.metrics().to_json().await;
                println!("{}", render(&metrics, pretty)?);
            }

            Ok(())
        }
        other => {
            print_help();
            anyhow::bail!("unknown command: {other}")
        }
    }
}
