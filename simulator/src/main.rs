use anyhow::Context;
use clap::Parser;
use generator::profile::{build_tracks_from_config, GeneratorConfig};
use gui_bridge::bridge::{default_bind_address, GuiBridge};
use gui_bridge::model::VisualizationModel;
use ingest::feed::load_feed;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use trackcore::gradient::encoder::DEFAULT_SUBDIVISIONS;
use trackcore::track::GradientField;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod gui_bridge;
mod ingest;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Machine track prediction and gradient overlay driver")]
struct Args {
    /// Run a single pass over the tracks and emit an overlay summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Read tracks from a feed JSON file instead of generating them
    #[arg(long)]
    feed: Option<PathBuf>,
    /// Load a synthetic machine generator config from YAML
    #[arg(long)]
    generator: Option<PathBuf>,
    #[arg(long, default_value_t = 2)]
    reference_points: usize,
    #[arg(long, default_value_t = 5.0)]
    prediction_minutes: f64,
    /// Enable position prediction
    #[arg(long, default_value_t = false)]
    predict: bool,
    /// Field driving the gradient track (altitude, satellites, battery, ...)
    #[arg(long)]
    field: Option<GradientField>,
    #[arg(long, default_value_t = DEFAULT_SUBDIVISIONS)]
    subdivisions: usize,
    /// Keep the overlay bridge alive for incoming feed payloads
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

fn summarize(result: &WorkflowResult) -> String {
    let mut report = String::new();
    for overlay in &result.overlays {
        let prediction = match &overlay.prediction {
            Some(p) => format!(
                "({:.6}, {:.6}) at {} speed={:.2}km/h heading={:.1} confidence={:.2}",
                p.latitude,
                p.longitude,
                p.timestamp.to_rfc3339(),
                p.speed,
                p.heading,
                p.confidence
            ),
            None => "none".to_string(),
        };
        report.push_str(&format!(
            "machine={} points={} usable={} segments={} prediction={}\n",
            overlay.machine_id,
            overlay.point_count,
            overlay.usable_points,
            overlay.segments.len(),
            prediction
        ));
    }
    report
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.reference_points,
            args.prediction_minutes,
            args.predict,
            args.field,
            args.subdivisions,
        )
    };

    let tracks = if let Some(path) = args.feed {
        load_feed(path)?
    } else {
        let generator_config = match args.generator {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        build_tracks_from_config(&generator_config)?
    };

    let runner = Runner::new(workflow_config.clone());
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()), args.bind);

    if args.offline {
        let result = runner.execute(&tracks)?;

        println!(
            "Offline run -> machines {}, predictions {}, declined {}, segments {}",
            result.overlays.len(),
            result.metrics.predictions,
            result.metrics.declined,
            result.metrics.segments
        );

        let model = VisualizationModel::from_result(&result, workflow_config.gradient_field);
        gui_bridge.publish(&model)?;
        gui_bridge.publish_status("Offline overlay results ready.");

        let report = summarize(&result);
        let report_path = PathBuf::from("tools/data/offline_overlay.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
