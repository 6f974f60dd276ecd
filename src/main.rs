mod analyzer;
mod app;
mod util;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use app::CodeGraphApp;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the project to visualize
    project_path: String,

    /// Analysis backend executable
    #[arg(long, default_value = "codegraph-analyzer")]
    analyzer: String,

    /// Initial layout algorithm: force, hierarchical, or radial
    #[arg(long, default_value = "force")]
    layout: String,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("codegraph=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let algorithm = app::LayoutAlgorithm::from_flag(&args.layout)
        .unwrap_or(app::LayoutAlgorithm::ForceDirected);
    tracing::info!(project = %args.project_path, "starting codegraph");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "codegraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(CodeGraphApp::new(
                cc,
                args.project_path.clone(),
                args.analyzer.clone(),
                algorithm,
            )))
        }),
    )
}
