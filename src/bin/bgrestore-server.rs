//! HTTP server entry point

use anyhow::Result;
use bgrestore::{InputRange, RemoverKind, ServiceConfig};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RangeArg {
    /// Scale inputs to [0, 1]
    ZeroToOne,
    /// Scale inputs to [-1, 1] (deployed checkpoint)
    SymmetricOne,
}

impl From<RangeArg> for InputRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::ZeroToOne => InputRange::ZeroToOne,
            RangeArg::SymmetricOne => InputRange::SymmetricOne,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RemoverArg {
    /// Heuristic chroma-key segmentation, no model required
    Chroma,
    /// ONNX alpha-matting network (requires --matting-model)
    Matting,
}

impl From<RemoverArg> for RemoverKind {
    fn from(arg: RemoverArg) -> Self {
        match arg {
            RemoverArg::Chroma => RemoverKind::Chroma,
            RemoverArg::Matting => RemoverKind::Matting,
        }
    }
}

/// Background removal and frame restoration HTTP service
#[derive(Debug, Parser)]
#[command(name = "bgrestore-server", version, about)]
struct Args {
    /// Path to the restoration model (ONNX)
    #[arg(long, default_value = "./models/model.onnx")]
    model: std::path::PathBuf,

    /// Path to the matting model (ONNX); omit to disable the matting remover
    #[arg(long)]
    matting_model: Option<std::path::PathBuf>,

    /// Input normalization convention for the restoration model
    #[arg(long, value_enum, default_value_t = RangeArg::SymmetricOne)]
    input_range: RangeArg,

    /// Remover used by the /process-image endpoint
    #[arg(long, value_enum, default_value_t = RemoverArg::Chroma)]
    remover: RemoverArg,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 8087)]
    port: u16,

    /// Maximum request body size in megabytes
    #[arg(long, default_value_t = 32)]
    max_body_mb: usize,

    /// Intra-op threads for the inference sessions (0 = auto)
    #[arg(long, default_value_t = 0)]
    intra_threads: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bgrestore=info,ort=off"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = ServiceConfig::builder()
        .model_path(args.model)
        .matting_model_path(args.matting_model)
        .input_range(args.input_range.into())
        .default_remover(args.remover.into())
        .host(args.host)
        .port(args.port)
        .max_body_bytes(args.max_body_mb * 1024 * 1024)
        .intra_threads(args.intra_threads)
        .build()?;

    bgrestore::server::run(config).await
}
