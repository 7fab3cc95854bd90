//! Inspect an ONNX model's input and output signatures
//!
//! Prints the tensor names and types the restoration service will bind to,
//! without starting the server.

use anyhow::{Context, Result};
use clap::Parser;
use ort::session::Session;

/// Print input/output metadata of an ONNX model
#[derive(Debug, Parser)]
#[command(name = "model-info", version, about)]
struct Args {
    /// Path to the ONNX model file
    #[arg(default_value = "./models/model.onnx")]
    model: std::path::PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let session = Session::builder()
        .context("failed to create session builder")?
        .commit_from_file(&args.model)
        .with_context(|| format!("failed to load model '{}'", args.model.display()))?;

    println!("model: {}", args.model.display());

    println!("\ninputs:");
    for input in session.inputs() {
        println!("  {}: {:?}", input.name(), input.dtype());
    }

    println!("\noutputs:");
    for output in session.outputs() {
        println!("  {}: {:?}", output.name(), output.dtype());
    }

    Ok(())
}
