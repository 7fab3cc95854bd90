//! End-to-end test client
//!
//! Posts base64-encoded images to a running bgrestore server, prints the
//! diagnostic fields and saves the returned PNGs next to the inputs.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bgrestore::{CompareResponse, ProcessResponse};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Drive end-to-end requests against a running server
#[derive(Debug, Parser)]
#[command(name = "e2e-client", version, about)]
struct Args {
    /// Image files to post
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Server base URL
    #[arg(long, default_value = "http://localhost:8087")]
    url: String,

    /// Hit the comparison endpoint instead of the single-method one
    #[arg(long)]
    compare: bool,
}

fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");
    input.with_file_name(format!("{stem}{suffix}.png"))
}

fn save_base64_png(input: &Path, suffix: &str, payload: &str) -> Result<()> {
    let bytes = STANDARD
        .decode(payload)
        .context("response image is not valid base64")?;
    let path = output_path(input, suffix);
    std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    println!("  saved {}", path.display());
    Ok(())
}

async fn post_image(
    client: &reqwest::Client,
    endpoint: &str,
    input: &Path,
) -> Result<serde_json::Value> {
    let image_bytes =
        std::fs::read(input).with_context(|| format!("read '{}'", input.display()))?;
    let body = STANDARD.encode(image_bytes);

    let response = client
        .post(endpoint)
        .body(body)
        .send()
        .await
        .context("request failed")?;

    let status = response.status();
    let payload: serde_json::Value = response.json().await.context("invalid JSON response")?;

    if let Some(error) = payload.get("error").and_then(|e| e.as_str()) {
        bail!("server error ({status}): {error}");
    }
    Ok(payload)
}

async fn run_single(client: &reqwest::Client, url: &str, input: &Path) -> Result<()> {
    let endpoint = format!("{url}/process-image");
    let payload = post_image(client, &endpoint, input).await?;
    let response: ProcessResponse =
        serde_json::from_value(payload).context("unexpected response shape")?;

    println!(
        "  original {:?} -> processed {:?} in {:.2}s",
        response.original_shape, response.processed_shape, response.processing_time_seconds
    );
    save_base64_png(input, "_result", &response.image)?;
    save_base64_png(input, "_processed", &response.processed_image)?;
    Ok(())
}

async fn run_compare(client: &reqwest::Client, url: &str, input: &Path) -> Result<()> {
    let endpoint = format!("{url}/compare-methods");
    let payload = post_image(client, &endpoint, input).await?;
    let response: CompareResponse =
        serde_json::from_value(payload).context("unexpected response shape")?;

    println!(
        "  chroma distance  : {:.2}",
        response.comparison.chroma.euclidean_distance
    );
    println!(
        "  matting distance : {:.2}",
        response.comparison.matting.euclidean_distance
    );
    println!(
        "  better method    : {} (difference {:.2}, {:.2}s)",
        response.comparison.better_method.as_deref().unwrap_or("tie"),
        response.comparison.difference,
        response.processing_time_seconds
    );
    save_base64_png(input, "_result", &response.processed_image)?;
    save_base64_png(input, "_feature", &response.feature_image)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    for input in &args.inputs {
        println!("posting {}...", input.display());
        let result = if args.compare {
            run_compare(&client, &args.url, input).await
        } else {
            run_single(&client, &args.url, input).await
        };
        if let Err(e) = result {
            eprintln!("  failed: {e:#}");
        }
    }

    Ok(())
}
