//! Command line client for a running image resizer

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use image_resizer::models::{ResizeRequest, ResizeResult};
use image_resizer::utils::cache_key::IMAGE_PATH_PREFIX;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "resize-client")]
#[command(version)]
#[command(about = "Submit resize batches and download resized images")]
struct Cli {
    /// Base URL of the image resizer
    #[arg(short, long, default_value = "http://localhost:8080", env = "RESIZER_URL")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit source URLs for resizing and print the results
    Resize {
        /// Source image URL; repeat for a batch
        #[arg(short, long = "url", required = true)]
        urls: Vec<String>,

        /// Target width, 0 keeps the aspect ratio
        #[arg(short = 'W', long, default_value_t = 0)]
        width: u32,

        /// Target height, 0 keeps the aspect ratio
        #[arg(short = 'H', long, default_value_t = 0)]
        height: u32,

        /// Return immediately and resize in the background
        #[arg(short, long = "async")]
        background: bool,
    },
    /// Download a resized image
    Get {
        /// Image URL, `/v1/image/...` path, or bare image id
        image: String,

        /// Give up after this long
        #[arg(short, long, default_value = "2s", value_parser = humantime::parse_duration)]
        timeout: Duration,

        /// Write the image here instead of reporting its size
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let server = cli.server.trim_end_matches('/');

    match cli.command {
        Command::Resize {
            urls,
            width,
            height,
            background,
        } => resize(&client, server, urls, width, height, background).await,
        Command::Get {
            image,
            timeout,
            output,
        } => get(&client, server, &image, timeout, output).await,
    }
}

async fn resize(
    client: &reqwest::Client,
    server: &str,
    urls: Vec<String>,
    width: u32,
    height: u32,
    is_async: bool,
) -> Result<()> {
    let request = ResizeRequest {
        urls,
        width,
        height,
        is_async: false,
    };

    let response = client
        .post(format!("{server}/v1/resize"))
        .query(&[("async", is_async)])
        .json(&request)
        .send()
        .await
        .context("Failed to reach the resizer")?;

    if response.status() != StatusCode::CREATED {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Resize request rejected ({status}): {body}");
    }

    let results: Vec<ResizeResult> = response
        .json()
        .await
        .context("Failed to decode resize results")?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn get(
    client: &reqwest::Client,
    server: &str,
    image: &str,
    timeout: Duration,
    output: Option<PathBuf>,
) -> Result<()> {
    let url = image_url(server, image);
    let wait = humantime::format_duration(timeout).to_string();

    // The server-side wait is the same deadline, so a slow job reports 408
    // instead of the client timing out first
    let response = client
        .get(&url)
        .query(&[("wait", wait.as_str())])
        .timeout(timeout + Duration::from_millis(500))
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    match response.status() {
        StatusCode::OK => {
            let bytes = response.bytes().await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Saved {} bytes to {}", bytes.len(), path.display());
                }
                None => println!("Image is ready ({} bytes)", bytes.len()),
            }
            Ok(())
        }
        StatusCode::NOT_FOUND => bail!("Image not found: {url}"),
        StatusCode::REQUEST_TIMEOUT => bail!("Image still in progress after {wait}"),
        status => bail!("Unexpected response {status} for {url}"),
    }
}

/// Accept a full URL, an image path, or a bare image id
fn image_url(server: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else if image.starts_with(IMAGE_PATH_PREFIX) {
        format!("{server}{image}")
    } else {
        format!("{server}{IMAGE_PATH_PREFIX}{image}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_forms() {
        let server = "http://localhost:8080";
        assert_eq!(
            image_url(server, "http://cdn/v1/image/x.jpeg"),
            "http://cdn/v1/image/x.jpeg"
        );
        assert_eq!(
            image_url(server, "/v1/image/x.jpeg"),
            "http://localhost:8080/v1/image/x.jpeg"
        );
        assert_eq!(
            image_url(server, "x.jpeg"),
            "http://localhost:8080/v1/image/x.jpeg"
        );
    }
}
