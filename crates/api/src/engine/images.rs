//! Source-image retrieval and output-image storage.

use std::path::Path;

use genimage_core::urls::sanitize_output_filename;

use super::error::ToolError;

/// Name used for an uploaded source image whose URL has no usable file name.
const FALLBACK_SOURCE_NAME: &str = "source.png";

/// Download an image over HTTP.
pub async fn download_image(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, ToolError> {
    let failed = |message: String| ToolError::Download {
        url: url.to_string(),
        message,
    };

    let response = http.get(url).send().await.map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }
    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    tracing::debug!(url, bytes = bytes.len(), "Downloaded image");
    Ok(bytes.to_vec())
}

/// Fetch the image an upscale starts from.
///
/// URLs under our own public output base are read straight from
/// `outputs_dir`; anything else is downloaded. Returns a file name to
/// upload under, prefixed so concurrent uploads cannot collide.
pub async fn fetch_source_image(
    http: &reqwest::Client,
    outputs_dir: &Path,
    output_url_base: Option<&str>,
    url: &str,
) -> Result<(String, Vec<u8>), ToolError> {
    let bytes = match output_url_base.and_then(|base| local_output_name(base, url)) {
        Some(name) => {
            let name = sanitize_output_filename(&name)?;
            tracing::debug!(file = %name, "Reading source image from outputs");
            tokio::fs::read(outputs_dir.join(&name)).await.map_err(|e| ToolError::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?
        }
        None => download_image(http, url).await?,
    };

    let name = format!("mcp_{}_{}", short_uuid(), source_file_name(url));
    Ok((name, bytes))
}

/// Write a rendered image into `outputs_dir` and return the stored name.
///
/// ComfyUI instances number their outputs independently, so the stored
/// name carries a random prefix.
pub async fn save_output(outputs_dir: &Path, filename: &str, bytes: &[u8]) -> Result<String, ToolError> {
    let name = format!("{}_{}", short_uuid(), sanitize_output_filename(filename)?);
    tokio::fs::create_dir_all(outputs_dir).await?;
    tokio::fs::write(outputs_dir.join(&name), bytes).await?;
    tracing::info!(file = %name, bytes = bytes.len(), "Saved output image");
    Ok(name)
}

/// The file name part of `url` if it points directly under `base`.
fn local_output_name(base: &str, url: &str) -> Option<String> {
    let rest = url.strip_prefix(base.trim_end_matches('/'))?.strip_prefix('/')?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
}

fn short_uuid() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn source_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    sanitize_output_filename(last).unwrap_or_else(|_| FALLBACK_SOURCE_NAME.to_string())
}
