//! Locating generated images in a `/history/{prompt_id}` response.
//!
//! History has the shape
//! `{"<prompt_id>": {"outputs": {"<node_id>": {"images": [{filename, subfolder, type}]}}}}`.

use serde::Deserialize;
use serde_json::Value;

/// One file reference as reported by ComfyUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    #[serde(rename = "type", default = "default_folder_type")]
    pub folder_type: String,
}

fn default_folder_type() -> String {
    "output".to_string()
}

/// First image of a node's output, if it has one.
fn first_image(node_output: &Value) -> Option<ImageRef> {
    node_output
        .get("images")?
        .as_array()?
        .iter()
        .find_map(|img| serde_json::from_value::<ImageRef>(img.clone()).ok())
}

/// Pick the image to deliver for a prompt.
///
/// The `preferred_node` (the workflow's output-image node) wins when it
/// produced an image. Otherwise the first node with a saved (`output`)
/// image is used, then any node with an image at all.
pub fn find_output_image(
    history: &Value,
    prompt_id: &str,
    preferred_node: Option<&str>,
) -> Option<ImageRef> {
    let outputs = history.get(prompt_id)?.get("outputs")?.as_object()?;

    if let Some(image) = preferred_node
        .and_then(|node| outputs.get(node))
        .and_then(first_image)
    {
        return Some(image);
    }

    let images: Vec<ImageRef> = outputs.values().filter_map(first_image).collect();
    images
        .iter()
        .find(|img| img.folder_type == "output")
        .or_else(|| images.first())
        .cloned()
}
