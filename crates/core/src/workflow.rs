//! ComfyUI workflow templates.
//!
//! A workflow file is ComfyUI's API-format graph: a JSON object mapping
//! node IDs to `{ "class_type", "inputs", "_meta": { "title" } }`. Nodes
//! whose title follows the `MCP_*` convention get a [`NodeRole`], and a
//! role index is built once when the template is parsed.
//!
//! [`WorkflowTemplate::parameterize`] writes request values into a copy of
//! the graph; the template itself stays untouched so one parsed file can
//! serve any number of requests.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Node titles recognised in workflow files.
pub const TITLE_POSITIVE_PROMPT: &str = "MCP_INPUT_PROMPT";
pub const TITLE_NEGATIVE_PROMPT: &str = "MCP_INPUT_NEGATIVE_PROMPT";
pub const TITLE_SEED: &str = "MCP_SEED";
pub const TITLE_RESOLUTION: &str = "MCP_RESOLUTION";
pub const TITLE_DENOISE: &str = "MCP_DENOISE";
pub const TITLE_INPUT_IMAGE: &str = "MCP_INPUT_IMAGE";
pub const TITLE_OUTPUT_IMAGE: &str = "MCP_OUTPUT_IMAGE";

/// Input keys tried, in order, for each writable role. The first key
/// already present on the node is overwritten; if none is, the first
/// key is inserted.
const TEXT_KEYS: &[&str] = &["text", "Text"];
const SEED_KEYS: &[&str] = &["value", "Value", "seed", "noise_seed"];
const DENOISE_KEYS: &[&str] = &["value", "denoise"];
const IMAGE_KEYS: &[&str] = &["image"];

/// The part a node plays in parameterisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    PositivePrompt,
    NegativePrompt,
    Seed,
    Resolution,
    Denoise,
    InputImage,
    OutputImage,
}

impl NodeRole {
    pub fn from_title(title: &str) -> Option<Self> {
        match title {
            TITLE_POSITIVE_PROMPT => Some(Self::PositivePrompt),
            TITLE_NEGATIVE_PROMPT => Some(Self::NegativePrompt),
            TITLE_SEED => Some(Self::Seed),
            TITLE_RESOLUTION => Some(Self::Resolution),
            TITLE_DENOISE => Some(Self::Denoise),
            TITLE_INPUT_IMAGE => Some(Self::InputImage),
            TITLE_OUTPUT_IMAGE => Some(Self::OutputImage),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::PositivePrompt => TITLE_POSITIVE_PROMPT,
            Self::NegativePrompt => TITLE_NEGATIVE_PROMPT,
            Self::Seed => TITLE_SEED,
            Self::Resolution => TITLE_RESOLUTION,
            Self::Denoise => TITLE_DENOISE,
            Self::InputImage => TITLE_INPUT_IMAGE,
            Self::OutputImage => TITLE_OUTPUT_IMAGE,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// `_meta` block of a node. Only the title matters here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One node of an API-format workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub class_type: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowNode {
    pub fn title(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.title.as_deref())
    }

    fn set_input(&mut self, keys: &[&str], value: Value) {
        let key = keys
            .iter()
            .find(|k| self.inputs.contains_key(**k))
            .unwrap_or(&keys[0]);
        self.inputs.insert((*key).to_string(), value);
    }
}

/// Values injected into a workflow for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowParams {
    pub positive_prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub seed: Option<i64>,
    pub resolution: Option<(u32, u32)>,
    pub denoise: Option<f64>,
    /// Name of an image already uploaded to the backend.
    pub input_image: Option<String>,
}

/// A parsed workflow graph plus its role index.
#[derive(Debug, Clone)]
pub struct WorkflowTemplate {
    nodes: BTreeMap<String, WorkflowNode>,
    roles: HashMap<NodeRole, String>,
}

impl WorkflowTemplate {
    /// Parse an API-format workflow from JSON text.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CoreError::Validation(format!("Workflow is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Build a template from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        if !value.is_object() {
            return Err(CoreError::Validation(
                "Workflow must be a JSON object mapping node IDs to nodes".to_string(),
            ));
        }
        let nodes: BTreeMap<String, WorkflowNode> = serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("Malformed workflow node: {e}")))?;

        let mut roles = HashMap::new();
        for (id, node) in &nodes {
            if let Some(role) = node.title().and_then(NodeRole::from_title) {
                // BTreeMap order makes the lowest node ID win on duplicates.
                roles.entry(role).or_insert_with(|| id.clone());
            }
        }

        Ok(Self { nodes, roles })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// ID of the node playing `role`, if any.
    pub fn node_for(&self, role: NodeRole) -> Option<&str> {
        self.roles.get(&role).map(String::as_str)
    }

    /// Like [`node_for`](Self::node_for) but a missing node is an error.
    pub fn require(&self, role: NodeRole) -> Result<&str, CoreError> {
        self.node_for(role).ok_or_else(|| {
            CoreError::Validation(format!("Workflow is missing node '{}'", role.title()))
        })
    }

    /// Produce the graph to submit, with `params` written in.
    ///
    /// An input image is a requested feature, so its node is required.
    /// Every other role is optional and silently skipped when absent.
    /// Empty prompts leave the template's text alone.
    pub fn parameterize(&self, params: &WorkflowParams) -> Result<Value, CoreError> {
        let mut nodes = self.nodes.clone();

        if let Some(image) = &params.input_image {
            let id = self.require(NodeRole::InputImage)?;
            set(&mut nodes, id, IMAGE_KEYS, Value::from(image.as_str()));
        }

        let text_inputs = [
            (NodeRole::PositivePrompt, &params.positive_prompt),
            (NodeRole::NegativePrompt, &params.negative_prompt),
        ];
        for (role, text) in text_inputs {
            if let (Some(text), Some(id)) = (text.as_deref().filter(|t| !t.is_empty()), self.node_for(role)) {
                set(&mut nodes, id, TEXT_KEYS, Value::from(text));
            }
        }

        if let (Some(seed), Some(id)) = (params.seed, self.node_for(NodeRole::Seed)) {
            set(&mut nodes, id, SEED_KEYS, Value::from(seed));
        }

        if let (Some((width, height)), Some(id)) = (params.resolution, self.node_for(NodeRole::Resolution)) {
            set(&mut nodes, id, &["width"], Value::from(width));
            set(&mut nodes, id, &["height"], Value::from(height));
        }

        if let (Some(denoise), Some(id)) = (params.denoise, self.node_for(NodeRole::Denoise)) {
            set(&mut nodes, id, DENOISE_KEYS, Value::from(denoise));
        }

        serde_json::to_value(nodes)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize workflow: {e}")))
    }
}

fn set(nodes: &mut BTreeMap<String, WorkflowNode>, id: &str, keys: &[&str], value: Value) {
    if let Some(node) = nodes.get_mut(id) {
        node.set_input(keys, value);
    }
}

/// Reject workflow file names that could escape the workflows directory.
pub fn validate_workflow_filename(filename: &str) -> Result<(), CoreError> {
    if filename.trim().is_empty() {
        return Err(CoreError::Validation(
            "Workflow filename must not be empty".to_string(),
        ));
    }
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(CoreError::Validation(format!(
            "Invalid characters in workflow filename: {filename}"
        )));
    }
    Ok(())
}
