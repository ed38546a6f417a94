use std::path::Path;

use genimage_core::workflow::{validate_workflow_filename, WorkflowTemplate};

use super::error::ToolError;

/// Read and parse a render type's workflow file from `dir`.
pub async fn load_template(dir: &Path, filename: &str) -> Result<WorkflowTemplate, ToolError> {
    validate_workflow_filename(filename)?;

    let text = match tokio::fs::read_to_string(dir.join(filename)).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::domain(format!("Workflow file '{filename}' not found.")));
        }
        Err(e) => return Err(ToolError::Storage(e)),
    };

    let template = WorkflowTemplate::parse(&text)?;
    tracing::debug!(filename, nodes = template.node_count(), "Loaded workflow template");
    Ok(template)
}
