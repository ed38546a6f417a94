//! Key/value settings.

use std::collections::HashMap;

/// Request body for `PUT /settings`: keys to insert or overwrite.
pub type UpsertSettings = HashMap<String, String>;
