//! Repository for the append-only `generation_logs` table.

use std::collections::HashMap;

use genimage_core::generation::GenerationStatus;
use sqlx::SqlitePool;

use crate::models::generation_log::{GenerationLog, GenerationStats, NewGenerationLog, UsageCount};

/// Column list for `generation_logs` queries.
const COLUMNS: &str = "\
    id, tool_name, positive_prompt, negative_prompt, render_type_name, style_names, \
    aspect_ratio, seed, llm_enhanced, status, duration_ms, error_message, \
    image_filename, comfyui_instance_id, created_at";

/// Default page size for [`GenerationLogRepo::list`].
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Upper bound on the page size.
pub const MAX_PAGE_SIZE: i64 = 500;

pub struct GenerationLogRepo;

impl GenerationLogRepo {
    pub async fn create(
        pool: &SqlitePool,
        input: &NewGenerationLog,
    ) -> Result<GenerationLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_logs \
                (tool_name, positive_prompt, negative_prompt, render_type_name, style_names, \
                 aspect_ratio, seed, llm_enhanced, status, duration_ms, error_message, \
                 image_filename, comfyui_instance_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationLog>(&query)
            .bind(&input.tool_name)
            .bind(&input.positive_prompt)
            .bind(&input.negative_prompt)
            .bind(&input.render_type_name)
            .bind(input.joined_style_names())
            .bind(&input.aspect_ratio)
            .bind(input.seed)
            .bind(input.llm_enhanced)
            .bind(input.status.as_str())
            .bind(input.duration_ms)
            .bind(&input.error_message)
            .bind(&input.image_filename)
            .bind(input.comfyui_instance_id)
            .fetch_one(pool)
            .await
    }

    /// Newest first. `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub async fn list(
        pool: &SqlitePool,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<GenerationLog>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM generation_logs \
             ORDER BY created_at DESC, id DESC \
             LIMIT ?1 OFFSET ?2"
        );
        sqlx::query_as::<_, GenerationLog>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM generation_logs")
            .fetch_one(pool)
            .await
    }

    /// Aggregates over successful generations.
    pub async fn stats(pool: &SqlitePool) -> Result<GenerationStats, sqlx::Error> {
        let success = GenerationStatus::Success.as_str();

        let (total_successful, llm_enhanced): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN llm_enhanced THEN 1 ELSE 0 END), 0) \
             FROM generation_logs WHERE status = ?1",
        )
        .bind(success)
        .fetch_one(pool)
        .await?;

        let render_type_usage = sqlx::query_as::<_, UsageCount>(
            "SELECT render_type_name AS name, COUNT(*) AS count \
             FROM generation_logs \
             WHERE status = ?1 AND render_type_name IS NOT NULL \
             GROUP BY render_type_name \
             ORDER BY count DESC, name ASC",
        )
        .bind(success)
        .fetch_all(pool)
        .await?;

        let joined: Vec<String> = sqlx::query_scalar(
            "SELECT style_names FROM generation_logs \
             WHERE status = ?1 AND style_names IS NOT NULL AND style_names <> ''",
        )
        .bind(success)
        .fetch_all(pool)
        .await?;

        Ok(GenerationStats {
            total_successful,
            llm_enhanced,
            render_type_usage,
            style_usage: count_style_usage(&joined),
        })
    }
}

/// Tally comma-joined style name lists, most used first.
fn count_style_usage(joined: &[String]) -> Vec<UsageCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for name in joined.iter().flat_map(|s| s.split(',')).map(str::trim) {
        if !name.is_empty() {
            *counts.entry(name).or_default() += 1;
        }
    }
    let mut usage: Vec<UsageCount> = counts
        .into_iter()
        .map(|(name, count)| UsageCount {
            name: name.to_string(),
            count,
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    usage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_usage_splits_and_sorts() {
        let joined = vec![
            "anime, noir".to_string(),
            "noir".to_string(),
            " , watercolor".to_string(),
        ];
        let usage = count_style_usage(&joined);
        assert_eq!(
            usage,
            vec![
                UsageCount { name: "noir".into(), count: 2 },
                UsageCount { name: "anime".into(), count: 1 },
                UsageCount { name: "watercolor".into(), count: 1 },
            ]
        );
    }
}
