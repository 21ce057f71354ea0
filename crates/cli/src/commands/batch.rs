//! `rustedguard batch` governs one message per line of a file.
//!
//! Runs are independent, so they go to blocking tasks in parallel, bounded
//! by `batch.max_parallel`. Results print in input order.

use crate::assessment::{Assessment, assess, audit_logger, new_trace_id};
use rustedguard_config::AppConfig;
use rustedguard_core::TraceId;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub async fn run(
    config: AppConfig,
    file: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let messages = messages(&content);
    let batch_id = new_trace_id()?;

    tracing::info!(batch = %batch_id, count = messages.len(), "Starting batch");
    let assessments = assess_all(Arc::new(config), &batch_id, messages).await?;

    let mut governed = 0;
    for (n, assessment) in assessments.iter().enumerate() {
        if assessment.is_governed() {
            governed += 1;
        }
        if json {
            println!("{}", serde_json::to_string(assessment)?);
        } else {
            println!("[{}] {}: {}", n + 1, assessment.label(), assessment.rendered());
        }
    }

    if !json {
        println!();
        println!("{governed}/{} governed", assessments.len());
    }
    Ok(())
}

/// Non-blank lines, untrimmed; the input guard trims each one.
fn messages(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Assess every message, at most `batch.max_parallel` at a time. Message
/// `n` is traced as `<batch_id>-<n>`.
pub async fn assess_all(
    config: Arc<AppConfig>,
    batch_id: &TraceId,
    messages: Vec<String>,
) -> Result<Vec<Assessment>, Box<dyn std::error::Error>> {
    let audit = Arc::new(audit_logger(&config));
    let permits = Arc::new(Semaphore::new(config.batch.max_parallel));
    let mut handles = Vec::with_capacity(messages.len());

    for (n, message) in messages.into_iter().enumerate() {
        let trace_id = TraceId::new(format!("{batch_id}-{}", n + 1))?;
        let permit = permits.clone().acquire_owned().await?;
        let config = config.clone();
        let audit = audit.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            assess(&config, (*audit).as_ref(), trace_id, &message, None)
        }));
    }

    let mut assessments = Vec::with_capacity(handles.len());
    for handle in handles {
        assessments.push(handle.await?);
    }
    Ok(assessments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        let content = "How do I boil an egg?\n\n   \nI want to quit\n";
        assert_eq!(messages(content), ["How do I boil an egg?", "I want to quit"]);
    }

    #[tokio::test]
    async fn results_keep_input_order() {
        let mut config = AppConfig::default();
        config.batch.max_parallel = 2;
        let batch_id = TraceId::new("batch").unwrap();
        let messages: Vec<String> = (0..12)
            .map(|i| {
                if i % 3 == 0 {
                    "\u{0007}".to_string()
                } else {
                    format!("How do I boil {i} eggs?")
                }
            })
            .collect();

        let results = assess_all(Arc::new(config), &batch_id, messages).await.unwrap();
        assert_eq!(results.len(), 12);
        for (i, a) in results.iter().enumerate() {
            assert_eq!(a.is_governed(), i % 3 != 0, "message {i}");
            let trace = match a {
                Assessment::Governed { trace_id, .. }
                | Assessment::Failed { trace_id, .. }
                | Assessment::Rejected { trace_id, .. } => trace_id,
            };
            assert_eq!(trace.as_str(), format!("batch-{}", i + 1));
        }
    }

    #[tokio::test]
    async fn batch_matches_single_runs() {
        let config = Arc::new(AppConfig::default());
        let batch_id = TraceId::new("same").unwrap();
        let text = "I'm going to drive home after six beers tonight";

        let batch = assess_all(config.clone(), &batch_id, vec![text.to_string()])
            .await
            .unwrap();
        let single = assess(&config, None, TraceId::new("same-1").unwrap(), text, None);
        assert_eq!(
            serde_json::to_value(&batch[0]).unwrap(),
            serde_json::to_value(&single).unwrap()
        );
    }
}
