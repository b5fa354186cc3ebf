//! End-to-end run orchestration: scan, extract, batch, infer, parse,
//! apply.
//!
//! Failure isolation is the organizing rule. A file that cannot be read
//! or applied is skipped, a batch whose inference or parse fails is
//! skipped, and the run always reaches its summary.

use anyhow::Context;
use crate::applier::{self, ApplyOptions};
use crate::cleaner::StopwordCleaner;
use crate::config::AppConfig;
use crate::models::{RunSummary, TagRecord, TagValue};
use crate::{extractor, parser, planner, scanner, template};
use providers::llama_server::{LlamaServerConfig, LlamaServerProvider};
use providers::noop::NoopProvider;
use providers::{LlmProvider, ProviderRegistry, SamplingConfig};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Run the full pipeline once over the configured library.
pub async fn run(config: &AppConfig, registry: &ProviderRegistry) -> anyhow::Result<RunSummary> {
    let output_dir = Path::new(&config.library.output_dir);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let cleaner = StopwordCleaner::new(&config.cleaner.stopwords)?;
    let source_dir = Path::new(&config.library.source_dir);
    let files = scanner::scan(source_dir, &config.library.exclude)?;

    let mut summary = RunSummary {
        scanned: files.len(),
        applied: 0,
    };
    if files.is_empty() {
        info!(dir = %source_dir.display(), "no mp3 files found");
        return Ok(summary);
    }

    let records: Vec<TagRecord> = files
        .iter()
        .filter_map(|path| extractor::extract(path, &config.tags.names, &cleaner))
        .collect();

    // No provider is not fatal: the run still scans and reports, every
    // batch is just skipped.
    let provider = match registry.llm(None) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(error = %e, "model provider unavailable, all batches will be skipped");
            None
        }
    };
    let sampling = SamplingConfig::default();
    let apply_opts = ApplyOptions {
        output_dir,
        remove_artwork: config.artwork.remove,
    };

    for batch in planner::plan(&records, config.batch.chunk_size) {
        let Some(provider) = provider.as_deref() else {
            continue;
        };
        let Some(raw) = infer_batch(provider, batch, &config.prompt.system, &sampling).await
        else {
            continue;
        };
        persist_raw_response(&config.debug.response_path, &raw);

        let Some(corrections) = parser::parse(&raw) else {
            warn!(
                batch_len = batch.len(),
                "response did not decode, skipping batch"
            );
            continue;
        };
        if corrections.len() != batch.len() {
            warn!(
                expected = batch.len(),
                got = corrections.len(),
                "response length mismatch, pairing up to the shorter side"
            );
        }

        for (record, correction) in batch.iter().zip(corrections.iter()) {
            let plan: Vec<(String, TagValue)> = config
                .tags
                .names
                .iter()
                .map(|name| (name.clone(), correction.field(name)))
                .collect();

            // Rename placeholders source the three required fields only;
            // any other placeholder hits the fallback below.
            let required = [
                ("artist", correction.field("artist")),
                ("title", correction.field("title")),
                ("album", correction.field("album")),
            ];
            let fields: HashMap<&str, &str> =
                required.iter().map(|(name, value)| (*name, value.render())).collect();
            let target_name = match template::render(&config.rename.template, &fields) {
                Ok(name) => name,
                Err(e) => {
                    warn!(
                        file = %record.filename,
                        error = %e,
                        "rename template failed, keeping original name"
                    );
                    record.filename.clone()
                }
            };

            let source = source_dir.join(&record.filename);
            if applier::apply(&source, &target_name, &plan, &apply_opts) {
                summary.applied += 1;
            }
        }
    }

    info!(
        scanned = summary.scanned,
        applied = summary.applied,
        "run complete"
    );
    Ok(summary)
}

/// One inference call for one batch. Any provider failure is logged and
/// collapses to `None` so the caller skips the batch.
async fn infer_batch(
    provider: &dyn LlmProvider,
    batch: &[TagRecord],
    system_prompt: &str,
    sampling: &SamplingConfig,
) -> Option<String> {
    let payload = match serde_json::to_string_pretty(batch) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "could not serialize batch payload");
            return None;
        }
    };
    let prompt = format!("[INST]\n{system_prompt}\n\n{payload}\n[/INST]");

    match provider.complete(&prompt, sampling).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(batch_len = batch.len(), error = %e, "inference failed, skipping batch");
            None
        }
    }
}

/// Overwrite the debug dump with the latest raw response. Best effort; a
/// write failure never affects the run.
fn persist_raw_response(path: &str, raw: &str) {
    if let Err(e) = fs::write(path, raw) {
        warn!(path, error = %e, "could not persist raw response");
    }
}

/// Wire up the provider registry from config. The noop provider is always
/// registered; llama-server joins when a base URL is configured, with an
/// optional bearer token taken from `LLM_API_KEY`.
pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new().with_llm("noop", Arc::new(NoopProvider));

    if let Some(base_url) = &config.model.base_url {
        let provider = LlamaServerProvider::new(LlamaServerConfig {
            base_url: base_url.clone(),
            model: config.model.model.clone(),
            api_key: std::env::var("LLM_API_KEY").ok(),
        });
        registry = registry.with_llm("llama-server", Arc::new(provider));
    }

    registry.set_preferred_llm(&config.model.provider)
}
