use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub library: LibraryConfig,
    pub tags: TagConfig,
    pub model: ModelConfig,
    pub prompt: PromptConfig,
    pub rename: RenameConfig,
    pub batch: BatchConfig,
    #[serde(default)]
    pub cleaner: CleanerConfig,
    #[serde(default)]
    pub artwork: ArtworkConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory scanned for candidate MP3 files (depth 1).
    pub source_dir: String,
    /// Directory receiving renamed, retagged copies. Created on startup;
    /// source files are never modified.
    pub output_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagConfig {
    /// Tag set extracted from every file and written back on apply,
    /// in this order.
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Preferred provider name: "llama-server" or "noop".
    pub provider: String,
    /// Base URL of an OpenAI-compatible completion endpoint.
    pub base_url: Option<String>,
    /// Model name forwarded to the endpoint, when it hosts several.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub system: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameConfig {
    /// Filename template with `{artist}`, `{title}`, `{album}` placeholders.
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records per inference call; the last batch may be shorter.
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanerConfig {
    #[serde(default)]
    pub stopwords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtworkConfig {
    /// Strip embedded images from every applied file via ffmpeg.
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Where the raw model response of the most recent batch is written.
    /// Overwritten each batch, not accumulated.
    #[serde(default = "default_response_path")]
    pub response_path: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            response_path: default_response_path(),
        }
    }
}

fn default_response_path() -> String {
    "last_response.txt".to_string()
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg: AppConfig = settings
        .build()
        .context("load config")?
        .try_deserialize()
        .context("deserialize config")?;
    cfg.validate()?;
    Ok(cfg)
}

impl AppConfig {
    /// Fail fast on values the pipeline cannot run with. A bad config
    /// aborts before any file is touched.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.library.source_dir.is_empty() {
            bail!("library.source_dir must not be empty");
        }
        if self.library.output_dir.is_empty() {
            bail!("library.output_dir must not be empty");
        }
        if self.batch.chunk_size == 0 {
            bail!("batch.chunk_size must be a positive integer");
        }
        if self.tags.names.is_empty() {
            bail!("tags.names must list at least one tag");
        }
        let mut seen = HashSet::new();
        for name in &self.tags.names {
            if !seen.insert(name) {
                bail!("tags.names contains duplicate tag {name:?}");
            }
        }
        if self.rename.template.is_empty() {
            bail!("rename.template must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            library: LibraryConfig {
                source_dir: "music".into(),
                output_dir: "music_recode".into(),
                exclude: vec![],
            },
            tags: TagConfig {
                names: vec!["artist".into(), "title".into(), "album".into()],
            },
            model: ModelConfig {
                provider: "noop".into(),
                base_url: None,
                model: None,
            },
            prompt: PromptConfig {
                system: "Fix the metadata.".into(),
            },
            rename: RenameConfig {
                template: "{artist} - {title}.mp3".into(),
            },
            batch: BatchConfig { chunk_size: 5 },
            cleaner: CleanerConfig::default(),
            artwork: ArtworkConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut cfg = valid_config();
        cfg.batch.chunk_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_tags_rejected() {
        let mut cfg = valid_config();
        cfg.tags.names.push("artist".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_tag_set_rejected() {
        let mut cfg = valid_config();
        cfg.tags.names.clear();
        assert!(cfg.validate().is_err());
    }
}
