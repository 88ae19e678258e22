//! `~/.launchpad/config.toml` loading.
//!
//! Every key is optional; anything absent keeps the composer default.

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use launchpad_composer::ComposerConfig;
use launchpad_protocol::ImageMimeType;
use toml_edit::DocumentMut;
use toml_edit::Table as TomlTable;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        Ok(Self::new(default_config_path(&launchpad_home()?)))
    }

    pub fn load_composer_config(&self) -> anyhow::Result<ComposerConfig> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(ComposerConfig::default());
        };
        let doc = content
            .parse::<DocumentMut>()
            .with_context(|| format!("parse {}", self.path.display()))?;
        apply_document(&doc, ComposerConfig::default())
            .with_context(|| format!("invalid {}", self.path.display()))
    }
}

pub fn launchpad_home() -> anyhow::Result<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        anyhow::bail!("cannot determine home directory for launchpad state");
    };
    Ok(home.join(".launchpad"))
}

fn default_config_path(launchpad_home: &Path) -> PathBuf {
    launchpad_home.join("config.toml")
}

fn apply_document(
    doc: &DocumentMut,
    mut config: ComposerConfig,
) -> anyhow::Result<ComposerConfig> {
    if let Some(enabled) = read_bool(doc.as_table(), "agent_mode_enabled")? {
        config.agent_mode_enabled = enabled;
    }

    if let Some(placeholder) = read_table(doc, "placeholder")? {
        if let Some(phrases) = read_string_array(placeholder, "phrases")? {
            config.placeholder_phrases = phrases;
        }
        let timing = &mut config.placeholder_timing;
        if let Some(ms) = read_u64(placeholder, "type_interval_ms")? {
            timing.type_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = read_u64(placeholder, "pause_ms")? {
            timing.pause = Duration::from_millis(ms);
        }
        if let Some(ms) = read_u64(placeholder, "erase_interval_ms")? {
            timing.erase_interval = Duration::from_millis(ms);
        }
    }

    if let Some(attachments) = read_table(doc, "attachments")? {
        if let Some(count) = read_u64(attachments, "max_count")? {
            config.attachment_limits.max_attachments =
                usize::try_from(count).context("max_count is too large")?;
        }
        if let Some(bytes) = read_u64(attachments, "max_file_bytes")? {
            config.attachment_limits.max_file_bytes = bytes;
        }
        if let Some(types) = read_string_array(attachments, "accepted_types")? {
            config.accepted_mime_types = types
                .iter()
                .map(|raw| {
                    ImageMimeType::from_mime(raw)
                        .with_context(|| format!("unsupported image type `{raw}`"))
                })
                .collect::<anyhow::Result<_>>()?;
        }
    }

    if let Some(input) = read_table(doc, "input")?
        && let Some(rows) = read_u64(input, "max_rows")?
    {
        config.max_input_rows = u16::try_from(rows).context("max_rows must fit in 16 bits")?;
    }

    Ok(config)
}

fn read_table<'a>(doc: &'a DocumentMut, key: &str) -> anyhow::Result<Option<&'a TomlTable>> {
    match doc.get(key) {
        None => Ok(None),
        Some(item) => item
            .as_table()
            .map(Some)
            .with_context(|| format!("`{key}` must be a table")),
    }
}

fn read_bool(table: &TomlTable, key: &str) -> anyhow::Result<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(item) => item
            .as_bool()
            .map(Some)
            .with_context(|| format!("`{key}` must be a boolean")),
    }
}

fn read_u64(table: &TomlTable, key: &str) -> anyhow::Result<Option<u64>> {
    let Some(item) = table.get(key) else {
        return Ok(None);
    };
    let value = item
        .as_integer()
        .with_context(|| format!("`{key}` must be an integer"))?;
    u64::try_from(value)
        .map(Some)
        .with_context(|| format!("`{key}` must not be negative"))
}

fn read_string_array(table: &TomlTable, key: &str) -> anyhow::Result<Option<Vec<String>>> {
    let Some(item) = table.get(key) else {
        return Ok(None);
    };
    let array = item
        .as_array()
        .with_context(|| format!("`{key}` must be an array"))?;
    array
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(ToString::to_string)
                .with_context(|| format!("`{key}` entries must be strings"))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .map(Some)
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
