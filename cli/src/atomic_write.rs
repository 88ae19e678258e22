use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` so readers see either the old file or the
/// new one, never a partial write. Missing parent directories are created.
pub fn persist_atomically(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path.display()))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(parent).context("stage temp file")?;
    staged.write_all(contents).context("write staged file")?;
    staged.as_file().sync_all().context("sync staged file")?;
    staged
        .persist(path)
        .map_err(|err| anyhow::Error::new(err.error))
        .with_context(|| format!("move staged file to {}", path.display()))?;
    Ok(())
}
