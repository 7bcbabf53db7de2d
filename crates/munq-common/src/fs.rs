use anyhow::Result;
use log::{debug, error};
use std::path::{Path, PathBuf};

/// Writes `contents` to `path`, replacing any file already there.
///
/// The bytes first land in a transient sibling (`.<name>.part`) that is renamed
/// into place once complete, so a failed write never leaves a truncated file
/// behind. The transient file is removed on every failure path.
/// ```rust,no_run
/// # async fn run() -> anyhow::Result<()> {
/// let saved = munq_common::save("stock_data.csv", b"date,close\n2021-01-04,729.77").await?;
/// # Ok(())
/// # }
/// ```
pub async fn save(path: impl AsRef<Path>, contents: &[u8]) -> Result<PathBuf> {
    let path = path.as_ref();
    let part = part_path(path)?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let written = async {
        tokio::fs::write(&part, contents).await?;
        tokio::fs::rename(&part, path).await
    }
    .await;

    if let Err(e) = written {
        error!("failed writing {}: {e}", path.display());
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e.into());
    }

    debug!("{} written ({} bytes)", path.display(), contents.len());
    Ok(path.to_path_buf())
}

fn part_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("{} does not name a file", path.display()))?;
    let mut part = std::ffi::OsString::from(".");
    part.push(name);
    part.push(".part");
    Ok(path.with_file_name(part))
}
