use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory a tempfile for `path` should live in, so the final rename stays
/// on one filesystem.
fn temp_dir_for(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting the comment link table.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = temp_dir_for(path);
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Fill a tempfile with `fill` and move it to `path` unless `path` exists.
///
/// The content is complete before the file appears under its final name, and
/// the no-clobber rename is the existence check. A failed `fill` leaves
/// nothing behind.
fn create_new_with<F>(path: &Path, fill: F) -> Result<bool>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    if path.exists() {
        return Ok(false);
    }
    let dir = temp_dir_for(path);
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(&mut tmp)?;
    tmp.as_file().sync_all()?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error.into()),
    }
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_new(path: &Path, data: &[u8]) -> Result<bool> {
    create_new_with(path, |f| f.write_all(data))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(std::io::Error::other)?
}

/// [`write_new`] off the async runtime.
pub async fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    let path = path.to_path_buf();
    let data = data.to_vec();
    blocking(move || write_new(&path, &data)).await
}

/// [`atomic_write`] off the async runtime.
pub async fn persist(path: &Path, data: Vec<u8>) -> Result<()> {
    let path = path.to_path_buf();
    blocking(move || atomic_write(&path, &data)).await
}

/// Write `data` to `path` readable by the owner only.
pub async fn write_private(path: &Path, data: Vec<u8>) -> Result<()> {
    let path: PathBuf = path.to_path_buf();
    blocking(move || {
        atomic_write(&path, &data)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.yml");
        atomic_write(&path, b"/foo/: 1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "/foo/: 1");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/refs.yml");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn write_if_missing_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive/2021/03/index.html");
        assert!(write_if_missing(&path, b"first").await.unwrap());
        assert!(!write_if_missing(&path, b"second").await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn interrupted_write_leaves_no_file_and_can_be_retried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags/go.md");

        let result = create_new_with(&path, |f| {
            f.write_all(b"---\nlay")?;
            Err(std::io::Error::other("no space left on device"))
        });
        assert!(result.is_err());
        assert!(!path.exists());
        let leftovers = std::fs::read_dir(dir.path().join("tags")).unwrap().count();
        assert_eq!(leftovers, 0, "tempfile must be cleaned up");

        assert!(write_new(&path, b"---\nlayout: tag\n---\n").unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "---\nlayout: tag\n---\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_private_sets_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        write_private(&path, b"https://t:@github.com".to_vec())
            .await
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
