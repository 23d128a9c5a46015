//! Fake set-file mode.
//!
//! Instead of touching the device, resources append their lines to a local
//! file that can later be loaded by hand or with `junos_null_commit_file`.

use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{ErrorContext, Result};

/// Append lines to `path`, creating it with `permission` when missing
pub async fn append_set_lines(path: &Path, lines: &[String], permission: u32) -> Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    options.mode(permission);
    #[cfg(not(unix))]
    let _ = permission;

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to open set file {}", path.display()))?;

    let mut content = lines.join("\n");
    content.push('\n');
    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("Failed to write set file {}", path.display()))?;
    file.flush()
        .await
        .with_context(|| format!("Failed to write set file {}", path.display()))?;

    debug!(file = %path.display(), lines = lines.len(), "Appended set lines");
    Ok(())
}

/// Read the non-blank lines of a set file
pub async fn read_set_lines(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read set file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Empty a set file, keeping it in place
pub async fn truncate_set_file(path: &Path) -> Result<()> {
    OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to truncate set file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.set");

        append_set_lines(&path, &["set vlans v10 vlan-id 10".to_string()], 0o600)
            .await
            .unwrap();
        append_set_lines(&path, &["delete vlans v20".to_string()], 0o600)
            .await
            .unwrap();

        let lines = read_set_lines(&path).await.unwrap();
        assert_eq!(lines, vec!["set vlans v10 vlan-id 10", "delete vlans v20"]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }

        truncate_set_file(&path).await.unwrap();
        assert!(read_set_lines(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_set_lines(Path::new("/nonexistent/fake.set"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read set file"));
    }
}
