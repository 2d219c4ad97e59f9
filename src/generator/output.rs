use std::path::PathBuf;

use super::GenerateError;

/// Filename for a persisted configuration script
pub fn config_filename(hostname: &str, vendor: &str) -> String {
    format!("{}_{}_config.txt", hostname, vendor)
}

/// Reject names that could escape the output directory or break a shell.
/// Same character policy the config server applies to served filenames.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 253
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
        && !name.contains("..")
}

/// Write a generated script to `<output_dir>/<hostname>_<vendor>_config.txt`,
/// creating the directory if needed. Returns the path written.
pub async fn save_config(
    output_dir: &str,
    hostname: &str,
    vendor: &str,
    content: &str,
) -> Result<PathBuf, GenerateError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| GenerateError::Io(format!("failed to create {}: {}", output_dir, e)))?;

    let path = PathBuf::from(output_dir).join(config_filename(hostname, vendor));
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| GenerateError::Io(format!("failed to write {}: {}", path.display(), e)))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_filename() {
        assert_eq!(
            config_filename("SW-HQ-01", "cisco"),
            "SW-HQ-01_cisco_config.txt"
        );
    }

    #[test]
    fn test_is_safe_name() {
        assert!(is_safe_name("SW-HQ-01"));
        assert!(is_safe_name("edge_router.lab"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name("../etc/passwd"));
        assert!(!is_safe_name("host/name"));
        assert!(!is_safe_name("host name"));
        assert!(!is_safe_name("host;rm"));
    }

    #[tokio::test]
    async fn test_save_config_creates_directory_and_file() {
        let dir = std::env::temp_dir().join(format!("confsmith-test-{}", std::process::id()));
        let dir_str = dir.to_str().unwrap().to_string();

        let path = save_config(&dir_str, "SW-01", "cisco", "hostname SW-01\n")
            .await
            .unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "hostname SW-01\n");
        assert!(path.ends_with("SW-01_cisco_config.txt"));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
