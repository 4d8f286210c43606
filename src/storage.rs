//! Object storage access (S3 through the AWS CLI).

use crate::defaults;
use crate::error::{RecapError, Result};
use crate::exec::CommandExecutor;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Format an `s3://bucket/key` URI.
pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

/// Remote key for a local file uploaded under `prefix`: `prefix/basename`.
pub fn object_key(prefix: &str, local: &Path) -> String {
    let name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

/// Trait for copying files to and from a bucket.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy a local file to `bucket/key`.
    async fn put(&self, local: &Path, bucket: &str, key: &str) -> Result<()>;

    /// Copy `bucket/key` to a local file, overwriting it.
    async fn get(&self, bucket: &str, key: &str, local: &Path) -> Result<()>;

    /// Upload `local` under `prefix` and return the remote key.
    async fn upload(&self, local: &Path, bucket: &str, prefix: &str) -> Result<String> {
        let key = object_key(prefix, local);
        tracing::info!("Copying {} to {}...", local.display(), s3_uri(bucket, &key));
        self.put(local, bucket, &key).await?;
        Ok(key)
    }
}

/// S3 store backed by `aws s3 cp`.
pub struct AwsCliStore<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> AwsCliStore<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    async fn copy(&self, from: OsString, to: OsString) -> Result<()> {
        let args = vec![OsString::from("s3"), OsString::from("cp"), from, to];
        self.executor.execute(defaults::AWS_CLI, &args).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<E: CommandExecutor> ObjectStore for AwsCliStore<E> {
    async fn put(&self, local: &Path, bucket: &str, key: &str) -> Result<()> {
        self.copy(local.into(), s3_uri(bucket, key).into()).await
    }

    async fn get(&self, bucket: &str, key: &str, local: &Path) -> Result<()> {
        self.copy(s3_uri(bucket, key).into(), local.into()).await
    }
}

/// In-memory store for tests.
///
/// Uploads are recorded but not read from disk. Downloads write objects
/// seeded with [`MemoryStore::with_object`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    uploads: Mutex<Vec<(PathBuf, String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object that `get` will return.
    pub fn with_object(self, bucket: &str, key: &str, body: &[u8]) -> Self {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert((bucket.to_string(), key.to_string()), body.to_vec());
        }
        self
    }

    /// Recorded uploads as (local path, bucket, key).
    pub fn uploads(&self) -> Vec<(PathBuf, String, String)> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, local: &Path, bucket: &str, key: &str) -> Result<()> {
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push((local.to_path_buf(), bucket.to_string(), key.to_string()));
        }
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str, local: &Path) -> Result<()> {
        let body = self
            .objects
            .lock()
            .ok()
            .and_then(|o| o.get(&(bucket.to_string(), key.to_string())).cloned())
            .ok_or_else(|| RecapError::CommandFailed {
                command: "get".to_string(),
                status: "404".to_string(),
                stderr: format!("{} does not exist", s3_uri(bucket, key)),
            })?;
        tokio::fs::write(local, body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;

    #[test]
    fn test_object_key_uses_basename() {
        assert_eq!(
            object_key("summary", Path::new("/home/me/audio/standup.mp3")),
            "summary/standup.mp3"
        );
    }

    #[test]
    fn test_object_key_trailing_slash_prefix() {
        assert_eq!(object_key("summary/", Path::new("a.mp3")), "summary/a.mp3");
    }

    #[test]
    fn test_object_key_empty_prefix() {
        assert_eq!(object_key("", Path::new("dir/a.mp3")), "a.mp3");
    }

    #[test]
    fn test_s3_uri() {
        assert_eq!(s3_uri("b", "summary/a.mp3"), "s3://b/summary/a.mp3");
    }

    #[tokio::test]
    async fn test_upload_runs_aws_s3_cp() {
        let store = AwsCliStore::new(MockCommandExecutor::new());

        let key = store
            .upload(Path::new("rec/talk.mp3"), "b", "summary")
            .await
            .unwrap();

        assert_eq!(key, "summary/talk.mp3");
        let (command, args) = store.executor.call(0).unwrap();
        assert_eq!(command, "aws");
        assert_eq!(args, vec!["s3", "cp", "rec/talk.mp3", "s3://b/summary/talk.mp3"]);
    }

    #[tokio::test]
    async fn test_get_runs_aws_s3_cp_in_reverse() {
        let store = AwsCliStore::new(MockCommandExecutor::new());

        store
            .get("b", "summary/output/j.json", Path::new("summary/output/j.json"))
            .await
            .unwrap();

        let (_, args) = store.executor.call(0).unwrap();
        assert_eq!(
            args,
            vec!["s3", "cp", "s3://b/summary/output/j.json", "summary/output/j.json"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_put_passes_non_utf8_local_path_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let local = Path::new(OsStr::from_bytes(b"rec/caf\xe9.mp3"));
        let store = AwsCliStore::new(MockCommandExecutor::new());

        store.put(local, "b", "summary/cafe.mp3").await.unwrap();

        let (_, args) = store.executor.raw_call(0).unwrap();
        assert_eq!(args[2].as_bytes(), b"rec/caf\xe9.mp3");
        assert_eq!(args[3], OsString::from("s3://b/summary/cafe.mp3"));
    }

    #[tokio::test]
    async fn test_upload_failure_propagates() {
        let executor = MockCommandExecutor::new().with_error(RecapError::CommandFailed {
            command: "aws".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "AccessDenied".to_string(),
        });
        let store = AwsCliStore::new(executor);

        let result = store.upload(Path::new("a.mp3"), "b", "summary").await;
        assert!(matches!(result, Err(RecapError::CommandFailed { stderr, .. }) if stderr == "AccessDenied"));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("out.json");
        let store = MemoryStore::new().with_object("b", "k", b"{}");

        store.get("b", "k", &local).await.unwrap();
        assert_eq!(std::fs::read(&local).unwrap(), b"{}");

        assert!(store.get("b", "missing", &local).await.is_err());
    }
}
