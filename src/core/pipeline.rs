pub use crate::app::pipelines::audit_pipeline::AuditPipeline;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigProvider, ExportInput, Pipeline, Storage};
    use crate::domain::model::RelationshipRecord;
    use crate::utils::error::{AuditError, Result};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AuditError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockConfig {
        following: Option<String>,
        followers: Option<String>,
        following_type: Option<String>,
        archive: Option<String>,
        output_formats: Vec<String>,
        compressed: Option<String>,
    }

    impl MockConfig {
        fn loose() -> Self {
            Self {
                following: Some("in/following.json".to_string()),
                followers: Some("in/followers_1.json".to_string()),
                output_formats: vec!["json".to_string()],
                ..Default::default()
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn following_path(&self) -> Option<&str> {
            self.following.as_deref()
        }

        fn followers_path(&self) -> Option<&str> {
            self.followers.as_deref()
        }

        fn archive_path(&self) -> Option<&str> {
            self.archive.as_deref()
        }

        fn following_content_type(&self) -> Option<&str> {
            self.following_type.as_deref()
        }

        fn upload_dir(&self) -> Option<&str> {
            None
        }

        fn backend_executable(&self) -> Option<&str> {
            None
        }

        fn backend_timeout(&self) -> Option<Duration> {
            None
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn compressed_output(&self) -> Option<&str> {
            self.compressed.as_deref()
        }
    }

    fn following_doc() -> Vec<u8> {
        json!({
            "relationships_following": [
                { "string_list_data": [{ "value": "alice", "timestamp": 100 }] },
                { "string_list_data": [{ "value": "bob", "timestamp": 200 }] }
            ]
        })
        .to_string()
        .into_bytes()
    }

    fn followers_doc() -> Vec<u8> {
        json!([
            { "string_list_data": [{ "value": "bob", "timestamp": 200 }] },
            { "string_list_data": [{ "value": "carol", "timestamp": 300 }] }
        ])
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn test_extract_loose_files() {
        let storage = MockStorage::new();
        storage.put("in/following.json", &following_doc()).await;
        storage.put("in/followers_1.json", &followers_doc()).await;

        let pipeline = AuditPipeline::new(storage, MockConfig::loose());
        let input = pipeline.extract().await.unwrap();

        match input {
            ExportInput::Loose {
                following,
                followers,
            } => {
                assert_eq!(following.file_name, "following.json");
                assert_eq!(followers.file_name, "followers_1.json");
            }
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_missing_followers_is_client_error() {
        let config = MockConfig {
            followers: None,
            ..MockConfig::loose()
        };
        let pipeline = AuditPipeline::new(MockStorage::new(), config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AuditError::MissingInputError { ref part } if part == "followers"));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_extract_unreadable_file_is_client_error() {
        let pipeline = AuditPipeline::new(MockStorage::new(), MockConfig::loose());
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AuditError::InputError { .. }));
    }

    #[tokio::test]
    async fn test_extract_rejects_archive_and_loose_together() {
        let config = MockConfig {
            archive: Some("export.zip".to_string()),
            ..MockConfig::loose()
        };
        let pipeline = AuditPipeline::new(MockStorage::new(), config);
        assert!(pipeline.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_transform_in_process() {
        let storage = MockStorage::new();
        storage.put("in/following.json", &following_doc()).await;
        storage.put("in/followers_1.json", &followers_doc()).await;

        let pipeline = AuditPipeline::new(storage, MockConfig::loose());
        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();

        assert_eq!(result.not_following_back, vec![RelationshipRecord::new("alice", Some(100))]);
        assert_eq!(result.not_followed_by_you, vec![RelationshipRecord::new("carol", Some(300))]);
    }

    #[tokio::test]
    async fn test_declared_type_overrides_content_sniffing() {
        // 以 '[' 開頭的 HTML 會被內容判斷誤認為 JSON
        let page = b"[saved page] <a href=\"https://www.instagram.com/alice/\">alice</a>";
        let storage = MockStorage::new();
        storage.put("in/following_export", page).await;
        storage.put("in/followers_1.json", &followers_doc()).await;

        let sniffed = MockConfig {
            following: Some("in/following_export".to_string()),
            ..MockConfig::loose()
        };
        let pipeline = AuditPipeline::new(storage.clone(), sniffed);
        let input = pipeline.extract().await.unwrap();
        let err = pipeline.transform(input).await.unwrap_err();
        assert!(matches!(err, AuditError::FormatError { .. }));

        let declared = MockConfig {
            following: Some("in/following_export".to_string()),
            following_type: Some("text/html".to_string()),
            ..MockConfig::loose()
        };
        let pipeline = AuditPipeline::new(storage, declared);
        let input = pipeline.extract().await.unwrap();
        match &input {
            ExportInput::Loose { following, .. } => {
                assert_eq!(following.content_type.as_deref(), Some("text/html"))
            }
            other => panic!("unexpected input: {other:?}"),
        }

        let result = pipeline.transform(input).await.unwrap();
        assert_eq!(result.not_following_back, vec![RelationshipRecord::new("alice", None)]);
        assert_eq!(
            result.not_followed_by_you,
            vec![
                RelationshipRecord::new("bob", Some(200)),
                RelationshipRecord::new("carol", Some(300))
            ]
        );
    }

    #[tokio::test]
    async fn test_load_writes_each_format() {
        let storage = MockStorage::new();
        let config = MockConfig {
            output_formats: vec!["json".to_string(), "csv".to_string()],
            ..MockConfig::loose()
        };
        let pipeline = AuditPipeline::new(storage.clone(), config);

        let result = crate::core::DiffResult {
            not_following_back: vec![RelationshipRecord::new("alice", Some(100))],
            not_followed_by_you: vec![],
        };
        let output = pipeline.load(result).await.unwrap();

        assert_eq!(
            output,
            "test_output/follow_audit.json, test_output/follow_audit.csv"
        );
        let json_bytes = storage.get_file("test_output/follow_audit.json").await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&json_bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "notFollowingBack": [{ "username": "alice", "timestamp": 100 }],
                "notFollowedByYou": []
            })
        );
        assert!(storage.get_file("test_output/follow_audit.csv").await.is_some());
    }

    #[tokio::test]
    async fn test_load_compressed_output() {
        let storage = MockStorage::new();
        let config = MockConfig {
            output_formats: vec!["json".to_string(), "tsv".to_string()],
            compressed: Some("audit.zip".to_string()),
            ..MockConfig::loose()
        };
        let pipeline = AuditPipeline::new(storage.clone(), config);

        let output = pipeline.load(crate::core::DiffResult::default()).await.unwrap();
        assert_eq!(output, "test_output/audit.zip");

        let zip_bytes = storage.get_file("test_output/audit.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(storage.get_file("test_output/follow_audit.json").await.is_none());
    }
}
