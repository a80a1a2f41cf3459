use axum::body::Bytes;
use lab_portal::storage::{
    LocalDiskStorage, MockStorageService, S3StorageClient, StorageError, StorageService,
    sanitize_key,
};

#[cfg(test)]
mod key_tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_traversal() {
        assert_eq!(sanitize_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_key("avatars/./jane.png"), "avatars/jane.png");
        assert_eq!(sanitize_key("/avatars//jane.png"), "avatars/jane.png");
        assert_eq!(sanitize_key("news\\..\\x.png"), "news/x.png");
    }

    #[test]
    fn test_sanitize_keeps_regular_keys() {
        assert_eq!(
            sanitize_key("journals/pdf/paper-1700000000000-a1b2c3d4.pdf"),
            "journals/pdf/paper-1700000000000-a1b2c3d4.pdf"
        );
    }
}

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_writes() {
        let mock = MockStorageService::new();
        let stored = mock
            .put_object("avatars/jane.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();

        assert_eq!(stored.key, "avatars/jane.png");
        assert!(stored.url.ends_with("/avatars/jane.png"));

        let writes = mock.writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].content_type, "image/png");
        assert_eq!(writes[0].size, 3);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();
        let result = mock
            .put_object("news/x.png", "image/png", Bytes::from_static(b"x"))
            .await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(mock.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockStorageService::new();
        let stored = mock
            .put_object("../../etc/passwd", "text/plain", Bytes::new())
            .await
            .unwrap();
        assert!(!stored.url.contains(".."));
        assert_eq!(stored.key, "etc/passwd");
    }

    #[tokio::test]
    async fn test_mock_rejects_empty_key() {
        let mock = MockStorageService::new();
        let result = mock.put_object("../..", "text/plain", Bytes::new()).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}

#[cfg(test)]
mod local_tests {
    use super::*;

    #[tokio::test]
    async fn test_local_writes_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path().join("uploads"), "/api/uploads");
        storage.ensure_ready().await.unwrap();

        let stored = storage
            .put_object(
                "journals/pdf/paper-1-abcd.pdf",
                "application/pdf",
                Bytes::from_static(b"%PDF-1.4"),
            )
            .await
            .unwrap();

        assert_eq!(stored.url, "/api/uploads/journals/pdf/paper-1-abcd.pdf");
        let written = std::fs::read(dir.path().join("uploads/journals/pdf/paper-1-abcd.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_local_traversal_stays_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let storage = LocalDiskStorage::new(root.clone(), "/api/uploads/");

        let stored = storage
            .put_object("../escape.txt", "text/plain", Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert_eq!(stored.url, "/api/uploads/escape.txt");
        assert!(root.join("escape.txt").exists());
        assert!(!dir.path().join("escape.txt").exists());
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_client_creation() {
        let _client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
            "http://localhost:9000/testbucket",
        );
        // Construction is offline; nothing is sent until a request is made.
    }
}
