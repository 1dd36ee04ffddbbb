// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use smartbudget_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn storage_unavailable() {
        let err = CoreError::StorageUnavailable("disabled by browser".into());
        assert_eq!(err.to_string(), "Storage unavailable: disabled by browser");
    }

    #[test]
    fn quota_exceeded() {
        let err = CoreError::QuotaExceeded {
            needed: 6_000_000,
            capacity: 5_242_880,
        };
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded: 6000000 bytes needed, capacity is 5242880 bytes"
        );
    }

    #[test]
    fn storage_write() {
        let err = CoreError::StorageWrite("Failed to persist 3 transactions".into());
        assert_eq!(err.to_string(), "Storage write failed: Failed to persist 3 transactions");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("CSV output is not UTF-8".into());
        assert_eq!(err.to_string(), "Serialization error: CSV output is not UTF-8");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn malformed_document() {
        let err = CoreError::MalformedDocument("missing field `data`".into());
        assert_eq!(err.to_string(), "Malformed document: missing field `data`");
    }

    #[test]
    fn invalid_csv() {
        let err = CoreError::InvalidCsv("Missing required columns: date".into());
        assert_eq!(err.to_string(), "Invalid CSV: Missing required columns: date");
    }

    #[test]
    fn reference() {
        let err = CoreError::Reference {
            source_name: "HTTP".into(),
            message: "HTTP status 404 Not Found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Reference data error (HTTP): HTTP status 404 Not Found"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn validation_joins_messages() {
        let err = CoreError::Validation(vec![
            "Description is required".into(),
            "Category is required".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Transaction validation failed: Description is required; Category is required"
        );
    }

    #[test]
    fn validation_single_message() {
        let err = CoreError::Validation(vec!["Date is required".into()]);
        assert_eq!(err.to_string(), "Transaction validation failed: Date is required");
    }

    #[test]
    fn transaction_not_found() {
        let err = CoreError::TransactionNotFound(42);
        assert_eq!(err.to_string(), "Transaction not found: 42");
    }
}

// ── validation_messages ─────────────────────────────────────────────

mod validation_messages {
    use super::*;

    #[test]
    fn returns_messages_of_validation_error() {
        let err = CoreError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.validation_messages(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn empty_for_other_variants() {
        assert!(CoreError::TransactionNotFound(1).validation_messages().is_empty());
        assert!(CoreError::InvalidCsv("x".into()).validation_messages().is_empty());
    }
}

// ── Debug trait ─────────────────────────────────────────────────────

mod debug_trait {
    use super::*;

    #[test]
    fn all_variants_are_debug() {
        let variants: Vec<CoreError> = vec![
            CoreError::StorageUnavailable("x".into()),
            CoreError::QuotaExceeded { needed: 1, capacity: 0 },
            CoreError::StorageWrite("x".into()),
            CoreError::Serialization("x".into()),
            CoreError::Deserialization("x".into()),
            CoreError::FileIO("x".into()),
            CoreError::MalformedDocument("x".into()),
            CoreError::InvalidCsv("x".into()),
            CoreError::Reference {
                source_name: "s".into(),
                message: "m".into(),
            },
            CoreError::Network("x".into()),
            CoreError::Validation(vec![]),
            CoreError::TransactionNotFound(0),
        ];
        for v in &variants {
            assert!(!format!("{v:?}").is_empty());
        }
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: CoreError = io_err.into();
        match err {
            CoreError::FileIO(msg) => assert!(msg.contains("access denied")),
            other => panic!("Expected FileIO, got {other:?}"),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_csv_error() {
        // Unequal row lengths are an error for a non-flexible reader.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader("a,b\nc\n".as_bytes());
        let csv_err = reader
            .records()
            .find_map(Result::err)
            .expect("ragged rows should fail");
        let err: CoreError = csv_err.into();
        assert!(matches!(err, CoreError::InvalidCsv(_)));
    }

    #[test]
    fn question_mark_converts_io_error() {
        fn read_missing() -> Result<String, CoreError> {
            Ok(std::fs::read_to_string("/definitely/not/here.json")?)
        }
        assert!(matches!(read_missing(), Err(CoreError::FileIO(_))));
    }
}

// ── std::error::Error ───────────────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn core_error_implements_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::TransactionNotFound(3));
        assert_eq!(err.to_string(), "Transaction not found: 3");
    }

    #[test]
    fn core_error_implements_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CoreError>();
    }

    #[test]
    fn core_error_implements_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<CoreError>();
    }
}

// ── Edge cases ──────────────────────────────────────────────────────

mod edge_cases {
    use super::*;

    #[test]
    fn unicode_in_error_message() {
        let err = CoreError::InvalidCsv("columna 'categoría' ausente".into());
        assert!(err.to_string().contains("categoría"));
    }

    #[test]
    fn empty_validation_list() {
        let err = CoreError::Validation(vec![]);
        assert_eq!(err.to_string(), "Transaction validation failed: ");
    }
}
