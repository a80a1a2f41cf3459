use lab_portal::{
    AppConfig,
    config::{ConfigError, DataBackend, Env, StorageBackend},
};
use serial_test::serial;
use std::{collections::HashMap, env, panic, path::PathBuf};

// --- Setup/Teardown Utilities ---

fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| map.get(key).cloned())
}

/// Runs `test` and restores the listed environment variables afterward, even on panic.
fn run_with_env<T, R>(test: T, cleanup_vars: &[&'static str]) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            match original_value {
                Some(val) => env::set_var(&key, val),
                None => env::remove_var(&key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
fn test_defaults_with_database_url() {
    let config = config_from(&[("DATABASE_URL", "postgres://u:p@localhost/lab")]).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.port, 3000);
    assert_eq!(
        config.data,
        DataBackend::Postgres {
            url: "postgres://u:p@localhost/lab".to_string(),
            max_connections: 5,
        }
    );
    assert_eq!(
        config.storage,
        StorageBackend::Local {
            dir: PathBuf::from("uploads")
        }
    );
    assert_eq!(config.uploads_public_prefix, "/api/uploads");
    assert_eq!(config.static_dir, PathBuf::from("build"));
    assert!(config.exposes_internal_errors());
}

#[test]
fn test_postgres_requires_database_url() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn test_blank_values_count_as_missing() {
    let err = config_from(&[("DATABASE_URL", "   ")]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn test_memory_backend_needs_no_database() {
    let config = config_from(&[("DATA_BACKEND", "memory"), ("PORT", "8080")]).unwrap();
    assert_eq!(config.data, DataBackend::Memory);
    assert_eq!(config.port, 8080);
}

#[test]
fn test_memory_backend_refused_in_production() {
    let err = config_from(&[("APP_ENV", "production"), ("DATA_BACKEND", "memory")]).unwrap_err();
    assert!(matches!(err, ConfigError::MemoryInProduction));
}

#[test]
fn test_invalid_port_is_rejected() {
    let err = config_from(&[("DATA_BACKEND", "memory"), ("PORT", "eighty")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
}

#[test]
fn test_unknown_backends_are_rejected() {
    let err = config_from(&[("DATA_BACKEND", "mysql")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "DATA_BACKEND", .. }));

    let err = config_from(&[("DATA_BACKEND", "memory"), ("STORAGE_BACKEND", "ftp")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "STORAGE_BACKEND", .. }));
}

#[test]
fn test_s3_backend_fails_fast_on_missing_secret() {
    let err = config_from(&[
        ("DATA_BACKEND", "memory"),
        ("STORAGE_BACKEND", "s3"),
        ("S3_ENDPOINT", "http://localhost:9000"),
        ("S3_ACCESS_KEY", "minio"),
        ("S3_BUCKET_NAME", "lab"),
        ("S3_PUBLIC_URL", "http://localhost:9000/lab"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::Missing("S3_SECRET_KEY")));
}

#[test]
fn test_s3_backend_complete() {
    let config = config_from(&[
        ("APP_ENV", "production"),
        ("DATABASE_URL", "postgres://db/lab"),
        ("STORAGE_BACKEND", "s3"),
        ("S3_ENDPOINT", "http://localhost:9000"),
        ("S3_ACCESS_KEY", "minio"),
        ("S3_SECRET_KEY", "minio-secret"),
        ("S3_BUCKET_NAME", "lab"),
        ("S3_PUBLIC_URL", "http://localhost:9000/lab/"),
    ])
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert!(!config.exposes_internal_errors());
    match config.storage {
        StorageBackend::S3 {
            region, public_url, ..
        } => {
            assert_eq!(region, "us-east-1");
            assert_eq!(public_url, "http://localhost:9000/lab");
        }
        other => panic!("expected S3 storage, got {other:?}"),
    }
}

#[test]
fn test_public_prefix_trailing_slash_trimmed() {
    let config = config_from(&[
        ("DATA_BACKEND", "memory"),
        ("UPLOADS_PUBLIC_PREFIX", "/files/"),
    ])
    .unwrap();
    assert_eq!(config.uploads_public_prefix, "/files");
}

#[test]
#[serial]
fn test_load_reads_process_environment() {
    let vars = [
        "APP_ENV",
        "DATA_BACKEND",
        "PORT",
        "STORAGE_BACKEND",
        "UPLOADS_DIR",
    ];

    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "local");
                env::set_var("DATA_BACKEND", "memory");
                env::set_var("PORT", "4100");
                env::set_var("STORAGE_BACKEND", "local");
                env::set_var("UPLOADS_DIR", "/tmp/lab-uploads");
            }
            AppConfig::load()
        },
        &vars,
    )
    .unwrap();

    assert_eq!(config.port, 4100);
    assert_eq!(config.data, DataBackend::Memory);
    assert_eq!(
        config.storage,
        StorageBackend::Local {
            dir: PathBuf::from("/tmp/lab-uploads")
        }
    );
}
