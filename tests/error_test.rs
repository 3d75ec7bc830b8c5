//! Tests for error types

use credit_sweep::Error;

#[test]
fn test_schema_error() {
    let error = Error::SchemaError("missing field 'telephone'".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Schema error"));
    assert!(error_str.contains("telephone"));
}

#[test]
fn test_training_failure_error() {
    let error = Error::TrainingFailure("no examples".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Training failed"));
    assert!(error_str.contains("no examples"));
}

#[test]
fn test_empty_partition_error() {
    let error = Error::EmptyPartition("validation");
    assert_eq!(
        format!("{error}"),
        "Cannot evaluate validation partition: no examples"
    );
}

#[test]
fn test_invalid_config_error() {
    let error = Error::InvalidConfig("num_trials must be at least 1".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid configuration"));
    assert!(error_str.contains("num_trials"));
}

#[test]
fn test_parse_error() {
    let error = Error::ParseError("invalid SQL".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("SQL parse error"));
    assert!(error_str.contains("invalid SQL"));
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file not found".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("Table not found: loans".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("loans"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").starts_with("JSON error"));
}

#[test]
fn test_error_debug() {
    let error = Error::EmptyPartition("training");
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("EmptyPartition"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> credit_sweep::Result<i32> {
        Err(Error::TrainingFailure("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
