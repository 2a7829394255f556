use domino::{
    CommandParser, Connection, ConnectionConfig, DominoConfig, WireConfig,
};
use validator::{Validate, ValidationErrors};

/// Sorted names of the fields that failed validation
fn error_fields(validation_errors: &ValidationErrors) -> Vec<&str> {
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    error_fields
}

#[test]
fn test_domino_config_validation() {
    let config = DominoConfig {
        wire: WireConfig {
            max_animation_depth: 0, // invalid
        },
        connection: ConnectionConfig {
            warn_queue_len: 0, // invalid
        },
    };

    let validation_errors = config.validate().unwrap_err();
    assert_eq!(
        error_fields(&validation_errors),
        vec!["connection", "wire"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
    assert!(DominoConfig::default().validate().is_ok());
}

#[test]
fn test_wire_config_validation() {
    let config = WireConfig {
        max_animation_depth: 1025, // invalid (too deep)
    };

    // This is a bit of a lazy check but it works well enough
    let err = CommandParser::new(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    assert_eq!(
        error_fields(&validation_errors),
        vec!["max_animation_depth"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}

#[test]
fn test_connection_config_validation() {
    let config = ConnectionConfig {
        warn_queue_len: 0, // invalid
    };

    let err = Connection::new(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    assert_eq!(
        error_fields(&validation_errors),
        vec!["warn_queue_len"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}
