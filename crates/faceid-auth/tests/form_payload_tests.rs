//! Integration tests for form payload field names and validation hooks.

use faceid_auth::{CredentialsLogin, FaceLogin, Registration, ValidationError, validate_form};

#[test]
fn form_payload_tests_uses_server_field_names() {
    let login = FaceLogin {
        webcam_image: "data:image/jpeg;base64,AAAA".to_string(),
    };
    let value = serde_json::to_value(&login).expect("payload should serialize");
    assert_eq!(value["webcam_image"], "data:image/jpeg;base64,AAAA");

    let registration = Registration {
        username: "alice".to_string(),
        password: "Abcdef12".to_string(),
        webcam_image: String::new(),
    };
    let value = serde_json::to_value(&registration).expect("payload should serialize");
    let keys: Vec<&str> = value
        .as_object()
        .expect("payload should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 3);
    assert!(keys.contains(&"username"));
    assert!(keys.contains(&"password"));
    assert!(keys.contains(&"webcam_image"));
}

#[test]
fn form_payload_tests_credentials_login_is_validated() {
    let login = CredentialsLogin {
        username: "bob".to_string(),
        password: "Abcdef12".to_string(),
    };
    assert_eq!(
        validate_form(&login.fields()),
        Err(ValidationError::UsernameTooShort)
    );

    let login = CredentialsLogin {
        username: "bobby".to_string(),
        password: "Abcdef12".to_string(),
    };
    assert!(validate_form(&login.fields()).is_ok());
}
