use actix_web::HttpResponse;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

/// Flatten field errors into their messages
pub fn validation_messages(validation_errors: &ValidationErrors) -> Vec<String> {
    validation_errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
            })
        })
        .collect()
}

fn field_map(
    validation_errors: &ValidationErrors,
    prefix: &str,
    fields: &mut serde_json::Map<String, serde_json::Value>,
) {
    for (field, errors) in validation_errors.field_errors() {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
            })
            .collect();
        fields.insert(
            format!("{}{}", prefix, field),
            serde_json::json!({"errors": messages}),
        );
    }

    // `location.lat` etc. come back as nested structs
    for (field, kind) in validation_errors.errors() {
        if let validator::ValidationErrorsKind::Struct(nested) = kind {
            field_map(nested, &format!("{}{}.", prefix, field), fields);
        }
    }
}

fn bad_request(error: &str, fields: serde_json::Map<String, serde_json::Value>) -> actix_web::Error {
    let error_response = ErrorResponse {
        error: error.to_string(),
        fields: serde_json::Value::Object(fields),
    };
    actix_web::error::InternalError::from_response(
        "",
        HttpResponse::BadRequest().json(error_response),
    )
    .into()
}

fn body_message(err_string: &str) -> String {
    if err_string.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload".to_string()
    } else if err_string.contains("unknown variant") {
        "Invalid enum value. status must be one of: completed, failed".to_string()
    } else if err_string.contains("missing field") {
        err_string.to_string()
    } else if err_string.contains("Content type error") {
        "Expected Content-Type: application/json".to_string()
    } else {
        "Invalid JSON format".to_string()
    }
}

/// JSON extractor config with the project's standard 400 body
pub fn json_config(limit: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let mut fields = serde_json::Map::new();

            match err {
                actix_web_validator::Error::Validate(validation_errors) => {
                    field_map(&validation_errors, "", &mut fields);
                    bad_request("Validation failed", fields)
                }
                actix_web_validator::Error::JsonPayloadError(payload_err) => {
                    fields.insert("message".to_string(), serde_json::json!(body_message(&payload_err.to_string())));
                    bad_request("Request validation failed", fields)
                }
                actix_web_validator::Error::Deserialize(de_err) => {
                    fields.insert("message".to_string(), serde_json::json!(body_message(&de_err.to_string())));
                    bad_request("Request validation failed", fields)
                }
                _ => {
                    fields.insert("message".to_string(), serde_json::json!("Validation error"));
                    bad_request("Validation failed", fields)
                }
            }
        })
}
