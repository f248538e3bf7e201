use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::{ApiError, FieldError};

/// Field name reported when the problem is with the body as a whole.
const BODY_FIELD: &str = "body";

/// ValidJson
///
/// JSON request body extractor. Unlike `axum::Json`, every rejection is an
/// `ApiError::Validation` (400 with field errors): a value of the wrong type is
/// reported under its camelCase field path, anything else under `body`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(body_error("Content-Type must be application/json."));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "failed to buffer request body");
            body_error("The request body could not be read.")
        })?;

        parse_body(&bytes).map(ValidJson)
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

fn body_error(message: &str) -> ApiError {
    ApiError::Validation(vec![FieldError::new(BODY_FIELD, message)])
}

/// Deserializes `bytes`, tracking the path so a type mismatch can name its field.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        tracing::debug!(path = %path, error = %inner, "rejected request body");

        match inner.classify() {
            Category::Data if !path.starts_with(['.', '[']) => {
                ApiError::Validation(vec![FieldError::new(&path, format!("{path} is invalid."))])
            }
            Category::Data => body_error("The request body has the wrong shape."),
            Category::Syntax | Category::Eof | Category::Io => {
                body_error("The request body is not valid JSON.")
            }
        }
    })?;

    deserializer
        .end()
        .map_err(|_| body_error("The request body is not valid JSON."))?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegionRequest, WalkRequest};

    fn fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn bad_uuid_names_its_field() {
        let err = parse_body::<WalkRequest>(br#"{"name":"Red Rocks","regionId":"not-a-uuid"}"#)
            .unwrap_err();

        assert_eq!(fields(err), vec!["regionId"]);
    }

    #[test]
    fn fractional_population_names_its_field() {
        let err = parse_body::<RegionRequest>(br#"{"code":"NSN","population":1.5}"#).unwrap_err();

        assert_eq!(fields(err), vec!["population"]);
    }

    #[test]
    fn syntax_errors_and_trailing_data_are_body_errors() {
        let err = parse_body::<RegionRequest>(br#"{"code":"#).unwrap_err();
        assert_eq!(fields(err), vec!["body"]);

        let err = parse_body::<RegionRequest>(br#"{"code":"NSN"} []"#).unwrap_err();
        assert_eq!(fields(err), vec!["body"]);
    }

    #[test]
    fn non_object_body_is_a_body_error() {
        let err = parse_body::<RegionRequest>(br#""Nelson""#).unwrap_err();

        assert_eq!(fields(err), vec!["body"]);
    }

    #[test]
    fn missing_fields_still_parse() {
        let request = parse_body::<WalkRequest>(b"{}").unwrap();

        assert!(request.name.is_empty());
    }
}
