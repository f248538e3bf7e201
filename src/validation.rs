use crate::{
    error::{ApiError, FieldError, RepositoryError},
    models::{LoginRequest, Region, RegionRequest, WalkDifficulty, WalkDifficultyRequest, WalkRequest},
    repository::Repository,
};

/// ValidationErrors
///
/// Accumulates field errors so a request reports every problem at once instead of
/// stopping at the first.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{field} is required.")));
        }
    }

    pub fn greater_than_zero(&mut self, field: &str, value: f64) {
        // Written as a negated comparison so NaN is rejected too.
        if !(value > 0.0) {
            self.errors.push(FieldError::new(
                field,
                format!("{field} must be greater than zero."),
            ));
        }
    }

    pub fn not_negative(&mut self, field: &str, value: i64) {
        if value < 0 {
            self.errors.push(FieldError::new(
                field,
                format!("{field} must be greater than or equal to zero."),
            ));
        }
    }

    pub fn invalid_reference(&mut self, field: &str) {
        self.errors
            .push(FieldError::new(field, format!("{field} is invalid.")));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Converts the accumulated errors into the 400 response, or `Ok` when there are none.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// Validate
///
/// Field-presence and range rules for an inbound request body.
pub trait Validate {
    fn validate(&self) -> ValidationErrors;
}

impl Validate for LoginRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.required("username", &self.username);
        errors.required("password", &self.password);
        errors
    }
}

impl Validate for RegionRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.required("code", &self.code);
        errors.required("name", &self.name);
        errors.greater_than_zero("area", self.area);
        errors.not_negative("population", self.population);
        errors
    }
}

impl Validate for WalkDifficultyRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.required("code", &self.code);
        errors
    }
}

impl Validate for WalkRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.required("name", &self.name);
        errors.greater_than_zero("length", self.length);
        errors
    }
}

/// validate_walk
///
/// Full validation of a walk write: field rules, then confirmation that the
/// referenced region and walk difficulty exist. One error per invalid reference;
/// both may be reported together with any field errors.
///
/// The lookups are plain reads with no isolation from a concurrent delete of the
/// referenced rows.
pub async fn validate_walk(
    request: &WalkRequest,
    regions: &dyn Repository<Region>,
    walk_difficulties: &dyn Repository<WalkDifficulty>,
) -> Result<ValidationErrors, RepositoryError> {
    let mut errors = request.validate();

    if regions.get(request.region_id).await?.is_none() {
        errors.invalid_reference("regionId");
    }

    if walk_difficulties
        .get(request.walk_difficulty_id)
        .await?
        .is_none()
    {
        errors.invalid_reference("walkDifficultyId");
    }

    Ok(errors)
}
