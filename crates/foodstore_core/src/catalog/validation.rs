//! Payload validation for record writes.
//!
//! Request bodies reach the catalog as untyped JSON. This module turns them into
//! a [`Food`] (create) or a [`FoodPatch`] (update) before any store access, so a
//! payload that fails validation is never partially applied.
//!
//! ## Rules
//!
//! - Every required field must be present and non-null on create.
//! - String fields must be strings, list fields lists of strings (empty lists are
//!   accepted), and the five nutritional values numbers (integer or float).
//! - Values are not range-checked: negative calories are accepted.
//! - `id` and `_id` are ignored, as are fields unknown to the schema.
//! - On update every field is optional, but a field that is present must satisfy
//!   the same rule as on create. Only `description` may be cleared with `null`.
//!
//! All offending fields are reported at once, in schema order.

use std::fmt::Display;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::catalog::{
    error::CatalogError,
    record::{Food, FoodPatch, NutritionPatch, NutritionalInformation},
};

const NUTRITIONAL_INFORMATION: &str = "nutritional_information";

/// What is wrong with a single field.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Problem {
    /// The field is absent or null
    Required,
    /// The field holds a value of the wrong type
    Cast(&'static str),
}

/// A field that failed validation, named by its dotted path.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldIssue {
    pub path: String,
    pub problem: Problem,
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.problem {
            Problem::Required => write!(f, "{0}: Path `{0}` is required.", self.path),
            Problem::Cast(kind) => write!(f, "{}: Cast to {} failed", self.path, kind),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Food validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Paths of the offending fields, in schema order.
    pub fn paths(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.path.as_str()).collect()
    }
}

/// Parses a raw request body into a JSON object.
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, CatalogError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(CatalogError::MalformedPayload("expected a JSON object".to_string())),
        Err(e) => Err(CatalogError::MalformedPayload(e.to_string())),
    }
}

/// Field reader over one JSON object, accumulating issues as it goes.
///
/// A `null` required field is always reported. An absent one is reported only
/// when `required` is set, which is the case on create but not on update.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    scope: Option<&'static str>,
    required: bool,
    issues: Vec<FieldIssue>,
}

impl<'a> Fields<'a> {
    fn new(object: &'a Map<String, Value>, required: bool) -> Self {
        Self { object, scope: None, required, issues: Vec::new() }
    }

    fn report(&mut self, key: &str, problem: Problem) {
        let path = match self.scope {
            Some(scope) => format!("{scope}.{key}"),
            None => key.to_string(),
        };
        self.issues.push(FieldIssue { path, problem });
    }

    fn present(&mut self, key: &str) -> Option<&'a Value> {
        match self.object.get(key) {
            None if !self.required => None,
            None | Some(Value::Null) => {
                self.report(key, Problem::Required);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.present(key)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.report(key, Problem::Cast("string"));
                None
            }
        }
    }

    fn strings(&mut self, key: &str) -> Option<Vec<String>> {
        let strings = match self.present(key)? {
            Value::Array(items) => {
                items.iter().map(|item| item.as_str().map(str::to_string)).collect()
            }
            _ => None,
        };
        if strings.is_none() {
            self.report(key, Problem::Cast("[string]"));
        }
        strings
    }

    fn number(&mut self, key: &str) -> Option<Number> {
        match self.present(key)? {
            Value::Number(n) => Some(n.clone()),
            _ => {
                self.report(key, Problem::Cast("number"));
                None
            }
        }
    }

    /// The optional description: `Some(None)` when explicitly null.
    fn description(&mut self) -> Option<Option<String>> {
        match self.object.get("description")? {
            Value::Null => Some(None),
            Value::String(s) => Some(Some(s.clone())),
            _ => {
                self.report("description", Problem::Cast("string"));
                None
            }
        }
    }

    fn nutrition(&mut self) -> Option<NutritionPatch> {
        let object = match self.present(NUTRITIONAL_INFORMATION)? {
            Value::Object(object) => object,
            _ => {
                self.report(NUTRITIONAL_INFORMATION, Problem::Cast("object"));
                return None;
            }
        };
        let mut nested = Fields {
            object,
            scope: Some(NUTRITIONAL_INFORMATION),
            required: self.required,
            issues: Vec::new(),
        };
        let patch = NutritionPatch {
            fat: nested.number("fat"),
            fiber: nested.number("fiber"),
            protein: nested.number("protein"),
            calories: nested.number("calories"),
            carbohydrates: nested.number("carbohydrates"),
        };
        self.issues.append(&mut nested.issues);
        Some(patch)
    }

    /// Reads every schema field, in schema order.
    fn patch(&mut self) -> FoodPatch {
        FoodPatch {
            food_item_name: self.string("food_item_name"),
            food_group: self.string("food_group"),
            description: self.description(),
            ingredients: self.strings("ingredients"),
            serving_size: self.string("serving_size"),
            certifications: self.strings("certifications"),
            health_benefits: self.strings("health_benefits"),
            country_of_origin: self.string("country_of_origin"),
            preparation_methods: self.strings("preparation_methods"),
            dietary_restrictions: self.strings("dietary_restrictions"),
            brand_or_manufacturer: self.string("brand_or_manufacturer"),
            nutritional_information: self.nutrition(),
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.issues.is_empty() { Ok(value) } else { Err(ValidationError { issues: self.issues }) }
    }
}

/// Validator for record write payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoodValidator;

impl FoodValidator {
    /// Validates a create payload into a complete record body.
    pub fn validate_new(&self, payload: &Map<String, Value>) -> Result<Food, ValidationError> {
        let mut fields = Fields::new(payload, true);
        let patch = fields.patch();
        let patch = fields.finish(patch)?;
        complete(patch).map_err(|issue| ValidationError { issues: vec![issue] })
    }

    /// Validates an update payload into a merge patch.
    pub fn validate_patch(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<FoodPatch, ValidationError> {
        let mut fields = Fields::new(payload, false);
        let patch = fields.patch();
        fields.finish(patch)
    }
}

fn required<T>(value: Option<T>, path: &str) -> Result<T, FieldIssue> {
    value.ok_or_else(|| FieldIssue { path: path.to_string(), problem: Problem::Required })
}

/// Turns a patch into a record body, naming the first missing field otherwise.
fn complete(patch: FoodPatch) -> Result<Food, FieldIssue> {
    let food_item_name = required(patch.food_item_name, "food_item_name")?;
    let food_group = required(patch.food_group, "food_group")?;
    let ingredients = required(patch.ingredients, "ingredients")?;
    let serving_size = required(patch.serving_size, "serving_size")?;
    let certifications = required(patch.certifications, "certifications")?;
    let health_benefits = required(patch.health_benefits, "health_benefits")?;
    let country_of_origin = required(patch.country_of_origin, "country_of_origin")?;
    let preparation_methods = required(patch.preparation_methods, "preparation_methods")?;
    let dietary_restrictions = required(patch.dietary_restrictions, "dietary_restrictions")?;
    let brand_or_manufacturer =
        required(patch.brand_or_manufacturer, "brand_or_manufacturer")?;
    let nutrition = required(patch.nutritional_information, NUTRITIONAL_INFORMATION)?;
    Ok(Food {
        food_item_name,
        food_group,
        description: patch.description.flatten(),
        ingredients,
        serving_size,
        certifications,
        health_benefits,
        country_of_origin,
        preparation_methods,
        dietary_restrictions,
        brand_or_manufacturer,
        nutritional_information: NutritionalInformation {
            fat: required(nutrition.fat, "nutritional_information.fat")?,
            fiber: required(nutrition.fiber, "nutritional_information.fiber")?,
            protein: required(nutrition.protein, "nutritional_information.protein")?,
            calories: required(nutrition.calories, "nutritional_information.calories")?,
            carbohydrates: required(
                nutrition.carbohydrates,
                "nutritional_information.carbohydrates",
            )?,
        },
    })
}
