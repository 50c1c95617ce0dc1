//! Food record shape.
//!
//! A stored record is a [`FoodRecord`]: the store-assigned [`FoodId`] plus the
//! validated [`Food`] body. Updates are expressed as a [`FoodPatch`] and merged
//! into the stored body with [`Food::apply`].

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::catalog::naming::FoodId;

/// Nutritional composite of a record. All five values are required.
///
/// Values are kept as JSON numbers so that integers supplied by a caller are
/// returned as integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionalInformation {
    pub fat: Number,
    pub fiber: Number,
    pub protein: Number,
    pub calories: Number,
    pub carbohydrates: Number,
}

/// Validated body of a food record, without its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub food_item_name: String,
    pub food_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub serving_size: String,
    pub certifications: Vec<String>,
    pub health_benefits: Vec<String>,
    pub country_of_origin: String,
    pub preparation_methods: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub brand_or_manufacturer: String,
    pub nutritional_information: NutritionalInformation,
}

/// A persisted food record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: FoodId,
    #[serde(flatten)]
    pub food: Food,
}

impl FoodRecord {
    pub fn new(id: FoodId, food: Food) -> Self {
        Self { id, food }
    }

    pub fn name(&self) -> &str {
        &self.food.food_item_name
    }
}

/// Partial nutritional composite carried by an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionPatch {
    pub fat: Option<Number>,
    pub fiber: Option<Number>,
    pub protein: Option<Number>,
    pub calories: Option<Number>,
    pub carbohydrates: Option<Number>,
}

/// Merge payload of an update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodPatch {
    pub food_item_name: Option<String>,
    pub food_group: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub ingredients: Option<Vec<String>>,
    pub serving_size: Option<String>,
    pub certifications: Option<Vec<String>>,
    pub health_benefits: Option<Vec<String>>,
    pub country_of_origin: Option<String>,
    pub preparation_methods: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub brand_or_manufacturer: Option<String>,
    pub nutritional_information: Option<NutritionPatch>,
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl NutritionalInformation {
    fn apply(&mut self, patch: NutritionPatch) {
        merge(&mut self.fat, patch.fat);
        merge(&mut self.fiber, patch.fiber);
        merge(&mut self.protein, patch.protein);
        merge(&mut self.calories, patch.calories);
        merge(&mut self.carbohydrates, patch.carbohydrates);
    }
}

impl Food {
    /// Merges `patch` into this body.
    pub fn apply(&mut self, patch: FoodPatch) {
        merge(&mut self.food_item_name, patch.food_item_name);
        merge(&mut self.food_group, patch.food_group);
        merge(&mut self.description, patch.description);
        merge(&mut self.ingredients, patch.ingredients);
        merge(&mut self.serving_size, patch.serving_size);
        merge(&mut self.certifications, patch.certifications);
        merge(&mut self.health_benefits, patch.health_benefits);
        merge(&mut self.country_of_origin, patch.country_of_origin);
        merge(&mut self.preparation_methods, patch.preparation_methods);
        merge(&mut self.dietary_restrictions, patch.dietary_restrictions);
        merge(&mut self.brand_or_manufacturer, patch.brand_or_manufacturer);
        if let Some(nutrition) = patch.nutritional_information {
            self.nutritional_information.apply(nutrition);
        }
    }
}
