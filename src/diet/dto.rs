use serde::{Deserialize, Serialize};

use crate::recommend::dto::OutputRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    VeryActive,
    ExtraActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPlan {
    Maintain,
    MildLoss,
    Loss,
    ExtremeLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obesity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DietProfile {
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub activity: ActivityLevel,
    pub plan: WeightPlan,
    #[serde(default = "default_meals")]
    pub meals_per_day: u8,
}
fn default_meals() -> u8 { 3 }

#[derive(Debug, Serialize)]
pub struct MealRecommendation {
    pub meal: &'static str,
    pub calories: f64,
    pub query: Vec<f64>,
    pub recipes: Vec<OutputRecord>,
}

#[derive(Debug, Serialize)]
pub struct DietPlanResponse {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub maintenance_calories: f64,
    pub target_calories: f64,
    pub meals: Vec<MealRecommendation>,
}
