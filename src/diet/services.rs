//! Daily calorie targets from a body profile, split across meals and turned into
//! recommendation queries.

use rand::Rng;
use thiserror::Error;

use super::dto::{
    ActivityLevel, BmiCategory, DietPlanResponse, DietProfile, Gender, MealRecommendation,
    WeightPlan,
};
use crate::recipes::NUTRITION_DIM;
use crate::recommend::{RecommendError, Recommender, SearchParams};

#[derive(Debug, Error)]
pub enum DietError {
    #[error("meals_per_day must be 3, 4 or 5, got {0}")]
    UnsupportedMealCount(u8),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error(transparent)]
    Recommend(#[from] RecommendError),
}

impl ActivityLevel {
    pub fn factor(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }
}

impl WeightPlan {
    pub fn factor(self) -> f64 {
        match self {
            Self::Maintain => 1.0,
            Self::MildLoss => 0.9,
            Self::Loss => 0.8,
            Self::ExtremeLoss => 0.6,
        }
    }
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obesity
        }
    }
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let h = height_cm / 100.0;
    round2(weight_kg / (h * h))
}

/// Mifflin-St Jeor basal metabolic rate, kcal/day.
pub fn bmr(p: &DietProfile) -> f64 {
    let base = 10.0 * p.weight_kg + 6.25 * p.height_cm - 5.0 * f64::from(p.age);
    match p.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

pub fn meal_split(meals_per_day: u8) -> Result<&'static [(&'static str, f64)], DietError> {
    match meals_per_day {
        3 => Ok(&[("breakfast", 0.35), ("lunch", 0.40), ("dinner", 0.25)]),
        4 => Ok(&[
            ("breakfast", 0.30),
            ("morning snack", 0.05),
            ("lunch", 0.40),
            ("dinner", 0.25),
        ]),
        5 => Ok(&[
            ("breakfast", 0.30),
            ("morning snack", 0.05),
            ("lunch", 0.40),
            ("afternoon snack", 0.05),
            ("dinner", 0.20),
        ]),
        n => Err(DietError::UnsupportedMealCount(n)),
    }
}

// Ranges for every nutrient after calories, in feature-vector order.
const LIGHT_MEAL: [(f64, f64); NUTRITION_DIM - 1] = [
    (10.0, 30.0),
    (0.0, 4.0),
    (0.0, 30.0),
    (0.0, 400.0),
    (40.0, 75.0),
    (4.0, 10.0),
    (0.0, 10.0),
    (30.0, 100.0),
];
const MAIN_MEAL: [(f64, f64); NUTRITION_DIM - 1] = [
    (20.0, 40.0),
    (0.0, 4.0),
    (0.0, 30.0),
    (0.0, 400.0),
    (40.0, 75.0),
    (4.0, 20.0),
    (0.0, 10.0),
    (50.0, 175.0),
];

pub fn meal_query<R: Rng>(meal: &str, calories: f64, rng: &mut R) -> [f64; NUTRITION_DIM] {
    let ranges = match meal {
        "lunch" | "dinner" => &MAIN_MEAL,
        _ => &LIGHT_MEAL,
    };
    let mut q = [0.0; NUTRITION_DIM];
    q[0] = calories;
    for (slot, &(lo, hi)) in q[1..].iter_mut().zip(ranges.iter()) {
        *slot = rng.gen_range(lo..=hi);
    }
    q
}

pub fn plan<R: Rng>(
    profile: &DietProfile,
    recommender: &Recommender,
    rng: &mut R,
) -> Result<DietPlanResponse, DietError> {
    if profile.age == 0 {
        return Err(DietError::NonPositive("age"));
    }
    if !(profile.height_cm > 0.0) {
        return Err(DietError::NonPositive("height_cm"));
    }
    if !(profile.weight_kg > 0.0) {
        return Err(DietError::NonPositive("weight_kg"));
    }
    let split = meal_split(profile.meals_per_day)?;

    let bmi = bmi(profile.weight_kg, profile.height_cm);
    let maintenance = bmr(profile) * profile.activity.factor();
    let target = maintenance * profile.plan.factor();

    let mut meals = Vec::with_capacity(split.len());
    for &(meal, share) in split {
        let calories = share * target;
        let query = meal_query(meal, calories, rng);
        let recipes = recommender
            .recommend(&query, &[], SearchParams::default())?
            .unwrap_or_default();
        meals.push(MealRecommendation {
            meal,
            calories: round2(calories),
            query: query.to_vec(),
            recipes,
        });
    }

    Ok(DietPlanResponse {
        bmi,
        bmi_category: BmiCategory::from_bmi(bmi),
        maintenance_calories: round2(maintenance),
        target_calories: round2(target),
        meals,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
