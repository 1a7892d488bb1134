use serde::{Deserialize, Serialize};

/// Number of nutrition components in a feature vector.
pub const NUTRITION_DIM: usize = 9;

/// Dataset column names, in feature-vector order. Reordering breaks every index built on them.
pub const NUTRITION_COLUMNS: [&str; NUTRITION_DIM] = [
    "Calories",
    "FatContent",
    "SaturatedFatContent",
    "CholesterolContent",
    "SodiumContent",
    "CarbohydrateContent",
    "FiberContent",
    "SugarContent",
    "ProteinContent",
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Nutrition {
    pub calories: f64,
    pub fat_content: f64,
    pub saturated_fat_content: f64,
    pub cholesterol_content: f64,
    pub sodium_content: f64,
    pub carbohydrate_content: f64,
    pub fiber_content: f64,
    pub sugar_content: f64,
    pub protein_content: f64,
}

impl Nutrition {
    pub fn to_vector(&self) -> [f64; NUTRITION_DIM] {
        [
            self.calories,
            self.fat_content,
            self.saturated_fat_content,
            self.cholesterol_content,
            self.sodium_content,
            self.carbohydrate_content,
            self.fiber_content,
            self.sugar_content,
            self.protein_content,
        ]
    }

    pub fn from_vector(v: [f64; NUTRITION_DIM]) -> Self {
        Self {
            calories: v[0],
            fat_content: v[1],
            saturated_fat_content: v[2],
            cholesterol_content: v[3],
            sodium_content: v[4],
            carbohydrate_content: v[5],
            fiber_content: v[6],
            sugar_content: v[7],
            protein_content: v[8],
        }
    }
}

/// One dataset row. Read-only once the catalog is loaded.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRecord {
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CookTime")]
    pub cook_time: String,
    #[serde(rename = "PrepTime")]
    pub prep_time: String,
    #[serde(rename = "TotalTime")]
    pub total_time: String,
    #[serde(rename = "RecipeIngredientParts")]
    pub ingredients: Vec<String>,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    #[serde(rename = "RecipeInstructions")]
    pub instructions: Vec<String>,
    #[serde(skip)]
    ingredient_text: String,
}

impl RecipeRecord {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        ingredients: Vec<String>,
        nutrition: Nutrition,
    ) -> Self {
        let ingredient_text = ingredients
            .iter()
            .map(|i| i.to_lowercase())
            .collect::<Vec<_>>()
            .join(";");
        Self {
            id,
            name: name.into(),
            cook_time: String::new(),
            prep_time: String::new(),
            total_time: String::new(),
            ingredients,
            nutrition,
            instructions: Vec::new(),
            ingredient_text,
        }
    }

    pub fn with_times(
        mut self,
        cook: impl Into<String>,
        prep: impl Into<String>,
        total: impl Into<String>,
    ) -> Self {
        self.cook_time = cook.into();
        self.prep_time = prep.into();
        self.total_time = total.into();
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Lowercased ingredient parts joined with `;`, used for keyword filters.
    /// A keyword spanning two parts, such as `"breast garlic"`, does not match.
    pub fn ingredient_text(&self) -> &str {
        &self.ingredient_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_order_matches_columns() {
        let n = Nutrition::from_vector([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let json = serde_json::to_value(n).unwrap();
        for (i, col) in NUTRITION_COLUMNS.iter().enumerate() {
            assert_eq!(json[*col].as_f64(), Some((i + 1) as f64), "column {}", col);
        }
        assert_eq!(n.to_vector()[8], 9.0);
    }

    #[test]
    fn record_serializes_flat_pascal_case() {
        let r = RecipeRecord::new(7, "Soup", vec!["Chicken Broth".into()], Nutrition::default())
            .with_times("PT10M", "PT5M", "PT15M");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["Name"], "Soup");
        assert_eq!(json["TotalTime"], "PT15M");
        assert!(json.get("Calories").is_some());
        assert!(json.get("ingredient_text").is_none());
    }

    #[test]
    fn ingredient_text_is_lowercased_and_joined() {
        let r = RecipeRecord::new(
            1,
            "x",
            vec!["Chicken Breast".into(), "garlic".into()],
            Nutrition::default(),
        );
        assert_eq!(r.ingredient_text(), "chicken breast;garlic");
        assert!(!r.ingredient_text().contains("breast garlic"));
        assert!(!r.ingredient_text().contains("breast, garlic"));
    }
}
