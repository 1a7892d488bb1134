use std::{collections::HashSet, io::Read, path::Path};

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::RecipeQuery;
use super::repo_types::{Nutrition, RecipeRecord, NUTRITION_COLUMNS, NUTRITION_DIM};

/// The recipe dataset, loaded once at startup.
#[derive(Debug, Default)]
pub struct RecipeCatalog {
    records: Vec<RecipeRecord>,
}

impl RecipeCatalog {
    pub fn new(records: Vec<RecipeRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        for r in &records {
            if !seen.insert(r.id) {
                warn!(id = r.id, name = %r.name, "duplicate recipe id; lookups return the first row");
            }
        }
        Self { records }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open dataset {}", path.display()))?;
        let catalog = Self::from_reader(file)
            .with_context(|| format!("load dataset {}", path.display()))?;
        if catalog.is_empty() {
            warn!(path = %path.display(), "recipe dataset has no rows; every recommendation will be empty");
        } else {
            info!(rows = catalog.len(), path = %path.display(), "recipe dataset loaded");
        }
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(rdr: R) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_reader(rdr);
        let headers = reader.headers().context("read dataset headers")?.clone();
        let columns = Columns::resolve(&headers)?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let rec = result.with_context(|| format!("read dataset row {}", row + 1))?;
            records.push(columns.parse_row(&rec, row)?);
        }
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RecipeRecord] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&RecipeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Filters, sorts by calories and pages. Returns the pre-paging match count.
    pub fn search(&self, q: &RecipeQuery) -> (usize, Vec<&RecipeRecord>) {
        let search = q.search.as_deref().map(str::to_lowercase);
        let ingredient = q.ingredient.as_deref().map(str::to_lowercase);

        let mut hits: Vec<&RecipeRecord> = self
            .records
            .iter()
            .filter(|r| match &search {
                Some(s) => r.name.to_lowercase().contains(s.as_str()),
                None => true,
            })
            .filter(|r| match &ingredient {
                Some(i) => r.ingredient_text().contains(i.as_str()),
                None => true,
            })
            .filter(|r| q.min_calories.map_or(true, |min| r.nutrition.calories >= min))
            .filter(|r| q.max_calories.map_or(true, |max| r.nutrition.calories <= max))
            .collect();

        let total = hits.len();
        hits.sort_by(|a, b| a.nutrition.calories.total_cmp(&b.nutrition.calories));
        let page = hits.into_iter().skip(q.offset).take(q.limit).collect();
        (total, page)
    }
}

struct Columns {
    id: Option<usize>,
    name: usize,
    cook_time: Option<usize>,
    prep_time: Option<usize>,
    total_time: Option<usize>,
    ingredients: usize,
    instructions: Option<usize>,
    nutrition: [usize; NUTRITION_DIM],
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "dataset is missing column {:?}; available columns: {:?}",
                    name,
                    headers.iter().collect::<Vec<_>>()
                )
            })
        };

        let mut nutrition = [0usize; NUTRITION_DIM];
        for (slot, col) in nutrition.iter_mut().zip(NUTRITION_COLUMNS) {
            *slot = require(col)?;
        }

        Ok(Self {
            id: find("id"),
            name: require("Name")?,
            cook_time: find("CookTime"),
            prep_time: find("PrepTime"),
            total_time: find("TotalTime"),
            ingredients: require("RecipeIngredientParts")?,
            instructions: find("RecipeInstructions"),
            nutrition,
        })
    }

    fn parse_row(&self, rec: &csv::StringRecord, row: usize) -> anyhow::Result<RecipeRecord> {
        let cell = |idx: usize| rec.get(idx).unwrap_or("").trim();
        let opt_cell = |idx: Option<usize>| idx.map(cell).unwrap_or("").to_string();

        let id = match self.id {
            Some(idx) => parse_id(cell(idx))
                .with_context(|| format!("row {}: invalid id {:?}", row + 1, cell(idx)))?,
            None => row as i64,
        };

        let mut values = [0f64; NUTRITION_DIM];
        for (i, (value, idx)) in values.iter_mut().zip(self.nutrition).enumerate() {
            *value = cell(idx).parse::<f64>().with_context(|| {
                format!(
                    "row {}: column {} is not a number: {:?}",
                    row + 1,
                    NUTRITION_COLUMNS[i],
                    cell(idx)
                )
            })?;
        }

        let instructions = self
            .instructions
            .map(|idx| parse_list(cell(idx)))
            .unwrap_or_default();

        Ok(RecipeRecord::new(
            id,
            cell(self.name),
            parse_list(cell(self.ingredients)),
            Nutrition::from_vector(values),
        )
        .with_times(
            opt_cell(self.cook_time),
            opt_cell(self.prep_time),
            opt_cell(self.total_time),
        )
        .with_instructions(instructions))
    }
}

fn parse_id(s: &str) -> anyhow::Result<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    let f = s.parse::<f64>()?;
    anyhow::ensure!(f.fract() == 0.0, "id must be integral");
    Ok(f as i64)
}

/// Splits a list-valued cell: `c("a", "b")`, `["a", "b"]` or a bare string.
pub(crate) fn parse_list(cell: &str) -> Vec<String> {
    lazy_static! {
        static ref QUOTED: Regex = Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap();
    }
    let cell = cell.trim();
    if cell.is_empty() || cell == "NA" || cell == "character(0)" {
        return Vec::new();
    }
    if !cell.contains('"') {
        return vec![cell.to_string()];
    }
    QUOTED
        .captures_iter(cell)
        .map(|c| c[1].replace("\\\"", "\"").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
