use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A scheduled meal. Duplicates are allowed; identity is the whole tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerEntry {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal: String, // breakfast, lunch, dinner, snack
    pub recipe_id: i64,
}

impl PlannerEntry {
    pub fn meta(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlannerRange {
    #[serde(default, with = "iso_date::option")]
    pub start: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub end: Option<Date>,
}

impl PlannerRange {
    pub fn contains(&self, date: Date) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

#[derive(Debug, Deserialize)]
pub struct RemovePlannerQuery {
    #[serde(rename = "date_", with = "iso_date")]
    pub date: Date,
    pub meal: String,
    pub recipe_id: i64,
}

impl From<RemovePlannerQuery> for PlannerEntry {
    fn from(q: RemovePlannerQuery) -> Self {
        Self {
            date: q.date,
            meal: q.meal,
            recipe_id: q.recipe_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlannerList {
    pub items: Vec<PlannerEntry>,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}
