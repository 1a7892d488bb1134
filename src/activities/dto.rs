use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// One entry of the append-only activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(with = "timestamp")]
    pub timestamp: OffsetDateTime,
    #[serde(rename = "type")]
    pub kind: String, // recipe_view, planner_add, planner_remove, search
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl ActivityEntry {
    pub fn now(kind: impl Into<String>, meta: Map<String, Value>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            kind: kind.into(),
            meta,
        }
    }
}

/// RFC 3339 on the wire. Offset-less ISO timestamps from clients are read as UTC.
mod timestamp {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::{format_description::well_known::Rfc3339, macros::format_description};
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn serialize<S: Serializer>(ts: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::serialize(ts, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{}`", raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<OffsetDateTime> {
        if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Some(ts);
        }
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
        )
        .ok()
        .map(PrimitiveDateTime::assume_utc)
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize { 200 }

#[derive(Debug, Serialize)]
pub struct ActivityList {
    pub items: Vec<ActivityEntry>,
}
