use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Structured result returned by the external model.
///
/// Cardinalities (3-5 issues, 5-7 recommendations) and the 0-100 score range are
/// requested from the model but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepAnalysis {
    pub main_issues: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub sleep_score: i64,
    pub summary: String,
}

/// One submission and its analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepAnalysisRecord {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    pub user_message: String,
    pub analysis: SleepAnalysis,
}

impl SleepAnalysisRecord {
    /// Create a record with a fresh id and the current timestamp.
    pub fn new(user_message: impl Into<String>, analysis: SleepAnalysis) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), Utc::now(), user_message, analysis)
    }

    /// The timestamp is truncated to milliseconds, the precision it is stored with.
    pub fn with_id(
        id: impl Into<String>,
        date: DateTime<Utc>,
        user_message: impl Into<String>,
        analysis: SleepAnalysis,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.trunc_subsecs(3),
            user_message: user_message.into(),
            analysis,
        }
    }

    pub fn sleep_score(&self) -> i64 {
        self.analysis.sleep_score
    }
}

/// Accepts `55` as well as `55.0`; models occasionally emit floats.
fn lenient_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid sleepScore: {}", value)))
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-01-01T08:00:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
