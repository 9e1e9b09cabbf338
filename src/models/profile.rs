use serde::{Deserialize, Serialize};

/// User profile as stored by the backend under `/api/user/:nick`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub total_savings_profile: f64,
    #[serde(default)]
    pub monthly_saving_profile: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blocked_categories: Vec<String>,
    /// Share of savings kept untouched (0..1).
    #[serde(default)]
    pub comfort_percent: f64,
}

/// The slice of the profile the calculator reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialProfile {
    pub total_savings: f64,
    pub monthly_allocation: f64,
    pub blocked_categories: Vec<String>,
}

impl UserProfile {
    pub fn empty(nick: &str) -> Self {
        Self {
            nick: nick.to_string(),
            ..Self::default()
        }
    }

    pub fn financial(&self) -> FinancialProfile {
        FinancialProfile {
            total_savings: self.total_savings_profile.max(0.0),
            monthly_allocation: self.monthly_saving_profile.max(0.0),
            blocked_categories: self.blocked_categories.clone(),
        }
    }
}

/// Split a comma-separated list as typed by the user, dropping blanks.
pub fn parse_category_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
