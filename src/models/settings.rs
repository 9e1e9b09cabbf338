use serde::{Deserialize, Serialize};

use crate::models::profile::{null_as_empty, parse_category_list};

/// Price bracket mapped to a cooldown duration. Both bounds are inclusive;
/// `max: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default, rename = "period", alias = "days")]
    pub days: u32,
}

impl CooldownRange {
    pub fn new(min: f64, max: Option<f64>, days: u32) -> Self {
        Self { min, max, days }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }

    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }
}

impl std::fmt::Display for CooldownRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) => write!(f, "{} – {}: {} days", self.min, max, self.days),
            None => write!(f, "{} and up: {} days", self.min, self.days),
        }
    }
}

/// Per-user settings under `/api/settings/:nick`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cooldowns: Vec<CooldownRange>,
    #[serde(default)]
    pub notification_frequency: String,
    /// Comma-separated, as typed on the settings page.
    #[serde(default)]
    pub excluded_products: String,
    #[serde(default)]
    pub notification_channel: String,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub total_purchases: u32,
    #[serde(default)]
    pub monthly_saving: f64,
}

impl Settings {
    pub fn excluded_list(&self) -> Vec<String> {
        parse_category_list(&self.excluded_products)
    }
}

/// Body of `POST /api/notify/:nick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let r = CooldownRange::new(0.0, Some(5000.0), 3);
        assert!(r.contains(0.0));
        assert!(r.contains(5000.0));
        assert!(!r.contains(5000.5));
        assert!(CooldownRange::new(5001.0, None, 7).contains(1e12));
    }

    #[test]
    fn decodes_settings_page_payload() {
        let json = r#"{
            "cooldowns": [{"min": 0, "max": 10000, "period": 3}, {"min": 10001, "max": null, "period": 14}],
            "notificationFrequency": "weekly",
            "excludedProducts": "алкоголь, сигареты",
            "notificationChannel": "email",
            "monthlySaving": 300
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.cooldowns.len(), 2);
        assert_eq!(settings.cooldowns[1].max, None);
        assert_eq!(settings.cooldowns[1].days, 14);
        assert_eq!(settings.total_purchases, 0);
        assert_eq!(settings.excluded_list(), vec!["алкоголь", "сигареты"]);
    }

    #[test]
    fn empty_backend_settings_decode() {
        let settings: Settings =
            serde_json::from_str(r#"{"cooldowns":null,"notificationFrequency":""}"#).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn range_serializes_with_period_key() {
        let json = serde_json::to_value(CooldownRange::new(1.0, None, 7)).unwrap();
        assert_eq!(json, serde_json::json!({"min": 1.0, "max": null, "period": 7}));
    }

    #[test]
    fn notification_uses_type_key() {
        let n = Notification {
            title: "t".into(),
            message: "m".into(),
            kind: "test".into(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "test");
    }
}
