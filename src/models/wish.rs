use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Category used when the user leaves it blank.
pub const DEFAULT_CATEGORY: &str = "прочее";

/// Upper limit for a cooling period chosen by hand.
pub const MAX_COOLING_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishStatus {
    #[default]
    Active,
    Completed,
    Canceled,
}

impl WishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishStatus::Active => "active",
            WishStatus::Completed => "completed",
            WishStatus::Canceled => "canceled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WishStatus::Active => "Active",
            WishStatus::Completed => "Completed",
            WishStatus::Canceled => "Canceled",
        }
    }

    /// Apply a status action. Only active wishes move; completed and
    /// canceled are final (they can still be deleted).
    pub fn apply(self, action: WishAction) -> Result<WishStatus, TransitionError> {
        match (self, action) {
            (WishStatus::Active, WishAction::Complete) => Ok(WishStatus::Completed),
            (WishStatus::Active, WishAction::Cancel) => Ok(WishStatus::Canceled),
            (from, action) => Err(TransitionError { from, action }),
        }
    }
}

impl std::fmt::Display for WishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for WishStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(WishStatus::Active),
            "completed" | "complete" | "done" => Ok(WishStatus::Completed),
            "canceled" | "cancelled" => Ok(WishStatus::Canceled),
            _ => Err(anyhow::anyhow!("Unknown wish status: {}", s)),
        }
    }
}

/// Status-changing action sent as `?action=` to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishAction {
    Complete,
    Cancel,
}

impl WishAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishAction::Complete => "complete",
            WishAction::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {} a wish that is already {}", .action.as_str(), .from.as_str())]
pub struct TransitionError {
    pub from: WishStatus,
    pub action: WishAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "cooldownDays")]
    pub cooling_days: u32,
    #[serde(default, alias = "recommendedCooldownDays")]
    pub recommended_cooling: u32,
    #[serde(default = "default_still_want")]
    pub still_want: bool,
    #[serde(default)]
    pub status: WishStatus,
    /// Months until affordable as computed by the backend; negative means never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comfort_months: Option<i64>,
}

fn default_still_want() -> bool {
    true
}

impl Wish {
    /// End of the cooling period; `None` without a creation timestamp or
    /// when the period runs past the last representable date.
    pub fn cooling_until(&self) -> Option<DateTime<Utc>> {
        self.created_at?
            .checked_add_signed(Duration::days(i64::from(self.cooling_days)))
    }

    /// True once the cooling period is over. Wishes without a creation
    /// timestamp are treated as cooled; a period too long to represent never ends.
    pub fn is_cooled(&self, now: DateTime<Utc>) -> bool {
        match (self.created_at, self.cooling_until()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(until)) => until <= now,
        }
    }

    /// Candidates for the "do you still want it?" review.
    pub fn needs_review(&self, now: DateTime<Utc>) -> bool {
        self.status == WishStatus::Active && self.still_want && self.is_cooled(now)
    }
}

/// A wish as submitted by the user, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWish {
    pub title: String,
    pub price: f64,
    pub category: String,
    pub cooling_days: u32,
    pub recommended_cooling: u32,
}

impl NewWish {
    pub fn new(
        title: &str,
        price: f64,
        category: &str,
        cooling_days: u32,
        recommended_cooling: u32,
    ) -> anyhow::Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Wish title must not be empty");
        }
        if !price.is_finite() || price <= 0.0 {
            anyhow::bail!("Price must be a positive number, got {}", price);
        }
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            c => c,
        };
        Ok(Self {
            title: title.to_string(),
            price,
            category: category.to_string(),
            cooling_days,
            recommended_cooling,
        })
    }

    pub fn into_wish(self, id: String, now: DateTime<Utc>) -> Wish {
        Wish {
            id,
            title: self.title,
            price: self.price,
            category: self.category,
            created_at: Some(now),
            updated_at: Some(now),
            cooling_days: self.cooling_days,
            recommended_cooling: self.recommended_cooling,
            still_want: true,
            status: WishStatus::Active,
            comfort_months: None,
        }
    }
}
