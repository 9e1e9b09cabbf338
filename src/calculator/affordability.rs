use chrono::{Months, NaiveDate};

use crate::calculator::category::is_category_blocked;
use crate::calculator::cooldown::{cooldown_for_price, CalcError};
use crate::models::{CooldownRange, FinancialProfile};

pub const DAYS_PER_MONTH: u32 = 30;

/// Stand-in day count for a wish that can never be afforded. Never shown
/// as a number; see [`RecommendedCooldown`]'s `Display`.
pub const UNREACHABLE_DAYS: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordability {
    /// Whole months of saving still needed; 0 means affordable now.
    Months(u32),
    Unreachable,
}

impl Affordability {
    fn as_days(&self) -> u32 {
        match self {
            Affordability::Months(m) => m.saturating_mul(DAYS_PER_MONTH),
            Affordability::Unreachable => UNREACHABLE_DAYS,
        }
    }
}

impl std::fmt::Display for Affordability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Affordability::Months(0) => write!(f, "affordable now"),
            Affordability::Months(1) => write!(f, "1 month"),
            Affordability::Months(m) => write!(f, "{} months", m),
            Affordability::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Months of saving `monthly_allocation` until `savings` covers `price`.
pub fn months_to_afford(price: f64, savings: f64, monthly_allocation: f64) -> Affordability {
    if savings >= price {
        return Affordability::Months(0);
    }
    if !(monthly_allocation > 0.0) {
        return Affordability::Unreachable;
    }
    let months = ((price - savings) / monthly_allocation).ceil().max(0.0);
    // float-to-int casts saturate
    Affordability::Months(months as u32)
}

/// Like [`months_to_afford`], but `comfort_percent` of both savings and the
/// monthly allocation stay untouched as a cushion.
pub fn comfort_months(
    price: f64,
    savings: f64,
    monthly_allocation: f64,
    comfort_percent: f64,
) -> Affordability {
    let remain = 1.0 - comfort_percent;
    if !(remain > 0.0) {
        return Affordability::Unreachable;
    }
    let left = price - savings * remain;
    if left <= 0.0 {
        return Affordability::Months(0);
    }
    if !(monthly_allocation > 0.0) {
        return Affordability::Unreachable;
    }
    let months = (left / (monthly_allocation * remain)).ceil();
    Affordability::Months(months as u32)
}

/// Calendar date on which the wish becomes affordable, month-end clamped.
pub fn afford_date(created: NaiveDate, affordability: Affordability) -> Option<NaiveDate> {
    match affordability {
        Affordability::Months(m) => created.checked_add_months(Months::new(m)),
        Affordability::Unreachable => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedCooldown {
    /// `max(bracket_days, months * 30)`, or [`UNREACHABLE_DAYS`].
    pub days: u32,
    pub bracket_days: u32,
    pub affordability: Affordability,
}

impl RecommendedCooldown {
    fn combine(bracket_days: u32, affordability: Affordability) -> Self {
        Self {
            days: bracket_days.max(affordability.as_days()),
            bracket_days,
            affordability,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.affordability == Affordability::Unreachable
    }

    /// Concrete day count, or `None` when the wish is unreachable.
    pub fn reachable_days(&self) -> Option<u32> {
        (!self.is_unreachable()).then_some(self.days)
    }
}

impl std::fmt::Display for RecommendedCooldown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reachable_days() {
            Some(1) => write!(f, "1 day"),
            Some(days) => write!(f, "{} days", days),
            None => write!(f, "unreachable"),
        }
    }
}

pub fn recommended_cooldown(
    price: f64,
    savings: f64,
    monthly_allocation: f64,
    ranges: &[CooldownRange],
) -> Result<RecommendedCooldown, CalcError> {
    let bracket_days = cooldown_for_price(price, ranges)?;
    Ok(RecommendedCooldown::combine(
        bracket_days,
        months_to_afford(price, savings, monthly_allocation),
    ))
}

/// Everything the add-wish flow needs to know about a prospective purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub blocked: bool,
    /// `None` when no bracket matched and the fallback was used.
    pub matched_bracket: Option<u32>,
    pub recommended: RecommendedCooldown,
}

impl Quote {
    pub fn bracket_days(&self) -> u32 {
        self.recommended.bracket_days
    }
}

pub fn quote(
    price: f64,
    category: &str,
    profile: &FinancialProfile,
    ranges: &[CooldownRange],
    fallback_days: u32,
) -> Quote {
    let savings = profile.total_savings;
    let monthly = profile.monthly_allocation;
    let (matched_bracket, recommended) =
        match recommended_cooldown(price, savings, monthly, ranges) {
            Ok(rec) => (Some(rec.bracket_days), rec),
            Err(e) => {
                log::debug!("{}; using fallback of {} days", e, fallback_days);
                let affordability = months_to_afford(price, savings, monthly);
                (None, RecommendedCooldown::combine(fallback_days, affordability))
            }
        };
    Quote {
        blocked: is_category_blocked(category, &profile.blocked_categories),
        matched_bracket,
        recommended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brackets() -> Vec<CooldownRange> {
        vec![
            CooldownRange::new(0.0, Some(5000.0), 3),
            CooldownRange::new(5001.0, None, 7),
        ]
    }

    #[test]
    fn zero_months_when_savings_cover_price() {
        for (p, s) in [(0.0, 0.0), (100.0, 100.0), (100.0, 1e9), (99.99, 100.0)] {
            assert_eq!(months_to_afford(p, s, 0.0), Affordability::Months(0));
            assert_eq!(months_to_afford(p, s, 50.0), Affordability::Months(0));
        }
    }

    #[test]
    fn unreachable_without_allocation() {
        assert_eq!(months_to_afford(100.0, 0.0, 0.0), Affordability::Unreachable);
        assert_eq!(months_to_afford(100.0, 0.0, -5.0), Affordability::Unreachable);
    }

    #[test]
    fn rounds_months_up() {
        assert_eq!(months_to_afford(1000.0, 200.0, 100.0), Affordability::Months(8));
        assert_eq!(months_to_afford(1000.0, 200.0, 300.0), Affordability::Months(3));
        assert_eq!(months_to_afford(1000.0, 999.0, 1000.0), Affordability::Months(1));
    }

    #[test]
    fn recommended_takes_longer_of_bracket_and_saving() {
        let quick = recommended_cooldown(1000.0, 200.0, 100.0, &brackets()).unwrap();
        assert_eq!(quick.days, 240);
        assert_eq!(quick.bracket_days, 3);

        let covered = recommended_cooldown(6000.0, 10000.0, 0.0, &brackets()).unwrap();
        assert_eq!(covered.days, 7);
        assert_eq!(covered.to_string(), "7 days");
    }

    #[test]
    fn unreachable_recommendation_is_never_zero() {
        let rec = recommended_cooldown(100.0, 0.0, 0.0, &brackets()).unwrap();
        assert!(rec.is_unreachable());
        assert_eq!(rec.days, UNREACHABLE_DAYS);
        assert_eq!(rec.reachable_days(), None);
        assert_eq!(rec.to_string(), "unreachable");
    }

    #[test]
    fn recommended_is_idempotent() {
        let a = recommended_cooldown(7500.0, 1200.0, 900.0, &brackets());
        let b = recommended_cooldown(7500.0, 1200.0, 900.0, &brackets());
        assert_eq!(a, b);
    }

    #[test]
    fn recommended_propagates_missing_bracket() {
        let ranges = [CooldownRange::new(10.0, Some(20.0), 1)];
        assert_eq!(
            recommended_cooldown(5.0, 0.0, 1.0, &ranges),
            Err(CalcError::NoMatchingRange(5.0))
        );
    }

    #[test]
    fn huge_month_counts_saturate() {
        let rec = recommended_cooldown(1e15, 0.0, 1.0, &brackets()).unwrap();
        assert_eq!(rec.affordability, Affordability::Months(u32::MAX));
        assert_eq!(rec.days, u32::MAX);
        assert!(!rec.is_unreachable());
    }

    #[test]
    fn comfort_keeps_a_cushion() {
        // 1000 - 400*0.5 = 800 left, 100*0.5 = 50 per month
        assert_eq!(comfort_months(1000.0, 400.0, 100.0, 0.5), Affordability::Months(16));
        assert_eq!(comfort_months(1000.0, 400.0, 100.0, 0.0), Affordability::Months(6));
        assert_eq!(comfort_months(100.0, 400.0, 0.0, 0.5), Affordability::Months(0));
        assert_eq!(comfort_months(100.0, 0.0, 10.0, 1.0), Affordability::Unreachable);
        assert_eq!(comfort_months(100.0, 0.0, 0.0, 0.2), Affordability::Unreachable);
    }

    #[test]
    fn afford_date_adds_calendar_months() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            afford_date(created, Affordability::Months(1)),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(afford_date(created, Affordability::Months(0)), Some(created));
        assert_eq!(afford_date(created, Affordability::Unreachable), None);
    }

    #[test]
    fn quote_uses_fallback_and_blocked_list() {
        let profile = FinancialProfile {
            total_savings: 0.0,
            monthly_allocation: 1000.0,
            blocked_categories: vec!["игры".into()],
        };
        let ranges = [CooldownRange::new(0.0, Some(100.0), 2)];

        let q = quote(500.0, "Игровая консоль", &profile, &ranges, 7);
        assert!(q.blocked);
        assert_eq!(q.matched_bracket, None);
        assert_eq!(q.bracket_days(), 7);
        assert_eq!(q.recommended.days, 30);

        let q = quote(50.0, "книги", &profile, &ranges, 7);
        assert!(!q.blocked);
        assert_eq!(q.matched_bracket, Some(2));
        assert_eq!(q.recommended.days, 30);
    }

    #[test]
    fn affordability_labels() {
        assert_eq!(Affordability::Months(0).to_string(), "affordable now");
        assert_eq!(Affordability::Months(1).to_string(), "1 month");
        assert_eq!(Affordability::Months(4).to_string(), "4 months");
        assert_eq!(Affordability::Unreachable.to_string(), "unreachable");
    }
}
