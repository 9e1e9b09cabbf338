use thiserror::Error;

use crate::models::CooldownRange;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("no cooldown range matches price {0}")]
    NoMatchingRange(f64),
    #[error("range {index} is invalid: {reason}")]
    InvalidRange { index: usize, reason: String },
    #[error("ranges {first} and {second} overlap")]
    OverlappingRanges { first: usize, second: usize },
}

/// Day count of the first bracket containing `price` (bounds inclusive).
pub fn cooldown_for_price(price: f64, ranges: &[CooldownRange]) -> Result<u32, CalcError> {
    ranges
        .iter()
        .find(|r| r.contains(price))
        .map(|r| r.days)
        .ok_or(CalcError::NoMatchingRange(price))
}

/// Reject brackets that make the lookup ambiguous. Gaps are allowed; a
/// price falling in one is handled by the caller's fallback.
pub fn validate_ranges(ranges: &[CooldownRange]) -> Result<(), CalcError> {
    for (index, r) in ranges.iter().enumerate() {
        if !r.min.is_finite() || r.min < 0.0 {
            return Err(CalcError::InvalidRange {
                index,
                reason: format!("lower bound {} must be a non-negative number", r.min),
            });
        }
        if let Some(max) = r.max {
            if max.is_nan() || max < r.min {
                return Err(CalcError::InvalidRange {
                    index,
                    reason: format!("upper bound {} is below lower bound {}", max, r.min),
                });
            }
        }
    }

    let mut order: Vec<usize> = (0..ranges.len()).collect();
    order.sort_by(|&a, &b| ranges[a].min.total_cmp(&ranges[b].min));
    for pair in order.windows(2) {
        let (lo, hi) = (&ranges[pair[0]], &ranges[pair[1]]);
        if hi.min <= lo.upper() {
            let (first, second) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            return Err(CalcError::OverlappingRanges { first, second });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_brackets() -> Vec<CooldownRange> {
        vec![
            CooldownRange::new(0.0, Some(5000.0), 3),
            CooldownRange::new(5001.0, None, 7),
        ]
    }

    #[test]
    fn upper_bound_is_inclusive() {
        assert_eq!(cooldown_for_price(5000.0, &two_brackets()), Ok(3));
        assert_eq!(cooldown_for_price(5001.0, &two_brackets()), Ok(7));
        assert_eq!(cooldown_for_price(0.0, &two_brackets()), Ok(3));
    }

    #[test]
    fn gap_between_brackets_has_no_match() {
        assert_eq!(
            cooldown_for_price(5000.5, &two_brackets()),
            Err(CalcError::NoMatchingRange(5000.5))
        );
        assert_eq!(cooldown_for_price(10.0, &[]), Err(CalcError::NoMatchingRange(10.0)));
    }

    #[test]
    fn first_match_wins() {
        let ranges = [
            CooldownRange::new(0.0, Some(100.0), 1),
            CooldownRange::new(50.0, Some(200.0), 2),
        ];
        assert_eq!(cooldown_for_price(75.0, &ranges), Ok(1));
    }

    #[test]
    fn validates_partition() {
        assert_eq!(validate_ranges(&two_brackets()), Ok(()));
        assert_eq!(validate_ranges(&[]), Ok(()));

        let reversed = [
            CooldownRange::new(5001.0, None, 7),
            CooldownRange::new(0.0, Some(5000.0), 3),
        ];
        assert_eq!(validate_ranges(&reversed), Ok(()));
    }

    #[test]
    fn rejects_overlap_and_inverted_bounds() {
        let overlapping = [
            CooldownRange::new(0.0, Some(100.0), 1),
            CooldownRange::new(100.0, None, 2),
        ];
        assert_eq!(
            validate_ranges(&overlapping),
            Err(CalcError::OverlappingRanges { first: 0, second: 1 })
        );

        let unbounded_first = [
            CooldownRange::new(0.0, None, 1),
            CooldownRange::new(500.0, Some(600.0), 2),
        ];
        assert!(validate_ranges(&unbounded_first).is_err());

        let inverted = [CooldownRange::new(10.0, Some(5.0), 1)];
        assert!(matches!(
            validate_ranges(&inverted),
            Err(CalcError::InvalidRange { index: 0, .. })
        ));

        let negative = [CooldownRange::new(-1.0, Some(5.0), 1)];
        assert!(validate_ranges(&negative).is_err());
    }
}
