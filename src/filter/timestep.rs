use crate::filter::error::FilterError;

pub const DEFAULT_MIN_TIMESTEP: i64 = 0;
pub const DEFAULT_MAX_TIMESTEP: i64 = 48;

/// Generates the forecast lead-time tokens for every integer in `[min, max]`
/// inclusive, zero-padded to three digits and wrapped in underscores
/// (`"_000_"`, `"_001_"`, ...). `None` bounds fall back to 0 and 48, the full
/// ICON-D2 forecast horizon.
///
/// The tokens are one dimension of filename filtering and are meant to be
/// appended to a caller-supplied include list, never to replace it (see
/// [`FilterSpec::with_timestep_range`](crate::FilterSpec::with_timestep_range)).
///
/// # Errors
///
/// Returns [`FilterError::InvalidTimestepRange`] when `min` is negative or
/// exceeds `max`.
pub fn timestep_tokens(min: Option<i64>, max: Option<i64>) -> Result<Vec<String>, FilterError> {
    let min = min.unwrap_or(DEFAULT_MIN_TIMESTEP);
    let max = max.unwrap_or(DEFAULT_MAX_TIMESTEP);

    if min < 0 || min > max {
        return Err(FilterError::InvalidTimestepRange { min, max });
    }

    Ok((min..=max).map(|t| format!("_{t:03}_")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_count_matches_range_width() -> Result<(), FilterError> {
        let tokens = timestep_tokens(Some(3), Some(12))?;
        assert_eq!(tokens.len(), 10);
        Ok(())
    }

    #[test]
    fn tokens_are_zero_padded_and_underscore_wrapped() -> Result<(), FilterError> {
        let tokens = timestep_tokens(Some(0), Some(2))?;
        assert_eq!(tokens, vec!["_000_", "_001_", "_002_"]);

        let re = regex::Regex::new(r"^_\d{3}_$").unwrap();
        for token in timestep_tokens(None, None)? {
            assert!(re.is_match(&token), "bad token: {token}");
        }
        Ok(())
    }

    #[test]
    fn defaults_cover_the_full_forecast_horizon() -> Result<(), FilterError> {
        let tokens = timestep_tokens(None, None)?;
        assert_eq!(tokens.len(), 49);
        assert_eq!(tokens.first().map(String::as_str), Some("_000_"));
        assert_eq!(tokens.last().map(String::as_str), Some("_048_"));
        Ok(())
    }

    #[test]
    fn single_step_range_yields_one_token() -> Result<(), FilterError> {
        assert_eq!(timestep_tokens(Some(0), Some(0))?, vec!["_000_"]);
        Ok(())
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            timestep_tokens(Some(10), Some(2)),
            Err(FilterError::InvalidTimestepRange { min: 10, max: 2 })
        );
    }

    #[test]
    fn negative_bound_is_rejected() {
        assert_eq!(
            timestep_tokens(Some(-1), None),
            Err(FilterError::InvalidTimestepRange {
                min: -1,
                max: DEFAULT_MAX_TIMESTEP
            })
        );
    }
}
