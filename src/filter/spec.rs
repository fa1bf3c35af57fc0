use crate::filter::error::FilterError;
use crate::filter::timestep::timestep_tokens;
use bon::Builder;

/// Chooses how the include patterns of a [`FilterSpec`] combine.
///
/// Forecast and upload call sites historically required every pattern to be
/// present; the historical-archive and MOSMIX call sites required only one.
/// The mode is an explicit parameter so the choice is visible at the call
/// site instead of being an implicit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludeMode {
    /// Every include pattern must be a substring of the filename.
    #[default]
    All,
    /// At least one include pattern must be a substring of the filename.
    Any,
}

/// The criteria one filtering call selects filenames by.
///
/// All collections default to empty and an empty criterion matches
/// everything, so `FilterSpec::default()` selects every input filename.
///
/// # Examples
///
/// ```
/// use dwdsync::FilterSpec;
///
/// let spec = FilterSpec::builder()
///     .prefix("icon-d2_germany")
///     .suffix(".grib2.bz2")
///     .exclude(vec!["icosahedral".to_string()])
///     .build()
///     .with_timestep_range(Some(0), Some(12))
///     .unwrap();
/// assert_eq!(spec.timesteps.len(), 13);
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct FilterSpec {
    /// Filenames must start with this. Empty matches everything.
    #[builder(default, into)]
    pub prefix: String,

    /// Filenames must end with this. Empty matches everything.
    #[builder(default, into)]
    pub suffix: String,

    /// Substring patterns combined per [`IncludeMode`]. Empty passes.
    #[builder(default)]
    pub include: Vec<String>,

    #[builder(default)]
    pub include_mode: IncludeMode,

    /// Filenames containing any of these are dropped.
    #[builder(default)]
    pub exclude: Vec<String>,

    /// Lead-time tokens; at least one must be a substring unless the check is
    /// bypassed. Empty passes.
    #[builder(default)]
    pub timesteps: Vec<String>,

    /// Bypasses the timestep check entirely, for categories that are not
    /// timestep-partitioned (station archives, MOSMIX point forecasts).
    #[builder(default)]
    pub bypass_timesteps: bool,

    /// Categories whose files skip the ordinary filter altogether and are
    /// appended to the result unconditionally.
    #[builder(default)]
    pub skip_timestep_categories: Vec<String>,
}

impl FilterSpec {
    /// Appends the tokens for `[min, max]` (defaults 0 and 48) to the
    /// timestep list. Additive: tokens already present stay.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidTimestepRange`] for a negative or
    /// inverted range.
    pub fn with_timestep_range(
        mut self,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Self, FilterError> {
        self.timesteps.extend(timestep_tokens(min, max)?);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_is_fully_permissive() {
        let spec = FilterSpec::default();
        assert!(spec.prefix.is_empty());
        assert!(spec.suffix.is_empty());
        assert!(spec.include.is_empty());
        assert!(spec.timesteps.is_empty());
        assert_eq!(spec.include_mode, IncludeMode::All);
    }

    #[test]
    fn timestep_range_appends_to_existing_tokens() -> Result<(), FilterError> {
        let spec = FilterSpec::builder()
            .timesteps(vec!["_100_".to_string()])
            .build()
            .with_timestep_range(Some(0), Some(1))?;
        assert_eq!(spec.timesteps, vec!["_100_", "_000_", "_001_"]);
        Ok(())
    }

    #[test]
    fn invalid_timestep_range_is_rejected_before_filtering() {
        let result = FilterSpec::default().with_timestep_range(Some(5), Some(1));
        assert!(matches!(
            result,
            Err(FilterError::InvalidTimestepRange { min: 5, max: 1 })
        ));
    }
}
