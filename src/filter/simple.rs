use crate::filter::category::category_of;
use crate::filter::spec::{FilterSpec, IncludeMode};
use std::collections::HashSet;

fn include_matches(filename: &str, patterns: &[String], mode: IncludeMode) -> bool {
    if patterns.is_empty() {
        return true;
    }
    match mode {
        IncludeMode::All => patterns.iter().all(|p| filename.contains(p.as_str())),
        IncludeMode::Any => patterns.iter().any(|p| filename.contains(p.as_str())),
    }
}

fn timestep_matches(filename: &str, spec: &FilterSpec) -> bool {
    spec.bypass_timesteps
        || spec.timesteps.is_empty()
        || spec.timesteps.iter().any(|t| filename.contains(t.as_str()))
}

/// First filtering stage: keeps the filenames that satisfy every criterion of
/// `spec` (prefix, suffix, include patterns, timestep membership, exclusion).
///
/// Filenames whose category is listed in `spec.skip_timestep_categories` are
/// additionally appended to the result regardless of the ordinary criteria:
/// those variables are not timestep-partitioned but must still reach the
/// downstream per-variable merges. The two passes are independent, so a file
/// can appear twice; downstream consumers deduplicate by path.
pub fn simple_filter(filenames: &[String], spec: &FilterSpec) -> Vec<String> {
    let mut filtered: Vec<String> = filenames
        .iter()
        .filter(|f| {
            f.starts_with(&spec.prefix)
                && f.ends_with(&spec.suffix)
                && include_matches(f, &spec.include, spec.include_mode)
                && timestep_matches(f, spec)
                && !spec.exclude.iter().any(|p| f.contains(p.as_str()))
        })
        .cloned()
        .collect();

    if !spec.skip_timestep_categories.is_empty() {
        let targets: HashSet<String> = spec
            .skip_timestep_categories
            .iter()
            .map(|v| v.to_lowercase())
            .collect();
        filtered.extend(
            filenames
                .iter()
                .filter(|f| targets.contains(&category_of(f)))
                .cloned(),
        );
    }

    filtered
}
