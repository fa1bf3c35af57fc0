use crate::filter::category::{category_of, extract_tag, numeric_tag_pattern};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Second filtering stage: per-category constraints keyed by each file's
/// parent-directory category (case-insensitive).
///
/// - With neither constraint, the input is returned unchanged.
/// - `categories` is an allowlist: files of other categories are dropped.
/// - `patterns` constrains the numeric tag (the `_<digits>_<category>`
///   filename convention) of the categories it names; a file of a constrained
///   category is kept only when its tag parses and is a member of the
///   constraint set. Files of categories *not* named in the map are kept
///   unconditionally — a permissive default carried over from the original
///   behavior, see DESIGN.md.
pub fn advanced_filter(
    filenames: &[String],
    categories: Option<&[String]>,
    patterns: Option<&HashMap<String, Vec<i64>>>,
) -> Vec<String> {
    if categories.is_none() && patterns.is_none() {
        return filenames.to_vec();
    }

    let allowed: Option<HashSet<String>> =
        categories.map(|cats| cats.iter().map(|c| c.to_lowercase()).collect());
    // One compiled matcher per constrained category, reused across the whole
    // listing.
    let constraints: Option<HashMap<String, (HashSet<i64>, Option<Regex>)>> =
        patterns.map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let category = k.to_lowercase();
                    let pattern = numeric_tag_pattern(&category);
                    (category, (v.iter().copied().collect(), pattern))
                })
                .collect()
        });

    let tag_allowed = |file: &str, category: &str| -> bool {
        match constraints.as_ref().and_then(|map| map.get(category)) {
            Some((tags, Some(pattern))) => {
                extract_tag(pattern, file).is_some_and(|tag| tags.contains(&tag))
            }
            // A constraint whose pattern cannot compile matches nothing.
            Some((_, None)) => false,
            None => true,
        }
    };

    filenames
        .iter()
        .filter(|file| {
            let category = category_of(file);
            match &allowed {
                Some(set) => set.contains(&category) && tag_allowed(file, &category),
                None => tag_allowed(file, &category),
            }
        })
        .cloned()
        .collect()
}
