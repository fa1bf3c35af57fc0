use regex::Regex;
use std::path::Path;

/// Derives the logical category of a file from the basename of its parent
/// directory, lower-cased.
///
/// Weather file trees are laid out as `<run>/<variable>/<file>`, so the parent
/// directory carries the variable name (e.g. `t_2m`, `relhum`). A path with no
/// parent yields an empty category.
///
/// # Examples
///
/// ```
/// use dwdsync::category_of;
///
/// assert_eq!(category_of("00/T_2M/icon-d2_000_T_2M.grib2.bz2"), "t_2m");
/// assert_eq!(category_of("lone_file.csv"), "");
/// ```
pub fn category_of(path: &str) -> String {
    Path::new(path)
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Compiles the matcher for one category's numeric tags, following the
/// `_<digits>_<category>.` filename convention. Compile once per category and
/// reuse across a listing; see [`extract_tag`].
pub fn numeric_tag_pattern(category: &str) -> Option<Regex> {
    Regex::new(&format!("_([0-9]+)_{}\\.", regex::escape(category))).ok()
}

/// Extracts the numeric tag from a filename using a matcher from
/// [`numeric_tag_pattern`]. Matching is case-insensitive and anchored to the
/// file's basename. Returns `None` when the filename does not follow the
/// convention.
pub fn extract_tag(pattern: &Regex, path: &str) -> Option<i64> {
    let file_name = Path::new(path).file_name()?.to_string_lossy().to_lowercase();
    let caps = pattern.captures(&file_name)?;
    caps.get(1)?.as_str().parse().ok()
}

/// One-shot convenience over [`numeric_tag_pattern`] + [`extract_tag`]
/// (e.g. `..._1000_relhum.csv` with category `relhum` yields `1000`).
pub fn numeric_tag(path: &str, category: &str) -> Option<i64> {
    let pattern = numeric_tag_pattern(category)?;
    extract_tag(&pattern, path)
}
