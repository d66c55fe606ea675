//! Settings surface for the detector and extractor, with TOML loading.
//!
//! Mirrors the shape of a rules file: a plain `serde`-derived struct with a
//! `Default` impl matching the documented defaults, and a thin
//! `toml::from_str` wrapper so callers that prefer a configuration file over
//! constructing the struct in-process have a documented path.

use serde::{Deserialize, Serialize};

use crate::core::error::GlycosectorError;

/// Settings consumed by [`crate::detector::SugarPatternDetector`]
/// implementations.
///
/// Read-only during extraction: both the detector and the extractor take
/// this by shared reference, so the type system rather than a runtime guard
/// enforces the "configured once, read many times" contract of a
/// single-threaded synchronous core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Only remove sugars attached to the rest of the molecule by a single
    /// bond; internal (bridging) sugars are left in place.
    pub remove_only_terminal_sugars: bool,
    /// Minimum heavy-atom count a fragment must retain to be preserved as a
    /// standalone sugar, rather than folded back or discarded.
    pub preservation_mode_threshold: u32,
    /// When a ring shares a single spiro atom with a non-sugar ring, stamp
    /// that atom instead of removing it, so the extractor can duplicate it
    /// onto both sides.
    pub detect_spiro_rings_as_circular_sugars: bool,
    /// Minimum number of consecutive qualifying carbons for an acyclic chain
    /// to be considered a linear sugar candidate.
    pub linear_sugar_candidate_min_size: u32,
    /// Minimum ratio of exocyclic hydroxy-like oxygen substituents to ring
    /// atoms for a ring to qualify as a candidate circular sugar.
    pub exocyclic_oxygen_ratio_threshold: f64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            remove_only_terminal_sugars: true,
            preservation_mode_threshold: 5,
            detect_spiro_rings_as_circular_sugars: false,
            linear_sugar_candidate_min_size: 4,
            exocyclic_oxygen_ratio_threshold: 0.5,
        }
    }
}

impl DetectorSettings {
    /// Parses settings from a TOML payload, falling back to [`Default`] for
    /// any field the payload omits.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::config::DetectorSettings;
    ///
    /// let settings = DetectorSettings::from_toml(
    ///     "preservation_mode_threshold = 7\n",
    /// )
    /// .unwrap();
    /// assert_eq!(settings.preservation_mode_threshold, 7);
    /// assert!(settings.remove_only_terminal_sugars);
    /// ```
    pub fn from_toml(payload: &str) -> Result<Self, GlycosectorError> {
        toml::from_str(payload).map_err(GlycosectorError::from)
    }
}

/// Options passed to [`crate::extractor::copy_and_extract`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorOptions {
    /// Enables the circular-sugar branch of the detector.
    pub extract_circular: bool,
    /// Enables the linear-sugar branch of the detector.
    pub extract_linear: bool,
    /// If set, open valences left by broken bonds are saturated with pseudo
    /// `R` atoms; otherwise with implicit hydrogens.
    pub mark_attach_points_by_r: bool,
    /// Enables the post-processing splitter after extraction.
    pub post_process_sugars: bool,
    /// Enables the size gate inside every splitter routine.
    pub limit_post_processing_by_size: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            extract_circular: true,
            extract_linear: false,
            mark_attach_points_by_r: false,
            post_process_sugars: false,
            limit_post_processing_by_size: true,
        }
    }
}

impl ExtractorOptions {
    /// Parses options from a TOML payload, falling back to [`Default`] for
    /// any field the payload omits.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::config::ExtractorOptions;
    ///
    /// let options = ExtractorOptions::from_toml("extract_linear = true\n").unwrap();
    /// assert!(options.extract_linear);
    /// assert!(options.extract_circular);
    /// ```
    pub fn from_toml(payload: &str) -> Result<Self, GlycosectorError> {
        toml::from_str(payload).map_err(GlycosectorError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_settings_default_matches_documented_values() {
        let settings = DetectorSettings::default();
        assert!(settings.remove_only_terminal_sugars);
        assert_eq!(settings.preservation_mode_threshold, 5);
        assert!(!settings.detect_spiro_rings_as_circular_sugars);
        assert_eq!(settings.linear_sugar_candidate_min_size, 4);
    }

    #[test]
    fn extractor_options_default_matches_documented_values() {
        let options = ExtractorOptions::default();
        assert!(options.extract_circular);
        assert!(!options.extract_linear);
        assert!(!options.mark_attach_points_by_r);
        assert!(!options.post_process_sugars);
        assert!(options.limit_post_processing_by_size);
    }

    #[test]
    fn detector_settings_from_toml_overrides_only_given_fields() {
        let settings = DetectorSettings::from_toml("linear_sugar_candidate_min_size = 6\n").unwrap();
        assert_eq!(settings.linear_sugar_candidate_min_size, 6);
        assert_eq!(
            settings.preservation_mode_threshold,
            DetectorSettings::default().preservation_mode_threshold
        );
    }

    #[test]
    fn extractor_options_from_toml_rejects_malformed_payload() {
        let result = ExtractorOptions::from_toml("not valid toml {{{");
        assert!(result.is_err());
    }
}
