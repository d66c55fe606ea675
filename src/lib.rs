#![doc = include_str!("../README.md")]

pub mod config;
pub mod core;
pub mod detector;
pub mod extractor;
pub mod splitter;

pub use crate::core::graph::{
    deeper_copy, Atom, AtomId, AtomKind, AtomMap, Bond, BondId, BondMap, LonePair, MolecularGraph,
    PropertyMap, PropertyValue, SingleElectron, StereoElement, StereoReferent,
};
pub use crate::core::{BondDisplay, BondOrder, BondStereo, Element, StereoConfiguration};

pub use crate::core::error::{
    DetectorError, GlycosectorError, GraphValidationError, PatternMatchError,
};

pub use crate::config::{DetectorSettings, ExtractorOptions};
pub use crate::detector::{DefaultSugarDetector, SugarPatternDetector};
pub use crate::extractor::{
    atom_indices_of_group, bond_indices_of_group, copy_and_extract, group_indices_for_all_atoms,
    Diagnostic, DiagnosticLevel, ExtractionMaps, ExtractionOutcome,
};

/// Extracts sugar moieties from `mol` using the default detector and
/// extractor options (circular sugars only, terminal sugars only, implicit
/// hydrogen saturation, no post-processing).
///
/// `mol` is never mutated; the aglycone and any sugar fragments are returned
/// as independent graphs in [`ExtractionOutcome::fragments`].
///
/// # Examples
///
/// ```
/// use glycosector::{extract_sugars, Element, MolecularGraph};
///
/// let mut mol = MolecularGraph::new();
/// mol.new_atom(Element::C);
/// let outcome = extract_sugars(&mol);
/// assert_eq!(outcome.fragments.len(), 1);
/// ```
pub fn extract_sugars(mol: &MolecularGraph) -> ExtractionOutcome {
    let detector = DefaultSugarDetector::new(DetectorSettings::default());
    let options = ExtractorOptions::default();
    copy_and_extract(mol, &options, &detector)
}

/// Extracts sugar moieties from `mol` using caller-supplied `options` and
/// `detector`, so a caller can enable linear-sugar detection, post-processing
/// splitting, `R`-marked attachment points, or a custom
/// [`SugarPatternDetector`] implementation.
///
/// # Examples
///
/// ```
/// use glycosector::{
///     extract_sugars_with_options, DefaultSugarDetector, DetectorSettings, ExtractorOptions,
///     MolecularGraph,
/// };
///
/// let mol = MolecularGraph::new();
/// let detector = DefaultSugarDetector::new(DetectorSettings::default());
/// let options = ExtractorOptions {
///     extract_linear: true,
///     ..ExtractorOptions::default()
/// };
/// let outcome = extract_sugars_with_options(&mol, &options, &detector);
/// assert_eq!(outcome.fragments.len(), 1);
/// ```
pub fn extract_sugars_with_options(
    mol: &MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> ExtractionOutcome {
    copy_and_extract(mol, options, detector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_sugars_on_empty_molecule_returns_single_empty_fragment() {
        let mol = MolecularGraph::new();
        let outcome = extract_sugars(&mol);
        assert_eq!(outcome.fragments.len(), 1);
        assert!(outcome.fragments[0].is_empty());
    }

    #[test]
    fn extract_sugars_with_options_honors_linear_extraction_flag() {
        let mut mol = MolecularGraph::new();
        let chain: Vec<_> = (0..4).map(|_| mol.new_atom(Element::C)).collect();
        for i in 0..3 {
            mol.new_bond(chain[i], chain[i + 1], BondOrder::Single)
                .unwrap();
        }
        for &c in &chain {
            let oh = mol.new_atom(Element::O);
            mol.new_bond(c, oh, BondOrder::Single).unwrap();
        }

        let detector = DefaultSugarDetector::new(DetectorSettings::default());
        let options = ExtractorOptions {
            extract_circular: false,
            extract_linear: true,
            ..ExtractorOptions::default()
        };
        let outcome = extract_sugars_with_options(&mol, &options, &detector);
        assert_eq!(outcome.fragments.len(), 2);
        assert!(outcome.fragments[0].is_empty());
    }
}
