//! End-to-end extraction scenarios exercising the public
//! `extract_sugars`/`extract_sugars_with_options` entry points against whole
//! molecules built label-by-label, rather than unit-testing individual
//! extractor/detector/splitter internals in isolation.

mod support;

use glycosector::{
    extract_sugars, extract_sugars_with_options, BondOrder, DefaultSugarDetector,
    DetectorSettings, Element, ExtractorOptions, MolecularGraph,
};
use support::LabeledMolecule;

#[test]
fn empty_molecule_returns_itself_as_the_only_fragment() {
    let mol = MolecularGraph::new();
    let outcome = extract_sugars(&mol);
    assert_eq!(outcome.fragments.len(), 1);
    assert!(outcome.fragments[0].is_empty());
}

#[test]
fn glycoside_splits_into_aglycone_and_sugar_with_shared_anomeric_oxygen() {
    // A single pyranose ring attached to a small aglycone core through one
    // glycosidic oxygen, analogous to a simple O-glycoside.
    let mut mol = LabeledMolecule::new();
    mol.atom("aglycone_c", Element::C);
    mol.atom("bridge_o", Element::O);
    let sugar_c0 = mol.add_pyranose_ring("sug");
    mol.bond("aglycone_c", "bridge_o", BondOrder::Single);
    mol.bond("bridge_o", &sugar_c0, BondOrder::Single);

    let outcome = extract_sugars(&mol.graph);
    assert_eq!(outcome.fragments.len(), 2);

    let aglycone = &outcome.fragments[0];
    let sugar = &outcome.fragments[1];

    assert!(aglycone.contains_atom(mol.id("aglycone_c")));
    assert!(aglycone.contains_atom(mol.id("bridge_o")));
    // The bridging oxygen must also reappear on the sugar side: it is
    // duplicated across the boundary rather than assigned to only one side.
    assert!(sugar
        .atoms()
        .filter(|(_, atom)| atom.element() == Some(Element::O))
        .count()
        >= 5);
}

#[test]
fn standalone_sugar_returns_an_empty_aglycone() {
    let mut mol = LabeledMolecule::new();
    mol.add_pyranose_ring("sug");
    // Give c0 (normally reserved for a glycosidic attachment) its own
    // hydroxyl too, so the whole molecule is unambiguously just the ring.
    mol.atom("sug_oh0", Element::O);
    mol.bond("sug_c0", "sug_oh0", BondOrder::Single);

    let outcome = extract_sugars(&mol.graph);
    assert_eq!(outcome.fragments.len(), 2);
    assert!(outcome.fragments[0].is_empty());
    assert_eq!(outcome.fragments[1].atom_count(), mol.graph.atom_count());
}

#[test]
fn non_terminal_sugar_bridging_two_aglycone_pieces_is_left_in_place_by_default() {
    let mut mol = LabeledMolecule::new();
    mol.atom("left_c", Element::C);
    mol.atom("left_o", Element::O);
    mol.atom("right_c", Element::C);
    mol.atom("right_o", Element::O);
    let sugar_c0 = mol.add_pyranose_ring("sug");
    mol.bond("left_c", "left_o", BondOrder::Single);
    mol.bond("left_o", &sugar_c0, BondOrder::Single);
    mol.bond("right_c", "right_o", BondOrder::Single);
    mol.bond("right_o", "sug_c2", BondOrder::Single);

    let default_detector = DefaultSugarDetector::new(DetectorSettings::default());
    let options = ExtractorOptions::default();
    let outcome = extract_sugars_with_options(&mol.graph, &options, &default_detector);
    // Bridges two distinct aglycone pieces through two separate glycosidic
    // bonds: with the default terminal-only policy this ring must survive.
    assert_eq!(outcome.fragments.len(), 1);
    assert_eq!(outcome.fragments[0].atom_count(), mol.graph.atom_count());

    let permissive_detector = DefaultSugarDetector::new(DetectorSettings {
        remove_only_terminal_sugars: false,
        ..DetectorSettings::default()
    });
    let outcome = extract_sugars_with_options(&mol.graph, &options, &permissive_detector);
    assert_eq!(outcome.fragments.len(), 2);
    // Removing the bridge leaves the left and right aglycone pieces
    // disconnected from each other.
    assert!(!outcome.fragments[0].is_connected());
}
