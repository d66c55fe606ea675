//! Integration coverage for the post-processing splitter, exercised
//! directly against hand-built sugar fragments rather than through the
//! extractor: the general boundary-reconstruction step in `extractor` is
//! bond-local, so a heteroatom whose both neighbors end up on the sugar
//! side is duplicated once per severed bond rather than handed over whole.
//! That is a property of extraction, not of the splitter, so the splitter
//! is tested here on graphs that already represent a single, already
//! continuous sugar-side fragment.

use glycosector::{
    splitter, BondOrder, DefaultSugarDetector, DetectorSettings, Element, ExtractorOptions,
    MolecularGraph,
};

/// Two 4-carbon polyol chains joined by an ester bridge: `acyl_c1`, bearing
/// the carbonyl, is bonded to the bridging oxygen; `alkyl_b1` is bonded to
/// the same oxygen from the other side.
fn ester_bridged_chains() -> MolecularGraph {
    let mut mol = MolecularGraph::new();

    let acyl: Vec<_> = (0..4).map(|_| mol.new_atom(Element::C)).collect();
    for i in 0..3 {
        mol.new_bond(acyl[i], acyl[i + 1], BondOrder::Single)
            .unwrap();
    }
    let carbonyl_o = mol.new_atom(Element::O);
    mol.new_bond(acyl[0], carbonyl_o, BondOrder::Double)
        .unwrap();
    for &c in &acyl[1..] {
        let oh = mol.new_atom(Element::O);
        mol.new_bond(c, oh, BondOrder::Single).unwrap();
    }

    let alkyl: Vec<_> = (0..4).map(|_| mol.new_atom(Element::C)).collect();
    for i in 0..3 {
        mol.new_bond(alkyl[i], alkyl[i + 1], BondOrder::Single)
            .unwrap();
    }
    for &c in &alkyl[1..] {
        let oh = mol.new_atom(Element::O);
        mol.new_bond(c, oh, BondOrder::Single).unwrap();
    }

    let ester_o = mol.new_atom(Element::O);
    mol.new_bond(acyl[0], ester_o, BondOrder::Single).unwrap();
    mol.new_bond(ester_o, alkyl[0], BondOrder::Single).unwrap();

    mol
}

#[test]
fn split_esters_breaks_the_bridge_into_two_preserved_components() {
    let mut mol = ester_bridged_chains();
    let before = mol.atom_count();
    let detector = DefaultSugarDetector::new(DetectorSettings::default());
    let options = ExtractorOptions::default();

    splitter::split_esters(&mut mol, &options, &detector).unwrap();

    assert_eq!(mol.atom_count(), before + 1, "bridging oxygen is duplicated");
    let components = mol.partition_into_components();
    assert_eq!(components.len(), 2);
    for (component, _) in &components {
        assert!(component.atom_count() >= 5);
    }
}

#[test]
fn split_esters_is_a_no_op_below_the_size_gate() {
    let mut mol = MolecularGraph::new();
    let acyl = mol.new_atom(Element::C);
    let carbonyl_o = mol.new_atom(Element::O);
    mol.new_bond(acyl, carbonyl_o, BondOrder::Double).unwrap();
    let alkyl = mol.new_atom(Element::C);
    let ester_o = mol.new_atom(Element::O);
    mol.new_bond(acyl, ester_o, BondOrder::Single).unwrap();
    mol.new_bond(ester_o, alkyl, BondOrder::Single).unwrap();
    let before = mol.atom_count();

    let detector = DefaultSugarDetector::new(DetectorSettings::default());
    let options = ExtractorOptions::default();
    splitter::split_esters(&mut mol, &options, &detector).unwrap();

    assert_eq!(mol.atom_count(), before);
    assert_eq!(mol.partition_into_components().len(), 1);
}
