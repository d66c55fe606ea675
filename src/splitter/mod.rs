//! Post-processing Splitter: breaks specific acyclic bond patterns in an
//! already-extracted sugar fragment (O-glycosidic, ester, cross-linking
//! ether, plain ether, peroxide).
//!
//! No SMARTS-matching crate is available in this dependency stack, so each
//! pattern of the design table is expressed as a small hand-written
//! neighborhood query against [`MolecularGraph`] directly, guarded by ring
//! membership computed through [`crate::detector::rings::find_rings`].

use std::collections::HashSet;

use crate::config::ExtractorOptions;
use crate::core::error::PatternMatchError;
use crate::core::graph::{deeper_copy, Atom, AtomId, BondId, MolecularGraph, StereoReferent};
use crate::core::{BondOrder, Element};
use crate::detector::{rings, SugarPatternDetector};

fn ring_atom_ids(graph: &MolecularGraph) -> HashSet<AtomId> {
    rings::find_rings(graph).into_iter().flatten().collect()
}

fn is_carbon(graph: &MolecularGraph, id: AtomId) -> bool {
    graph.atom(id).and_then(|a| a.element()) == Some(Element::C)
}

fn is_oxygen(graph: &MolecularGraph, id: AtomId) -> bool {
    graph.atom(id).and_then(|a| a.element()) == Some(Element::O)
}

fn has_hydroxy_substituent(graph: &MolecularGraph, carbon: AtomId, exclude: AtomId) -> bool {
    graph.neighbors(carbon).into_iter().any(|n| {
        n != exclude && is_oxygen(graph, n) && graph.degree(n) == 1
    })
}

fn has_carbonyl_neighbor(graph: &MolecularGraph, carbon: AtomId) -> bool {
    graph.neighbors(carbon).into_iter().any(|n| {
        is_oxygen(graph, n)
            && graph
                .bond_between(carbon, n)
                .and_then(|b| graph.bond(b))
                .map(|b| b.order == BondOrder::Double)
                .unwrap_or(false)
    })
}

fn is_too_small(
    graph: &MolecularGraph,
    bond_id: BondId,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
    linear_pattern: bool,
) -> bool {
    if !options.limit_post_processing_by_size {
        return false;
    }
    let (mut copy, _, bond_map) = deeper_copy(graph);
    if let Some(copy_bond) = bond_map[bond_id.0] {
        copy.remove_bond(copy_bond);
    }
    copy.partition_into_components().iter().any(|(component, _)| {
        if linear_pattern {
            (component.atom_count() as u32) < detector.linear_sugar_candidate_min_size_setting()
        } else {
            detector.is_too_small_to_preserve(component)
        }
    })
}

fn saturate(
    graph: &mut MolecularGraph,
    atom_id: AtomId,
    weight: u8,
    mark_with_r: bool,
    r_counter: &mut u32,
) {
    if mark_with_r {
        *r_counter += 1;
        let r = graph.add_atom(Atom::pseudo(format!("R{}", *r_counter), *r_counter));
        let _ = graph.new_bond(atom_id, r, BondOrder::Single);
    } else if let Some(atom) = graph.atom_mut(atom_id) {
        let base = atom.implicit_h_count.unwrap_or(0);
        atom.implicit_h_count = Some(base + weight);
    }
}

/// Breaks `bond_id` (between `oxygen` and the side not named here),
/// duplicating a fresh copy of `oxygen` onto `duplicate_side` bonded with
/// the original order. No further saturation is needed: the duplicate
/// already carries a bond of the original order, and the original oxygen
/// keeps its remaining bond on the other side. Any stereo element focused on
/// `duplicate_side` that carried `oxygen` is updated to carry the duplicate
/// instead, since that half of the molecule now sees only the copy.
fn break_and_duplicate_oxygen(
    graph: &mut MolecularGraph,
    oxygen: AtomId,
    duplicate_side: AtomId,
    bond_id: BondId,
    order: BondOrder,
) {
    let oxygen_atom = graph.atom(oxygen).expect("queried candidate exists").clone();
    let new_o = graph.add_atom(oxygen_atom);
    if graph.new_bond(duplicate_side, new_o, order).is_ok() {
        graph.rehome_stereo_carrier(
            StereoReferent::Atom(duplicate_side),
            StereoReferent::Atom(oxygen),
            StereoReferent::Atom(new_o),
        );
        graph.remove_bond(bond_id);
    }
}

/// Breaks `bond_id` without duplicating either endpoint, saturating both
/// surviving atoms with an `R` marker or implicit hydrogen equal to the
/// bond's order.
fn break_and_saturate_both(
    graph: &mut MolecularGraph,
    a: AtomId,
    b: AtomId,
    bond_id: BondId,
    order: BondOrder,
    mark_with_r: bool,
    r_counter: &mut u32,
) {
    graph.remove_bond(bond_id);
    saturate(graph, a, order.weight(), mark_with_r, r_counter);
    saturate(graph, b, order.weight(), mark_with_r, r_counter);
}

/// Splits every O-glycosidic bond: a non-ring, degree-2 oxygen bridging a
/// ring carbon of degree 3-4 and any other carbon. The C-O bond on the
/// ring-carbon side is broken and the oxygen duplicated onto that side.
pub fn split_o_glycosidic_bonds(
    mol: &mut MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> Result<(), PatternMatchError> {
    let mut rejected: HashSet<BondId> = HashSet::new();
    loop {
        let ring_atoms = ring_atom_ids(mol);
        let found = mol.atoms().find_map(|(o_id, o_atom)| {
            if o_atom.element() != Some(Element::O) || ring_atoms.contains(&o_id) {
                return None;
            }
            if mol.degree(o_id) != 2 {
                return None;
            }
            let neighbors = mol.neighbors(o_id);
            let ring_c = *neighbors.iter().find(|&&n| {
                ring_atoms.contains(&n) && is_carbon(mol, n) && (3..=4).contains(&mol.degree(n))
            })?;
            let other_c = *neighbors.iter().find(|&&n| n != ring_c && is_carbon(mol, n))?;
            let bond_id = mol.bond_between(o_id, ring_c)?;
            if rejected.contains(&bond_id) {
                return None;
            }
            Some((o_id, ring_c, other_c, bond_id))
        });

        let Some((o_id, ring_c, _other_c, bond_id)) = found else {
            break;
        };
        if is_too_small(mol, bond_id, options, detector, false) {
            rejected.insert(bond_id);
            continue;
        }
        let order = mol.bond(bond_id).expect("just found").order;
        break_and_duplicate_oxygen(mol, o_id, ring_c, bond_id, order);
    }
    Ok(())
}

/// Splits every ester bond: a non-ring acyl carbon (bearing a carbonyl `=O`)
/// connected through a non-ring, degree-2 oxygen to a non-ring alkyl carbon.
/// The C-O bond on the acyl side is broken and the oxygen duplicated there.
pub fn split_esters(
    mol: &mut MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> Result<(), PatternMatchError> {
    let mut rejected: HashSet<BondId> = HashSet::new();
    loop {
        let ring_atoms = ring_atom_ids(mol);
        let found = mol.atoms().find_map(|(o_id, o_atom)| {
            if o_atom.element() != Some(Element::O) || ring_atoms.contains(&o_id) {
                return None;
            }
            if mol.degree(o_id) != 2 {
                return None;
            }
            let neighbors = mol.neighbors(o_id);
            let acyl_c = *neighbors.iter().find(|&&n| {
                !ring_atoms.contains(&n) && is_carbon(mol, n) && has_carbonyl_neighbor(mol, n)
            })?;
            let alkyl_c = *neighbors
                .iter()
                .find(|&&n| n != acyl_c && !ring_atoms.contains(&n) && is_carbon(mol, n))?;
            let bond_id = mol.bond_between(o_id, acyl_c)?;
            if rejected.contains(&bond_id) {
                return None;
            }
            Some((o_id, acyl_c, alkyl_c, bond_id))
        });

        let Some((o_id, acyl_c, _alkyl_c, bond_id)) = found else {
            break;
        };
        if is_too_small(mol, bond_id, options, detector, false) {
            rejected.insert(bond_id);
            continue;
        }
        let order = mol.bond(bond_id).expect("just found").order;
        break_and_duplicate_oxygen(mol, o_id, acyl_c, bond_id, order);
    }
    Ok(())
}

/// Splits every cross-linking ether: a non-ring, degree-2 oxygen bridging
/// two non-ring carbons where one of the two also bears a hydroxy
/// substituent. The O-C bond on the hydroxylated side is broken; the
/// oxygen is not duplicated.
pub fn split_ethers_crosslinking(
    mol: &mut MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> Result<(), PatternMatchError> {
    let mut rejected: HashSet<BondId> = HashSet::new();
    let mut r_counter = 0u32;
    loop {
        let ring_atoms = ring_atom_ids(mol);
        let found = mol.atoms().find_map(|(o_id, o_atom)| {
            if o_atom.element() != Some(Element::O) || ring_atoms.contains(&o_id) {
                return None;
            }
            if mol.degree(o_id) != 2 {
                return None;
            }
            let neighbors = mol.neighbors(o_id);
            let c1 = *neighbors
                .iter()
                .find(|&&n| !ring_atoms.contains(&n) && is_carbon(mol, n))?;
            let hydroxylated_c = *neighbors.iter().find(|&&n| {
                n != c1
                    && !ring_atoms.contains(&n)
                    && is_carbon(mol, n)
                    && has_hydroxy_substituent(mol, n, o_id)
            })?;
            let bond_id = mol.bond_between(o_id, hydroxylated_c)?;
            if rejected.contains(&bond_id) {
                return None;
            }
            Some((o_id, hydroxylated_c, bond_id))
        });

        let Some((o_id, hydroxylated_c, bond_id)) = found else {
            break;
        };
        if is_too_small(mol, bond_id, options, detector, true) {
            rejected.insert(bond_id);
            continue;
        }
        let order = mol.bond(bond_id).expect("just found").order;
        break_and_saturate_both(
            mol,
            o_id,
            hydroxylated_c,
            bond_id,
            order,
            options.mark_attach_points_by_r,
            &mut r_counter,
        );
    }
    Ok(())
}

/// Splits every remaining plain ether: a non-ring, degree-2 oxygen bridging
/// two non-ring carbons, neither matching the ester or cross-linking
/// patterns above (the aggregate always runs those first). The bond on the
/// first-found carbon's side is broken and the oxygen duplicated there.
pub fn split_ethers(
    mol: &mut MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> Result<(), PatternMatchError> {
    let mut rejected: HashSet<BondId> = HashSet::new();
    loop {
        let ring_atoms = ring_atom_ids(mol);
        let found = mol.atoms().find_map(|(o_id, o_atom)| {
            if o_atom.element() != Some(Element::O) || ring_atoms.contains(&o_id) {
                return None;
            }
            if mol.degree(o_id) != 2 {
                return None;
            }
            let mut neighbors = mol.neighbors(o_id);
            neighbors.retain(|&n| !ring_atoms.contains(&n) && is_carbon(mol, n));
            neighbors.sort_by_key(|n| n.0);
            if neighbors.len() != 2 {
                return None;
            }
            let first_c = neighbors[0];
            let bond_id = mol.bond_between(o_id, first_c)?;
            if rejected.contains(&bond_id) {
                return None;
            }
            Some((o_id, first_c, bond_id))
        });

        let Some((o_id, first_c, bond_id)) = found else {
            break;
        };
        if is_too_small(mol, bond_id, options, detector, false) {
            rejected.insert(bond_id);
            continue;
        }
        let order = mol.bond(bond_id).expect("just found").order;
        break_and_duplicate_oxygen(mol, o_id, first_c, bond_id, order);
    }
    Ok(())
}

/// Splits every peroxide: a non-ring carbon bonded to a non-ring, degree-2
/// oxygen bonded to a second non-ring, degree-2 oxygen bonded to a second
/// non-ring carbon. Breaks the O-O bond; neither oxygen is duplicated.
pub fn split_peroxides(
    mol: &mut MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> Result<(), PatternMatchError> {
    let mut rejected: HashSet<BondId> = HashSet::new();
    let mut r_counter = 0u32;
    loop {
        let ring_atoms = ring_atom_ids(mol);
        let found = mol.bonds().find_map(|(bond_id, bond)| {
            if rejected.contains(&bond_id) {
                return None;
            }
            let (o1, o2) = (bond.begin, bond.end);
            if ring_atoms.contains(&o1) || ring_atoms.contains(&o2) {
                return None;
            }
            if !is_oxygen(mol, o1) || !is_oxygen(mol, o2) {
                return None;
            }
            if mol.degree(o1) != 2 || mol.degree(o2) != 2 {
                return None;
            }
            let has_carbon_neighbor = |o: AtomId, exclude: AtomId| {
                mol.neighbors(o)
                    .into_iter()
                    .any(|n| n != exclude && !ring_atoms.contains(&n) && is_carbon(mol, n))
            };
            if !has_carbon_neighbor(o1, o2) || !has_carbon_neighbor(o2, o1) {
                return None;
            }
            Some((o1, o2, bond_id))
        });

        let Some((o1, o2, bond_id)) = found else {
            break;
        };
        if is_too_small(mol, bond_id, options, detector, false) {
            rejected.insert(bond_id);
            continue;
        }
        let order = mol.bond(bond_id).expect("just found").order;
        break_and_saturate_both(
            mol,
            o1,
            o2,
            bond_id,
            order,
            options.mark_attach_points_by_r,
            &mut r_counter,
        );
    }
    Ok(())
}

/// Runs ester, cross-linking ether, plain ether, and peroxide splitting in
/// that fixed order on `mol`. The order matters: the plain-ether pattern is
/// promiscuous and would otherwise match esters and peroxides first.
///
/// Running this twice in succession is a no-op after the first pass: every
/// matching bond has already been broken and either duplicated or saturated.
pub fn split_ether_ester_and_peroxide_postprocessing(
    mol: &mut MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> Result<(), PatternMatchError> {
    split_esters(mol, options, detector)?;
    split_ethers_crosslinking(mol, options, detector)?;
    split_ethers(mol, options, detector)?;
    split_peroxides(mol, options, detector)?;
    Ok(())
}
