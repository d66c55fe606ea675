//! The Aglycone/Sugar Extractor: partitions a molecular graph into a
//! non-sugar aglycone and one or more sugar fragments.
//!
//! `copy_and_extract` never mutates its input; it clones the graph up to
//! twice (once per side that is actually needed), lets a
//! [`SugarPatternDetector`] remove candidate sugar atoms from one clone, then
//! reconciles the two clones so every broken bond at the boundary is either
//! repaired (bridging heteroatom duplicated onto both sides) or saturated
//! (open valence filled with an `R` marker or an implicit hydrogen).

use std::collections::HashMap;

use crate::config::ExtractorOptions;
use crate::core::graph::{
    deeper_copy, Atom, AtomId, AtomMap, BondId, BondMap, MolecularGraph,
};
use crate::core::{BondOrder, Element};
use crate::detector::{SugarPatternDetector, SPIRO_MARKER_PROPERTY};

/// Severity of a diagnostic raised during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// An internal inconsistency was found; the procedure continued anyway.
    Error,
    /// An informational note about the shape of the input or the result.
    Info,
}

/// A diagnostic collected during extraction, surfaced to the caller instead
/// of written to a logger.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity of this diagnostic.
    pub level: DiagnosticLevel,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
        }
    }
}

/// The original-to-copy maps produced (or supplied and then populated) by
/// [`copy_and_extract`].
///
/// `atom_sugars`/`bond_sugars` address the whole sugars copy as it stood
/// right before partitioning into connected components; per-fragment handles
/// are available via the component maps [`ExtractionOutcome`] returns
/// alongside the fragments.
#[derive(Debug, Clone, Default)]
pub struct ExtractionMaps {
    /// Original atom handle to its counterpart in the aglycone copy.
    pub atom_aglycone: AtomMap,
    /// Original bond handle to its counterpart in the aglycone copy.
    pub bond_aglycone: BondMap,
    /// Original atom handle to its counterpart in the (pre-partition) sugars
    /// copy.
    pub atom_sugars: AtomMap,
    /// Original bond handle to its counterpart in the (pre-partition) sugars
    /// copy.
    pub bond_sugars: BondMap,
}

/// The result of [`copy_and_extract`].
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Element 0 is the aglycone copy (possibly empty). Elements 1..n are
    /// the connected components of the sugars copy, in discovery order.
    pub fragments: Vec<MolecularGraph>,
    /// Maps from the original graph's atom/bond handles into the aglycone
    /// copy and the (pre-partition) sugars copy.
    pub maps: ExtractionMaps,
    /// Per-fragment atom map from the original graph's handles into
    /// `fragments[i]`, aligned index-for-index with `fragments`.
    pub fragment_atom_maps: Vec<AtomMap>,
    /// Diagnostics collected during extraction; callers may inspect these
    /// instead of relying on a side-channel logger.
    pub diagnostics: Vec<Diagnostic>,
}

/// Returns the indices (within `mol`) of atoms whose image under `map` is
/// contained in `group`. Atoms in `group` that have no corresponding entry
/// in `map` (e.g. freshly introduced `R` markers) are ignored, since they
/// have no original counterpart.
pub fn atom_indices_of_group(mol: &MolecularGraph, group: &[AtomId], map: &AtomMap) -> Vec<usize> {
    mol.atoms()
        .filter(|(id, _)| {
            map.get(id.0)
                .copied()
                .flatten()
                .is_some_and(|copy_id| group.contains(&copy_id))
        })
        .map(|(id, _)| id.0)
        .collect()
}

/// Returns the indices (within `mol`) of bonds whose image under `map` is
/// contained in `group`.
pub fn bond_indices_of_group(mol: &MolecularGraph, group: &[BondId], map: &BondMap) -> Vec<usize> {
    mol.bonds()
        .filter(|(id, _)| {
            map.get(id.0)
                .copied()
                .flatten()
                .is_some_and(|copy_id| group.contains(&copy_id))
        })
        .map(|(id, _)| id.0)
        .collect()
}

/// Returns one label per atom of `mol`: `0` for the aglycone, `i` (1-based)
/// for the i-th sugar fragment, or `-1` for an atom that ended up in neither
/// (which should not occur for a well-formed extraction). A heteroatom
/// duplicated onto both the aglycone and a sugar fragment is labeled `0`
/// (the aglycone wins), matching the aglycone-first iteration order used
/// throughout the extractor.
pub fn group_indices_for_all_atoms(
    mol: &MolecularGraph,
    aglycone_map: &AtomMap,
    fragment_atom_maps: &[AtomMap],
) -> Vec<i64> {
    let mut labels = vec![-1i64; aglycone_map.len().max(1)];
    for (orig_id, _) in mol.atoms() {
        if orig_id.0 >= labels.len() {
            labels.resize(orig_id.0 + 1, -1);
        }
        if aglycone_map.get(orig_id.0).copied().flatten().is_some() {
            labels[orig_id.0] = 0;
            continue;
        }
        for (i, map) in fragment_atom_maps.iter().enumerate() {
            if map.get(orig_id.0).copied().flatten().is_some() {
                labels[orig_id.0] = (i + 1) as i64;
                break;
            }
        }
    }
    labels
}

fn saturate_with_r_or_implicit_h(
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

/// Saturation for a heteroatom freshly duplicated across the boundary.
/// Implements Open Question 3 of the design notes literally: when marking
/// with `R`, `implicit_h_count += bond_order_sum(orig_hetero) - (1 +
/// broken_bond_order)`, the `-1` accounting for the added `R` bond; without
/// an `R`, the `-1` term drops out.
fn saturate_duplicated_heteroatom(
    graph: &mut MolecularGraph,
    new_atom: AtomId,
    orig_bond_order_sum: u32,
    broken_bond_order: u8,
    mark_with_r: bool,
    r_counter: &mut u32,
) {
    let r_contribution = if mark_with_r {
        *r_counter += 1;
        let r = graph.add_atom(Atom::pseudo(format!("R{}", *r_counter), *r_counter));
        let _ = graph.new_bond(new_atom, r, BondOrder::Single);
        1
    } else {
        0
    };
    let delta = orig_bond_order_sum as i64 - (r_contribution + broken_bond_order as i64);
    let add = delta.max(0) as u8;
    if let Some(atom) = graph.atom_mut(new_atom) {
        let base = atom.implicit_h_count.unwrap_or(0);
        atom.implicit_h_count = Some(base + add);
    }
}

/// Saturation for the side that already held the heteroatom before the bond
/// broke: it only lost this one bond, so it is topped up with implicit H
/// equal to that bond's order regardless of `mark_attach_points_by_r` (an
/// `R` marker is reserved for the freshly duplicated copy).
fn saturate_closed_side(graph: &mut MolecularGraph, atom_id: AtomId, broken_bond_order: u8) {
    if let Some(atom) = graph.atom_mut(atom_id) {
        let base = atom.implicit_h_count.unwrap_or(0);
        atom.implicit_h_count = Some(base + broken_bond_order);
    }
}

struct CopySide<'a> {
    graph: &'a mut MolecularGraph,
    atom_map: &'a mut AtomMap,
    reverse_atom_map: HashMap<AtomId, AtomId>,
    r_counter: u32,
}

fn build_reverse_map(atom_map: &AtomMap) -> HashMap<AtomId, AtomId> {
    atom_map
        .iter()
        .enumerate()
        .filter_map(|(orig, copy)| copy.map(|c| (c, AtomId(orig))))
        .collect()
}

/// Partitions `mol` into a non-sugar aglycone and its sugar fragments.
///
/// `mol` is never mutated. If `mol` is empty, returns a single-element
/// result holding a copy of `mol`.
pub fn copy_and_extract(
    mol: &MolecularGraph,
    options: &ExtractorOptions,
    detector: &dyn SugarPatternDetector,
) -> ExtractionOutcome {
    let mut diagnostics = Vec::new();

    if mol.is_empty() {
        return ExtractionOutcome {
            fragments: vec![mol.clone()],
            maps: ExtractionMaps::default(),
            fragment_atom_maps: Vec::new(),
            diagnostics,
        };
    }

    let (mut ag, mut atom_aglycone, mut bond_aglycone) = deeper_copy(mol);

    let mut removed_any = false;
    if options.extract_circular {
        match detector.remove_circular_sugars(&mut ag) {
            Ok(removed) => removed_any |= removed,
            Err(err) => diagnostics.push(Diagnostic::error(format!(
                "circular sugar detection failed: {err}"
            ))),
        }
    }
    if options.extract_linear {
        match detector.remove_linear_sugars(&mut ag) {
            Ok(removed) => removed_any |= removed,
            Err(err) => diagnostics.push(Diagnostic::error(format!(
                "linear sugar detection failed: {err}"
            ))),
        }
    }

    if !removed_any {
        cleanup_map(&mut atom_aglycone, |id| ag.contains_atom(id));
        cleanup_bond_map(&mut bond_aglycone, |id| ag.contains_bond(id));
        return ExtractionOutcome {
            fragments: vec![ag],
            maps: ExtractionMaps {
                atom_aglycone,
                bond_aglycone,
                atom_sugars: AtomMap::new(),
                bond_sugars: BondMap::new(),
            },
            fragment_atom_maps: Vec::new(),
            diagnostics,
        };
    }

    let (mut su, mut atom_sugars, mut bond_sugars) = deeper_copy(mol);

    let detect_spiro = detector.settings().detect_spiro_rings_as_circular_sugars;
    let mut contains_spiro_sugars = false;
    for (orig_id, _) in mol.atoms() {
        let ag_handle = atom_aglycone[orig_id.0];
        let su_handle = atom_sugars[orig_id.0];

        let ag_has_spiro_marker = detect_spiro
            && ag_handle
                .and_then(|h| ag.atom(h))
                .and_then(|atom| atom.properties.get(SPIRO_MARKER_PROPERTY))
                .is_some();

        if ag_has_spiro_marker {
            if let Some(su_h) = su_handle {
                if let Some(atom) = su.atom_mut(su_h) {
                    atom.properties.insert(
                        SPIRO_MARKER_PROPERTY.to_string(),
                        crate::core::graph::PropertyValue::Bool(true),
                    );
                }
            }
            contains_spiro_sugars = true;
            continue;
        }

        if ag_handle.is_some_and(|h| ag.contains_atom(h)) {
            if let Some(su_h) = su_handle {
                su.remove_atom(su_h);
                atom_sugars[orig_id.0] = None;
            }
        }
    }

    let mut reverse_aglycone = build_reverse_map(&atom_aglycone);
    let mut any_broken = false;

    // Step 4: special C-C boundary corrections.
    for (bond_id, bond) in mol.bonds() {
        let begin_elem = mol.atom(bond.begin).and_then(|a| a.element());
        let end_elem = mol.atom(bond.end).and_then(|a| a.element());
        if begin_elem != Some(Element::C) || end_elem != Some(Element::C) {
            continue;
        }

        let bond_in_ag = bond_aglycone[bond_id.0].is_some_and(|h| ag.contains_bond(h));
        let bond_in_su = bond_sugars[bond_id.0].is_some_and(|h| su.contains_bond(h));
        if bond_in_ag || bond_in_su {
            continue;
        }

        let begin_in_ag = atom_aglycone[bond.begin.0].filter(|h| ag.contains_atom(*h));
        let end_in_ag = atom_aglycone[bond.end.0].filter(|h| ag.contains_atom(*h));

        let (surviving_orig, surviving_ag, other_orig) = match (begin_in_ag, end_in_ag) {
            (Some(h), None) => (bond.begin, h, bond.end),
            (None, Some(h)) => (bond.end, h, bond.begin),
            _ => continue,
        };

        let other_su = match atom_sugars[other_orig.0].filter(|h| su.contains_atom(*h)) {
            Some(h) => h,
            None => continue,
        };

        let degree = ag.degree(surviving_ag);
        let neighbors = ag.neighbors(surviving_ag);

        if degree == 1 {
            if let Some(&only_neighbor) = neighbors.first() {
                if ag.atom(only_neighbor).and_then(|a| a.element()) == Some(Element::O) {
                    let clone = ag.atom(surviving_ag).expect("just queried").clone();
                    ag.remove_atom(surviving_ag);
                    let new_c = su.add_atom(clone);
                    if su.new_bond(new_c, other_su, bond.order).is_ok() {
                        atom_aglycone[surviving_orig.0] = None;
                        atom_sugars[surviving_orig.0] = Some(new_c);
                        reverse_aglycone.remove(&surviving_ag);
                        any_broken = true;
                    }
                    continue;
                }
            }
        }

        if degree == 2 {
            let mut keto = None;
            let mut ether = None;
            for n in &neighbors {
                if ag.atom(*n).and_then(|a| a.element()) != Some(Element::O) {
                    continue;
                }
                let Some(b) = ag.bond_between(surviving_ag, *n) else {
                    continue;
                };
                match ag.bond(b).map(|bond| bond.order) {
                    Some(BondOrder::Double) => keto = Some((*n, b)),
                    Some(BondOrder::Single) => ether = Some((*n, b)),
                    _ => {}
                }
            }
            if let (Some((keto_o, _)), Some((ether_o, ether_bond))) = (keto, ether) {
                let carbon_clone = ag.atom(surviving_ag).expect("just queried").clone();
                let keto_clone = ag.atom(keto_o).expect("just queried").clone();
                let keto_o_orig = reverse_aglycone.get(&keto_o).copied();

                let new_c = su.add_atom(carbon_clone);
                let new_o = su.add_atom(keto_clone);
                if su.new_bond(new_c, new_o, BondOrder::Double).is_ok()
                    && su.new_bond(new_c, other_su, bond.order).is_ok()
                {
                    ag.remove_bond(ether_bond);
                    ag.remove_atom(keto_o);
                    ag.remove_atom(surviving_ag);

                    atom_aglycone[surviving_orig.0] = None;
                    atom_sugars[surviving_orig.0] = Some(new_c);
                    reverse_aglycone.remove(&surviving_ag);
                    if let Some(keto_orig) = keto_o_orig {
                        atom_aglycone[keto_orig.0] = None;
                        atom_sugars[keto_orig.0] = Some(new_o);
                        reverse_aglycone.remove(&keto_o);
                    }
                    any_broken = true;
                }
            }
        }
    }

    // Step 5: general bond reconstruction.
    let mark_with_r = options.mark_attach_points_by_r;
    let mut ag_r_counter = 0u32;
    let mut su_r_counter = 0u32;

    for (bond_id, bond) in mol.bonds() {
        let bond_in_ag = bond_aglycone[bond_id.0].is_some_and(|h| ag.contains_bond(h));
        let bond_in_su = bond_sugars[bond_id.0].is_some_and(|h| su.contains_bond(h));
        if bond_in_ag || bond_in_su {
            continue;
        }

        let begin_in_ag = atom_aglycone[bond.begin.0].filter(|h| ag.contains_atom(*h));
        let end_in_ag = atom_aglycone[bond.end.0].filter(|h| ag.contains_atom(*h));
        let begin_in_su = atom_sugars[bond.begin.0].filter(|h| su.contains_atom(*h));
        let end_in_su = atom_sugars[bond.end.0].filter(|h| su.contains_atom(*h));

        any_broken = true;
        let weight = bond.order.weight();
        let begin_is_carbon = mol.atom(bond.begin).and_then(|a| a.element()) == Some(Element::C);
        let end_is_carbon = mol.atom(bond.end).and_then(|a| a.element()) == Some(Element::C);

        if begin_is_carbon != end_is_carbon {
            let (carbon_orig, hetero_orig) = if begin_is_carbon {
                (bond.begin, bond.end)
            } else {
                (bond.end, bond.begin)
            };
            let hetero_in_ag = atom_aglycone[hetero_orig.0].filter(|h| ag.contains_atom(*h));
            let hetero_in_su = atom_sugars[hetero_orig.0].filter(|h| su.contains_atom(*h));

            if let Some(keeper) = hetero_in_ag {
                if let Some(carbon_su) = atom_sugars[carbon_orig.0].filter(|h| su.contains_atom(*h))
                {
                    let hetero_atom = mol.atom(hetero_orig).expect("original atom").clone();
                    let new_h = su.add_atom(hetero_atom);
                    if su.new_bond(new_h, carbon_su, bond.order).is_ok() {
                        let orig_sum = mol.bond_order_sum(hetero_orig);
                        saturate_duplicated_heteroatom(
                            &mut su,
                            new_h,
                            orig_sum,
                            weight,
                            mark_with_r,
                            &mut su_r_counter,
                        );
                        atom_sugars[hetero_orig.0] = Some(new_h);
                        // This bond was `keeper`'s only remaining tie to the
                        // aglycone: it never bridged anything, so it is
                        // fully handed over rather than saturated in place.
                        if ag.degree(keeper) == 0 {
                            ag.remove_atom(keeper);
                            atom_aglycone[hetero_orig.0] = None;
                            reverse_aglycone.remove(&keeper);
                        } else {
                            saturate_closed_side(&mut ag, keeper, weight);
                        }
                    }
                } else {
                    diagnostics.push(Diagnostic::error(format!(
                        "carbon atom {} missing from sugars copy during boundary reconstruction",
                        carbon_orig.0
                    )));
                }
            } else if let Some(keeper) = hetero_in_su {
                if let Some(carbon_ag) = atom_aglycone[carbon_orig.0].filter(|h| ag.contains_atom(*h))
                {
                    let hetero_atom = mol.atom(hetero_orig).expect("original atom").clone();
                    let new_h = ag.add_atom(hetero_atom);
                    if ag.new_bond(new_h, carbon_ag, bond.order).is_ok() {
                        let orig_sum = mol.bond_order_sum(hetero_orig);
                        saturate_duplicated_heteroatom(
                            &mut ag,
                            new_h,
                            orig_sum,
                            weight,
                            mark_with_r,
                            &mut ag_r_counter,
                        );
                        atom_aglycone[hetero_orig.0] = Some(new_h);
                        reverse_aglycone.insert(new_h, hetero_orig);
                        // Symmetric case: `keeper` loses its only bond to the
                        // aglycone side, so it is fully handed over instead
                        // of left behind, padded, in the sugars copy.
                        if su.degree(keeper) == 0 {
                            su.remove_atom(keeper);
                            atom_sugars[hetero_orig.0] = None;
                        } else {
                            saturate_closed_side(&mut su, keeper, weight);
                        }
                    }
                } else {
                    diagnostics.push(Diagnostic::error(format!(
                        "carbon atom {} missing from aglycone copy during boundary reconstruction",
                        carbon_orig.0
                    )));
                }
            } else {
                diagnostics.push(Diagnostic::error(format!(
                    "atom {} found in neither aglycone nor sugars during boundary reconstruction",
                    hetero_orig.0
                )));
            }
        } else {
            if let Some(h) = begin_in_ag {
                saturate_with_r_or_implicit_h(&mut ag, h, weight, mark_with_r, &mut ag_r_counter);
            }
            if let Some(h) = end_in_ag {
                saturate_with_r_or_implicit_h(&mut ag, h, weight, mark_with_r, &mut ag_r_counter);
            }
            if let Some(h) = begin_in_su {
                saturate_with_r_or_implicit_h(&mut su, h, weight, mark_with_r, &mut su_r_counter);
            }
            if let Some(h) = end_in_su {
                saturate_with_r_or_implicit_h(&mut su, h, weight, mark_with_r, &mut su_r_counter);
            }
        }
    }

    // Steps 4/5 (stereo): rebuild every stereo element on both sides from
    // the original molecule's elements, mapped through the final atom/bond
    // correspondence that steps 4 and 5 just finished producing. This
    // re-homes a stereo element whenever its focus and every carrier still
    // resolve on a side, including a focus/carrier that was relocated (the
    // C-C repairs above) or duplicated (the general reconstruction above) —
    // a plain re-copy from `mol`'s maps would miss exactly those cases.
    ag.clear_stereo_elements();
    su.clear_stereo_elements();
    for element in mol.stereo_elements() {
        if let Some(mapped) = element.map(&atom_aglycone, &bond_aglycone) {
            ag.add_stereo_element(mapped);
        }
        if let Some(mapped) = element.map(&atom_sugars, &bond_sugars) {
            su.add_stereo_element(mapped);
        }
    }

    // Step 6: invariant audit.
    if !any_broken && !ag.is_empty() && mol.is_connected() && !contains_spiro_sugars {
        diagnostics.push(Diagnostic::info(
            "no broken bonds found despite the detector reporting a removal",
        ));
    }

    // Step 7: spiro saturation.
    let spiro_ag: Vec<AtomId> = ag
        .atoms()
        .filter(|(_, atom)| atom.properties.contains_key(SPIRO_MARKER_PROPERTY))
        .map(|(id, _)| id)
        .collect();
    for id in spiro_ag {
        saturate_with_r_or_implicit_h(&mut ag, id, 2, mark_with_r, &mut ag_r_counter);
    }
    let spiro_su: Vec<AtomId> = su
        .atoms()
        .filter(|(_, atom)| atom.properties.contains_key(SPIRO_MARKER_PROPERTY))
        .map(|(id, _)| id)
        .collect();
    for id in spiro_su {
        saturate_with_r_or_implicit_h(&mut su, id, 2, mark_with_r, &mut su_r_counter);
    }

    // Step 8: optional post-processing.
    if options.post_process_sugars {
        if options.extract_linear {
            if let Err(err) = crate::splitter::split_ether_ester_and_peroxide_postprocessing(
                &mut su, options, detector,
            ) {
                diagnostics.push(Diagnostic::error(format!(
                    "linear post-processing failed: {err}"
                )));
            }
        }
        if options.extract_circular {
            if let Err(err) =
                crate::splitter::split_o_glycosidic_bonds(&mut su, options, detector)
            {
                diagnostics.push(Diagnostic::error(format!(
                    "O-glycosidic post-processing failed: {err}"
                )));
            }
        }
    }

    // Step 9: map clean-up.
    cleanup_map(&mut atom_aglycone, |id| ag.contains_atom(id));
    cleanup_bond_map(&mut bond_aglycone, |id| ag.contains_bond(id));
    cleanup_map(&mut atom_sugars, |id| su.contains_atom(id));
    cleanup_bond_map(&mut bond_sugars, |id| su.contains_bond(id));

    // Step 10: partition sugars.
    let mut fragments = vec![ag];
    let mut fragment_atom_maps = Vec::new();

    if su.is_connected() {
        fragment_atom_maps.push(atom_sugars.clone());
        fragments.push(su);
    } else {
        for (component, su_to_component) in su.partition_into_components() {
            if component.is_empty() {
                continue;
            }
            let mut composed: AtomMap = vec![None; atom_sugars.len()];
            for (orig_idx, su_handle) in atom_sugars.iter().enumerate() {
                if let Some(su_h) = su_handle {
                    if let Some(Some(component_h)) = su_to_component.get(su_h.0) {
                        composed[orig_idx] = Some(*component_h);
                    }
                }
            }
            fragment_atom_maps.push(composed);
            fragments.push(component);
        }
    }

    ExtractionOutcome {
        fragments,
        maps: ExtractionMaps {
            atom_aglycone,
            bond_aglycone,
            atom_sugars,
            bond_sugars,
        },
        fragment_atom_maps,
        diagnostics,
    }
}

fn cleanup_map(map: &mut AtomMap, contains: impl Fn(AtomId) -> bool) {
    for entry in map.iter_mut() {
        if let Some(id) = *entry {
            if !contains(id) {
                *entry = None;
            }
        }
    }
}

fn cleanup_bond_map(map: &mut BondMap, contains: impl Fn(BondId) -> bool) {
    for entry in map.iter_mut() {
        if let Some(id) = *entry {
            if !contains(id) {
                *entry = None;
            }
        }
    }
}
