//! The Sugar Pattern Detector: classifies ring and acyclic carbon-chain
//! substructures as candidate sugars and removes them from a graph in place.
//!
//! Expressed as a capability trait rather than an inheritance hierarchy, so
//! the extractor owns a detector by composition and tests can substitute a
//! mock implementation. [`DefaultSugarDetector`] is the shipped
//! implementation; its classification heuristics are an implementation
//! detail behind the trait's externally observable contract (mutate in
//! place, report whether anything was removed).

pub mod rings;

use std::collections::HashSet;

use crate::config::DetectorSettings;
use crate::core::error::DetectorError;
use crate::core::graph::{AtomId, MolecularGraph, PropertyValue};
use crate::core::Element;

/// Property key the detector stamps on an atom that is a spiro junction
/// between a recognized sugar ring and a non-sugar ring, when
/// [`DetectorSettings::detect_spiro_rings_as_circular_sugars`] is enabled.
/// The extractor reads this flag to decide the atom must be duplicated onto
/// both copies.
pub const SPIRO_MARKER_PROPERTY: &str = "glycosector.is_spiro_sugar_junction";

/// Capability interface for sugar detection, owned by the extractor through
/// composition rather than inherited from.
pub trait SugarPatternDetector {
    /// The settings this detector was configured with.
    fn settings(&self) -> &DetectorSettings;

    /// Removes every candidate circular (ring) sugar from `mol` in place.
    /// Returns whether any atom was removed.
    fn remove_circular_sugars(&self, mol: &mut MolecularGraph) -> Result<bool, DetectorError>;

    /// Removes every candidate linear (acyclic chain) sugar from `mol` in
    /// place. Returns whether any atom was removed.
    fn remove_linear_sugars(&self, mol: &mut MolecularGraph) -> Result<bool, DetectorError>;

    /// Runs both removal passes. Returns whether either removed anything.
    fn remove_circular_and_linear_sugars(
        &self,
        mol: &mut MolecularGraph,
    ) -> Result<bool, DetectorError> {
        let removed_circular = self.remove_circular_sugars(mol)?;
        let removed_linear = self.remove_linear_sugars(mol)?;
        Ok(removed_circular || removed_linear)
    }

    /// Whether `fragment` falls below the preservation-mode threshold and
    /// should not be kept as a standalone sugar.
    fn is_too_small_to_preserve(&self, fragment: &MolecularGraph) -> bool {
        fragment.atom_count() < self.settings().preservation_mode_threshold as usize
    }

    /// The configured minimum size for a linear sugar candidate.
    fn linear_sugar_candidate_min_size_setting(&self) -> u32 {
        self.settings().linear_sugar_candidate_min_size
    }
}

/// The shipped [`SugarPatternDetector`] implementation.
///
/// Classifies rings of size 5-7 containing exactly one ring oxygen and a
/// sufficient ratio of exocyclic hydroxy-like oxygen substituents as
/// candidate circular sugars (the pyranose/furanose/heptose shape), and
/// maximal runs of acyclic, non-ring carbons each bearing an exocyclic
/// oxygen substituent as candidate linear sugars.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSugarDetector {
    settings: DetectorSettings,
}

impl DefaultSugarDetector {
    /// Creates a detector configured with `settings`.
    pub fn new(settings: DetectorSettings) -> Self {
        Self { settings }
    }

    fn qualifies_as_circular_sugar(&self, mol: &MolecularGraph, ring: &[AtomId]) -> bool {
        if !(5..=7).contains(&ring.len()) {
            return false;
        }
        let ring_set: HashSet<AtomId> = ring.iter().copied().collect();
        let ring_oxygens = ring
            .iter()
            .filter(|&&a| mol.atom(a).and_then(|atom| atom.element()) == Some(Element::O))
            .count();
        if ring_oxygens != 1 {
            return false;
        }
        let exocyclic_oxygens = ring
            .iter()
            .filter(|&&a| {
                mol.neighbors(a).into_iter().any(|n| {
                    !ring_set.contains(&n)
                        && mol.atom(n).and_then(|atom| atom.element()) == Some(Element::O)
                })
            })
            .count();
        let ratio = exocyclic_oxygens as f64 / ring.len() as f64;
        ratio >= self.settings.exocyclic_oxygen_ratio_threshold
    }

    /// A group is terminal if it has at most one external neighbour that
    /// itself leads further into the molecule (degree > 1). A dangling
    /// substituent such as a lone hydroxyl oxygen (degree 1, no other
    /// neighbour) does not count: removing the group turns it into an
    /// isolated atom rather than splitting off a second fragment, so it
    /// does not make the group a bridge.
    fn is_terminal_group(&self, mol: &MolecularGraph, group: &[AtomId]) -> bool {
        let group_set: HashSet<AtomId> = group.iter().copied().collect();
        let mut external_neighbors: HashSet<AtomId> = HashSet::new();
        for &atom_id in group {
            for neighbor in mol.neighbors(atom_id) {
                if !group_set.contains(&neighbor) && mol.degree(neighbor) > 1 {
                    external_neighbors.insert(neighbor);
                }
            }
        }
        external_neighbors.len() <= 1
    }

    fn find_spiro_atoms(&self, mol: &MolecularGraph, ring: &[AtomId]) -> HashSet<AtomId> {
        if !self.settings.detect_spiro_rings_as_circular_sugars {
            return HashSet::new();
        }
        let ring_set: HashSet<AtomId> = ring.iter().copied().collect();
        let mut spiro = HashSet::new();
        for other in rings::find_rings(mol) {
            if other == ring {
                continue;
            }
            let other_set: HashSet<AtomId> = other.iter().copied().collect();
            let shared: Vec<AtomId> = ring_set.intersection(&other_set).copied().collect();
            if shared.len() == 1 && !self.qualifies_as_circular_sugar(mol, &other) {
                spiro.insert(shared[0]);
            }
        }
        spiro
    }

    fn remove_or_stamp_ring(&self, mol: &mut MolecularGraph, ring: &[AtomId]) {
        let spiro_atoms = self.find_spiro_atoms(mol, ring);
        for &atom_id in ring {
            if spiro_atoms.contains(&atom_id) {
                if let Some(atom) = mol.atom_mut(atom_id) {
                    atom.properties.insert(
                        SPIRO_MARKER_PROPERTY.to_string(),
                        PropertyValue::Bool(true),
                    );
                }
            } else {
                mol.remove_atom(atom_id);
            }
        }
    }

    fn atom_in_any_ring(&self, mol: &MolecularGraph, atom_id: AtomId) -> bool {
        rings::find_rings(mol)
            .iter()
            .any(|ring| ring.contains(&atom_id))
    }

    fn is_polyol_carbon(&self, mol: &MolecularGraph, atom_id: AtomId) -> bool {
        let Some(atom) = mol.atom(atom_id) else {
            return false;
        };
        if atom.element() != Some(Element::C) {
            return false;
        }
        if self.atom_in_any_ring(mol, atom_id) {
            return false;
        }
        mol.neighbors(atom_id).into_iter().any(|n| {
            mol.atom(n).and_then(|a| a.element()) == Some(Element::O) && mol.degree(n) <= 2
        })
    }

    fn find_linear_sugar_candidates(&self, mol: &MolecularGraph) -> Vec<Vec<AtomId>> {
        let qualifying: HashSet<AtomId> = mol
            .atoms()
            .map(|(id, _)| id)
            .filter(|&id| self.is_polyol_carbon(mol, id))
            .collect();

        let mut visited: HashSet<AtomId> = HashSet::new();
        let mut candidates = Vec::new();
        for &start in &qualifying {
            if visited.contains(&start) {
                continue;
            }
            let mut component = vec![start];
            visited.insert(start);
            let mut frontier = vec![start];
            while let Some(current) = frontier.pop() {
                for neighbor in mol.neighbors(current) {
                    if qualifying.contains(&neighbor) && visited.insert(neighbor) {
                        component.push(neighbor);
                        frontier.push(neighbor);
                    }
                }
            }
            if component.len() >= self.settings.linear_sugar_candidate_min_size as usize {
                candidates.push(component);
            }
        }
        candidates
    }
}

impl SugarPatternDetector for DefaultSugarDetector {
    fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    fn remove_circular_sugars(&self, mol: &mut MolecularGraph) -> Result<bool, DetectorError> {
        let mut removed_any = false;
        let mut rejected: HashSet<Vec<AtomId>> = HashSet::new();

        loop {
            let candidate_rings = rings::find_rings(mol);
            let mut acted = false;

            for ring in &candidate_rings {
                if !self.qualifies_as_circular_sugar(mol, ring) {
                    continue;
                }
                let mut key = ring.clone();
                key.sort_by_key(|a| a.0);
                if rejected.contains(&key) {
                    continue;
                }
                if self.settings.remove_only_terminal_sugars && !self.is_terminal_group(mol, ring)
                {
                    rejected.insert(key);
                    continue;
                }
                self.remove_or_stamp_ring(mol, ring);
                removed_any = true;
                acted = true;
                break;
            }

            if !acted {
                break;
            }
        }

        Ok(removed_any)
    }

    fn remove_linear_sugars(&self, mol: &mut MolecularGraph) -> Result<bool, DetectorError> {
        let mut removed_any = false;
        let mut rejected: HashSet<Vec<AtomId>> = HashSet::new();

        loop {
            let candidates = self.find_linear_sugar_candidates(mol);
            let mut acted = false;

            for chain in &candidates {
                let mut key = chain.clone();
                key.sort_by_key(|a| a.0);
                if rejected.contains(&key) {
                    continue;
                }
                if self.settings.remove_only_terminal_sugars
                    && !self.is_terminal_group(mol, chain)
                {
                    rejected.insert(key);
                    continue;
                }
                for &atom_id in chain {
                    mol.remove_atom(atom_id);
                }
                removed_any = true;
                acted = true;
                break;
            }

            if !acted {
                break;
            }
        }

        Ok(removed_any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BondOrder;

    fn pyranose_ring() -> MolecularGraph {
        let mut mol = MolecularGraph::new();
        let ring: Vec<_> = (0..5).map(|_| mol.new_atom(Element::C)).collect();
        let ring_o = mol.new_atom(Element::O);
        mol.new_bond(ring[4], ring_o, BondOrder::Single).unwrap();
        mol.new_bond(ring_o, ring[0], BondOrder::Single).unwrap();
        for i in 0..4 {
            mol.new_bond(ring[i], ring[i + 1], BondOrder::Single)
                .unwrap();
        }
        for &c in &ring {
            let oh = mol.new_atom(Element::O);
            mol.new_bond(c, oh, BondOrder::Single).unwrap();
        }
        mol
    }

    #[test]
    fn qualifies_as_circular_sugar_accepts_pyranose_ring() {
        let mol = pyranose_ring();
        let detector = DefaultSugarDetector::default();
        let rings = rings::find_rings(&mol);
        assert_eq!(rings.len(), 1);
        assert!(detector.qualifies_as_circular_sugar(&mol, &rings[0]));
    }

    #[test]
    fn qualifies_as_circular_sugar_rejects_benzene() {
        let mut mol = MolecularGraph::new();
        let ring: Vec<_> = (0..6).map(|_| mol.new_atom(Element::C)).collect();
        for i in 0..6 {
            mol.new_bond(ring[i], ring[(i + 1) % 6], BondOrder::Single)
                .unwrap();
        }
        let detector = DefaultSugarDetector::default();
        let rings = rings::find_rings(&mol);
        assert!(!detector.qualifies_as_circular_sugar(&mol, &rings[0]));
    }

    #[test]
    fn remove_circular_sugars_removes_standalone_pyranose_ring() {
        let mut mol = pyranose_ring();
        let detector = DefaultSugarDetector::default();
        let removed = detector.remove_circular_sugars(&mut mol).unwrap();
        assert!(removed);
        // Ring atoms are gone; the five exocyclic hydroxyl oxygens remain
        // behind as isolated atoms, awaiting extractor boundary reconstruction.
        assert_eq!(mol.atom_count(), 5);
        assert!(mol.atoms().all(|(_, atom)| atom.element() == Some(Element::O)));
    }

    #[test]
    fn remove_circular_sugars_is_noop_without_a_qualifying_ring() {
        let mut mol = MolecularGraph::new();
        let a = mol.new_atom(Element::C);
        let b = mol.new_atom(Element::C);
        mol.new_bond(a, b, BondOrder::Single).unwrap();
        let detector = DefaultSugarDetector::default();
        let removed = detector.remove_circular_sugars(&mut mol).unwrap();
        assert!(!removed);
        assert_eq!(mol.atom_count(), 2);
    }

    #[test]
    fn remove_linear_sugars_removes_chain_at_or_above_min_size() {
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
        let detector = DefaultSugarDetector::default();
        let removed = detector.remove_linear_sugars(&mut mol).unwrap();
        assert!(removed);
        assert_eq!(mol.atom_count(), 4);
    }

    #[test]
    fn remove_linear_sugars_leaves_short_chain_below_min_size() {
        let mut mol = MolecularGraph::new();
        let chain: Vec<_> = (0..2).map(|_| mol.new_atom(Element::C)).collect();
        mol.new_bond(chain[0], chain[1], BondOrder::Single).unwrap();
        for &c in &chain {
            let oh = mol.new_atom(Element::O);
            mol.new_bond(c, oh, BondOrder::Single).unwrap();
        }
        let detector = DefaultSugarDetector::default();
        let removed = detector.remove_linear_sugars(&mut mol).unwrap();
        assert!(!removed);
        assert_eq!(mol.atom_count(), 4);
    }

    #[test]
    fn is_too_small_to_preserve_uses_threshold() {
        let detector = DefaultSugarDetector::new(DetectorSettings {
            preservation_mode_threshold: 4,
            ..DetectorSettings::default()
        });
        let mut small = MolecularGraph::new();
        small.new_atom(Element::C);
        small.new_atom(Element::O);
        assert!(detector.is_too_small_to_preserve(&small));
    }
}
