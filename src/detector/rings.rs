//! Smallest-set-of-smallest-rings perception.
//!
//! Finds a cycle basis by taking, for every bond, the shortest path between
//! its endpoints with that bond excluded; the resulting candidate cycles are
//! sorted by size and reduced to a linearly independent basis over GF(2)
//! using the bond-incidence vector of each cycle.

use std::collections::{HashSet, VecDeque};

use crate::core::graph::{AtomId, BondId, MolecularGraph};

/// Returns the smallest set of smallest rings of `graph`, each as the
/// ordered sequence of atoms around the ring.
///
/// # Examples
///
/// ```
/// use glycosector::core::graph::MolecularGraph;
/// use glycosector::detector::rings::find_rings;
/// use glycosector::{BondOrder, Element};
///
/// let mut graph = MolecularGraph::new();
/// let atoms: Vec<_> = (0..6).map(|_| graph.new_atom(Element::C)).collect();
/// for i in 0..6 {
///     graph
///         .new_bond(atoms[i], atoms[(i + 1) % 6], BondOrder::Single)
///         .unwrap();
/// }
/// let rings = find_rings(&graph);
/// assert_eq!(rings.len(), 1);
/// assert_eq!(rings[0].len(), 6);
/// ```
pub fn find_rings(graph: &MolecularGraph) -> Vec<Vec<AtomId>> {
    let atom_count = graph.atom_count();
    if atom_count == 0 {
        return Vec::new();
    }

    let component_count = count_components(graph);
    let cyclomatic_number =
        graph.bond_count() as isize - atom_count as isize + component_count as isize;
    if cyclomatic_number <= 0 {
        return Vec::new();
    }
    let cyclomatic_number = cyclomatic_number as usize;

    let bond_order: Vec<BondId> = graph.bonds().map(|(id, _)| id).collect();
    let bond_index: std::collections::HashMap<BondId, usize> = bond_order
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    let mut candidates: Vec<(Vec<AtomId>, Vec<bool>)> = Vec::new();
    for (bond_id, bond) in graph.bonds() {
        let Some(path) = shortest_path_excluding_bond(graph, bond.begin, bond.end, bond_id) else {
            continue;
        };
        if path.len() < 3 {
            continue;
        }
        let Some(vector) = bond_incidence_vector(graph, &path, bond_id, &bond_index, bond_order.len())
        else {
            continue;
        };
        candidates.push((path, vector));
    }
    candidates.sort_by_key(|(path, _)| path.len());

    let mut basis: Vec<Vec<bool>> = Vec::new();
    let mut rings = Vec::new();
    for (path, vector) in candidates {
        if rings.len() == cyclomatic_number {
            break;
        }
        if try_insert(vector, &mut basis) {
            rings.push(path);
        }
    }
    rings
}

fn bond_incidence_vector(
    graph: &MolecularGraph,
    path: &[AtomId],
    closing_bond: BondId,
    bond_index: &std::collections::HashMap<BondId, usize>,
    width: usize,
) -> Option<Vec<bool>> {
    let mut vector = vec![false; width];
    vector[*bond_index.get(&closing_bond)?] = true;
    for window in path.windows(2) {
        let bond_id = graph.bond_between(window[0], window[1])?;
        vector[*bond_index.get(&bond_id)?] = true;
    }
    Some(vector)
}

fn first_set_bit(vector: &[bool]) -> Option<usize> {
    vector.iter().position(|bit| *bit)
}

fn xor_into(target: &mut [bool], other: &[bool]) {
    for (t, o) in target.iter_mut().zip(other.iter()) {
        *t ^= o;
    }
}

/// Attempts to insert `vector` into `basis`, reducing it against existing
/// rows first. Returns `true` if `vector` was linearly independent of the
/// current basis and was added.
fn try_insert(mut vector: Vec<bool>, basis: &mut Vec<Vec<bool>>) -> bool {
    loop {
        let Some(pivot) = first_set_bit(&vector) else {
            return false;
        };
        match basis.iter().find(|row| first_set_bit(row) == Some(pivot)) {
            Some(existing) => xor_into(&mut vector, existing),
            None => {
                basis.push(vector);
                return true;
            }
        }
    }
}

fn shortest_path_excluding_bond(
    graph: &MolecularGraph,
    start: AtomId,
    goal: AtomId,
    excluded: BondId,
) -> Option<Vec<AtomId>> {
    let mut visited = HashSet::new();
    visited.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back(vec![start]);

    while let Some(path) = queue.pop_front() {
        let current = *path.last().expect("path is never empty");
        if current == goal && path.len() > 1 {
            return Some(path);
        }
        for (bond_id, bond) in graph.bonds() {
            if bond_id == excluded {
                continue;
            }
            let Some(next) = bond.other(current) else {
                continue;
            };
            if visited.insert(next) {
                let mut next_path = path.clone();
                next_path.push(next);
                queue.push_back(next_path);
            }
        }
    }
    None
}

fn count_components(graph: &MolecularGraph) -> usize {
    let mut remaining: HashSet<AtomId> = graph.atoms().map(|(id, _)| id).collect();
    let mut count = 0;
    while let Some(&start) = remaining.iter().next() {
        count += 1;
        remaining.remove(&start);
        let mut frontier = vec![start];
        while let Some(current) = frontier.pop() {
            for neighbor in graph.neighbors(current) {
                if remaining.remove(&neighbor) {
                    frontier.push(neighbor);
                }
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BondOrder;
    use crate::core::Element;

    fn cyclohexane() -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        let atoms: Vec<_> = (0..6).map(|_| graph.new_atom(Element::C)).collect();
        for i in 0..6 {
            graph
                .new_bond(atoms[i], atoms[(i + 1) % 6], BondOrder::Single)
                .unwrap();
        }
        graph
    }

    #[test]
    fn acyclic_graph_has_no_rings() {
        let mut graph = MolecularGraph::new();
        let a = graph.new_atom(Element::C);
        let b = graph.new_atom(Element::C);
        graph.new_bond(a, b, BondOrder::Single).unwrap();
        assert!(find_rings(&graph).is_empty());
    }

    #[test]
    fn single_ring_is_found_with_correct_size() {
        let rings = find_rings(&cyclohexane());
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 6);
    }

    #[test]
    fn fused_bicyclic_graph_finds_two_independent_rings() {
        let mut graph = MolecularGraph::new();
        let atoms: Vec<_> = (0..8).map(|_| graph.new_atom(Element::C)).collect();
        // Two fused six-membered rings sharing the bond atoms[2]-atoms[3].
        let ring_a = [0, 1, 2, 3, 4, 5];
        for i in 0..ring_a.len() {
            graph
                .new_bond(
                    atoms[ring_a[i]],
                    atoms[ring_a[(i + 1) % ring_a.len()]],
                    BondOrder::Single,
                )
                .unwrap();
        }
        graph.new_bond(atoms[2], atoms[6], BondOrder::Single).unwrap();
        graph.new_bond(atoms[6], atoms[7], BondOrder::Single).unwrap();
        graph.new_bond(atoms[7], atoms[3], BondOrder::Single).unwrap();

        let rings = find_rings(&graph);
        assert_eq!(rings.len(), 2);
    }
}
