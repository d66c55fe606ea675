//! Label-addressed molecule builder shared by the integration test files:
//! atoms are referred to by a short string label instead of a raw handle, so
//! a test reads like the molecule it describes.

use std::collections::HashMap;

use glycosector::{AtomId, BondOrder, Element, MolecularGraph};

pub struct LabeledMolecule {
    pub graph: MolecularGraph,
    labels: HashMap<String, AtomId>,
}

impl LabeledMolecule {
    pub fn new() -> Self {
        Self {
            graph: MolecularGraph::new(),
            labels: HashMap::new(),
        }
    }

    pub fn atom(&mut self, label: impl Into<String>, element: Element) -> AtomId {
        let label = label.into();
        let id = self.graph.new_atom(element);
        if self.labels.insert(label.clone(), id).is_some() {
            panic!("duplicate atom label '{}'", label);
        }
        id
    }

    pub fn id(&self, label: &str) -> AtomId {
        *self
            .labels
            .get(label)
            .unwrap_or_else(|| panic!("unknown atom label '{}'", label))
    }

    pub fn bond(&mut self, a: &str, b: &str, order: BondOrder) {
        let (a_id, b_id) = (self.id(a), self.id(b));
        self.graph
            .new_bond(a_id, b_id, order)
            .unwrap_or_else(|err| panic!("bond {}-{} failed: {}", a, b, err));
    }

    /// Builds a pyranose-shaped ring: five ring carbons `{prefix}_c0`..`c4`,
    /// a ring oxygen `{prefix}_o_ring`, and a hydroxyl `{prefix}_oh1`..`oh4`
    /// hung off every ring carbon except `c0` (left free for a glycosidic
    /// attachment). Returns the label of `c0`.
    pub fn add_pyranose_ring(&mut self, prefix: &str) -> String {
        let c0 = format!("{prefix}_c0");
        let carbons: Vec<String> = (0..5).map(|i| format!("{prefix}_c{i}")).collect();
        let ring_o = format!("{prefix}_o_ring");

        for label in &carbons {
            self.atom(label.clone(), Element::C);
        }
        self.atom(ring_o.clone(), Element::O);

        for i in 0..4 {
            self.bond(&carbons[i], &carbons[i + 1], BondOrder::Single);
        }
        self.bond(&carbons[4], &ring_o, BondOrder::Single);
        self.bond(&ring_o, &carbons[0], BondOrder::Single);

        for (i, label) in carbons.iter().enumerate().skip(1) {
            let oh = format!("{prefix}_oh{i}");
            self.atom(oh.clone(), Element::O);
            self.bond(label, &oh, BondOrder::Single);
        }

        c0
    }
}

impl Default for LabeledMolecule {
    fn default() -> Self {
        Self::new()
    }
}
