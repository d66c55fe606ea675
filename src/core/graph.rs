//! The molecular graph model: atoms, bonds, stereo elements, and the arena
//! that owns them.
//!
//! `MolecularGraph` is the single representation shared by the detector, the
//! extractor, and the splitter. Atoms and bonds are addressed by opaque
//! [`AtomId`]/[`BondId`] handles into tombstoned arenas rather than by
//! position in a dense `Vec`, so that removing an atom or bond never
//! invalidates a handle held elsewhere (a renumbering scheme would require
//! every caller to track index shifts through every mutation).

use std::collections::HashMap;

use super::{BondDisplay, BondOrder, BondStereo, Element, StereoConfiguration};

/// Opaque handle to an atom stored in a [`MolecularGraph`].
///
/// Stable across insertions and removals of *other* atoms; a handle to a
/// removed atom becomes dangling and subsequent lookups return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub usize);

/// Opaque handle to a bond stored in a [`MolecularGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondId(pub usize);

/// A map from original handles to their counterpart in a copy, indexed by the
/// original handle's raw position. `None` means the original entity was not
/// carried into the copy.
pub type AtomMap = Vec<Option<AtomId>>;
/// See [`AtomMap`]; the bond-handle equivalent.
pub type BondMap = Vec<Option<BondId>>;

/// A primitive-typed property value attached to an atom, bond, or the graph
/// itself. Restricted to scalars so that deep-copy can carry properties
/// across without a user-supplied clone hook.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Text value.
    Text(String),
    /// Signed integer value.
    Int(i64),
    /// Boolean flag value.
    Bool(bool),
    /// Floating-point value.
    Float(f64),
}

/// A property bag keyed by name, carried on atoms, bonds, and the graph.
pub type PropertyMap = HashMap<String, PropertyValue>;

/// A 2D layout coordinate, carried through deep copy for rendering purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// A 3D layout coordinate, carried through deep copy for rendering purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// What an atom node actually represents: a real element, or a pseudo atom
/// left behind to mark a severed attachment point.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    /// An ordinary chemical element.
    Element(Element),
    /// A wildcard "R" attachment-point marker left where a bond was cut.
    /// `attach_point_num` distinguishes multiple attachment points on the
    /// same fragment (R1, R2, ...).
    Pseudo {
        /// Display symbol, conventionally `"R"` or `"R1"`/`"R2"`.
        symbol: String,
        /// Attachment point number, unique within one fragment.
        attach_point_num: u32,
    },
}

/// An atom stored in a [`MolecularGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// What this node represents: an element or a pseudo-atom marker.
    pub kind: AtomKind,
    /// Formal charge, e.g. `-1` for a carboxylate oxygen.
    pub formal_charge: i8,
    /// Implicit hydrogen count. `None` means unperceived/unset, distinct from
    /// a perceived count of zero.
    pub implicit_h_count: Option<u8>,
    /// Whether this atom participates in an aromatic system.
    pub is_aromatic: bool,
    /// Perceived valence, if known.
    pub valency: Option<i8>,
    /// A free-form perceived atom type name (e.g. force-field or ring-class
    /// label), if one has been assigned upstream of this crate.
    pub atom_type_name: Option<String>,
    /// 2D layout coordinate, if the input graph carried one.
    pub point2d: Option<Point2D>,
    /// 3D layout coordinate, if the input graph carried one.
    pub point3d: Option<Point3D>,
    /// Free-form bit flags reserved for caller use; copied opaquely.
    pub flags: u32,
    /// Primitive-typed named properties.
    pub properties: PropertyMap,
}

impl Atom {
    /// Creates a plain atom of the given element with no charge, no
    /// perceived aromaticity, and all other fields at their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::Atom;
    /// use glycosector::Element;
    ///
    /// let carbon = Atom::new(Element::C);
    /// assert_eq!(carbon.element(), Some(Element::C));
    /// ```
    pub fn new(element: Element) -> Self {
        Self {
            kind: AtomKind::Element(element),
            formal_charge: 0,
            implicit_h_count: None,
            is_aromatic: false,
            valency: None,
            atom_type_name: None,
            point2d: None,
            point3d: None,
            flags: 0,
            properties: PropertyMap::new(),
        }
    }

    /// Creates a pseudo attachment-point marker atom.
    pub fn pseudo(symbol: impl Into<String>, attach_point_num: u32) -> Self {
        Self {
            kind: AtomKind::Pseudo {
                symbol: symbol.into(),
                attach_point_num,
            },
            formal_charge: 0,
            implicit_h_count: None,
            is_aromatic: false,
            valency: None,
            atom_type_name: None,
            point2d: None,
            point3d: None,
            flags: 0,
            properties: PropertyMap::new(),
        }
    }

    /// The underlying element, or `None` if this is a pseudo atom.
    pub fn element(&self) -> Option<Element> {
        match &self.kind {
            AtomKind::Element(e) => Some(*e),
            AtomKind::Pseudo { .. } => None,
        }
    }

    /// Whether this atom is a pseudo attachment-point marker.
    pub fn is_pseudo(&self) -> bool {
        matches!(self.kind, AtomKind::Pseudo { .. })
    }
}

/// A bond stored in a [`MolecularGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    /// One endpoint of the bond.
    pub begin: AtomId,
    /// The other endpoint.
    pub end: AtomId,
    /// The bond order.
    pub order: BondOrder,
    /// Whether this bond participates in an aromatic system.
    pub is_aromatic: bool,
    /// Wedge/hash stereo annotation.
    pub stereo: BondStereo,
    /// Rendering style, independent of chemical order.
    pub display: BondDisplay,
    /// Whether this bond was found to lie on a ring during perception.
    pub is_in_ring: bool,
    /// Shared electron count, distinct from nominal bond order for resonance
    /// bookkeeping; defaults to `2 * order.weight()`.
    pub electron_count: u8,
    /// Primitive-typed named properties.
    pub properties: PropertyMap,
}

impl Bond {
    /// Creates a new bond between two atom handles.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::{AtomId, Bond};
    /// use glycosector::BondOrder;
    ///
    /// let bond = Bond::new(AtomId(0), AtomId(1), BondOrder::Single);
    /// assert!(bond.involves(AtomId(0)));
    /// ```
    pub fn new(begin: AtomId, end: AtomId, order: BondOrder) -> Self {
        Self {
            begin,
            end,
            order,
            is_aromatic: false,
            stereo: BondStereo::default(),
            display: BondDisplay::default(),
            is_in_ring: false,
            electron_count: order.weight() * 2,
            properties: PropertyMap::new(),
        }
    }

    /// Whether `atom` is one of this bond's two endpoints.
    pub fn involves(&self, atom: AtomId) -> bool {
        self.begin == atom || self.end == atom
    }

    /// Returns the endpoint other than `atom`, if `atom` is actually an
    /// endpoint of this bond.
    pub fn other(&self, atom: AtomId) -> Option<AtomId> {
        if self.begin == atom {
            Some(self.end)
        } else if self.end == atom {
            Some(self.begin)
        } else {
            None
        }
    }
}

/// A non-bonding lone pair of electrons, localized on one atom. An atom with
/// two lone pairs (e.g. a neutral ether oxygen) has two separate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LonePair(pub AtomId);

/// An unpaired (radical) electron, localized on one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleElectron(pub AtomId);

/// One endpoint a stereo element's focus or carrier list can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoReferent {
    /// References an atom.
    Atom(AtomId),
    /// References a bond.
    Bond(BondId),
}

/// A perceived stereo element: a tetrahedral center or a double-bond
/// geometry, described independently of the bond/atom wedge annotations used
/// purely for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoElement {
    /// The atom or bond the stereo configuration is centered on.
    pub focus: StereoReferent,
    /// The neighboring atoms/bonds whose arrangement around `focus` defines
    /// the configuration, in a caller-defined canonical order.
    pub carriers: Vec<StereoReferent>,
    /// The stereo configuration itself.
    pub configuration: StereoConfiguration,
}

impl StereoElement {
    /// Re-homes this stereo element onto a copy's handles using `atom_map`
    /// and `bond_map`, returning `None` if the focus or any carrier has no
    /// counterpart in the copy — a stereo element cannot be partially
    /// re-homed.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::{AtomId, StereoElement, StereoReferent};
    /// use glycosector::StereoConfiguration;
    ///
    /// let element = StereoElement {
    ///     focus: StereoReferent::Atom(AtomId(0)),
    ///     carriers: vec![StereoReferent::Atom(AtomId(1))],
    ///     configuration: StereoConfiguration::TetrahedralClockwise,
    /// };
    /// let atom_map = vec![Some(AtomId(10)), Some(AtomId(11))];
    /// let bond_map = vec![];
    /// let mapped = element.map(&atom_map, &bond_map).unwrap();
    /// assert_eq!(mapped.focus, StereoReferent::Atom(AtomId(10)));
    /// ```
    pub fn map(&self, atom_map: &AtomMap, bond_map: &BondMap) -> Option<StereoElement> {
        let focus = map_referent(self.focus, atom_map, bond_map)?;
        let mut carriers = Vec::with_capacity(self.carriers.len());
        for carrier in &self.carriers {
            carriers.push(map_referent(*carrier, atom_map, bond_map)?);
        }
        Some(StereoElement {
            focus,
            carriers,
            configuration: self.configuration,
        })
    }

    /// Swaps every carrier reference equal to `old` for `new`. Used when a
    /// boundary atom is duplicated and a stereo element needs to keep
    /// pointing at whichever copy retained the relevant substituent.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::{AtomId, StereoElement, StereoReferent};
    /// use glycosector::StereoConfiguration;
    ///
    /// let mut element = StereoElement {
    ///     focus: StereoReferent::Atom(AtomId(0)),
    ///     carriers: vec![StereoReferent::Atom(AtomId(1))],
    ///     configuration: StereoConfiguration::TetrahedralClockwise,
    /// };
    /// element.update_carriers(StereoReferent::Atom(AtomId(1)), StereoReferent::Atom(AtomId(9)));
    /// assert_eq!(element.carriers, vec![StereoReferent::Atom(AtomId(9))]);
    /// ```
    pub fn update_carriers(&mut self, old: StereoReferent, new: StereoReferent) {
        for carrier in self.carriers.iter_mut() {
            if *carrier == old {
                *carrier = new;
            }
        }
    }
}

fn map_referent(
    referent: StereoReferent,
    atom_map: &AtomMap,
    bond_map: &BondMap,
) -> Option<StereoReferent> {
    match referent {
        StereoReferent::Atom(id) => {
            let mapped = *atom_map.get(id.0)?;
            mapped.map(StereoReferent::Atom)
        }
        StereoReferent::Bond(id) => {
            let mapped = *bond_map.get(id.0)?;
            mapped.map(StereoReferent::Bond)
        }
    }
}

/// An arena-backed molecular graph.
///
/// Atoms and bonds live in `Vec<Option<T>>` slots addressed by [`AtomId`]/
/// [`BondId`]; removal tombstones the slot instead of shifting later
/// elements, so handles captured before a removal remain valid pointers
/// (possibly now dangling, which lookups surface as `None` rather than a
/// panic or silently wrong index).
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    atoms: Vec<Option<Atom>>,
    bonds: Vec<Option<Bond>>,
    stereo_elements: Vec<StereoElement>,
    lone_pairs: Vec<LonePair>,
    single_electrons: Vec<SingleElectron>,
    properties: PropertyMap,
}

impl MolecularGraph {
    /// Creates a new, empty molecular graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::MolecularGraph;
    ///
    /// let graph = MolecularGraph::new();
    /// assert_eq!(graph.atom_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `atom` and returns its handle.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let id = AtomId(self.atoms.len());
        self.atoms.push(Some(atom));
        id
    }

    /// Convenience constructor: inserts a plain element atom.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::MolecularGraph;
    /// use glycosector::Element;
    ///
    /// let mut graph = MolecularGraph::new();
    /// let carbon = graph.new_atom(Element::C);
    /// assert!(graph.contains_atom(carbon));
    /// ```
    pub fn new_atom(&mut self, element: Element) -> AtomId {
        self.add_atom(Atom::new(element))
    }

    /// Inserts `bond`, validating that both endpoints exist, are distinct,
    /// and are not already directly bonded.
    pub fn add_bond(&mut self, bond: Bond) -> Result<BondId, super::error::GraphValidationError> {
        self.validate_new_bond(bond.begin, bond.end)?;
        let id = BondId(self.bonds.len());
        self.bonds.push(Some(bond));
        Ok(id)
    }

    /// Convenience constructor: builds and inserts a bond of the given order.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::MolecularGraph;
    /// use glycosector::{BondOrder, Element};
    ///
    /// let mut graph = MolecularGraph::new();
    /// let a = graph.new_atom(Element::C);
    /// let b = graph.new_atom(Element::O);
    /// let bond = graph.new_bond(a, b, BondOrder::Single).unwrap();
    /// assert!(graph.contains_bond(bond));
    /// ```
    pub fn new_bond(
        &mut self,
        begin: AtomId,
        end: AtomId,
        order: BondOrder,
    ) -> Result<BondId, super::error::GraphValidationError> {
        self.add_bond(Bond::new(begin, end, order))
    }

    fn validate_new_bond(
        &self,
        begin: AtomId,
        end: AtomId,
    ) -> Result<(), super::error::GraphValidationError> {
        if !self.contains_atom(begin) {
            return Err(super::error::GraphValidationError::MissingAtom { atom_id: begin.0 });
        }
        if !self.contains_atom(end) {
            return Err(super::error::GraphValidationError::MissingAtom { atom_id: end.0 });
        }
        if begin == end {
            return Err(super::error::GraphValidationError::SelfBondingAtom { atom_id: begin.0 });
        }
        if self.bond_between(begin, end).is_some() {
            return Err(super::error::GraphValidationError::DuplicateBond {
                atom_id_1: begin.0,
                atom_id_2: end.0,
            });
        }
        Ok(())
    }

    /// Removes an atom and every bond incident to it, tombstoning the atom's
    /// slot. Also drops any stereo element whose focus or carriers reference
    /// the removed atom or any of the removed bonds, and any lone pair or
    /// single electron localized on it. Returns the removed atom, or `None`
    /// if `id` was already absent.
    pub fn remove_atom(&mut self, id: AtomId) -> Option<Atom> {
        let atom = self.atoms.get_mut(id.0)?.take()?;
        let incident: Vec<BondId> = self
            .bonds()
            .filter(|(_, bond)| bond.involves(id))
            .map(|(bond_id, _)| bond_id)
            .collect();
        for bond_id in incident {
            self.remove_bond(bond_id);
        }
        self.stereo_elements
            .retain(|element| !stereo_references_atom(element, id));
        self.lone_pairs.retain(|pair| pair.0 != id);
        self.single_electrons.retain(|electron| electron.0 != id);
        Some(atom)
    }

    /// Removes a bond, tombstoning its slot. Also drops any stereo element
    /// whose focus or carriers reference this bond. Returns the removed bond,
    /// or `None` if `id` was already absent.
    pub fn remove_bond(&mut self, id: BondId) -> Option<Bond> {
        let bond = self.bonds.get_mut(id.0)?.take()?;
        self.stereo_elements
            .retain(|element| !stereo_references_bond(element, id));
        Some(bond)
    }

    /// Removes the bond directly connecting `a` and `b`, if one exists.
    pub fn remove_bond_between(&mut self, a: AtomId, b: AtomId) -> Option<Bond> {
        let id = self.bond_between(a, b)?;
        self.remove_bond(id)
    }

    /// Whether `id` currently refers to a live atom.
    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.atoms.get(id.0).is_some_and(Option::is_some)
    }

    /// Whether `id` currently refers to a live bond.
    pub fn contains_bond(&self, id: BondId) -> bool {
        self.bonds.get(id.0).is_some_and(Option::is_some)
    }

    /// Looks up an atom by handle.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id.0)?.as_ref()
    }

    /// Looks up an atom by handle, mutably.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id.0)?.as_mut()
    }

    /// Looks up a bond by handle.
    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id.0)?.as_ref()
    }

    /// Looks up a bond by handle, mutably.
    pub fn bond_mut(&mut self, id: BondId) -> Option<&mut Bond> {
        self.bonds.get_mut(id.0)?.as_mut()
    }

    /// Finds the bond directly connecting `a` and `b`, if any.
    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<BondId> {
        self.bonds()
            .find(|(_, bond)| bond.involves(a) && bond.involves(b))
            .map(|(id, _)| id)
    }

    /// The atoms directly bonded to `id`.
    pub fn neighbors(&self, id: AtomId) -> Vec<AtomId> {
        self.bonds()
            .filter_map(|(_, bond)| bond.other(id))
            .collect()
    }

    /// The bonds incident to `id`.
    pub fn incident_bonds(&self, id: AtomId) -> Vec<BondId> {
        self.bonds()
            .filter(|(_, bond)| bond.involves(id))
            .map(|(bond_id, _)| bond_id)
            .collect()
    }

    /// The number of bonds incident to `id` (the atom's degree).
    pub fn degree(&self, id: AtomId) -> usize {
        self.bonds().filter(|(_, bond)| bond.involves(id)).count()
    }

    /// The sum of bond-order weights over every bond incident to `id`.
    pub fn bond_order_sum(&self, id: AtomId) -> u32 {
        self.bonds()
            .filter(|(_, bond)| bond.involves(id))
            .map(|(_, bond)| bond.order.weight() as u32)
            .sum()
    }

    /// Iterates over live atoms and their handles.
    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|atom| (AtomId(i), atom)))
    }

    /// Iterates over live bonds and their handles.
    pub fn bonds(&self) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|bond| (BondId(i), bond)))
    }

    /// The number of live atoms.
    pub fn atom_count(&self) -> usize {
        self.atoms.iter().filter(|slot| slot.is_some()).count()
    }

    /// The number of live bonds.
    pub fn bond_count(&self) -> usize {
        self.bonds.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the graph has no live atoms.
    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Adds a stereo element.
    pub fn add_stereo_element(&mut self, element: StereoElement) {
        self.stereo_elements.push(element);
    }

    /// All perceived stereo elements.
    pub fn stereo_elements(&self) -> &[StereoElement] {
        &self.stereo_elements
    }

    /// Removes every stereo element. Used before rebuilding the set wholesale
    /// from a fresh source-of-truth mapping, e.g. after boundary
    /// reconstruction has relocated or duplicated atoms across two copies.
    pub fn clear_stereo_elements(&mut self) {
        self.stereo_elements.clear();
    }

    /// Adds a lone pair localized on `atom`.
    pub fn add_lone_pair(&mut self, atom: AtomId) {
        self.lone_pairs.push(LonePair(atom));
    }

    /// All lone pairs currently held on the graph.
    pub fn lone_pairs(&self) -> &[LonePair] {
        &self.lone_pairs
    }

    /// Adds a single (radical) electron localized on `atom`.
    pub fn add_single_electron(&mut self, atom: AtomId) {
        self.single_electrons.push(SingleElectron(atom));
    }

    /// All single electrons currently held on the graph.
    pub fn single_electrons(&self) -> &[SingleElectron] {
        &self.single_electrons
    }

    /// In every stereo element whose focus is `focus`, replaces a carrier
    /// equal to `old` with `new`. Used when a bond-breaking operation
    /// duplicates a carrier atom onto `focus`'s side, so the stereo element
    /// must follow the duplicate rather than the original.
    pub fn rehome_stereo_carrier(
        &mut self,
        focus: StereoReferent,
        old: StereoReferent,
        new: StereoReferent,
    ) {
        for element in &mut self.stereo_elements {
            if element.focus == focus {
                element.update_carriers(old, new);
            }
        }
    }

    /// Graph-level named properties.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Graph-level named properties, mutably.
    pub fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    /// Whether every atom in the graph is reachable from every other atom via
    /// bonds; an empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        let mut ids = self.atoms().map(|(id, _)| id);
        let Some(start) = ids.next() else {
            return true;
        };
        let reached = self.reachable_from(start);
        reached.len() == self.atom_count()
    }

    /// Breadth-first traversal of every atom reachable from `start`.
    fn reachable_from(&self, start: AtomId) -> Vec<AtomId> {
        let mut visited = vec![start];
        let mut frontier = vec![start];
        while let Some(current) = frontier.pop() {
            for neighbor in self.neighbors(current) {
                if !visited.contains(&neighbor) {
                    visited.push(neighbor);
                    frontier.push(neighbor);
                }
            }
        }
        visited
    }

    /// Splits the graph into its connected components, each returned as an
    /// independent [`MolecularGraph`] together with the map from this
    /// graph's atom handles to the component's.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::core::graph::MolecularGraph;
    /// use glycosector::Element;
    ///
    /// let mut graph = MolecularGraph::new();
    /// graph.new_atom(Element::C);
    /// graph.new_atom(Element::O);
    /// let components = graph.partition_into_components();
    /// assert_eq!(components.len(), 2);
    /// ```
    pub fn partition_into_components(&self) -> Vec<(MolecularGraph, AtomMap)> {
        let mut unvisited: Vec<AtomId> = self.atoms().map(|(id, _)| id).collect();
        let mut components = Vec::new();

        while let Some(&seed) = unvisited.first() {
            let member_ids = self.reachable_from(seed);
            unvisited.retain(|id| !member_ids.contains(id));

            let mut component = MolecularGraph::new();
            let mut atom_map: AtomMap = vec![None; self.atoms.len()];
            for &orig_id in &member_ids {
                let atom = self.atom(orig_id).expect("reachable atom must be live");
                let new_id = component.add_atom(atom.clone());
                atom_map[orig_id.0] = Some(new_id);
            }
            for (_, bond) in self.bonds() {
                if let (Some(begin), Some(end)) =
                    (atom_map[bond.begin.0], atom_map[bond.end.0])
                {
                    let mut copied = bond.clone();
                    copied.begin = begin;
                    copied.end = end;
                    component
                        .bonds
                        .push(Some(copied));
                }
            }
            let bond_map: BondMap = (0..component.bonds.len()).map(|i| Some(BondId(i))).collect();
            for element in &self.stereo_elements {
                if let Some(mapped) = element.map(&atom_map, &bond_map) {
                    component.add_stereo_element(mapped);
                }
            }
            for pair in &self.lone_pairs {
                if let Some(new_atom) = atom_map[pair.0 .0] {
                    component.add_lone_pair(new_atom);
                }
            }
            for electron in &self.single_electrons {
                if let Some(new_atom) = atom_map[electron.0 .0] {
                    component.add_single_electron(new_atom);
                }
            }
            components.push((component, atom_map));
        }
        components
    }
}

fn stereo_references_atom(element: &StereoElement, id: AtomId) -> bool {
    element.focus == StereoReferent::Atom(id)
        || element.carriers.contains(&StereoReferent::Atom(id))
}

fn stereo_references_bond(element: &StereoElement, id: BondId) -> bool {
    element.focus == StereoReferent::Bond(id)
        || element.carriers.contains(&StereoReferent::Bond(id))
}

/// Produces an independent deep copy of `src`, along with the forward maps
/// from the original handles to their counterparts in the copy.
///
/// Every atom's atomic number, implicit H count, aromaticity, valency, atom
/// type name, formal charge, coordinates, flags, and primitive-typed
/// properties are copied; every bond's order, aromaticity, stereo, display,
/// ring membership, and properties are copied. Stereo elements are re-homed
/// via [`StereoElement::map`] and silently dropped if any referent did not
/// survive the copy (it cannot, since this copies the whole graph, but the
/// same routine is reused by callers that copy a subset). Lone pairs and
/// single electrons are likewise redirected onto their atom's counterpart
/// and dropped if that atom did not survive.
///
/// # Examples
///
/// ```
/// use glycosector::core::graph::{deeper_copy, MolecularGraph};
/// use glycosector::Element;
///
/// let mut original = MolecularGraph::new();
/// original.new_atom(Element::C);
/// let (copy, atom_map, _bond_map) = deeper_copy(&original);
/// assert_eq!(copy.atom_count(), 1);
/// assert!(atom_map[0].is_some());
/// ```
pub fn deeper_copy(src: &MolecularGraph) -> (MolecularGraph, AtomMap, BondMap) {
    let mut dst = MolecularGraph::new();
    let mut atom_map: AtomMap = vec![None; src.atoms.len()];
    for (id, atom) in src.atoms() {
        let new_id = dst.add_atom(atom.clone());
        atom_map[id.0] = Some(new_id);
    }

    let mut bond_map: BondMap = vec![None; src.bonds.len()];
    for (id, bond) in src.bonds() {
        let begin = atom_map[bond.begin.0].expect("source atom must have been copied");
        let end = atom_map[bond.end.0].expect("source atom must have been copied");
        let mut copied = bond.clone();
        copied.begin = begin;
        copied.end = end;
        let new_id = BondId(dst.bonds.len());
        dst.bonds.push(Some(copied));
        bond_map[id.0] = Some(new_id);
    }

    for element in &src.stereo_elements {
        if let Some(mapped) = element.map(&atom_map, &bond_map) {
            dst.add_stereo_element(mapped);
        }
    }
    for pair in &src.lone_pairs {
        if let Some(new_atom) = atom_map[pair.0 .0] {
            dst.add_lone_pair(new_atom);
        }
    }
    for electron in &src.single_electrons {
        if let Some(new_atom) = atom_map[electron.0 .0] {
            dst.add_single_electron(new_atom);
        }
    }
    dst.properties = src.properties.clone();

    (dst, atom_map, bond_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Element;

    fn ethanol() -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        let c1 = graph.new_atom(Element::C);
        let c2 = graph.new_atom(Element::C);
        let o = graph.new_atom(Element::O);
        graph.new_bond(c1, c2, BondOrder::Single).unwrap();
        graph.new_bond(c2, o, BondOrder::Single).unwrap();
        graph
    }

    #[test]
    fn new_graph_is_empty() {
        let graph = MolecularGraph::new();
        assert_eq!(graph.atom_count(), 0);
        assert_eq!(graph.bond_count(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn add_atom_and_bond_round_trip() {
        let graph = ethanol();
        assert_eq!(graph.atom_count(), 3);
        assert_eq!(graph.bond_count(), 2);
    }

    #[test]
    fn add_bond_rejects_out_of_bounds_atom() {
        let mut graph = MolecularGraph::new();
        let a = graph.new_atom(Element::C);
        let result = graph.new_bond(a, AtomId(99), BondOrder::Single);
        assert!(result.is_err());
    }

    #[test]
    fn add_bond_rejects_self_bond() {
        let mut graph = MolecularGraph::new();
        let a = graph.new_atom(Element::C);
        let result = graph.new_bond(a, a, BondOrder::Single);
        assert!(result.is_err());
    }

    #[test]
    fn add_bond_rejects_duplicate() {
        let mut graph = MolecularGraph::new();
        let a = graph.new_atom(Element::C);
        let b = graph.new_atom(Element::C);
        graph.new_bond(a, b, BondOrder::Single).unwrap();
        let result = graph.new_bond(a, b, BondOrder::Single);
        assert!(result.is_err());
    }

    #[test]
    fn remove_atom_tombstones_slot_and_incident_bonds() {
        let mut graph = ethanol();
        let c1 = AtomId(0);
        graph.remove_atom(c1);
        assert!(!graph.contains_atom(c1));
        assert_eq!(graph.atom_count(), 2);
        assert_eq!(graph.bond_count(), 1);
    }

    #[test]
    fn handles_issued_before_removal_stay_dangling_not_reused() {
        let mut graph = ethanol();
        let c1 = AtomId(0);
        graph.remove_atom(c1);
        let new_atom = graph.new_atom(Element::N);
        assert_ne!(new_atom, c1);
        assert!(!graph.contains_atom(c1));
    }

    #[test]
    fn is_connected_true_for_single_component() {
        let graph = ethanol();
        assert!(graph.is_connected());
    }

    #[test]
    fn is_connected_false_for_two_components() {
        let mut graph = MolecularGraph::new();
        graph.new_atom(Element::C);
        graph.new_atom(Element::O);
        assert!(!graph.is_connected());
    }

    #[test]
    fn partition_into_components_splits_disjoint_fragments() {
        let mut graph = MolecularGraph::new();
        let a = graph.new_atom(Element::C);
        let b = graph.new_atom(Element::C);
        graph.new_bond(a, b, BondOrder::Single).unwrap();
        graph.new_atom(Element::O);

        let components = graph.partition_into_components();
        assert_eq!(components.len(), 2);
        let sizes: Vec<usize> = components
            .iter()
            .map(|(g, _)| g.atom_count())
            .collect();
        assert!(sizes.contains(&2));
        assert!(sizes.contains(&1));
    }

    #[test]
    fn deeper_copy_preserves_topology_and_atom_fields() {
        let original = ethanol();
        let (copy, atom_map, bond_map) = deeper_copy(&original);

        assert_eq!(copy.atom_count(), original.atom_count());
        assert_eq!(copy.bond_count(), original.bond_count());
        for (orig_id, orig_atom) in original.atoms() {
            let new_id = atom_map[orig_id.0].unwrap();
            assert_eq!(copy.atom(new_id).unwrap().element(), orig_atom.element());
        }
        for (orig_id, orig_bond) in original.bonds() {
            let new_id = bond_map[orig_id.0].unwrap();
            assert_eq!(copy.bond(new_id).unwrap().order, orig_bond.order);
        }
    }

    #[test]
    fn deeper_copy_produces_independent_graph() {
        let original = ethanol();
        let (mut copy, _, _) = deeper_copy(&original);
        copy.remove_atom(AtomId(0));
        assert_eq!(original.atom_count(), 3);
        assert_eq!(copy.atom_count(), 2);
    }

    #[test]
    fn stereo_element_map_fails_when_referent_missing() {
        let element = StereoElement {
            focus: StereoReferent::Atom(AtomId(0)),
            carriers: vec![StereoReferent::Atom(AtomId(1))],
            configuration: StereoConfiguration::TetrahedralClockwise,
        };
        let atom_map: AtomMap = vec![Some(AtomId(10)), None];
        let bond_map: BondMap = vec![];
        assert!(element.map(&atom_map, &bond_map).is_none());
    }

    #[test]
    fn remove_atom_drops_stereo_elements_that_reference_it() {
        let mut graph = MolecularGraph::new();
        let center = graph.new_atom(Element::C);
        let a = graph.new_atom(Element::N);
        let b = graph.new_atom(Element::O);
        let c = graph.new_atom(Element::H);
        graph.new_bond(center, a, BondOrder::Single).unwrap();
        graph.new_bond(center, b, BondOrder::Single).unwrap();
        graph.new_bond(center, c, BondOrder::Single).unwrap();
        graph.add_stereo_element(StereoElement {
            focus: StereoReferent::Atom(center),
            carriers: vec![
                StereoReferent::Atom(a),
                StereoReferent::Atom(b),
                StereoReferent::Atom(c),
            ],
            configuration: StereoConfiguration::TetrahedralClockwise,
        });
        assert_eq!(graph.stereo_elements().len(), 1);
        graph.remove_atom(a);
        assert!(graph.stereo_elements().is_empty());
    }

    #[test]
    fn lone_pairs_and_single_electrons_survive_deeper_copy_and_removal() {
        let mut graph = MolecularGraph::new();
        let o = graph.new_atom(Element::O);
        let n = graph.new_atom(Element::N);
        graph.new_bond(o, n, BondOrder::Single).unwrap();
        graph.add_lone_pair(o);
        graph.add_lone_pair(o);
        graph.add_single_electron(n);

        let (copy, atom_map, _) = deeper_copy(&graph);
        let copy_o = atom_map[o.0].unwrap();
        let copy_n = atom_map[n.0].unwrap();
        assert_eq!(copy.lone_pairs(), &[LonePair(copy_o), LonePair(copy_o)]);
        assert_eq!(copy.single_electrons(), &[SingleElectron(copy_n)]);

        let mut graph = graph;
        graph.remove_atom(o);
        assert!(graph.lone_pairs().is_empty());
        assert_eq!(graph.single_electrons(), &[SingleElectron(n)]);
    }

    #[test]
    fn pseudo_atom_has_no_element() {
        let atom = Atom::pseudo("R1", 1);
        assert!(atom.is_pseudo());
        assert_eq!(atom.element(), None);
    }
}
