//! Core types and enumerations for chemical elements and bonding.
//!
//! This module defines the fundamental value types used throughout the
//! glycosector library: chemical elements, bond orders, and the wedge/hash
//! stereo vocabulary. These building blocks underpin the molecular graph
//! model in [`graph`], the sugar detector, the extractor, and the splitter.

use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod graph;

/// A chemical element, identified by its standard atomic number.
///
/// Pseudo ("wildcard") atoms used to mark cleaved attachment points are not
/// elements and are represented separately by [`graph::AtomKind::Pseudo`];
/// this enum only covers real elements likely to appear in carbohydrate and
/// aglycone structures, plus common counter-ions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    /// Hydrogen (atomic number 1)
    H = 1,
    /// Helium (atomic number 2)
    He,
    /// Lithium (atomic number 3)
    Li = 3,
    /// Beryllium (atomic number 4)
    Be,
    /// Boron (atomic number 5)
    B,
    /// Carbon (atomic number 6)
    C,
    /// Nitrogen (atomic number 7)
    N,
    /// Oxygen (atomic number 8)
    O,
    /// Fluorine (atomic number 9)
    F,
    /// Neon (atomic number 10)
    Ne,
    /// Sodium (atomic number 11)
    Na,
    /// Magnesium (atomic number 12)
    Mg,
    /// Aluminium (atomic number 13)
    Al,
    /// Silicon (atomic number 14)
    Si,
    /// Phosphorus (atomic number 15)
    P,
    /// Sulfur (atomic number 16)
    S,
    /// Chlorine (atomic number 17)
    Cl,
    /// Argon (atomic number 18)
    Ar,
    /// Potassium (atomic number 19)
    K,
    /// Calcium (atomic number 20)
    Ca,
    /// Iron (atomic number 26)
    Fe = 26,
    /// Zinc (atomic number 30)
    Zn = 30,
    /// Arsenic (atomic number 33)
    As = 33,
    /// Selenium (atomic number 34)
    Se,
    /// Bromine (atomic number 35)
    Br,
    /// Iodine (atomic number 53)
    I = 53,
}

/// Error type for failed element symbol parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseElementError {
    /// The invalid string that could not be parsed.
    invalid_string: String,
}

impl fmt::Display for ParseElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid element symbol: '{}'", self.invalid_string)
    }
}
impl std::error::Error for ParseElementError {}

impl FromStr for Element {
    type Err = ParseElementError;

    /// Parses a chemical element from its standard symbol string.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use glycosector::Element;
    ///
    /// let carbon = Element::from_str("C").unwrap();
    /// assert_eq!(carbon, Element::C);
    ///
    /// let sodium = Element::from_str("Na").unwrap();
    /// assert_eq!(sodium, Element::Na);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "H" => Ok(Element::H),
            "He" => Ok(Element::He),
            "Li" => Ok(Element::Li),
            "Be" => Ok(Element::Be),
            "B" => Ok(Element::B),
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            "F" => Ok(Element::F),
            "Ne" => Ok(Element::Ne),
            "Na" => Ok(Element::Na),
            "Mg" => Ok(Element::Mg),
            "Al" => Ok(Element::Al),
            "Si" => Ok(Element::Si),
            "P" => Ok(Element::P),
            "S" => Ok(Element::S),
            "Cl" => Ok(Element::Cl),
            "Ar" => Ok(Element::Ar),
            "K" => Ok(Element::K),
            "Ca" => Ok(Element::Ca),
            "Fe" => Ok(Element::Fe),
            "Zn" => Ok(Element::Zn),
            "As" => Ok(Element::As),
            "Se" => Ok(Element::Se),
            "Br" => Ok(Element::Br),
            "I" => Ok(Element::I),
            _ => Err(ParseElementError {
                invalid_string: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Element {
    /// Displays the element as its standard chemical symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::Element;
    ///
    /// assert_eq!(format!("{}", Element::C), "C");
    /// assert_eq!(format!("{}", Element::Na), "Na");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Element::H => "H",
            Element::He => "He",
            Element::Li => "Li",
            Element::Be => "Be",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ar => "Ar",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Fe => "Fe",
            Element::Zn => "Zn",
            Element::As => "As",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::I => "I",
        };
        write!(f, "{}", symbol)
    }
}

/// The order of a chemical bond, including the explicit `Unset` sentinel used
/// before any perception step has assigned a definite order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BondOrder {
    /// No definite order has been assigned yet.
    Unset = 0,
    /// Single bond (order 1).
    Single = 1,
    /// Double bond (order 2).
    Double = 2,
    /// Triple bond (order 3).
    Triple = 3,
    /// Quadruple bond (order 4); present for completeness, not expected in
    /// carbohydrate or aglycone structures.
    Quadruple = 4,
}

impl BondOrder {
    /// The integer weight used for valence and saturation accounting.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycosector::BondOrder;
    ///
    /// assert_eq!(BondOrder::Double.weight(), 2);
    /// assert_eq!(BondOrder::Unset.weight(), 0);
    /// ```
    pub fn weight(self) -> u8 {
        self as u8
    }
}

/// Error type for failed bond order parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBondOrderError {
    invalid_string: String,
}

impl fmt::Display for ParseBondOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid bond order string: '{}'", self.invalid_string)
    }
}
impl std::error::Error for ParseBondOrderError {}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unset" => Ok(BondOrder::Unset),
            "Single" => Ok(BondOrder::Single),
            "Double" => Ok(BondOrder::Double),
            "Triple" => Ok(BondOrder::Triple),
            "Quadruple" => Ok(BondOrder::Quadruple),
            _ => Err(ParseBondOrderError {
                invalid_string: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BondOrder::Unset => "Unset",
            BondOrder::Single => "Single",
            BondOrder::Double => "Double",
            BondOrder::Triple => "Triple",
            BondOrder::Quadruple => "Quadruple",
        };
        write!(f, "{}", s)
    }
}

/// Wedge/hash stereo annotation carried by a bond for rendering purposes,
/// independent of any [`graph::StereoElement`] that references the bond as a
/// carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    /// No stereo annotation.
    #[default]
    None,
    /// Wedge pointing up, out of the plane.
    Up,
    /// Hash pointing down, behind the plane.
    Down,
    /// Either orientation is acceptable; the stereocenter is undefined.
    Either,
}

/// How a bond should be rendered, independent of its chemical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDisplay {
    /// Ordinary solid line.
    #[default]
    Solid,
    /// Crossed double bond, meaning the double bond geometry is unknown.
    Crossed,
    /// Bold wedge.
    Wedge,
    /// Hashed wedge.
    Hash,
}

/// The stereo configuration carried by a [`graph::StereoElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoConfiguration {
    /// Tetrahedral center, clockwise carrier order.
    TetrahedralClockwise,
    /// Tetrahedral center, counter-clockwise carrier order.
    TetrahedralCounterClockwise,
    /// Double bond, cis arrangement of the two reference carriers.
    DoubleBondCis,
    /// Double bond, trans arrangement of the two reference carriers.
    DoubleBondTrans,
    /// Geometry is deliberately left unspecified.
    Either,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_round_trips_through_display_and_from_str() {
        for element in [Element::C, Element::O, Element::N, Element::Na] {
            let symbol = element.to_string();
            assert_eq!(Element::from_str(&symbol).unwrap(), element);
        }
    }

    #[test]
    fn element_from_str_rejects_unknown_symbol() {
        assert!(Element::from_str("Xx").is_err());
    }

    #[test]
    fn bond_order_weight_matches_discriminant() {
        assert_eq!(BondOrder::Single.weight(), 1);
        assert_eq!(BondOrder::Triple.weight(), 3);
        assert_eq!(BondOrder::Quadruple.weight(), 4);
        assert_eq!(BondOrder::Unset.weight(), 0);
    }

    #[test]
    fn bond_order_round_trips_through_display_and_from_str() {
        for order in [
            BondOrder::Unset,
            BondOrder::Single,
            BondOrder::Double,
            BondOrder::Triple,
            BondOrder::Quadruple,
        ] {
            let s = order.to_string();
            assert_eq!(BondOrder::from_str(&s).unwrap(), order);
        }
    }
}
