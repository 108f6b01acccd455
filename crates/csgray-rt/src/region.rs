//! Regions and the boolean trees that define them.

use std::fmt;

use crate::soltab::SolidBit;

/// Binary-operator flag in [`BoolTree::op_code`].
pub const OP_BINARY: u8 = 0x01;
/// Leaf code.
pub const OP_SOLID: u8 = 1 << 1;
/// Union code.
pub const OP_UNION: u8 = (2 << 1) | OP_BINARY;
/// Intersection code.
pub const OP_INTERSECT: u8 = (3 << 1) | OP_BINARY;
/// Subtraction code.
pub const OP_SUBTRACT: u8 = (4 << 1) | OP_BINARY;
/// Exclusive-or code.
pub const OP_XOR: u8 = (5 << 1) | OP_BINARY;

/// Dense index of a region in its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionBit(u32);

impl RegionBit {
    /// Bit for region slot `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Region slot.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Boolean combination of solids.
///
/// Leaves are solid references. A region's tree is owned by the region;
/// solids are shared between trees through their bits.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolTree {
    /// A single solid.
    Solid(SolidBit),
    /// Points in either operand.
    Union(Box<BoolTree>, Box<BoolTree>),
    /// Points in both operands.
    Intersect(Box<BoolTree>, Box<BoolTree>),
    /// Points in the left operand but not the right.
    Subtract(Box<BoolTree>, Box<BoolTree>),
    /// Points in exactly one operand.
    Xor(Box<BoolTree>, Box<BoolTree>),
}

impl BoolTree {
    /// Leaf node.
    pub fn leaf(bit: SolidBit) -> Self {
        BoolTree::Solid(bit)
    }

    /// `a ∪ b`.
    pub fn union(a: BoolTree, b: BoolTree) -> Self {
        BoolTree::Union(Box::new(a), Box::new(b))
    }

    /// `a ∩ b`.
    pub fn intersect(a: BoolTree, b: BoolTree) -> Self {
        BoolTree::Intersect(Box::new(a), Box::new(b))
    }

    /// `a − b`.
    pub fn subtract(a: BoolTree, b: BoolTree) -> Self {
        BoolTree::Subtract(Box::new(a), Box::new(b))
    }

    /// `a ⊕ b`.
    pub fn xor(a: BoolTree, b: BoolTree) -> Self {
        BoolTree::Xor(Box::new(a), Box::new(b))
    }

    /// Classic numeric operator code: leaves are [`OP_SOLID`], binary
    /// operators carry [`OP_BINARY`].
    pub fn op_code(&self) -> u8 {
        match self {
            BoolTree::Solid(_) => OP_SOLID,
            BoolTree::Union(..) => OP_UNION,
            BoolTree::Intersect(..) => OP_INTERSECT,
            BoolTree::Subtract(..) => OP_SUBTRACT,
            BoolTree::Xor(..) => OP_XOR,
        }
    }

    /// Operands of a binary node.
    pub fn children(&self) -> Option<(&BoolTree, &BoolTree)> {
        match self {
            BoolTree::Solid(_) => None,
            BoolTree::Union(a, b)
            | BoolTree::Intersect(a, b)
            | BoolTree::Subtract(a, b)
            | BoolTree::Xor(a, b) => Some((a, b)),
        }
    }

    /// Every leaf, left to right.
    pub fn leaves(&self) -> Vec<SolidBit> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<SolidBit>) {
        match self {
            BoolTree::Solid(bit) => out.push(*bit),
            _ => {
                if let Some((a, b)) = self.children() {
                    a.collect_leaves(out);
                    b.collect_leaves(out);
                }
            }
        }
    }

    /// Infix rendering with leaves named by `name_of`.
    pub fn display_with<'a, F>(&'a self, name_of: F) -> impl fmt::Display + 'a
    where
        F: Fn(SolidBit) -> String + 'a,
    {
        TreeDisplay {
            tree: self,
            name_of: Box::new(name_of),
        }
    }
}

struct TreeDisplay<'a> {
    tree: &'a BoolTree,
    name_of: Box<dyn Fn(SolidBit) -> String + 'a>,
}

impl TreeDisplay<'_> {
    fn write(&self, tree: &BoolTree, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match tree {
            BoolTree::Solid(bit) => return f.write_str(&(self.name_of)(*bit)),
            BoolTree::Union(..) => "u",
            BoolTree::Intersect(..) => "+",
            BoolTree::Subtract(..) => "-",
            BoolTree::Xor(..) => "^",
        };
        if let Some((a, b)) = tree.children() {
            f.write_str("(")?;
            self.write(a, f)?;
            write!(f, " {sym} ")?;
            self.write(b, f)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(self.tree, f)
    }
}

/// Shading attributes carried through to applications untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialInfo {
    /// RGB color, if one was assigned.
    pub color: Option<[u8; 3]>,
    /// Shader or material name.
    pub name: String,
    /// Shader parameter string.
    pub params: String,
    /// Lower combinations inherit this material.
    pub inherit: bool,
}

/// A named volume with uniform material, defined by a boolean tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Region name.
    pub name: String,
    /// Defining tree.
    pub tree: BoolTree,
    /// Region identifier code.
    pub id: i32,
    /// Nonzero for air and other non-solid regions.
    pub aircode: i32,
    /// Material code.
    pub gift_material: i32,
    /// Line-of-sight equivalence percentage.
    pub los: i32,
    /// Shading attributes.
    pub material: MaterialInfo,
    /// Instance number for regions referenced more than once.
    pub instnum: u32,
    pub(crate) bit: RegionBit,
}

impl Region {
    /// Region with default attributes.
    pub fn new(name: impl Into<String>, tree: BoolTree) -> Self {
        Self {
            name: name.into(),
            tree,
            id: 0,
            aircode: 0,
            gift_material: 0,
            los: 100,
            material: MaterialInfo::default(),
            instnum: 0,
            bit: RegionBit::from_index(0),
        }
    }

    /// Set the region identifier.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    /// Set the air code.
    pub fn with_aircode(mut self, aircode: i32) -> Self {
        self.aircode = aircode;
        self
    }

    /// Set the shading attributes.
    pub fn with_material(mut self, material: MaterialInfo) -> Self {
        self.material = material;
        self
    }

    /// Index of this region. Meaningful once added to a model.
    pub fn bit(&self) -> RegionBit {
        self.bit
    }

    /// True for air regions.
    pub fn is_air(&self) -> bool {
        self.aircode != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(i: usize) -> BoolTree {
        BoolTree::leaf(SolidBit::from_index(i))
    }

    #[test]
    fn test_op_codes() {
        assert_eq!(s(0).op_code(), 2);
        assert_eq!(BoolTree::union(s(0), s(1)).op_code(), 5);
        assert_eq!(BoolTree::intersect(s(0), s(1)).op_code(), 7);
        assert_eq!(BoolTree::subtract(s(0), s(1)).op_code(), 9);
        assert_eq!(BoolTree::xor(s(0), s(1)).op_code() & OP_BINARY, OP_BINARY);
    }

    #[test]
    fn test_leaves_in_order() {
        let tree = BoolTree::subtract(BoolTree::union(s(2), s(0)), s(1));
        let leaves: Vec<_> = tree.leaves().iter().map(|b| b.index()).collect();
        assert_eq!(leaves, vec![2, 0, 1]);
    }

    #[test]
    fn test_display() {
        let names = ["box", "hole", "rod"];
        let tree = BoolTree::union(BoolTree::subtract(s(0), s(1)), s(2));
        let text = tree.display_with(|b| names[b.index()].to_string()).to_string();
        assert_eq!(text, "((box - hole) u rod)");
    }
}
