// This module defines the register operand model for the rop-level IR. RegisterSpec is
// an immutable (register index, category) pair where the category says how many physical
// register slots the value occupies: one slot for 32-bit and reference values, two slots
// for 64-bit values. RegisterSpecList is an immutable ordered sequence of specs used as
// an instruction's source operand list. Both support derivation operations that return
// new instances (offsetting every index by a constant during renumbering, dropping the
// first or last operand during literal folding) so instruction transforms never mutate
// shared state. Display renders the conventional v-prefixed register names used in
// disassembly output.

//! Register operands for the rop-level IR.

use super::cst::Constant;
use std::fmt;

/// Number of physical register slots a value occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// 32-bit or reference value, one slot.
    Word = 1,
    /// 64-bit value, two adjacent slots.
    Wide = 2,
}

impl Category {
    /// Slot count for this category.
    pub fn width(self) -> u32 {
        self as u32
    }
}

/// An immutable (register index, category) pair, optionally tagged with the
/// constant the register is statically known to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterSpec {
    reg: u32,
    category: Category,
    known_const: Option<Constant>,
}

impl RegisterSpec {
    /// Create a new spec.
    pub fn new(reg: u32, category: Category) -> Self {
        Self {
            reg,
            category,
            known_const: None,
        }
    }

    /// Create a spec for a register statically known to hold `value`. The
    /// category follows the value's width.
    pub fn new_constant(reg: u32, value: Constant) -> Self {
        Self {
            reg,
            category: value.category(),
            known_const: Some(value),
        }
    }

    /// The constant this register is known to hold, if any.
    pub fn known_const(&self) -> Option<Constant> {
        self.known_const
    }

    /// The register index.
    pub fn reg(&self) -> u32 {
        self.reg
    }

    /// The category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Index of the first register past this spec's slots.
    pub fn next_reg(&self) -> u32 {
        self.reg + self.category.width()
    }

    /// New spec with the register index shifted by `delta`.
    ///
    /// Panics if the shifted index would be negative; register renumbering
    /// never produces a negative index on well-formed input.
    pub fn with_offset(&self, delta: i32) -> Self {
        let shifted = self.reg as i64 + delta as i64;
        assert!(shifted >= 0, "register offset underflow: v{} + {}", self.reg, delta);
        Self {
            reg: shifted as u32,
            ..*self
        }
    }

    /// New spec with the register index replaced outright.
    pub fn with_reg(&self, reg: u32) -> Self {
        Self { reg, ..*self }
    }
}

impl fmt::Display for RegisterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.reg)
    }
}

/// Immutable ordered sequence of register specs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterSpecList {
    specs: Vec<RegisterSpec>,
}

impl RegisterSpecList {
    /// The empty list.
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    /// Single-element list.
    pub fn make1(spec: RegisterSpec) -> Self {
        Self { specs: vec![spec] }
    }

    /// Two-element list.
    pub fn make2(spec0: RegisterSpec, spec1: RegisterSpec) -> Self {
        Self {
            specs: vec![spec0, spec1],
        }
    }

    /// Number of operands.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The spec at `index`. Panics when out of range.
    pub fn get(&self, index: usize) -> RegisterSpec {
        self.specs[index]
    }

    /// Iterator over the specs.
    pub fn iter(&self) -> impl Iterator<Item = &RegisterSpec> {
        self.specs.iter()
    }

    /// New list without the first operand.
    pub fn without_first(&self) -> Self {
        Self {
            specs: self.specs[1..].to_vec(),
        }
    }

    /// New list without the last operand.
    pub fn without_last(&self) -> Self {
        Self {
            specs: self.specs[..self.specs.len() - 1].to_vec(),
        }
    }

    /// New list with every register index shifted by `delta`.
    pub fn with_offset(&self, delta: i32) -> Self {
        Self {
            specs: self.specs.iter().map(|s| s.with_offset(delta)).collect(),
        }
    }
}

impl From<Vec<RegisterSpec>> for RegisterSpecList {
    fn from(specs: Vec<RegisterSpec>) -> Self {
        Self { specs }
    }
}

impl fmt::Display for RegisterSpecList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{spec}")?;
        }
        write!(f, "}}")
    }
}
