// This module defines the target-level instruction records handed to the format
// catalog. A DalvInsn carries its opcode, the source position it came from, its final
// (post-allocation) register list, its own resolved address in 16-bit code units once
// layout has run, and a payload distinguishing simple instructions from
// constant-bearing and branch-target-bearing ones. Branch targets are block labels;
// the address-assignment pass installs the resolved target address, after which
// target_offset yields the signed code-unit distance the branch formats encode. Like
// the rop layer, every transform returns a new record.

//! Target instructions.

use super::dop::Dop;
use crate::rop::cst::Constant;
use crate::rop::insn::SourcePosition;
use crate::rop::reg::RegisterSpecList;
use std::fmt;

/// Variant-specific target-instruction data.
#[derive(Debug, Clone, PartialEq)]
pub enum DalvPayload {
    /// No embedded data.
    Simple,
    /// Embedded literal constant.
    Cst(Constant),
    /// Branch target: the block label, and its address once resolved.
    Target { label: u32, address: Option<u32> },
}

/// One target-level instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct DalvInsn {
    opcode: &'static Dop,
    position: SourcePosition,
    registers: RegisterSpecList,
    /// Own address in 16-bit code units, once layout has run.
    address: Option<u32>,
    payload: DalvPayload,
}

impl DalvInsn {
    /// Construct a simple instruction.
    pub fn simple(
        opcode: &'static Dop,
        position: SourcePosition,
        registers: RegisterSpecList,
    ) -> Self {
        Self {
            opcode,
            position,
            registers,
            address: None,
            payload: DalvPayload::Simple,
        }
    }

    /// Construct a constant-bearing instruction.
    pub fn cst(
        opcode: &'static Dop,
        position: SourcePosition,
        registers: RegisterSpecList,
        constant: Constant,
    ) -> Self {
        Self {
            opcode,
            position,
            registers,
            address: None,
            payload: DalvPayload::Cst(constant),
        }
    }

    /// Construct a branch instruction targeting the block with `label`.
    pub fn target(
        opcode: &'static Dop,
        position: SourcePosition,
        registers: RegisterSpecList,
        label: u32,
    ) -> Self {
        Self {
            opcode,
            position,
            registers,
            address: None,
            payload: DalvPayload::Target {
                label,
                address: None,
            },
        }
    }

    /// The opcode descriptor.
    pub fn opcode(&self) -> &'static Dop {
        self.opcode
    }

    /// The source position.
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// The register operand list.
    pub fn registers(&self) -> &RegisterSpecList {
        &self.registers
    }

    /// The variant-specific payload.
    pub fn payload(&self) -> &DalvPayload {
        &self.payload
    }

    /// The embedded constant, when this is a constant-bearing instruction.
    pub fn constant(&self) -> Option<Constant> {
        match &self.payload {
            DalvPayload::Cst(cst) => Some(*cst),
            _ => None,
        }
    }

    /// Whether this is a branch-target-bearing instruction.
    pub fn is_target(&self) -> bool {
        matches!(self.payload, DalvPayload::Target { .. })
    }

    /// The target block label. Panics on non-target instructions.
    pub fn target_label(&self) -> u32 {
        match &self.payload {
            DalvPayload::Target { label, .. } => *label,
            _ => panic!("not a branch: {self}"),
        }
    }

    /// Code units this instruction occupies, fixed by its opcode's format.
    pub fn code_size(&self) -> usize {
        self.opcode.format().code_size()
    }

    /// Whether layout has fixed this instruction's own address.
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// The resolved own address. Panics before layout.
    pub fn address(&self) -> u32 {
        self.address.expect("address not yet known")
    }

    /// New instruction with its own address fixed.
    pub fn with_address(&self, address: u32) -> Self {
        Self {
            address: Some(address),
            ..self.clone()
        }
    }

    /// New instruction carrying a different opcode for the same operation.
    /// Used when format selection widens along the opcode chain.
    pub fn with_opcode(&self, opcode: &'static Dop) -> Self {
        Self {
            opcode,
            ..self.clone()
        }
    }

    /// New instruction with the branch-target address resolved. Panics on
    /// non-target instructions.
    pub fn with_target_address(&self, target_address: u32) -> Self {
        match &self.payload {
            DalvPayload::Target { label, .. } => Self {
                payload: DalvPayload::Target {
                    label: *label,
                    address: Some(target_address),
                },
                ..self.clone()
            },
            _ => panic!("not a branch: {self}"),
        }
    }

    /// New instruction with the branch-target address dropped again. Used to
    /// tell an offset-induced format mismatch from a shape mismatch.
    pub(crate) fn with_target_cleared(&self) -> Self {
        match &self.payload {
            DalvPayload::Target { label, .. } => Self {
                payload: DalvPayload::Target {
                    label: *label,
                    address: None,
                },
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// Whether both this instruction's address and its target's address are
    /// resolved, so the branch offset is known.
    pub fn has_target_offset(&self) -> bool {
        match &self.payload {
            DalvPayload::Target { address, .. } => {
                address.is_some() && self.address.is_some()
            }
            _ => false,
        }
    }

    /// The resolved branch offset in code units, target minus own address.
    /// Panics while either address is unresolved.
    pub fn target_offset(&self) -> i32 {
        match &self.payload {
            DalvPayload::Target { address, .. } => {
                let target = address.expect("target address not yet known");
                target as i32 - self.address() as i32
            }
            _ => panic!("not a branch: {self}"),
        }
    }
}

impl fmt::Display for DalvInsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.opcode.name(), self.registers)?;
        match &self.payload {
            DalvPayload::Cst(cst) => write!(f, ", {cst}")?,
            DalvPayload::Target { label, .. } => write!(f, ", :{label}")?,
            DalvPayload::Simple => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::dop::dops;
    use crate::rop::reg::{Category, RegisterSpec};

    fn if_eqz(reg: u32, label: u32) -> DalvInsn {
        DalvInsn::target(
            &dops::IF_EQZ,
            SourcePosition::UNKNOWN,
            RegisterSpecList::make1(RegisterSpec::new(reg, Category::Word)),
            label,
        )
    }

    #[test]
    fn test_target_offset_resolution() {
        let insn = if_eqz(0, 7);
        assert!(insn.is_target());
        assert_eq!(insn.target_label(), 7);
        assert!(!insn.has_target_offset());

        let placed = insn.with_address(10).with_target_address(4);
        assert!(placed.has_target_offset());
        assert_eq!(placed.target_offset(), -6);

        let cleared = placed.with_target_cleared();
        assert!(!cleared.has_target_offset());
        assert_eq!(cleared.address(), 10);
    }

    #[test]
    #[should_panic(expected = "address not yet known")]
    fn test_unresolved_address_panics() {
        if_eqz(0, 1).address();
    }

    #[test]
    fn test_code_size() {
        assert_eq!(if_eqz(0, 1).code_size(), 2);
        let nop = DalvInsn::simple(
            &dops::NOP,
            SourcePosition::UNKNOWN,
            RegisterSpecList::empty(),
        );
        assert_eq!(nop.code_size(), 1);
    }
}
