// This module resolves symbolic block addresses to concrete code-unit offsets. A
// CodeAddress is a placeholder anchored to a source position and bound at most once to
// an offset; BlockAddresses holds three of them per basic-block label: the start
// (before the first instruction), the last (at the final instruction), and the end
// (just past the final instruction). The tables are built once from the rop-level
// method, then fixed by assign_addresses, which walks the lowered instruction stream
// in layout order summing instruction sizes, stamps every instruction with its own
// address, and resolves each branch's target address from the start address of its
// target block. After that pass the tables and the returned stream are read-only.

//! Symbolic block addresses and the layout pass that fixes them.

use super::insn::DalvInsn;
use crate::rop::insn::SourcePosition;
use crate::rop::method::{BasicBlock, RopMethod};

/// A symbolic position marker, resolved at most once to a code-unit offset.
#[derive(Debug, Clone)]
pub struct CodeAddress {
    position: SourcePosition,
    address: Option<u32>,
}

impl CodeAddress {
    /// Unresolved address anchored at `position`.
    pub fn new(position: SourcePosition) -> Self {
        Self {
            position,
            address: None,
        }
    }

    /// The anchoring source position.
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// Whether the address has been resolved.
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// The resolved code-unit offset. Panics while unresolved.
    pub fn address(&self) -> u32 {
        self.address.expect("address not yet known")
    }

    /// Resolve the address. Panics when already resolved; an address is
    /// fixed exactly once per layout.
    pub fn set_address(&mut self, address: u32) {
        assert!(self.address.is_none(), "address already set");
        self.address = Some(address);
    }
}

/// The start, last-instruction, and end addresses of every basic block,
/// indexed by label.
#[derive(Debug, Clone)]
pub struct BlockAddresses {
    starts: Vec<Option<CodeAddress>>,
    lasts: Vec<Option<CodeAddress>>,
    ends: Vec<Option<CodeAddress>>,
}

impl BlockAddresses {
    /// Build the address tables for a method: the start address anchored at
    /// each block's first instruction, last and end both anchored at its
    /// final instruction.
    pub fn new(method: &RopMethod) -> Self {
        let max_label = method.blocks().max_label() as usize;
        let mut this = Self {
            starts: vec![None; max_label],
            lasts: vec![None; max_label],
            ends: vec![None; max_label],
        };

        for block in method.blocks().iter() {
            let label = block.label() as usize;
            let last_pos = block.last_insn().position();

            this.starts[label] = Some(CodeAddress::new(block.first_insn().position()));
            this.lasts[label] = Some(CodeAddress::new(last_pos));
            this.ends[label] = Some(CodeAddress::new(last_pos));
        }

        this
    }

    /// Start address of the block with `label`.
    pub fn start(&self, label: u32) -> &CodeAddress {
        Self::pick(&self.starts, label)
    }

    /// Last-instruction address of the block with `label`.
    pub fn last(&self, label: u32) -> &CodeAddress {
        Self::pick(&self.lasts, label)
    }

    /// End address (just past the final instruction) of the block with
    /// `label`.
    pub fn end(&self, label: u32) -> &CodeAddress {
        Self::pick(&self.ends, label)
    }

    /// Start address of `block`.
    pub fn start_of(&self, block: &BasicBlock) -> &CodeAddress {
        self.start(block.label())
    }

    /// Last-instruction address of `block`.
    pub fn last_of(&self, block: &BasicBlock) -> &CodeAddress {
        self.last(block.label())
    }

    /// End address of `block`.
    pub fn end_of(&self, block: &BasicBlock) -> &CodeAddress {
        self.end(block.label())
    }

    fn pick(table: &[Option<CodeAddress>], label: u32) -> &CodeAddress {
        table
            .get(label as usize)
            .and_then(|a| a.as_ref())
            .unwrap_or_else(|| panic!("no block with label {label}"))
    }
}

/// Fix every address to a concrete code-unit offset.
///
/// `layout` is the lowered instruction stream, one `(label, instructions)`
/// entry per basic block in layout order. The pass stamps each instruction
/// with its own address, binds the three block addresses, resolves every
/// branch's target address from its target block's start, and returns the
/// finalized stream.
pub fn assign_addresses(
    layout: Vec<(u32, Vec<DalvInsn>)>,
    addresses: &mut BlockAddresses,
) -> Vec<DalvInsn> {
    let mut cursor: u32 = 0;
    let mut placed = Vec::new();

    for (label, insns) in layout {
        addresses.starts[label as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("no block with label {label}"))
            .set_address(cursor);

        let mut last_address = cursor;
        for insn in insns {
            last_address = cursor;
            let insn = insn.with_address(cursor);
            cursor += insn.code_size() as u32;
            placed.push(insn);
        }

        addresses.lasts[label as usize]
            .as_mut()
            .unwrap()
            .set_address(last_address);
        addresses.ends[label as usize]
            .as_mut()
            .unwrap()
            .set_address(cursor);

        log::debug!(
            "block {label} at {:04x}..{cursor:04x}",
            addresses.start(label).address()
        );
    }

    placed
        .into_iter()
        .map(|insn| {
            if insn.is_target() {
                let target = addresses.start(insn.target_label()).address();
                insn.with_target_address(target)
            } else {
                insn
            }
        })
        .collect()
}
