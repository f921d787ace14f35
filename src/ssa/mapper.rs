// This module defines the register mapping produced by allocation and applied by the
// rewrite pass. A BasicRegisterMapper is built incrementally, one old-register mapping
// at a time, while tracking the running physical register count as the maximum of
// new-register-plus-width over all mappings; once allocation finishes it is read-only.
// The RegisterMapper trait carries the read side with default implementations for
// mapping a single spec, an operand list, and a whole instruction, so instruction
// rewriting is uniform over mapper implementations.

//! Old-register to new-register mappings.

use crate::rop::insn::Insn;
use crate::rop::reg::{Category, RegisterSpec, RegisterSpecList};

/// Read side of a finalized register mapping.
pub trait RegisterMapper {
    /// Number of physical registers the mapping uses.
    fn new_register_count(&self) -> u32;

    /// The new register assigned to `old`. Panics when `old` was never
    /// mapped; allocation maps every register before the mapper is read.
    fn old_to_new(&self, old: u32) -> u32;

    /// Map one register spec.
    fn map(&self, spec: &RegisterSpec) -> RegisterSpec {
        spec.with_reg(self.old_to_new(spec.reg()))
    }

    /// Map an operand list.
    fn map_list(&self, list: &RegisterSpecList) -> RegisterSpecList {
        list.iter().map(|s| self.map(s)).collect::<Vec<_>>().into()
    }

    /// Rewrite an instruction's result and sources through the mapping.
    fn map_insn(&self, insn: &Insn) -> Insn {
        insn.with_new_registers(
            insn.result().map(|r| self.map(&r)),
            self.map_list(insn.sources()),
        )
    }
}

/// Incrementally built register mapping.
#[derive(Debug, Clone)]
pub struct BasicRegisterMapper {
    /// Indexed by old register.
    old_to_new: Vec<Option<u32>>,
    new_register_count: u32,
}

impl BasicRegisterMapper {
    /// Create a mapper for `old_reg_count` registers, all unmapped.
    pub fn new(old_reg_count: u32) -> Self {
        Self {
            old_to_new: vec![None; old_reg_count as usize],
            new_register_count: 0,
        }
    }

    /// Add (or update) the mapping for one old register, widening the
    /// running physical register count as needed.
    pub fn add_mapping(&mut self, old: u32, new: u32, category: Category) {
        assert!(
            (old as usize) < self.old_to_new.len(),
            "register v{old} out of range"
        );
        self.old_to_new[old as usize] = Some(new);
        self.new_register_count = self.new_register_count.max(new + category.width());
    }

    /// Whether `old` has a mapping yet.
    pub fn is_mapped(&self, old: u32) -> bool {
        matches!(self.old_to_new.get(old as usize), Some(Some(_)))
    }
}

impl RegisterMapper for BasicRegisterMapper {
    fn new_register_count(&self) -> u32 {
        self.new_register_count
    }

    fn old_to_new(&self, old: u32) -> u32 {
        self.old_to_new
            .get(old as usize)
            .copied()
            .flatten()
            .unwrap_or_else(|| panic!("no mapping for v{old}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rop::insn::SourcePosition;
    use crate::rop::rop::rops;

    #[test]
    fn test_mapping_and_count() {
        let mut mapper = BasicRegisterMapper::new(4);
        mapper.add_mapping(0, 0, Category::Word);
        mapper.add_mapping(1, 1, Category::Wide);
        mapper.add_mapping(2, 1, Category::Wide);
        mapper.add_mapping(3, 3, Category::Word);

        assert_eq!(mapper.old_to_new(1), 1);
        assert_eq!(mapper.old_to_new(2), 1);
        assert_eq!(mapper.new_register_count(), 4);
        assert!(mapper.is_mapped(3));
        assert!(!BasicRegisterMapper::new(1).is_mapped(0));
    }

    #[test]
    #[should_panic(expected = "no mapping for v2")]
    fn test_unmapped_read_panics() {
        let mut mapper = BasicRegisterMapper::new(3);
        mapper.add_mapping(0, 0, Category::Word);
        mapper.old_to_new(2);
    }

    #[test]
    fn test_map_insn() {
        let mut mapper = BasicRegisterMapper::new(3);
        mapper.add_mapping(0, 5, Category::Word);
        mapper.add_mapping(1, 6, Category::Word);
        mapper.add_mapping(2, 0, Category::Word);

        let insn = Insn::plain(
            &rops::ADD,
            SourcePosition::UNKNOWN,
            Some(RegisterSpec::new(0, Category::Word)),
            RegisterSpecList::make2(
                RegisterSpec::new(1, Category::Word),
                RegisterSpec::new(2, Category::Word),
            ),
        );
        let mapped = mapper.map_insn(&insn);
        assert_eq!(mapped.result().unwrap().reg(), 5);
        assert_eq!(mapped.sources().get(0).reg(), 6);
        assert_eq!(mapped.sources().get(1).reg(), 0);
    }
}
