// This module implements register allocation over an SSA method body. The
// FirstFitAllocator walks virtual registers in index order and greedily packs
// non-interfering later registers into the same physical slot, growing an accumulated
// interference set with every coalescing decision so that anything overlapping any
// member of the slot is kept out of it. Method parameters are preslotted: their
// physical slots are fixed by calling-convention position at the bottom of the frame,
// and a parameter slot is never widened past the original parameter width by a
// coalesced register. The packing is first-fit and O(n^2), not optimal; correctness
// only requires that no two simultaneously-live registers share a slot.

//! First-fit register allocation.

use super::interference::{BitIntSet, InterferenceGraph};
use super::mapper::BasicRegisterMapper;
use super::method::SsaMethod;

/// If true, the allocator places parameters at the bottom of the frame in
/// calling-convention order.
const PRESLOT_PARAMS: bool = true;

/// A register allocation strategy over one SSA method.
pub trait RegisterAllocator {
    /// Whether the final frame layout expects parameters in their
    /// calling-convention slots.
    fn wants_params_moved_high(&self) -> bool;

    /// Produce the old-to-new register mapping.
    fn allocate_registers(&mut self) -> BasicRegisterMapper;
}

/// Naive n^2 first-fit allocator. Does not try to co-locate local variables
/// or deal intelligently with different size register uses.
pub struct FirstFitAllocator<'a> {
    method: &'a SsaMethod,
    interference: &'a InterferenceGraph,
    /// Indexed by old register; the registers already mapped.
    mapped: BitIntSet,
}

impl<'a> FirstFitAllocator<'a> {
    /// Create an allocator for one method.
    pub fn new(method: &'a SsaMethod, interference: &'a InterferenceGraph) -> Self {
        Self {
            method,
            interference,
            mapped: BitIntSet::new(method.reg_count() as usize),
        }
    }
}

impl RegisterAllocator for FirstFitAllocator<'_> {
    fn wants_params_moved_high(&self) -> bool {
        PRESLOT_PARAMS
    }

    fn allocate_registers(&mut self) -> BasicRegisterMapper {
        let old_reg_count = self.method.reg_count();
        let mut mapper = BasicRegisterMapper::new(old_reg_count);

        let mut next_new_register = 0;

        if PRESLOT_PARAMS {
            // Reserve space for the params at the bottom of the register
            // space.
            next_new_register = self.method.param_width();
        }

        for i in 0..old_reg_count {
            if self.mapped.has(i as usize) {
                // we already got this one
                continue;
            }

            let mut max_category = self.method.category_for_reg(i);
            let mut current = BitIntSet::new(old_reg_count as usize);

            self.interference.merge_interference_set(i as usize, &mut current);

            let mut is_preslotted = false;
            let new_reg;

            if PRESLOT_PARAMS && self.method.is_definition_move_param(i) {
                new_reg = self.method.param_number_from_move_param(i);
                mapper.add_mapping(i, new_reg, max_category);
                is_preslotted = true;
                log::trace!("v{i} preslotted to v{new_reg}");
            } else {
                new_reg = next_new_register;
                mapper.add_mapping(i, next_new_register, max_category);
                log::trace!("v{i} mapped to v{new_reg}");
            }

            for j in (i + 1)..old_reg_count {
                if self.mapped.has(j as usize) || self.method.is_definition_move_param(j) {
                    continue;
                }

                /*
                 * Coalesce j into this slot if it doesn't interfere with the
                 * current mapping. A pre-slotted method parameter can't grow
                 * past the original param width.
                 */
                if !current.has(j as usize)
                    && !(is_preslotted && max_category < self.method.category_for_reg(j))
                {
                    self.interference.merge_interference_set(j as usize, &mut current);

                    max_category = max_category.max(self.method.category_for_reg(j));

                    mapper.add_mapping(j, new_reg, max_category);
                    self.mapped.add(j as usize);
                    log::trace!("v{j} coalesced into v{new_reg}");
                }
            }

            self.mapped.add(i as usize);
            if !is_preslotted {
                next_new_register += max_category.width();
            }
        }

        mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rop::cst::Constant;
    use crate::rop::insn::{Insn, SourcePosition};
    use crate::rop::reg::{Category, RegisterSpec, RegisterSpecList};
    use crate::rop::rop::rops;
    use crate::ssa::mapper::RegisterMapper;

    fn move_param(reg: u32, param: i32) -> Insn {
        Insn::plain_cst(
            &rops::MOVE_PARAM,
            SourcePosition::UNKNOWN,
            Some(RegisterSpec::new(reg, Category::Word)),
            RegisterSpecList::empty(),
            Constant::int(param),
        )
    }

    fn const_def(reg: u32, category: Category) -> Insn {
        Insn::plain_cst(
            &rops::CONST,
            SourcePosition::UNKNOWN,
            Some(RegisterSpec::new(reg, category)),
            RegisterSpecList::empty(),
            Constant::int(0),
        )
    }

    /// Two registers never simultaneously live, one of them a parameter:
    /// the parameter keeps its calling-convention slot and the other
    /// register coalesces into it.
    #[test]
    fn test_param_and_disjoint_register() {
        let mut method = SsaMethod::new(2, 1);
        method.add_definition(move_param(0, 0));
        method.add_definition(const_def(1, Category::Word));
        let interference = InterferenceGraph::new(2);

        let mut allocator = FirstFitAllocator::new(&method, &interference);
        assert!(allocator.wants_params_moved_high());
        let mapper = allocator.allocate_registers();

        assert_eq!(mapper.old_to_new(0), 0);
        assert_eq!(mapper.old_to_new(1), 0);
        assert_eq!(mapper.new_register_count(), 1);
    }

    /// Interfering registers end up in disjoint slot ranges.
    #[test]
    fn test_interference_keeps_slots_disjoint() {
        let mut method = SsaMethod::new(3, 0);
        method.add_definition(const_def(0, Category::Word));
        method.add_definition(const_def(1, Category::Word));
        method.add_definition(const_def(2, Category::Word));
        let mut interference = InterferenceGraph::new(3);
        interference.add(0, 1);
        interference.add(1, 2);

        let mapper = FirstFitAllocator::new(&method, &interference).allocate_registers();

        // 0 and 2 never interfere and share a slot; 1 is kept apart.
        assert_eq!(mapper.old_to_new(0), 0);
        assert_eq!(mapper.old_to_new(2), 0);
        assert_eq!(mapper.old_to_new(1), 1);
        assert_eq!(mapper.new_register_count(), 2);
    }

    /// Coalescing accounts for the whole accumulated set, not just the
    /// anchor: j may not interfere with i but still interfere with an
    /// earlier coalesced register.
    #[test]
    fn test_accumulated_interference_blocks_coalescing() {
        let mut method = SsaMethod::new(3, 0);
        for reg in 0..3 {
            method.add_definition(const_def(reg, Category::Word));
        }
        let mut interference = InterferenceGraph::new(3);
        interference.add(1, 2);

        let mapper = FirstFitAllocator::new(&method, &interference).allocate_registers();

        // 1 coalesces with 0; 2 interferes with 1, so it gets its own slot
        // even though it does not interfere with 0 itself.
        assert_eq!(mapper.old_to_new(0), 0);
        assert_eq!(mapper.old_to_new(1), 0);
        assert_eq!(mapper.old_to_new(2), 1);
    }

    /// A coalesced wide register widens a non-parameter slot.
    #[test]
    fn test_category_widening() {
        let mut method = SsaMethod::new(3, 0);
        method.add_definition(const_def(0, Category::Word));
        method.add_definition(const_def(1, Category::Wide));
        method.add_definition(const_def(2, Category::Word));
        let mut interference = InterferenceGraph::new(3);
        interference.add(0, 1);
        interference.add(0, 2);
        interference.add(1, 2);

        let mapper = FirstFitAllocator::new(&method, &interference).allocate_registers();

        assert_eq!(mapper.old_to_new(0), 0);
        assert_eq!(mapper.old_to_new(1), 1);
        // The wide pair occupies v1..v3, so v2 lands at 3.
        assert_eq!(mapper.old_to_new(2), 3);
        assert_eq!(mapper.new_register_count(), 4);
    }

    /// A parameter slot must not be widened by a coalesced wide register.
    #[test]
    fn test_preslotted_param_not_widened() {
        let mut method = SsaMethod::new(2, 1);
        method.add_definition(move_param(0, 0));
        method.add_definition(const_def(1, Category::Wide));
        let interference = InterferenceGraph::new(2);

        let mapper = FirstFitAllocator::new(&method, &interference).allocate_registers();

        assert_eq!(mapper.old_to_new(0), 0);
        // The wide register does not fit the one-slot param; it gets the
        // next free slot past the param area.
        assert_eq!(mapper.old_to_new(1), 1);
        assert_eq!(mapper.new_register_count(), 3);
    }

    /// A parameter-defining register is never coalesced into another slot.
    #[test]
    fn test_param_never_coalesced_as_target() {
        let mut method = SsaMethod::new(3, 1);
        method.add_definition(const_def(0, Category::Word));
        method.add_definition(move_param(1, 0));
        method.add_definition(const_def(2, Category::Word));
        let interference = InterferenceGraph::new(3);

        let mapper = FirstFitAllocator::new(&method, &interference).allocate_registers();

        // v0 lands past the reserved param area; v1 keeps its param slot
        // even though nothing interferes with v0's slot; v2 coalesces.
        assert_eq!(mapper.old_to_new(0), 1);
        assert_eq!(mapper.old_to_new(1), 0);
        assert_eq!(mapper.old_to_new(2), 1);
        assert_eq!(mapper.new_register_count(), 2);
    }

    /// Every register in range receives a mapping.
    #[test]
    fn test_totality() {
        let count = 10;
        let mut method = SsaMethod::new(count, 0);
        for reg in 0..count {
            method.add_definition(const_def(reg, Category::Word));
        }
        let mut interference = InterferenceGraph::new(count as usize);
        for reg in 1..count as usize {
            interference.add(0, reg);
        }

        let mapper = FirstFitAllocator::new(&method, &interference).allocate_registers();
        for reg in 0..count {
            assert!(mapper.is_mapped(reg), "v{reg} unmapped");
        }
        // 0 alone in its slot, 1..9 coalesced together.
        assert_eq!(mapper.new_register_count(), 2);
    }
}
