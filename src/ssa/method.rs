// This module defines the SSA view of a method body that the register allocator
// consumes: the virtual register count, the combined width of the method parameters,
// and the single defining instruction of every register. Definitions are registered
// once; a second definition for the same register violates SSA form and is rejected.
// The parameter queries lean on the move-param convention: a parameter-receiving
// register is defined by a constant-bearing move-param instruction whose literal is the
// parameter's offset within the total parameter width. A definition that does not match
// that shape when the allocator expects a parameter is a defect in the upstream
// instruction-selection stage and panics rather than being handled.

//! SSA method bodies.

use crate::rop::cst::Constant;
use crate::rop::insn::Insn;
use crate::rop::reg::Category;
use crate::rop::rop::RegOp;

/// A method body in SSA form: every register has exactly one definition.
#[derive(Debug, Clone)]
pub struct SsaMethod {
    reg_count: u32,
    param_width: u32,
    /// Indexed by register; the instruction defining it.
    definitions: Vec<Option<Insn>>,
}

impl SsaMethod {
    /// Create a method with no definitions yet.
    pub fn new(reg_count: u32, param_width: u32) -> Self {
        Self {
            reg_count,
            param_width,
            definitions: vec![None; reg_count as usize],
        }
    }

    /// Number of virtual registers.
    pub fn reg_count(&self) -> u32 {
        self.reg_count
    }

    /// Combined width of the method parameters, in register slots.
    pub fn param_width(&self) -> u32 {
        self.param_width
    }

    /// Record the defining instruction of its result register.
    ///
    /// Panics when the instruction has no result, the register is out of
    /// range, or the register is already defined (SSA has one definition per
    /// register).
    pub fn add_definition(&mut self, insn: Insn) {
        let result = insn
            .result()
            .unwrap_or_else(|| panic!("definition without result: {insn}"));
        let reg = result.reg() as usize;
        assert!(
            reg < self.definitions.len(),
            "register v{reg} out of range"
        );
        assert!(
            self.definitions[reg].is_none(),
            "second definition for v{reg}"
        );
        self.definitions[reg] = Some(insn);
    }

    /// The defining instruction of `reg`, if one was recorded.
    pub fn definition_for_reg(&self, reg: u32) -> Option<&Insn> {
        self.definitions
            .get(reg as usize)
            .and_then(|d| d.as_ref())
    }

    /// Slot category of `reg`, read off its definition's result.
    ///
    /// Panics when the register has no definition; the allocator only asks
    /// about registers the upstream stage defined.
    pub fn category_for_reg(&self, reg: u32) -> Category {
        self.definition_for_reg(reg)
            .unwrap_or_else(|| panic!("no definition for v{reg}"))
            .result()
            .unwrap()
            .category()
    }

    /// Whether `reg` is defined by a move-param instruction.
    pub fn is_definition_move_param(&self, reg: u32) -> bool {
        self.definition_for_reg(reg)
            .map(|insn| insn.opcode().op() == RegOp::MoveParam)
            .unwrap_or(false)
    }

    /// The parameter offset a move-param definition refers to.
    ///
    /// Panics when the definition is not a constant-bearing move-param with
    /// an integer literal; that shape is guaranteed by instruction selection
    /// and anything else is a defect there.
    pub fn param_number_from_move_param(&self, reg: u32) -> u32 {
        let insn = self
            .definition_for_reg(reg)
            .unwrap_or_else(|| panic!("no definition for v{reg}"));
        assert!(
            insn.opcode().op() == RegOp::MoveParam,
            "v{reg} is not a move-param definition: {insn}"
        );
        match insn.constant() {
            Some(Constant::Integer(number)) if number >= 0 => number as u32,
            _ => panic!("malformed move-param definition: {insn}"),
        }
    }
}
