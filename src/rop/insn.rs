// This module defines the immutable instruction records of the rop-level IR. An Insn
// carries its operation descriptor, source position, optional result register, and
// source operand list, plus a payload tag distinguishing plain instructions from
// constant-bearing, switch, and throwing ones. Construction enforces the IR invariants:
// switch and throw branchingness require the payload variant that carries the switch
// table or catch list, and a result register is only legal on a non-branching
// instruction (a branch that produces a value must use a trailing move-result-pseudo
// instead). Every transform returns a new record; with_source_literal performs the
// best-effort rewrite of a register-register operation into its literal-carrying
// sibling when one operand is statically known to be constant.

//! Instruction records and their transforms.

use super::cst::Constant;
use super::reg::{RegisterSpec, RegisterSpecList};
use super::rop::{rops, Branchingness, RegOp, Rop};
use std::fmt;

/// Opaque source-position token. Never interpreted by the backend; it only
/// anchors code addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    line: u32,
}

impl SourcePosition {
    /// The position used when no source information is known.
    pub const UNKNOWN: SourcePosition = SourcePosition { line: 0 };

    /// Position for the given source line.
    pub fn at_line(line: u32) -> Self {
        Self { line }
    }

    /// The source line, zero when unknown.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Variant-specific instruction data.
#[derive(Debug, Clone, PartialEq)]
pub enum InsnPayload {
    /// No embedded data.
    Plain,
    /// Embedded literal constant.
    Constant(Constant),
    /// Switch table: case values and the branch-target labels they select.
    Switch { cases: Vec<i32>, targets: Vec<u32> },
    /// Catch list: descriptors of the exception types handled around this
    /// instruction.
    Throwing { catches: Vec<String> },
}

/// One immutable rop-level instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Insn {
    opcode: &'static Rop,
    position: SourcePosition,
    result: Option<RegisterSpec>,
    sources: RegisterSpecList,
    payload: InsnPayload,
}

impl Insn {
    /// Construct a plain instruction.
    ///
    /// Panics when the opcode's branchingness is `Switch` or `Throw` (those
    /// require the dedicated payload variants) or when a result is supplied
    /// together with non-`None` branchingness.
    pub fn plain(
        opcode: &'static Rop,
        position: SourcePosition,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
    ) -> Self {
        Self::make(opcode, position, result, sources, InsnPayload::Plain)
    }

    /// Construct a constant-bearing instruction. Same invariants as
    /// [`Insn::plain`]; the opcode must be a literal-carrying shape.
    pub fn plain_cst(
        opcode: &'static Rop,
        position: SourcePosition,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
        constant: Constant,
    ) -> Self {
        assert!(
            opcode.takes_literal(),
            "{} does not carry a literal",
            opcode.nickname()
        );
        Self::make(
            opcode,
            position,
            result,
            sources,
            InsnPayload::Constant(constant),
        )
    }

    /// Construct a switch instruction carrying its case table.
    pub fn switch(
        opcode: &'static Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        cases: Vec<i32>,
        targets: Vec<u32>,
    ) -> Self {
        assert_eq!(
            opcode.branchingness(),
            Branchingness::Switch,
            "{} is not a switch opcode",
            opcode.nickname()
        );
        assert_eq!(
            cases.len(),
            targets.len(),
            "switch case/target tables differ in length"
        );
        Self {
            opcode,
            position,
            result: None,
            sources,
            payload: InsnPayload::Switch { cases, targets },
        }
    }

    /// Construct a throwing instruction carrying its catch list.
    pub fn throwing(
        opcode: &'static Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        catches: Vec<String>,
    ) -> Self {
        assert_eq!(
            opcode.branchingness(),
            Branchingness::Throw,
            "{} is not a throwing opcode",
            opcode.nickname()
        );
        Self {
            opcode,
            position,
            result: None,
            sources,
            payload: InsnPayload::Throwing { catches },
        }
    }

    fn make(
        opcode: &'static Rop,
        position: SourcePosition,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
        payload: InsnPayload,
    ) -> Self {
        match opcode.branchingness() {
            Branchingness::Switch | Branchingness::Throw => {
                panic!("bogus branchingness for {}", opcode.nickname());
            }
            Branchingness::None => {}
            _ => {
                // move-result-pseudo is required here
                assert!(
                    result.is_none(),
                    "can't mix branchingness with result: {}",
                    opcode.nickname()
                );
            }
        }

        Self {
            opcode,
            position,
            result,
            sources,
            payload,
        }
    }

    /// The operation descriptor.
    pub fn opcode(&self) -> &'static Rop {
        self.opcode
    }

    /// The source position.
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// The result register, if any.
    pub fn result(&self) -> Option<RegisterSpec> {
        self.result
    }

    /// The source operand list.
    pub fn sources(&self) -> &RegisterSpecList {
        &self.sources
    }

    /// The variant-specific payload.
    pub fn payload(&self) -> &InsnPayload {
        &self.payload
    }

    /// The embedded constant, when this is a constant-bearing instruction.
    pub fn constant(&self) -> Option<Constant> {
        match &self.payload {
            InsnPayload::Constant(cst) => Some(*cst),
            _ => None,
        }
    }

    /// New instruction with every register index in result and sources
    /// shifted by `delta`.
    pub fn with_register_offset(&self, delta: i32) -> Self {
        Self {
            result: self.result.map(|r| r.with_offset(delta)),
            sources: self.sources.with_offset(delta),
            payload: self.payload.clone(),
            ..*self
        }
    }

    /// New instruction with result and sources replaced outright. Used to
    /// install the allocator's final register assignment.
    pub fn with_new_registers(
        &self,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
    ) -> Self {
        match &self.payload {
            InsnPayload::Plain | InsnPayload::Constant(_) => Self::make(
                self.opcode,
                self.position,
                result,
                sources,
                self.payload.clone(),
            ),
            _ => {
                assert!(
                    result.is_none(),
                    "can't mix branchingness with result: {}",
                    self.opcode.nickname()
                );
                Self {
                    result: None,
                    sources,
                    payload: self.payload.clone(),
                    ..*self
                }
            }
        }
    }

    /// Best-effort rewrite of a register-register operation into its
    /// literal-carrying sibling when one operand is statically constant.
    ///
    /// A constant last source folds directly; subtraction of an integer
    /// constant is flipped to addition of its negation so the literal-add
    /// shape is reused. When the last source is not constant but the first
    /// of exactly two is, the operands are treated as reversed, which is
    /// only sound for commutative operations. If no literal-carrying shape
    /// exists the instruction is returned unchanged; plain register-register
    /// encodings remain a correct fallback.
    pub fn with_source_literal(&self) -> Self {
        if !matches!(self.payload, InsnPayload::Plain) {
            return self.clone();
        }

        let sz = self.sources.len();
        if sz == 0 {
            return self.clone();
        }

        let last = self.sources.get(sz - 1);
        let Some(cst) = last.known_const() else {
            // Check for a reversed-operand fold, where the first source is
            // the constant one.
            if sz == 2 {
                if let Some(cst) = self.sources.get(0).known_const() {
                    if !self.opcode.op().is_commutative() {
                        return self.clone();
                    }
                    let new_sources = self.sources.without_first();
                    return match rops::rop_for(self.opcode.op(), &new_sources, &cst) {
                        Some(rop) => Self::plain_cst(
                            rop,
                            self.position,
                            self.result,
                            new_sources,
                            cst,
                        ),
                        None => self.clone(),
                    };
                }
            }
            return self.clone();
        };

        let new_sources = self.sources.without_last();

        let mut op = self.opcode.op();
        let mut cst = cst;
        if op == RegOp::Sub {
            if let Constant::Integer(value) = cst {
                // Flip constant subtraction to addition.
                op = RegOp::Add;
                cst = Constant::int(value.wrapping_neg());
            }
        }

        match rops::rop_for(op, &new_sources, &cst) {
            Some(rop) => Self::plain_cst(rop, self.position, self.result, new_sources, cst),
            None => self.clone(),
        }
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.nickname())?;
        if let Some(result) = &self.result {
            write!(f, " {result} <-")?;
        }
        write!(f, " {}", self.sources)?;
        if let InsnPayload::Constant(cst) = &self.payload {
            write!(f, " {cst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rop::reg::Category;

    fn word(reg: u32) -> RegisterSpec {
        RegisterSpec::new(reg, Category::Word)
    }

    fn const_word(reg: u32, value: i32) -> RegisterSpec {
        RegisterSpec::new_constant(reg, Constant::int(value))
    }

    #[test]
    #[should_panic(expected = "bogus branchingness")]
    fn test_plain_rejects_throw() {
        Insn::plain(
            &rops::THROW,
            SourcePosition::UNKNOWN,
            None,
            RegisterSpecList::make1(word(0)),
        );
    }

    #[test]
    #[should_panic(expected = "bogus branchingness")]
    fn test_plain_rejects_switch() {
        Insn::plain(
            &rops::SWITCH,
            SourcePosition::UNKNOWN,
            None,
            RegisterSpecList::make1(word(0)),
        );
    }

    #[test]
    #[should_panic(expected = "can't mix branchingness with result")]
    fn test_plain_rejects_branch_with_result() {
        Insn::plain(
            &rops::GOTO,
            SourcePosition::UNKNOWN,
            Some(word(0)),
            RegisterSpecList::empty(),
        );
    }

    #[test]
    fn test_register_offset() {
        let insn = Insn::plain(
            &rops::ADD,
            SourcePosition::at_line(10),
            Some(word(0)),
            RegisterSpecList::make2(word(1), word(2)),
        );
        let shifted = insn.with_register_offset(4);
        assert_eq!(shifted.result().unwrap().reg(), 4);
        assert_eq!(shifted.sources().get(0).reg(), 5);
        assert_eq!(shifted.sources().get(1).reg(), 6);
        assert_eq!(shifted.position(), SourcePosition::at_line(10));
    }

    #[test]
    fn test_new_registers() {
        let insn = Insn::plain(
            &rops::MOVE,
            SourcePosition::UNKNOWN,
            Some(word(9)),
            RegisterSpecList::make1(word(8)),
        );
        let rewritten =
            insn.with_new_registers(Some(word(0)), RegisterSpecList::make1(word(1)));
        assert_eq!(rewritten.result().unwrap().reg(), 0);
        assert_eq!(rewritten.sources().get(0).reg(), 1);
        assert_eq!(rewritten.opcode(), insn.opcode());
    }

    #[test]
    fn test_literal_fold_noop_without_constants() {
        let insn = Insn::plain(
            &rops::ADD,
            SourcePosition::UNKNOWN,
            Some(word(0)),
            RegisterSpecList::make2(word(1), word(2)),
        );
        assert_eq!(insn.with_source_literal(), insn);
    }

    #[test]
    fn test_literal_fold_last_source() {
        let insn = Insn::plain(
            &rops::ADD,
            SourcePosition::UNKNOWN,
            Some(word(0)),
            RegisterSpecList::make2(word(1), const_word(2, 12)),
        );
        let folded = insn.with_source_literal();
        assert_eq!(folded.opcode().op(), RegOp::Add);
        assert!(folded.opcode().takes_literal());
        assert_eq!(folded.constant(), Some(Constant::int(12)));
        assert_eq!(folded.sources().len(), 1);
        assert_eq!(folded.sources().get(0).reg(), 1);
    }

    #[test]
    fn test_literal_fold_flips_subtraction() {
        let insn = Insn::plain(
            &rops::SUB,
            SourcePosition::UNKNOWN,
            Some(word(0)),
            RegisterSpecList::make2(word(1), const_word(2, 5)),
        );
        let folded = insn.with_source_literal();
        assert_eq!(folded.opcode().op(), RegOp::Add);
        assert!(folded.opcode().takes_literal());
        assert_eq!(folded.constant(), Some(Constant::int(-5)));
    }

    #[test]
    fn test_literal_fold_reversed_commutative() {
        let insn = Insn::plain(
            &rops::MUL,
            SourcePosition::UNKNOWN,
            Some(word(0)),
            RegisterSpecList::make2(const_word(1, 3), word(2)),
        );
        let folded = insn.with_source_literal();
        assert_eq!(folded.opcode().op(), RegOp::Mul);
        assert!(folded.opcode().takes_literal());
        assert_eq!(folded.constant(), Some(Constant::int(3)));
        assert_eq!(folded.sources().get(0).reg(), 2);
    }

    #[test]
    fn test_literal_fold_reversed_noncommutative_unchanged() {
        // 3 - v2 must not be rebuilt as a swapped-operand literal op.
        let insn = Insn::plain(
            &rops::SUB,
            SourcePosition::UNKNOWN,
            Some(word(0)),
            RegisterSpecList::make2(const_word(1, 3), word(2)),
        );
        assert_eq!(insn.with_source_literal(), insn);
    }

    #[test]
    fn test_literal_fold_wide_constant_unchanged() {
        let wide = RegisterSpec::new_constant(2, Constant::long(5));
        let insn = Insn::plain(
            &rops::ADD,
            SourcePosition::UNKNOWN,
            Some(RegisterSpec::new(0, Category::Wide)),
            RegisterSpecList::make2(RegisterSpec::new(4, Category::Wide), wide),
        );
        assert_eq!(insn.with_source_literal(), insn);
    }

    #[test]
    fn test_switch_requires_matching_tables() {
        let insn = Insn::switch(
            &rops::SWITCH,
            SourcePosition::UNKNOWN,
            RegisterSpecList::make1(word(0)),
            vec![1, 2],
            vec![10, 11],
        );
        assert!(matches!(insn.payload(), InsnPayload::Switch { .. }));
        assert_eq!(insn.result(), None);
    }

    #[test]
    #[should_panic(expected = "is not a switch opcode")]
    fn test_switch_rejects_plain_opcode() {
        Insn::switch(
            &rops::GOTO,
            SourcePosition::UNKNOWN,
            RegisterSpecList::empty(),
            vec![],
            vec![],
        );
    }

    #[test]
    fn test_throwing() {
        let insn = Insn::throwing(
            &rops::THROW,
            SourcePosition::UNKNOWN,
            RegisterSpecList::make1(word(0)),
            vec!["Ljava/lang/Exception;".to_string()],
        );
        assert!(matches!(insn.payload(), InsnPayload::Throwing { .. }));
    }
}
