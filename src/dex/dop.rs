// This module defines the target opcode catalog. A Dop pairs the numeric opcode byte
// of the target instruction set with its name and the identifier of the fixed-width
// format that encodes it. The dops catalog holds one static descriptor per supported
// opcode; instruction selection upstream picks a Dop per rop-level instruction and the
// format catalog does the rest. Opcode values follow the Dalvik instruction-set
// numbering.

//! Target opcodes.

use super::form::{self, FormatId, InsnFormat};

/// Descriptor for one target opcode.
#[derive(Debug, PartialEq, Eq)]
pub struct Dop {
    value: u8,
    name: &'static str,
    format: FormatId,
    /// Next-wider opcode carrying the same operation, for format selection.
    next: Option<&'static Dop>,
}

impl Dop {
    const fn new(value: u8, name: &'static str, format: FormatId) -> Self {
        Self {
            value,
            name,
            format,
            next: None,
        }
    }

    const fn chained(
        value: u8,
        name: &'static str,
        format: FormatId,
        next: &'static Dop,
    ) -> Self {
        Self {
            value,
            name,
            format,
            next: Some(next),
        }
    }

    /// The numeric opcode byte.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// The opcode mnemonic.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identifier of the format that encodes this opcode.
    pub fn format_id(&self) -> FormatId {
        self.format
    }

    /// The format that encodes this opcode.
    pub fn format(&self) -> &'static dyn InsnFormat {
        form::format(self.format)
    }

    /// The next-wider opcode for the same operation, if any.
    pub fn next(&self) -> Option<&'static Dop> {
        self.next
    }
}

/// The static opcode catalog.
pub mod dops {
    use super::*;

    pub static NOP: Dop = Dop::new(0x00, "nop", FormatId::F10x);
    pub static MOVE: Dop = Dop::new(0x01, "move", FormatId::F12x);
    pub static MOVE_WIDE: Dop = Dop::new(0x04, "move-wide", FormatId::F12x);
    pub static RETURN_VOID: Dop = Dop::new(0x0e, "return-void", FormatId::F10x);
    pub static RETURN: Dop = Dop::new(0x0f, "return", FormatId::F11x);
    pub static CONST_4: Dop = Dop::chained(0x12, "const/4", FormatId::F11n, &CONST_16);
    pub static CONST_16: Dop = Dop::new(0x13, "const/16", FormatId::F21s);
    pub static THROW: Dop = Dop::new(0x27, "throw", FormatId::F11x);
    pub static GOTO: Dop = Dop::chained(0x28, "goto", FormatId::F10t, &GOTO_16);
    pub static GOTO_16: Dop = Dop::new(0x29, "goto/16", FormatId::F20t);
    pub static IF_EQ: Dop = Dop::new(0x32, "if-eq", FormatId::F22t);
    pub static IF_NE: Dop = Dop::new(0x33, "if-ne", FormatId::F22t);
    pub static IF_EQZ: Dop = Dop::new(0x38, "if-eqz", FormatId::F21t);
    pub static IF_NEZ: Dop = Dop::new(0x39, "if-nez", FormatId::F21t);
    pub static ADD_INT: Dop = Dop::new(0x90, "add-int", FormatId::F23x);
    pub static SUB_INT: Dop = Dop::new(0x91, "sub-int", FormatId::F23x);
    pub static MUL_INT: Dop = Dop::new(0x92, "mul-int", FormatId::F23x);
    pub static DIV_INT: Dop = Dop::new(0x93, "div-int", FormatId::F23x);
    pub static REM_INT: Dop = Dop::new(0x94, "rem-int", FormatId::F23x);
    pub static AND_INT: Dop = Dop::new(0x95, "and-int", FormatId::F23x);
    pub static OR_INT: Dop = Dop::new(0x96, "or-int", FormatId::F23x);
    pub static XOR_INT: Dop = Dop::new(0x97, "xor-int", FormatId::F23x);
    pub static ADD_INT_LIT16: Dop = Dop::new(0xd0, "add-int/lit16", FormatId::F22s);
    pub static RSUB_INT: Dop = Dop::new(0xd1, "rsub-int", FormatId::F22s);
    pub static MUL_INT_LIT16: Dop = Dop::new(0xd2, "mul-int/lit16", FormatId::F22s);
    pub static DIV_INT_LIT16: Dop = Dop::new(0xd3, "div-int/lit16", FormatId::F22s);
    pub static REM_INT_LIT16: Dop = Dop::new(0xd4, "rem-int/lit16", FormatId::F22s);
    pub static AND_INT_LIT16: Dop = Dop::new(0xd5, "and-int/lit16", FormatId::F22s);
    pub static OR_INT_LIT16: Dop = Dop::new(0xd6, "or-int/lit16", FormatId::F22s);
    pub static XOR_INT_LIT16: Dop = Dop::new(0xd7, "xor-int/lit16", FormatId::F22s);
    pub static ADD_INT_LIT8: Dop =
        Dop::chained(0xd8, "add-int/lit8", FormatId::F22b, &ADD_INT_LIT16);
}
