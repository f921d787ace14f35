// This module groups the rop-level IR layer: register operands and operand lists,
// literal constants, abstract operation descriptors, immutable instruction records with
// their transforms, and the basic-block method body. Everything here is an immutable
// value type; transforms return new instances. The SSA layer consumes these records
// through the defining-instruction table and the encoding layer consumes the method
// body for address resolution.

//! The rop-level register-machine IR.

pub mod cst;
pub mod insn;
pub mod method;
pub mod reg;
pub mod rop;

pub use cst::Constant;
pub use insn::{Insn, InsnPayload, SourcePosition};
pub use method::{BasicBlock, BasicBlockList, RopMethod};
pub use reg::{Category, RegisterSpec, RegisterSpecList};
pub use rop::{rops, Branchingness, RegOp, Rop};
