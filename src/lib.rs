//! rodex - register-IR to Dalvik-style bytecode backend.
//!
//! rodex is the backend core of a bytecode-to-bytecode compiler. It consumes
//! a register-machine IR in SSA form, packs virtual registers into physical
//! register slots with a first-fit interference-driven allocator, resolves
//! symbolic block addresses to code-unit offsets, and serializes each
//! instruction through a catalog of fixed-width encodings.
//!
//! # Primary Usage
//!
//! ```ignore
//! use rodex::ssa::{FirstFitAllocator, RegisterAllocator, RegisterMapper};
//! use rodex::dex::{assign_addresses, encode_insn, BlockAddresses, CodeOutput};
//!
//! // Allocate registers for an SSA method body.
//! let mut allocator = FirstFitAllocator::new(&method, &interference);
//! let mapper = allocator.allocate_registers();
//!
//! // Rewrite, lay out, and encode the lowered instructions.
//! let mut addresses = BlockAddresses::new(&rop_method);
//! let placed = assign_addresses(layout, &mut addresses);
//! let mut out = CodeOutput::new();
//! for insn in &placed {
//!     encode_insn(&mut out, insn)?;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`rop`] - register-machine IR (operands, constants, instructions, blocks)
//! - [`ssa`] - SSA method view, interference graph, register allocation
//! - [`dex`] - address resolution, instruction formats, binary encoding
//! - [`error`] - surfaced encoder failures

pub mod dex;
pub mod error;
pub mod rop;
pub mod ssa;

// Re-export common types from the layer modules
pub use dex::{
    // Address resolution
    assign_addresses, BlockAddresses, CodeAddress,
    // Encoding
    encode_insn, select_format, AnnotatedOutput, CodeOutput, DalvInsn, DalvPayload, Dop,
    FormatId, InsnFormat,
};
pub use error::{CompileError, CompileResult};
pub use rop::{
    BasicBlock, BasicBlockList, Branchingness, Category, Constant, Insn, InsnPayload,
    RegOp, RegisterSpec, RegisterSpecList, Rop, RopMethod, SourcePosition,
};
pub use ssa::{
    BasicRegisterMapper, BitIntSet, FirstFitAllocator, InterferenceGraph, RegisterAllocator,
    RegisterMapper, SsaMethod,
};
