// This module defines error types for the rodex backend using the thiserror crate for
// idiomatic Rust error handling. CompileError covers the failures the encoding stage is
// allowed to surface to its caller: an instruction for which no catalog format is
// compatible after register allocation, and a branch whose resolved offset does not fit
// any branch-format width (the caller owns the widen-or-trampoline retry). Each variant
// carries a rendering of the offending instruction so a failed method can be diagnosed.
// Invariant violations in construction or in the allocator are upstream defects and
// panic instead of flowing through this type. The module also provides CompileResult<T>
// as a convenience alias for Result<T, CompileError>.

//! Error types for the rodex backend.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for the encoding stage.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("no compatible instruction format: {insn}")]
    NoCompatibleFormat {
        insn: String,
    },

    #[error("branch offset {offset} fits no branch format: {insn}")]
    BranchOffsetOverflow {
        insn: String,
        offset: i32,
    },
}

/// Result type alias for encode operations.
pub type CompileResult<T> = Result<T, CompileError>;
