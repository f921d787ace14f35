// This module groups the target encoding layer: the opcode catalog, target
// instruction records, symbolic block addresses with the layout pass that fixes them,
// the annotated output sink, and the fixed-width format catalog with selection and
// serialization. Encoding runs strictly after register allocation and address
// resolution; a format is a pure function of the finalized instruction.

//! Target instruction encoding.

pub mod addresses;
pub mod dop;
pub mod form;
pub mod insn;
pub mod output;

pub use addresses::{assign_addresses, BlockAddresses, CodeAddress};
pub use dop::{dops, Dop};
pub use form::{encode_insn, select_format, FormatId, InsnFormat};
pub use insn::{DalvInsn, DalvPayload};
pub use output::{AnnotatedOutput, Annotation, CodeOutput};
