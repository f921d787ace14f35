// This module groups the SSA layer: the per-register defining-instruction view of a
// method, the interference relation computed from liveness, the incremental register
// mapping, and the first-fit allocator tying them together. The allocator owns all
// mutable state (the mapped set and the growing interference accumulator) for the
// duration of one call; a finalized mapper is immutable and safe to share for reads.

//! SSA-form method view and register allocation.

pub mod allocator;
pub mod interference;
pub mod mapper;
pub mod method;

pub use allocator::{FirstFitAllocator, RegisterAllocator};
pub use interference::{BitIntSet, InterferenceGraph};
pub use mapper::{BasicRegisterMapper, RegisterMapper};
pub use method::SsaMethod;
