// This module implements the fixed-width instruction format catalog. Every format is a
// stateless singleton declaring its size in 16-bit code units, an applicability
// predicate over a candidate instruction (payload variant, operand count, register
// width limits, and resolved branch offset for the branch-carrying formats), a
// per-operand register-fit bitmask for allocation-feedback passes, and the
// byte-serialization rule. Selection walks an instruction's opcode chain cheapest
// variant first and takes the first compatible format; when every variant of a branch
// is ruled out solely by its resolved offset the failure is surfaced as a
// branch-offset overflow so the caller can widen or insert a trampoline. Encoding is a
// pure function of the final register assignment and resolved addresses: no format is
// selected before both phases complete, and re-encoding is byte-identical.

//! Instruction formats and binary encoding.

use super::insn::{DalvInsn, DalvPayload};
use super::output::AnnotatedOutput;
use crate::error::{CompileError, CompileResult};
use crate::rop::cst::Constant;

/// Identifier of one catalog format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    F10x,
    F10t,
    F11n,
    F11x,
    F12x,
    F20t,
    F21s,
    F21t,
    F22b,
    F22s,
    F22t,
    F23x,
}

/// One fixed-width binary encoding shape.
pub trait InsnFormat: Sync {
    /// The format name, matching the instruction-set documentation.
    fn name(&self) -> &'static str;

    /// Fixed size in 16-bit code units, independent of operand values.
    fn code_size(&self) -> usize;

    /// Whether the instruction's variant, operand count, register widths,
    /// and (for branch formats) resolved offset all fit this encoding.
    fn is_compatible(&self, insn: &DalvInsn) -> bool;

    /// Per-operand bitmask: bit `i` is set when register operand `i`
    /// satisfies this format's width limit.
    fn compatible_regs(&self, _insn: &DalvInsn) -> u32 {
        0
    }

    /// For branch-carrying formats: whether the resolved target offset is
    /// encodable. A zero offset never is; the target instruction set
    /// prohibits a self-branch of zero.
    fn branch_fits(&self, _insn: &DalvInsn) -> bool {
        false
    }

    /// Serialize the instruction. The caller guarantees compatibility.
    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn);

    /// Operand rendering for disassembly listings.
    fn insn_arg_string(&self, insn: &DalvInsn) -> String;

    /// Comment rendering for disassembly listings.
    fn insn_comment_string(&self, _insn: &DalvInsn) -> String {
        String::new()
    }
}

/// The format singleton for an id.
pub fn format(id: FormatId) -> &'static dyn InsnFormat {
    match id {
        FormatId::F10x => &FORM_10X,
        FormatId::F10t => &FORM_10T,
        FormatId::F11n => &FORM_11N,
        FormatId::F11x => &FORM_11X,
        FormatId::F12x => &FORM_12X,
        FormatId::F20t => &FORM_20T,
        FormatId::F21s => &FORM_21S,
        FormatId::F21t => &FORM_21T,
        FormatId::F22b => &FORM_22B,
        FormatId::F22s => &FORM_22S,
        FormatId::F22t => &FORM_22T,
        FormatId::F23x => &FORM_23X,
    }
}

/// Every format, one-unit shapes first.
pub static CATALOG: [&dyn InsnFormat; 12] = [
    &FORM_10X, &FORM_10T, &FORM_11N, &FORM_11X, &FORM_12X, &FORM_20T, &FORM_21S, &FORM_21T,
    &FORM_22B, &FORM_22S, &FORM_22T, &FORM_23X,
];

// ---------------------------------------------------------------------------
// Fit predicates and unit packing, shared across formats.
// ---------------------------------------------------------------------------

/// Whether a register index fits in an unsigned nibble.
pub fn unsigned_fits_in_nibble(value: u32) -> bool {
    value <= 0xf
}

/// Whether a register index fits in an unsigned byte.
pub fn unsigned_fits_in_byte(value: u32) -> bool {
    value <= 0xff
}

/// Whether a value fits in a signed nibble.
pub fn signed_fits_in_nibble(value: i32) -> bool {
    (-8..=7).contains(&value)
}

/// Whether a value fits in a signed byte.
pub fn signed_fits_in_byte(value: i32) -> bool {
    i8::try_from(value).is_ok()
}

/// Whether a value fits in a signed 16-bit short.
pub fn signed_fits_in_short(value: i32) -> bool {
    i16::try_from(value).is_ok()
}

/// First code unit: opcode byte in the low byte, `arg` in the high byte.
fn opcode_unit(insn: &DalvInsn, arg: u8) -> u16 {
    insn.opcode().value() as u16 | ((arg as u16) << 8)
}

/// Pack two nibbles, `low` in the low bits.
fn make_byte(low: u32, high: u32) -> u8 {
    debug_assert!(unsigned_fits_in_nibble(low) && unsigned_fits_in_nibble(high));
    (low | (high << 4)) as u8
}

/// Pack two bytes into one code unit, `low` in the low bits.
fn code_unit(low: u8, high: u8) -> u16 {
    low as u16 | ((high as u16) << 8)
}

/// Absolute-target rendering for branch operands.
fn branch_string(insn: &DalvInsn) -> String {
    if insn.has_target_offset() {
        let target = insn.address() as i32 + insn.target_offset();
        format!("{target:04x}")
    } else {
        format!(":{}", insn.target_label())
    }
}

/// Relative-offset rendering for branch comments.
fn branch_comment(insn: &DalvInsn) -> String {
    if insn.has_target_offset() {
        format!("{:+}", insn.target_offset())
    } else {
        String::new()
    }
}

/// Literal rendering for constant operands.
fn literal_bits_string(value: Constant) -> String {
    format!("#{}", value.to_human())
}

/// Literal comment rendering, noting the encoded width.
fn literal_bits_comment(value: Constant, width: u32) -> String {
    format!("#s{width} {:#x}", value.int_bits())
}

/// The embedded constant when it is usable as a narrow literal.
fn literal_of(insn: &DalvInsn) -> Option<Constant> {
    insn.constant().filter(Constant::fits_in_int)
}

// ---------------------------------------------------------------------------
// The formats.
// ---------------------------------------------------------------------------

/// Format `10x`: one unit, opcode only.
#[derive(Debug)]
pub struct Form10x;
pub static FORM_10X: Form10x = Form10x;

impl InsnFormat for Form10x {
    fn name(&self) -> &'static str {
        "10x"
    }

    fn code_size(&self) -> usize {
        1
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        matches!(insn.payload(), DalvPayload::Simple) && insn.registers().is_empty()
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        out.write_short(opcode_unit(insn, 0));
    }

    fn insn_arg_string(&self, _insn: &DalvInsn) -> String {
        String::new()
    }
}

/// Format `10t`: one unit, signed-byte branch offset, no registers.
#[derive(Debug)]
pub struct Form10t;
pub static FORM_10T: Form10t = Form10t;

impl InsnFormat for Form10t {
    fn name(&self) -> &'static str {
        "10t"
    }

    fn code_size(&self) -> usize {
        1
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        if !insn.is_target() || !insn.registers().is_empty() {
            return false;
        }
        if insn.has_target_offset() {
            self.branch_fits(insn)
        } else {
            true
        }
    }

    fn branch_fits(&self, insn: &DalvInsn) -> bool {
        let offset = insn.target_offset();
        (offset != 0) && signed_fits_in_byte(offset)
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        out.write_short(opcode_unit(insn, insn.target_offset() as i8 as u8));
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        branch_string(insn)
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        branch_comment(insn)
    }
}

/// Format `11n`: one unit, nibble register plus signed-nibble literal.
#[derive(Debug)]
pub struct Form11n;
pub static FORM_11N: Form11n = Form11n;

impl InsnFormat for Form11n {
    fn name(&self) -> &'static str {
        "11n"
    }

    fn code_size(&self) -> usize {
        1
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        let Some(value) = literal_of(insn) else {
            return false;
        };
        regs.len() == 1
            && unsigned_fits_in_nibble(regs.get(0).reg())
            && signed_fits_in_nibble(value.int_bits())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        unsigned_fits_in_nibble(insn.registers().get(0).reg()) as u32
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        let regs = insn.registers();
        let value = insn.constant().unwrap().int_bits();
        out.write_short(opcode_unit(
            insn,
            make_byte(regs.get(0).reg(), (value & 0xf) as u32),
        ));
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        format!(
            "{}, {}",
            insn.registers().get(0),
            literal_bits_string(insn.constant().unwrap())
        )
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        literal_bits_comment(insn.constant().unwrap(), 4)
    }
}

/// Format `11x`: one unit, one byte register.
#[derive(Debug)]
pub struct Form11x;
pub static FORM_11X: Form11x = Form11x;

impl InsnFormat for Form11x {
    fn name(&self) -> &'static str {
        "11x"
    }

    fn code_size(&self) -> usize {
        1
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        matches!(insn.payload(), DalvPayload::Simple)
            && regs.len() == 1
            && unsigned_fits_in_byte(regs.get(0).reg())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        unsigned_fits_in_byte(insn.registers().get(0).reg()) as u32
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        out.write_short(opcode_unit(insn, insn.registers().get(0).reg() as u8));
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        insn.registers().get(0).to_string()
    }
}

/// Format `12x`: one unit, two nibble registers.
#[derive(Debug)]
pub struct Form12x;
pub static FORM_12X: Form12x = Form12x;

impl InsnFormat for Form12x {
    fn name(&self) -> &'static str {
        "12x"
    }

    fn code_size(&self) -> usize {
        1
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        matches!(insn.payload(), DalvPayload::Simple)
            && regs.len() == 2
            && unsigned_fits_in_nibble(regs.get(0).reg())
            && unsigned_fits_in_nibble(regs.get(1).reg())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        let regs = insn.registers();
        unsigned_fits_in_nibble(regs.get(0).reg()) as u32
            | (unsigned_fits_in_nibble(regs.get(1).reg()) as u32) << 1
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        let regs = insn.registers();
        out.write_short(opcode_unit(
            insn,
            make_byte(regs.get(0).reg(), regs.get(1).reg()),
        ));
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        let regs = insn.registers();
        format!("{}, {}", regs.get(0), regs.get(1))
    }
}

/// Format `20t`: two units, signed-short branch offset, no registers.
#[derive(Debug)]
pub struct Form20t;
pub static FORM_20T: Form20t = Form20t;

impl InsnFormat for Form20t {
    fn name(&self) -> &'static str {
        "20t"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        if !insn.is_target() || !insn.registers().is_empty() {
            return false;
        }
        if insn.has_target_offset() {
            self.branch_fits(insn)
        } else {
            true
        }
    }

    fn branch_fits(&self, insn: &DalvInsn) -> bool {
        let offset = insn.target_offset();
        (offset != 0) && signed_fits_in_short(offset)
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        out.write_short(opcode_unit(insn, 0));
        out.write_short(insn.target_offset() as i16 as u16);
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        branch_string(insn)
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        branch_comment(insn)
    }
}

/// Format `21s`: two units, byte register plus signed-short literal.
#[derive(Debug)]
pub struct Form21s;
pub static FORM_21S: Form21s = Form21s;

impl InsnFormat for Form21s {
    fn name(&self) -> &'static str {
        "21s"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        let Some(value) = literal_of(insn) else {
            return false;
        };
        regs.len() == 1
            && unsigned_fits_in_byte(regs.get(0).reg())
            && signed_fits_in_short(value.int_bits())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        unsigned_fits_in_byte(insn.registers().get(0).reg()) as u32
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        out.write_short(opcode_unit(insn, insn.registers().get(0).reg() as u8));
        out.write_short(insn.constant().unwrap().int_bits() as i16 as u16);
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        format!(
            "{}, {}",
            insn.registers().get(0),
            literal_bits_string(insn.constant().unwrap())
        )
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        literal_bits_comment(insn.constant().unwrap(), 16)
    }
}

/// Format `21t`: two units, byte register plus signed-short branch offset.
#[derive(Debug)]
pub struct Form21t;
pub static FORM_21T: Form21t = Form21t;

impl InsnFormat for Form21t {
    fn name(&self) -> &'static str {
        "21t"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        if !insn.is_target()
            || regs.len() != 1
            || !unsigned_fits_in_byte(regs.get(0).reg())
        {
            return false;
        }
        if insn.has_target_offset() {
            self.branch_fits(insn)
        } else {
            true
        }
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        unsigned_fits_in_byte(insn.registers().get(0).reg()) as u32
    }

    fn branch_fits(&self, insn: &DalvInsn) -> bool {
        let offset = insn.target_offset();
        // A zero offset would fit, but it is prohibited by the target
        // instruction-set specification.
        (offset != 0) && signed_fits_in_short(offset)
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        out.write_short(opcode_unit(insn, insn.registers().get(0).reg() as u8));
        out.write_short(insn.target_offset() as i16 as u16);
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        format!("{}, {}", insn.registers().get(0), branch_string(insn))
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        branch_comment(insn)
    }
}

/// Format `22b`: two units, two byte registers plus signed-byte literal.
#[derive(Debug)]
pub struct Form22b;
pub static FORM_22B: Form22b = Form22b;

impl InsnFormat for Form22b {
    fn name(&self) -> &'static str {
        "22b"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        let Some(value) = literal_of(insn) else {
            return false;
        };
        regs.len() == 2
            && unsigned_fits_in_byte(regs.get(0).reg())
            && unsigned_fits_in_byte(regs.get(1).reg())
            && signed_fits_in_byte(value.int_bits())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        let regs = insn.registers();
        unsigned_fits_in_byte(regs.get(0).reg()) as u32
            | (unsigned_fits_in_byte(regs.get(1).reg()) as u32) << 1
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        let regs = insn.registers();
        let value = insn.constant().unwrap().int_bits();
        out.write_short(opcode_unit(insn, regs.get(0).reg() as u8));
        out.write_short(code_unit(regs.get(1).reg() as u8, value as i8 as u8));
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        let regs = insn.registers();
        format!(
            "{}, {}, {}",
            regs.get(0),
            regs.get(1),
            literal_bits_string(insn.constant().unwrap())
        )
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        literal_bits_comment(insn.constant().unwrap(), 8)
    }
}

/// Format `22s`: two units, two nibble registers plus signed-short literal.
#[derive(Debug)]
pub struct Form22s;
pub static FORM_22S: Form22s = Form22s;

impl InsnFormat for Form22s {
    fn name(&self) -> &'static str {
        "22s"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        let Some(value) = literal_of(insn) else {
            return false;
        };
        regs.len() == 2
            && unsigned_fits_in_nibble(regs.get(0).reg())
            && unsigned_fits_in_nibble(regs.get(1).reg())
            && signed_fits_in_short(value.int_bits())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        let regs = insn.registers();
        unsigned_fits_in_nibble(regs.get(0).reg()) as u32
            | (unsigned_fits_in_nibble(regs.get(1).reg()) as u32) << 1
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        let regs = insn.registers();
        out.write_short(opcode_unit(
            insn,
            make_byte(regs.get(0).reg(), regs.get(1).reg()),
        ));
        out.write_short(insn.constant().unwrap().int_bits() as i16 as u16);
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        let regs = insn.registers();
        format!(
            "{}, {}, {}",
            regs.get(0),
            regs.get(1),
            literal_bits_string(insn.constant().unwrap())
        )
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        literal_bits_comment(insn.constant().unwrap(), 16)
    }
}

/// Format `22t`: two units, two nibble registers plus signed-short branch
/// offset.
#[derive(Debug)]
pub struct Form22t;
pub static FORM_22T: Form22t = Form22t;

impl InsnFormat for Form22t {
    fn name(&self) -> &'static str {
        "22t"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        if !insn.is_target()
            || regs.len() != 2
            || !unsigned_fits_in_nibble(regs.get(0).reg())
            || !unsigned_fits_in_nibble(regs.get(1).reg())
        {
            return false;
        }
        if insn.has_target_offset() {
            self.branch_fits(insn)
        } else {
            true
        }
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        let regs = insn.registers();
        unsigned_fits_in_nibble(regs.get(0).reg()) as u32
            | (unsigned_fits_in_nibble(regs.get(1).reg()) as u32) << 1
    }

    fn branch_fits(&self, insn: &DalvInsn) -> bool {
        let offset = insn.target_offset();
        (offset != 0) && signed_fits_in_short(offset)
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        let regs = insn.registers();
        out.write_short(opcode_unit(
            insn,
            make_byte(regs.get(0).reg(), regs.get(1).reg()),
        ));
        out.write_short(insn.target_offset() as i16 as u16);
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        let regs = insn.registers();
        format!("{}, {}, {}", regs.get(0), regs.get(1), branch_string(insn))
    }

    fn insn_comment_string(&self, insn: &DalvInsn) -> String {
        branch_comment(insn)
    }
}

/// Format `23x`: two units, three byte registers.
#[derive(Debug)]
pub struct Form23x;
pub static FORM_23X: Form23x = Form23x;

impl InsnFormat for Form23x {
    fn name(&self) -> &'static str {
        "23x"
    }

    fn code_size(&self) -> usize {
        2
    }

    fn is_compatible(&self, insn: &DalvInsn) -> bool {
        let regs = insn.registers();
        matches!(insn.payload(), DalvPayload::Simple)
            && regs.len() == 3
            && unsigned_fits_in_byte(regs.get(0).reg())
            && unsigned_fits_in_byte(regs.get(1).reg())
            && unsigned_fits_in_byte(regs.get(2).reg())
    }

    fn compatible_regs(&self, insn: &DalvInsn) -> u32 {
        let regs = insn.registers();
        unsigned_fits_in_byte(regs.get(0).reg()) as u32
            | (unsigned_fits_in_byte(regs.get(1).reg()) as u32) << 1
            | (unsigned_fits_in_byte(regs.get(2).reg()) as u32) << 2
    }

    fn write_to(&self, out: &mut dyn AnnotatedOutput, insn: &DalvInsn) {
        let regs = insn.registers();
        out.write_short(opcode_unit(insn, regs.get(0).reg() as u8));
        out.write_short(code_unit(regs.get(1).reg() as u8, regs.get(2).reg() as u8));
    }

    fn insn_arg_string(&self, insn: &DalvInsn) -> String {
        let regs = insn.registers();
        format!("{}, {}, {}", regs.get(0), regs.get(1), regs.get(2))
    }
}

// ---------------------------------------------------------------------------
// Selection and encoding.
// ---------------------------------------------------------------------------

/// Pick the cheapest compatible encoding for `insn`, walking its opcode's
/// widening chain narrowest variant first.
///
/// Returns the (possibly opcode-widened) instruction together with its
/// format. When every variant of a branch is ruled out only by the resolved
/// offset, the failure surfaces as [`CompileError::BranchOffsetOverflow`]
/// so the caller can retry with a longer branch shape or a trampoline.
pub fn select_format(insn: &DalvInsn) -> CompileResult<(DalvInsn, &'static dyn InsnFormat)> {
    let mut candidate = insn.clone();
    loop {
        let fmt = candidate.opcode().format();
        if fmt.is_compatible(&candidate) {
            return Ok((candidate, fmt));
        }
        match candidate.opcode().next() {
            Some(wider) => candidate = candidate.with_opcode(wider),
            None => break,
        }
    }

    if insn.has_target_offset() {
        // Would some variant have taken this branch with its offset still
        // unresolved? Then the offset is what ruled everything out.
        let unresolved = insn.with_target_cleared();
        let mut candidate = unresolved.clone();
        loop {
            if candidate.opcode().format().is_compatible(&candidate) {
                return Err(CompileError::BranchOffsetOverflow {
                    insn: insn.to_string(),
                    offset: insn.target_offset(),
                });
            }
            match candidate.opcode().next() {
                Some(wider) => candidate = candidate.with_opcode(wider),
                None => break,
            }
        }
    }

    Err(CompileError::NoCompatibleFormat {
        insn: insn.to_string(),
    })
}

/// Select a format for `insn` and serialize it into `out`.
pub fn encode_insn(out: &mut dyn AnnotatedOutput, insn: &DalvInsn) -> CompileResult<()> {
    let (insn, fmt) = select_format(insn)?;

    if out.annotates() {
        let args = fmt.insn_arg_string(&insn);
        let comment = fmt.insn_comment_string(&insn);
        let text = match (args.is_empty(), comment.is_empty()) {
            (true, _) => insn.opcode().name().to_string(),
            (false, true) => format!("{} {args}", insn.opcode().name()),
            (false, false) => format!("{} {args} // {comment}", insn.opcode().name()),
        };
        out.annotate(fmt.code_size() * 2, &text);
    }

    fmt.write_to(out, &insn);
    Ok(())
}
