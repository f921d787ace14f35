// This module defines the rop-level method body consumed by address resolution. A
// method is an ordered collection of basic blocks; every block carries a dense integer
// label, a non-empty ordered instruction list whose final entry is the block's
// terminating branch or fall-through instruction, and the labels of its successor
// blocks. The block list is stored in layout order, which is not necessarily label
// order, so lookups by label go through a label-to-index map. Labels range over
// 0..max_label and a label with no corresponding block has no addresses and is never
// queried.

//! Basic blocks and rop-level method bodies.

use super::insn::Insn;
use hashbrown::HashMap;

/// One basic block.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    label: u32,
    insns: Vec<Insn>,
    successors: Vec<u32>,
}

impl BasicBlock {
    /// Construct a block. The instruction list must be non-empty; the final
    /// entry is the block's terminating instruction.
    pub fn new(label: u32, insns: Vec<Insn>, successors: Vec<u32>) -> Self {
        assert!(!insns.is_empty(), "block {label} has no instructions");
        Self {
            label,
            insns,
            successors,
        }
    }

    /// The block label.
    pub fn label(&self) -> u32 {
        self.label
    }

    /// The ordered instruction list.
    pub fn insns(&self) -> &[Insn] {
        &self.insns
    }

    /// The first instruction.
    pub fn first_insn(&self) -> &Insn {
        &self.insns[0]
    }

    /// The terminating instruction.
    pub fn last_insn(&self) -> &Insn {
        self.insns.last().unwrap()
    }

    /// Labels of the successor blocks.
    pub fn successors(&self) -> &[u32] {
        &self.successors
    }
}

/// Ordered collection of basic blocks with label lookup.
#[derive(Debug, Clone)]
pub struct BasicBlockList {
    blocks: Vec<BasicBlock>,
    label_to_index: HashMap<u32, usize>,
    max_label: u32,
}

impl BasicBlockList {
    /// Build the list from blocks in layout order. Labels must be unique.
    pub fn new(blocks: Vec<BasicBlock>) -> Self {
        let mut label_to_index = HashMap::with_capacity(blocks.len());
        let mut max_label = 0;
        for (index, block) in blocks.iter().enumerate() {
            let previous = label_to_index.insert(block.label(), index);
            assert!(previous.is_none(), "duplicate block label {}", block.label());
            max_label = max_label.max(block.label() + 1);
        }
        Self {
            blocks,
            label_to_index,
            max_label,
        }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// One past the highest label in use.
    pub fn max_label(&self) -> u32 {
        self.max_label
    }

    /// The block at layout position `index`.
    pub fn get(&self, index: usize) -> &BasicBlock {
        &self.blocks[index]
    }

    /// The block with the given label, if any.
    pub fn labeled(&self, label: u32) -> Option<&BasicBlock> {
        self.label_to_index.get(&label).map(|&i| &self.blocks[i])
    }

    /// Iterator over blocks in layout order.
    pub fn iter(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }
}

/// A rop-level method body.
#[derive(Debug, Clone)]
pub struct RopMethod {
    blocks: BasicBlockList,
    first_label: u32,
}

impl RopMethod {
    /// Construct a method. The entry block must exist.
    pub fn new(blocks: BasicBlockList, first_label: u32) -> Self {
        assert!(
            blocks.labeled(first_label).is_some(),
            "entry block {first_label} missing"
        );
        Self {
            blocks,
            first_label,
        }
    }

    /// The block list.
    pub fn blocks(&self) -> &BasicBlockList {
        &self.blocks
    }

    /// Label of the entry block.
    pub fn first_label(&self) -> u32 {
        self.first_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rop::insn::SourcePosition;
    use crate::rop::reg::RegisterSpecList;
    use crate::rop::rop::rops;

    fn goto_block(label: u32, target: u32) -> BasicBlock {
        let insn = Insn::plain(
            &rops::GOTO,
            SourcePosition::at_line(label),
            None,
            RegisterSpecList::empty(),
        );
        BasicBlock::new(label, vec![insn], vec![target])
    }

    #[test]
    fn test_label_lookup() {
        // Layout order differs from label order.
        let list = BasicBlockList::new(vec![goto_block(2, 0), goto_block(0, 2)]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.max_label(), 3);
        assert_eq!(list.labeled(0).unwrap().label(), 0);
        assert_eq!(list.labeled(2).unwrap().label(), 2);
        assert!(list.labeled(1).is_none());
        assert_eq!(list.get(0).label(), 2);
    }

    #[test]
    #[should_panic(expected = "duplicate block label")]
    fn test_duplicate_labels_rejected() {
        BasicBlockList::new(vec![goto_block(1, 0), goto_block(1, 0)]);
    }

    #[test]
    #[should_panic(expected = "entry block 5 missing")]
    fn test_missing_entry_rejected() {
        RopMethod::new(BasicBlockList::new(vec![goto_block(0, 0)]), 5);
    }
}
