use super::{BLOCK_GENERATION_INTERVAL, Block, DIFFICULTY_ADJUSTMENT_INTERVAL};

/// Retarget schedule. Every participant must use the same values, or
/// their chains stop being comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetargetParams {
    /// Expected seconds per block; retarget happens when the tip index is a
    /// multiple of it.
    pub block_generation_interval: u64,
    /// Distance, in blocks, from the tip back to the retarget anchor.
    pub difficulty_adjustment_interval: u64,
}

impl Default for RetargetParams {
    fn default() -> Self {
        Self {
            block_generation_interval: BLOCK_GENERATION_INTERVAL,
            difficulty_adjustment_interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
        }
    }
}

/// Difficulty for the block that will follow `blocks`.
///
/// Off a retarget boundary the tip's difficulty carries over. On a boundary
/// the time since the anchor is compared with the expected time: under half
/// raises the anchor's difficulty by one, over double lowers it by one
/// (never below zero).
///
/// The genesis timestamp is a fixed constant, not a mining time, so when the
/// anchor is genesis the elapsed time is measured from the block after it.
pub fn next_difficulty(blocks: &[Block], params: &RetargetParams) -> u32 {
    let Some(last) = blocks.last() else {
        return 0;
    };
    if params.block_generation_interval == 0
        || last.index % params.block_generation_interval != 0
    {
        return last.difficulty;
    }

    let anchor_pos = blocks
        .len()
        .saturating_sub(params.difficulty_adjustment_interval as usize);
    let anchor = &blocks[anchor_pos];
    let clock_start = match anchor_pos {
        0 => blocks.get(1).unwrap_or(anchor),
        _ => anchor,
    };

    let expected = params.block_generation_interval * params.difficulty_adjustment_interval;
    let actual = last.timestamp.saturating_sub(clock_start.timestamp);

    if actual.saturating_mul(2) < expected {
        anchor.difficulty.saturating_add(1)
    } else if actual > expected.saturating_mul(2) {
        anchor.difficulty.saturating_sub(1)
    } else {
        anchor.difficulty
    }
}
