//! Ragged-tail schedule concatenation.

use crate::scheduler::Schedule;
use crate::types::UnsignedInt;

/// Appends the ragged-tail grid's steps onto the main schedule.
///
/// Both grids carry one micro-batch per worker in every step, so the tail
/// steps slot in after the main steps unchanged.
pub fn concat<I: UnsignedInt>(schedule: &mut Schedule<I>, tail: Schedule<I>) {
    debug_assert!(schedule
        .first()
        .zip(tail.first())
        .map_or(true, |(main_step, tail_step)| main_step.len()
            == tail_step.len()));
    schedule.extend(tail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_steps_follow_main_steps() {
        let mut schedule: Schedule<u32> = vec![
            vec![vec![0, 1], vec![2, 3]],
            vec![vec![4, 5], vec![6, 7]],
        ];
        let tail: Schedule<u32> = vec![vec![vec![8], vec![9]]];

        concat(&mut schedule, tail);

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[2], vec![vec![8], vec![9]]);
        assert_eq!(schedule[0], vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_empty_tail_is_a_no_op() {
        let mut schedule: Schedule<u32> = vec![vec![vec![0], vec![1]]];
        concat(&mut schedule, Vec::new());
        assert_eq!(schedule.len(), 1);
    }
}
