use super::{error::EvalError, EResult};
use crate::common::Int;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Flag {
    Success,
    Failure,
    Critical,
    Fumble,
}

/// Outcome tags on a single roll.
///
/// Setting a flag clears the ones it contradicts: a critical is never a fumble
/// or a failure, a fumble is never a success or a critical, and success and
/// failure exclude each other.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RollFlags {
    pub success: bool,
    pub failure: bool,
    pub critical: bool,
    pub fumble: bool,
}

impl RollFlags {
    pub fn mark(&mut self, flag: Flag) {
        match flag {
            Flag::Success => {
                self.success = true;
                self.failure = false;
                self.fumble = false;
            }
            Flag::Failure => {
                self.failure = true;
                self.success = false;
                self.critical = false;
            }
            Flag::Critical => {
                self.critical = true;
                self.fumble = false;
                self.failure = false;
            }
            Flag::Fumble => {
                self.fumble = true;
                self.success = false;
                self.critical = false;
            }
        }
    }
}

/// A single die's outcome.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RollResult {
    pub sides: Int,
    pub value: Int,
    pub kept: bool,
    /// This roll matched an explode predicate and caused another roll.
    pub exploded: bool,
    /// Index (within the same term) of the roll whose explosion produced this one.
    pub explosion_of: Option<usize>,
    /// The roll this one replaced, if it is the result of a reroll.
    pub rerolled_from: Option<Box<RollResult>>,
    pub flags: RollFlags,
}

impl RollResult {
    pub fn new(sides: Int, value: Int) -> Self {
        Self {
            sides,
            value,
            kept: true,
            exploded: false,
            explosion_of: None,
            rerolled_from: None,
            flags: RollFlags::default(),
        }
    }

    /// Number of times this die was rerolled.
    pub fn rerolls(&self) -> usize {
        let mut n = 0;
        let mut current = self;
        while let Some(prev) = &current.rerolled_from {
            n += 1;
            current = prev;
        }
        n
    }

    /// Every value this die showed, oldest first.
    pub fn history(&self) -> Vec<Int> {
        let mut values = vec![self.value];
        let mut current = self;
        while let Some(prev) = &current.rerolled_from {
            values.push(prev.value);
            current = prev;
        }
        values.reverse();
        values
    }

    pub(crate) fn replace(&mut self, value: Int) {
        let sides = self.sides;
        let previous = std::mem::replace(self, Self::new(sides, value));
        self.explosion_of = previous.explosion_of;
        self.rerolled_from = Some(Box::new(previous));
    }
}

/// The rolls of one dice term while its modifiers are being applied.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DicePool {
    pub count: Int,
    pub sides: Int,
    pub rolls: Vec<RollResult>,
    pub(crate) counts_successes: bool,
}

impl DicePool {
    pub fn new(count: Int, sides: Int, values: impl IntoIterator<Item = Int>) -> Self {
        Self {
            count,
            sides,
            rolls: values
                .into_iter()
                .map(|v| RollResult::new(sides, v))
                .collect(),
            counts_successes: false,
        }
    }

    pub(crate) fn kept_indices(&self) -> Vec<usize> {
        (0..self.rolls.len())
            .filter(|&i| self.rolls[i].kept)
            .collect()
    }

    pub fn kept(&self) -> impl Iterator<Item = &RollResult> + '_ {
        self.rolls.iter().filter(|r| r.kept)
    }

    fn count_kept(&self, f: impl Fn(&RollResult) -> bool) -> usize {
        self.kept().filter(|r| f(r)).count()
    }

    pub fn successes(&self) -> usize {
        self.count_kept(|r| r.flags.success)
    }

    pub fn failures(&self) -> usize {
        self.count_kept(|r| r.flags.failure)
    }

    pub fn criticals(&self) -> usize {
        self.count_kept(|r| r.flags.critical)
    }

    pub fn fumbles(&self) -> usize {
        self.count_kept(|r| r.flags.fumble)
    }

    /// The term's value: the sum of kept rolls, or successes minus failures
    /// once success counting is in effect.
    pub fn total(&self) -> EResult<Int> {
        if self.counts_successes {
            let successes = Int::try_from(self.successes()).map_err(|_| EvalError::Overflow)?;
            let failures = Int::try_from(self.failures()).map_err(|_| EvalError::Overflow)?;
            Ok(successes - failures)
        } else {
            self.kept()
                .try_fold(0 as Int, |acc, r| acc.checked_add(r.value))
                .ok_or(EvalError::Overflow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_exclusive() {
        let mut flags = RollFlags::default();
        flags.mark(Flag::Success);
        flags.mark(Flag::Critical);
        assert!(flags.success && flags.critical);

        flags.mark(Flag::Fumble);
        assert!(flags.fumble);
        assert!(!flags.success && !flags.critical);

        flags.mark(Flag::Failure);
        assert!(flags.failure && flags.fumble);
    }

    #[test]
    fn test_replace_links_history() {
        let mut roll = RollResult::new(6, 1);
        roll.explosion_of = Some(0);
        roll.replace(2);
        roll.replace(5);

        assert_eq!(roll.value, 5);
        assert_eq!(roll.rerolls(), 2);
        assert_eq!(roll.history(), vec![1, 2, 5]);
        assert_eq!(roll.explosion_of, Some(0));
        assert_eq!(roll.rerolled_from.as_ref().unwrap().value, 2);
    }

    #[test]
    fn test_total() {
        let mut pool = DicePool::new(3, 6, [4, 2, 6]);
        assert_eq!(pool.total(), Ok(12));

        pool.rolls[1].kept = false;
        assert_eq!(pool.total(), Ok(10));

        pool.rolls[0].flags.mark(Flag::Success);
        pool.rolls[2].flags.mark(Flag::Success);
        pool.counts_successes = true;
        assert_eq!(pool.total(), Ok(2));
    }

    #[test]
    fn test_total_overflow() {
        let pool = DicePool::new(2, Int::MAX, [Int::MAX, 1]);
        assert_eq!(pool.total(), Err(EvalError::Overflow));
    }
}
