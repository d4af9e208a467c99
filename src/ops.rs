use crate::common::{Int, Predicate};
use crate::roll::{DicePool, EResult, EvalError, Flag, RollContext, RollResult};
use std::fmt;

/// A dice-term modifier. Modifiers are applied in source order, each one
/// receiving the pool left by the previous.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[enum_dispatch::enum_dispatch(Modify)]
pub enum Modifier {
    KeepHighest(KeepHighest),
    KeepLowest(KeepLowest),
    DropHighest(DropHighest),
    DropLowest(DropLowest),
    Reroll(Reroll),
    Explode(Explode),
    Advantage(Advantage),
    Disadvantage(Disadvantage),
    CountSuccesses(CountSuccesses),
    CountFailures(CountFailures),
    Critical(Critical),
    Fumble(Fumble),
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepHighest(x) => x.fmt(f),
            Self::KeepLowest(x) => x.fmt(f),
            Self::DropHighest(x) => x.fmt(f),
            Self::DropLowest(x) => x.fmt(f),
            Self::Reroll(x) => x.fmt(f),
            Self::Explode(x) => x.fmt(f),
            Self::Advantage(x) => x.fmt(f),
            Self::Disadvantage(x) => x.fmt(f),
            Self::CountSuccesses(x) => x.fmt(f),
            Self::CountFailures(x) => x.fmt(f),
            Self::Critical(x) => x.fmt(f),
            Self::Fumble(x) => x.fmt(f),
        }
    }
}

#[enum_dispatch::enum_dispatch]
pub trait Modify {
    fn apply(&self, pool: DicePool, ctx: &mut RollContext<'_>) -> EResult<DicePool>;
}

macro_rules! rank_modifier {
    ($(($name:ident, $disp:literal, keep: $keep:literal, highest: $highest:literal)),+ $(,)?) => {$(
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub struct $name(pub Int);

        impl Modify for $name {
            fn apply(&self, pool: DicePool, _: &mut RollContext<'_>) -> EResult<DicePool> {
                rank(pool, self.0, $disp, $keep, $highest)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $disp, self.0)
            }
        }
    )+};
}

rank_modifier!(
    (KeepHighest, "kh", keep: true, highest: true),
    (KeepLowest, "kl", keep: true, highest: false),
    (DropHighest, "dh", keep: false, highest: true),
    (DropLowest, "dl", keep: false, highest: false),
);

/// Orders the kept rolls from most to least extreme and keeps or drops the
/// first `n` of them. Equal values rank in roll order.
fn rank(
    mut pool: DicePool,
    n: Int,
    modifier: &'static str,
    keep: bool,
    highest: bool,
) -> EResult<DicePool> {
    let n = usize::try_from(n).map_err(|_| EvalError::ModifierCountOutOfRange { modifier, n })?;

    let mut kept = pool.kept_indices();
    kept.sort_by(|&a, &b| {
        let (a, b) = (pool.rolls[a].value, pool.rolls[b].value);
        if highest {
            b.cmp(&a)
        } else {
            a.cmp(&b)
        }
    });

    let (selected, rest) = kept.split_at(n.min(kept.len()));
    let dropped = if keep { rest } else { selected };
    for &i in dropped {
        pool.rolls[i].kept = false;
    }
    Ok(pool)
}

fn check_cap(cap: Int, modifier: &'static str) -> EResult<()> {
    if cap < 0 {
        Err(EvalError::ModifierCountOutOfRange { modifier, n: cap })
    } else {
        Ok(())
    }
}

/// Rerolls each kept die while it matches `predicate`, at most `max_rerolls`
/// times per die.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reroll {
    pub predicate: Predicate,
    pub max_rerolls: Int,
}

impl Reroll {
    pub const DEFAULT_LIMIT: Int = 100;

    pub const fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            max_rerolls: Self::DEFAULT_LIMIT,
        }
    }

    pub const fn once(predicate: Predicate) -> Self {
        Self {
            predicate,
            max_rerolls: 1,
        }
    }

    pub const fn limit(self, max_rerolls: Int) -> Self {
        Self {
            max_rerolls,
            ..self
        }
    }
}

impl Modify for Reroll {
    fn apply(&self, mut pool: DicePool, ctx: &mut RollContext<'_>) -> EResult<DicePool> {
        check_cap(self.max_rerolls, "r")?;
        if self.predicate.matches_every_face(pool.sides) {
            return Err(EvalError::UnsatisfiableReroll {
                predicate: self.predicate,
                sides: pool.sides,
            });
        }

        for i in pool.kept_indices() {
            let mut rerolls = 0;
            while rerolls < self.max_rerolls && self.predicate.matches(pool.rolls[i].value) {
                let value = ctx.roll_die(pool.sides)?;
                pool.rolls[i].replace(value);
                rerolls += 1;
            }
        }
        Ok(pool)
    }
}

impl fmt::Display for Reroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_rerolls {
            1 => write!(f, "ro{}", self.predicate),
            Self::DEFAULT_LIMIT => write!(f, "r{}", self.predicate),
            n => write!(f, "r{}x{}", self.predicate, n),
        }
    }
}

/// Adds a roll for every kept die matching the predicate, including dice added
/// this way, up to `max_explosions` additions for the whole term.
///
/// Without a predicate a die explodes on its highest face.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Explode {
    pub predicate: Option<Predicate>,
    pub max_explosions: Int,
}

impl Explode {
    pub const DEFAULT_LIMIT: Int = 100;

    pub const fn new(predicate: Option<Predicate>) -> Self {
        Self {
            predicate,
            max_explosions: Self::DEFAULT_LIMIT,
        }
    }

    pub const fn once(predicate: Option<Predicate>) -> Self {
        Self {
            predicate,
            max_explosions: 1,
        }
    }

    pub const fn limit(self, max_explosions: Int) -> Self {
        Self {
            max_explosions,
            ..self
        }
    }
}

impl Modify for Explode {
    fn apply(&self, mut pool: DicePool, ctx: &mut RollContext<'_>) -> EResult<DicePool> {
        check_cap(self.max_explosions, "!")?;
        let predicate = self.predicate.unwrap_or(Predicate::Equal(pool.sides));

        let mut added = 0;
        let mut i = 0;
        while i < pool.rolls.len() && added < self.max_explosions {
            let roll = &pool.rolls[i];
            if roll.kept && !roll.exploded && predicate.matches(roll.value) {
                let value = ctx.roll_die(pool.sides)?;
                pool.rolls[i].exploded = true;

                let mut extra = RollResult::new(pool.sides, value);
                extra.explosion_of = Some(i);
                pool.rolls.push(extra);
                added += 1;
            }
            i += 1;
        }
        Ok(pool)
    }
}

impl fmt::Display for Explode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.max_explosions == 1 { "!o" } else { "!" })?;
        if let Some(predicate) = &self.predicate {
            write!(f, "{}", predicate)?;
        }
        match self.max_explosions {
            1 | Self::DEFAULT_LIMIT => Ok(()),
            n => write!(f, "x{}", n),
        }
    }
}

/// Rolls a second die and keeps the better one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Advantage;

/// Rolls a second die and keeps the worse one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Disadvantage;

fn pick_one(
    mut pool: DicePool,
    ctx: &mut RollContext<'_>,
    modifier: &'static str,
    highest: bool,
) -> EResult<DicePool> {
    if pool.count != 1 {
        return Err(EvalError::InvalidModifierArity {
            modifier,
            count: pool.count,
        });
    }
    let value = ctx.roll_die(pool.sides)?;
    pool.rolls.push(RollResult::new(pool.sides, value));
    rank(pool, 1, modifier, true, highest)
}

impl Modify for Advantage {
    fn apply(&self, pool: DicePool, ctx: &mut RollContext<'_>) -> EResult<DicePool> {
        pick_one(pool, ctx, "adv", true)
    }
}

impl Modify for Disadvantage {
    fn apply(&self, pool: DicePool, ctx: &mut RollContext<'_>) -> EResult<DicePool> {
        pick_one(pool, ctx, "dis", false)
    }
}

impl fmt::Display for Advantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("adv")
    }
}

impl fmt::Display for Disadvantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dis")
    }
}

fn mark(mut pool: DicePool, predicate: Predicate, flag: Flag) -> DicePool {
    pool.rolls
        .iter_mut()
        .filter(|r| r.kept && predicate.matches(r.value))
        .for_each(|r| r.flags.mark(flag));
    pool
}

/// Marks matching dice as successes and switches the term to counting
/// successes instead of summing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CountSuccesses(pub Predicate);

/// Marks matching dice as failures; each one cancels a success.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CountFailures(pub Predicate);

/// Marks critical hits, by default the highest face.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Critical(pub Option<Predicate>);

/// Marks fumbles, by default a 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fumble(pub Option<Predicate>);

impl Modify for CountSuccesses {
    fn apply(&self, pool: DicePool, _: &mut RollContext<'_>) -> EResult<DicePool> {
        let mut pool = mark(pool, self.0, Flag::Success);
        pool.counts_successes = true;
        Ok(pool)
    }
}

impl Modify for CountFailures {
    fn apply(&self, pool: DicePool, _: &mut RollContext<'_>) -> EResult<DicePool> {
        Ok(mark(pool, self.0, Flag::Failure))
    }
}

impl Modify for Critical {
    fn apply(&self, pool: DicePool, _: &mut RollContext<'_>) -> EResult<DicePool> {
        let predicate = self.0.unwrap_or(Predicate::Equal(pool.sides));
        Ok(mark(pool, predicate, Flag::Critical))
    }
}

impl Modify for Fumble {
    fn apply(&self, pool: DicePool, _: &mut RollContext<'_>) -> EResult<DicePool> {
        let predicate = self.0.unwrap_or(Predicate::Equal(1));
        Ok(mark(pool, predicate, Flag::Fumble))
    }
}

impl fmt::Display for CountSuccesses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for CountFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl fmt::Display for Critical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cs")?;
        match &self.0 {
            Some(p) => write!(f, "{}", p),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Fumble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cf")?;
        match &self.0 {
            Some(p) => write!(f, "{}", p),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::roll::EvalConfig;

    fn apply(modifier: impl Into<Modifier>, pool: DicePool, script: &[Int]) -> EResult<DicePool> {
        let mut source = scripted(script);
        let mut ctx = RollContext::new(&mut source, EvalConfig::default());
        let modifier: Modifier = modifier.into();
        modifier.apply(pool, &mut ctx)
    }

    fn kept_values(pool: &DicePool) -> Vec<Int> {
        pool.kept().map(|r| r.value).collect()
    }

    #[test]
    fn test_keep_highest() {
        let pool = apply(KeepHighest(3), DicePool::new(4, 6, [1, 6, 3, 2]), &[1]).unwrap();
        assert_eq!(kept_values(&pool), vec![6, 3, 2]);
        assert!(!pool.rolls[0].kept);
    }

    #[test]
    fn test_drop_lowest() {
        let pool = apply(DropLowest(2), DicePool::new(4, 6, [4, 1, 5, 2]), &[1]).unwrap();
        assert_eq!(kept_values(&pool), vec![4, 5]);
    }

    #[test]
    fn test_keep_ties_prefer_earlier() {
        let pool = apply(KeepHighest(1), DicePool::new(3, 6, [5, 5, 2]), &[1]).unwrap();
        assert!(pool.rolls[0].kept);
        assert!(!pool.rolls[1].kept);
    }

    #[test]
    fn test_keep_count_clamped() {
        let pool = apply(KeepLowest(10), DicePool::new(2, 6, [3, 4]), &[1]).unwrap();
        assert_eq!(kept_values(&pool), vec![3, 4]);

        let pool = apply(DropHighest(10), DicePool::new(2, 6, [3, 4]), &[1]).unwrap();
        assert_eq!(pool.kept().count(), 0);
    }

    #[test]
    fn test_negative_keep_count() {
        assert_eq!(
            apply(KeepHighest(-1), DicePool::new(2, 6, [3, 4]), &[1]),
            Err(EvalError::ModifierCountOutOfRange {
                modifier: "kh",
                n: -1
            })
        );
    }

    #[test]
    fn test_reroll() {
        let pool = apply(
            Reroll::new(Predicate::Less(3)),
            DicePool::new(3, 6, [1, 5, 2]),
            &[2, 4, 6],
        )
        .unwrap();

        assert_eq!(kept_values(&pool), vec![4, 5, 6]);
        assert_eq!(pool.rolls[0].history(), vec![1, 2, 4]);
        assert_eq!(pool.rolls[2].history(), vec![2, 6]);
    }

    #[test]
    fn test_reroll_cap() {
        let pool = apply(
            Reroll::new(Predicate::Equal(1)).limit(3),
            DicePool::new(1, 6, [1]),
            &[1],
        )
        .unwrap();
        assert_eq!(pool.rolls[0].value, 1);
        assert_eq!(pool.rolls[0].rerolls(), 3);

        let pool = apply(Reroll::once(Predicate::Equal(1)), DicePool::new(1, 6, [1]), &[1]).unwrap();
        assert_eq!(pool.rolls[0].rerolls(), 1);
    }

    #[test]
    fn test_unsatisfiable_reroll() {
        assert_eq!(
            apply(
                Reroll::new(Predicate::LessOrEqual(6)),
                DicePool::new(2, 6, [1, 2]),
                &[1]
            ),
            Err(EvalError::UnsatisfiableReroll {
                predicate: Predicate::LessOrEqual(6),
                sides: 6
            })
        );
    }

    #[test]
    fn test_explode_chains() {
        let pool = apply(Explode::new(None), DicePool::new(2, 6, [6, 3]), &[6, 2]).unwrap();

        assert_eq!(kept_values(&pool), vec![6, 3, 6, 2]);
        assert!(pool.rolls[0].exploded);
        assert_eq!(pool.rolls[2].explosion_of, Some(0));
        assert_eq!(pool.rolls[3].explosion_of, Some(2));
        assert!(!pool.rolls[3].exploded);
    }

    #[test]
    fn test_explode_cap() {
        let pool = apply(Explode::new(None).limit(5), DicePool::new(2, 4, [4, 4]), &[4]).unwrap();
        assert_eq!(pool.rolls.len(), 7);

        let pool = apply(
            Explode::once(Some(Predicate::GreaterOrEqual(5))),
            DicePool::new(2, 6, [5, 6]),
            &[6],
        )
        .unwrap();
        assert_eq!(pool.rolls.len(), 3);
        assert!(!pool.rolls[1].exploded);
    }

    #[test]
    fn test_advantage() {
        let pool = apply(Advantage, DicePool::new(1, 20, [7]), &[15]).unwrap();
        assert_eq!(kept_values(&pool), vec![15]);
        assert!(!pool.rolls[0].kept);

        let pool = apply(Disadvantage, DicePool::new(1, 20, [7]), &[15]).unwrap();
        assert_eq!(kept_values(&pool), vec![7]);
    }

    #[test]
    fn test_advantage_arity() {
        assert_eq!(
            apply(Advantage, DicePool::new(2, 20, [7, 8]), &[15]),
            Err(EvalError::InvalidModifierArity {
                modifier: "adv",
                count: 2
            })
        );
    }

    #[test]
    fn test_success_counting() {
        let pool = DicePool::new(5, 10, [8, 3, 7, 1, 10]);
        let pool = apply(CountSuccesses(Predicate::GreaterOrEqual(7)), pool, &[1]).unwrap();
        let pool = apply(CountFailures(Predicate::Equal(1)), pool, &[1]).unwrap();

        assert_eq!(pool.successes(), 3);
        assert_eq!(pool.failures(), 1);
        assert_eq!(pool.total(), Ok(2));
    }

    #[test]
    fn test_critical_and_fumble_defaults() {
        let pool = DicePool::new(3, 20, [20, 1, 10]);
        let pool = apply(Critical(None), pool, &[1]).unwrap();
        let pool = apply(Fumble(None), pool, &[1]).unwrap();

        assert!(pool.rolls[0].flags.critical);
        assert!(pool.rolls[1].flags.fumble);
        assert_eq!((pool.criticals(), pool.fumbles()), (1, 1));
        assert_eq!(pool.total(), Ok(31));
    }

    #[test]
    fn test_display() {
        let cases: Vec<(Modifier, &str)> = vec![
            (KeepHighest(3).into(), "kh3"),
            (DropLowest(1).into(), "dl1"),
            (Reroll::new(Predicate::Less(3)).into(), "r<3"),
            (Reroll::once(Predicate::Equal(1)).into(), "ro1"),
            (Reroll::new(Predicate::Equal(1)).limit(5).into(), "r1x5"),
            (Explode::new(None).into(), "!"),
            (Explode::once(Some(Predicate::Greater(4))).into(), "!o>4"),
            (Explode::new(None).limit(3).into(), "!x3"),
            (Advantage.into(), "adv"),
            (CountSuccesses(Predicate::GreaterOrEqual(7)).into(), "s>=7"),
            (Critical(None).into(), "cs"),
            (Fumble(Some(Predicate::LessOrEqual(2))).into(), "cf<=2"),
        ];
        for (modifier, expected) in cases {
            assert_eq!(modifier.to_string(), expected);
        }
    }
}
