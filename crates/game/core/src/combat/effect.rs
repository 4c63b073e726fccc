//! Effect definitions and resolution.
//!
//! One [`EffectKind`] application is the smallest unit of combat: it mutates
//! the source/target pair in place and emits log events, but carries no
//! authority over the battle itself. Death and termination are the
//! simulator's business.

use crate::env::{AbilityDef, CombatRng, School};
use crate::tick::Tick;

use super::log::{BattleLog, CombatEvent, CombatEventKind};
use super::state::{ActiveBuff, ActivePoison, Combatant};

/// One effect of an ability, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Physical damage on the target, rolled with the source's melee range.
    PhysicalDamage { value: u32 },
    /// Magic damage on the target, rolled with the source's magic range.
    MagicDamage { value: u32 },
    /// Restores the source's own health, clamped to max.
    Heal { value: u32 },
    /// Additive percentage damage buff on the source for `duration`.
    BuffDamagePct { amount: f64, duration: Tick },
    /// Stuns the target; durations extend, they never stack.
    Stun { duration: Tick },
    /// Damage over time on the target.
    Poison {
        potency_per_tick: u32,
        tick_interval: Tick,
        duration: Tick,
    },
}

/// Roll a damage amount from source against target.
///
/// `raw = base + uniform(attack range)`, multiplied by the source's active
/// buff multiplier, reduced by the target's school resistance, floored at 1.
/// Shared by ability damage and basic attacks so both hit identically.
pub fn roll_damage(
    source: &Combatant,
    target: &Combatant,
    school: School,
    base: u32,
    now: Tick,
    rng: &mut dyn CombatRng,
) -> u32 {
    let range = source.stats.attack_range(school);
    let raw = base + rng.range_u32(range.min, range.max);
    let scaled =
        f64::from(raw) * source.damage_multiplier(now) * (1.0 - target.stats.resistance(school));
    (scaled.round() as u32).max(1)
}

/// Apply one effect of `ability` from source to target at `now`.
pub fn resolve_effect(
    effect: &EffectKind,
    ability: &AbilityDef,
    source: &mut Combatant,
    target: &mut Combatant,
    now: Tick,
    rng: &mut dyn CombatRng,
    log: &mut BattleLog,
) {
    match *effect {
        EffectKind::PhysicalDamage { value } => {
            apply_school_damage(ability, source, target, School::Physical, value, now, rng, log);
        }
        EffectKind::MagicDamage { value } => {
            apply_school_damage(ability, source, target, School::Magic, value, now, rng, log);
        }
        EffectKind::Heal { value } => {
            let before = source.resources.health;
            source.heal(value);
            log.push(CombatEvent {
                at: now,
                source: source.id.clone(),
                target: None,
                kind: CombatEventKind::Heal {
                    ability: ability.id.clone(),
                    amount: source.resources.health - before,
                },
            });
        }
        EffectKind::BuffDamagePct { amount, duration } => {
            let expires_at = now.plus(duration);
            // Full buff list: the oldest stays, the new application is lost.
            let _ = source.buffs.try_push(ActiveBuff { amount, expires_at });
            log.push(CombatEvent {
                at: now,
                source: source.id.clone(),
                target: None,
                kind: CombatEventKind::BuffApplied { amount, expires_at },
            });
        }
        EffectKind::Stun { duration } => {
            let until = target.stun_until.max(now.plus(duration));
            target.stun_until = until;
            log.push(CombatEvent {
                at: now,
                source: source.id.clone(),
                target: Some(target.id.clone()),
                kind: CombatEventKind::StunApplied { until },
            });
        }
        EffectKind::Poison {
            potency_per_tick,
            tick_interval,
            duration,
        } => {
            // A zero interval would make the drain loop spin forever.
            let tick_interval = Tick(tick_interval.0.max(1));
            let expires_at = now.plus(duration);
            let _ = target.poisons.try_push(ActivePoison {
                source: source.id.clone(),
                potency_per_tick,
                tick_interval,
                next_tick_at: now.plus(tick_interval),
                expires_at,
            });
            log.push(CombatEvent {
                at: now,
                source: source.id.clone(),
                target: Some(target.id.clone()),
                kind: CombatEventKind::PoisonApplied { expires_at },
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_school_damage(
    ability: &AbilityDef,
    source: &mut Combatant,
    target: &mut Combatant,
    school: School,
    base: u32,
    now: Tick,
    rng: &mut dyn CombatRng,
    log: &mut BattleLog,
) {
    let amount = roll_damage(source, target, school, base, now, rng);
    target.take_damage(amount);
    log.push(CombatEvent {
        at: now,
        source: source.id.clone(),
        target: Some(target.id.clone()),
        kind: CombatEventKind::AbilityDamage {
            ability: ability.id.clone(),
            school,
            amount,
        },
    });
}
