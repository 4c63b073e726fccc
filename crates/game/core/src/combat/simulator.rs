//! The battle loop.
//!
//! Runs a full fight between two sides (one or more combatants each) to a
//! deterministic outcome. The same loop serves live matches and fast-forward
//! fitness evaluation; the mode only decides whether the ordered event list
//! is retained.

use std::collections::BTreeMap;

use crate::character::{CharacterId, CharacterSnapshot};
use crate::config::SimConfig;
use crate::env::{AbilityOracle, CombatRng, EquipmentOracle};
use crate::stats::ResourcePools;
use crate::tick::Tick;

use super::CombatSetupError;
use super::effect::{resolve_effect, roll_damage};
use super::log::{BattleLog, CombatEvent, CombatEventKind};
use super::rotation::{TurnAction, decide_action};
use super::state::Combatant;

/// Invocation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimMode {
    /// Retain the full ordered event log (real matches).
    Live,
    /// Keep aggregates only (fitness evaluation).
    FastForward,
}

/// How the battle ended.
///
/// The iteration cap resolves to an explicit [`Verdict::Timeout`]; it never
/// credits either side with a win.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    SideA,
    SideB,
    Timeout,
}

/// Final resource state of one combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSummary {
    pub id: CharacterId,
    pub name: String,
    pub resources: ResourcePools,
    pub max_health: u32,
}

/// Outcome of one battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleReport {
    pub verdict: Verdict,
    /// Simulated time at which the battle ended.
    pub duration: Tick,
    /// Turn-loop iterations consumed.
    pub turns: u32,
    /// Ordered events; empty in fast-forward mode.
    pub events: Vec<CombatEvent>,
    /// Total damage dealt, attributed per combatant id (all modes).
    pub damage_by: BTreeMap<CharacterId, u64>,
    pub side_a: Vec<CombatantSummary>,
    pub side_b: Vec<CombatantSummary>,
}

impl BattleReport {
    /// Total damage dealt by one combatant.
    pub fn damage_dealt_by(&self, id: &str) -> u64 {
        self.damage_by.get(id).copied().unwrap_or(0)
    }
}

/// Which side a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// Deterministic turn-based battle resolver.
#[derive(Clone, Debug, Default)]
pub struct CombatSimulator {
    config: SimConfig,
}

impl CombatSimulator {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Run a battle between two sides.
    ///
    /// Validation happens before any turn executes: a bad rotation or a
    /// dangling catalog id returns an error with no partial state.
    pub fn run(
        &self,
        side_a: &[CharacterSnapshot],
        side_b: &[CharacterSnapshot],
        abilities: &dyn AbilityOracle,
        items: &dyn EquipmentOracle,
        mode: SimMode,
        rng: &mut dyn CombatRng,
    ) -> Result<BattleReport, CombatSetupError> {
        let mut a: Vec<Combatant> = side_a
            .iter()
            .map(|s| Combatant::from_snapshot(s, abilities, items))
            .collect::<Result<_, _>>()?;
        let mut b: Vec<Combatant> = side_b
            .iter()
            .map(|s| Combatant::from_snapshot(s, abilities, items))
            .collect::<Result<_, _>>()?;

        let mut log = BattleLog::new(mode == SimMode::Live);
        let mut clock = Tick::ZERO;
        let mut turns = 0u32;

        let verdict = loop {
            if turns >= self.config.iteration_cap {
                log.push(CombatEvent {
                    at: clock,
                    source: String::new(),
                    target: None,
                    kind: CombatEventKind::Timeout,
                });
                break Verdict::Timeout;
            }
            turns += 1;

            // Acting side: smallest next_action_at wins; on a tie the
            // first-listed combatant (side A, then listing order) acts.
            // Deliberate asymmetry, load-bearing for reproducibility.
            let (side, idx) = match select_actor(&a, &b) {
                Some(actor) => actor,
                None => break Verdict::Timeout,
            };
            let now = match side {
                Side::A => a[idx].next_action_at,
                Side::B => b[idx].next_action_at,
            };
            clock = now;

            // Aura upkeep for everyone at the acting timestamp.
            for combatant in a.iter_mut().chain(b.iter_mut()) {
                combatant.tick_auras(now, &mut log);
            }
            if let Some(v) = decide_deaths(&a, &b, now, &mut log) {
                break v;
            }

            let (actor, opponents) = match side {
                Side::A => (&mut a[idx], &mut b),
                Side::B => (&mut b[idx], &mut a),
            };

            // Stunned actors lose the turn but their clock still advances:
            // stuns cost tempo, they are not a permanent lock.
            if actor.stun_until > now {
                log.push(CombatEvent {
                    at: now,
                    source: actor.id.clone(),
                    target: None,
                    kind: CombatEventKind::StunSkipped,
                });
                actor.next_action_at = now.plus(actor.stats.attack_interval);
                continue;
            }

            let Some(target_idx) = opponents.iter().position(|c| c.is_alive()) else {
                // Opposing side died during upkeep; handled above, but a
                // fully dead side with a live clock still terminates here.
                break match side {
                    Side::A => Verdict::SideA,
                    Side::B => Verdict::SideB,
                };
            };
            let target = &mut opponents[target_idx];

            match decide_action(actor, abilities, now) {
                TurnAction::Ability(id) => {
                    if let Some(def) = abilities.ability(&id).cloned() {
                        for effect in &def.effects {
                            resolve_effect(effect, &def, actor, target, now, rng, &mut log);
                        }
                    }
                }
                TurnAction::BasicAttack => {
                    let school = actor.basic_school();
                    let amount = roll_damage(actor, target, school, 0, now, rng);
                    target.take_damage(amount);
                    log.push(CombatEvent {
                        at: now,
                        source: actor.id.clone(),
                        target: Some(target.id.clone()),
                        kind: CombatEventKind::BasicAttack { amount },
                    });
                }
            }

            actor.next_action_at = now.plus(actor.stats.attack_interval);

            if let Some(v) = decide_deaths(&a, &b, now, &mut log) {
                break v;
            }
        };

        let (events, damage_by) = log.into_parts();
        Ok(BattleReport {
            verdict,
            duration: clock,
            turns,
            events,
            damage_by,
            side_a: a.iter().map(summarize).collect(),
            side_b: b.iter().map(summarize).collect(),
        })
    }

    /// Convenience wrapper for the common one-on-one case.
    pub fn run_duel(
        &self,
        a: &CharacterSnapshot,
        b: &CharacterSnapshot,
        abilities: &dyn AbilityOracle,
        items: &dyn EquipmentOracle,
        mode: SimMode,
        rng: &mut dyn CombatRng,
    ) -> Result<BattleReport, CombatSetupError> {
        self.run(
            core::slice::from_ref(a),
            core::slice::from_ref(b),
            abilities,
            items,
            mode,
            rng,
        )
    }
}

/// Pick the next actor: minimum `next_action_at` over all living combatants,
/// visiting side A before side B and each side in listing order, with a
/// strict `<` comparison so the first-listed combatant wins every tie.
fn select_actor(a: &[Combatant], b: &[Combatant]) -> Option<(Side, usize)> {
    let mut best: Option<(Side, usize, Tick)> = None;
    let candidates = a
        .iter()
        .enumerate()
        .map(|(i, c)| (Side::A, i, c))
        .chain(b.iter().enumerate().map(|(i, c)| (Side::B, i, c)));
    for (side, idx, combatant) in candidates {
        if !combatant.is_alive() {
            continue;
        }
        let at = combatant.next_action_at;
        if best.is_none_or(|(_, _, t)| at < t) {
            best = Some((side, idx, at));
        }
    }
    best.map(|(side, idx, _)| (side, idx))
}

/// Terminal check: a side is dead when all its members are.
fn decide_deaths(
    a: &[Combatant],
    b: &[Combatant],
    now: Tick,
    log: &mut BattleLog,
) -> Option<Verdict> {
    let a_dead = a.iter().all(|c| !c.is_alive());
    let b_dead = b.iter().all(|c| !c.is_alive());
    if !a_dead && !b_dead {
        return None;
    }
    // Simultaneous wipes (mutual poison) credit side A, consistent with the
    // first-listed tie-break everywhere else.
    let fallen = if b_dead { b } else { a };
    if let Some(last) = fallen.last() {
        log.push(CombatEvent {
            at: now,
            source: last.id.clone(),
            target: Some(last.id.clone()),
            kind: CombatEventKind::Defeated,
        });
    }
    Some(if b_dead { Verdict::SideA } else { Verdict::SideB })
}

fn summarize(combatant: &Combatant) -> CombatantSummary {
    CombatantSummary {
        id: combatant.id.clone(),
        name: combatant.name.clone(),
        resources: combatant.resources,
        max_health: combatant.stats.maximums.health,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::testkit;
    use crate::env::Pcg32;

    fn sim() -> CombatSimulator {
        CombatSimulator::new(SimConfig::default())
    }

    #[test]
    fn battle_terminates_with_a_death_verdict() {
        let catalogs = testkit::catalogs();
        let a = testkit::melee_snapshot("warrior");
        let b = testkit::magic_snapshot("mage");
        let report = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::Live, &mut Pcg32::new(5))
            .unwrap();
        assert!(matches!(report.verdict, Verdict::SideA | Verdict::SideB));
        assert!(report.turns < SimConfig::DEFAULT_ITERATION_CAP);
        assert!(!report.events.is_empty());
    }

    #[test]
    fn fixed_seed_reproduces_the_battle_exactly() {
        let catalogs = testkit::catalogs();
        let a = testkit::melee_snapshot("warrior");
        let b = testkit::magic_snapshot("mage");
        let first = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::Live, &mut Pcg32::new(77))
            .unwrap();
        let second = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::Live, &mut Pcg32::new(77))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tie_break_favors_the_first_listed_combatant() {
        let catalogs = testkit::catalogs();
        // Identical twins: every next_action_at collides, so side A must act
        // first every time and land the first hit.
        let a = testkit::melee_snapshot("first");
        let b = testkit::melee_snapshot("second");
        let report = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::Live, &mut Pcg32::new(1))
            .unwrap();
        let first_attack = report
            .events
            .iter()
            .find(|e| matches!(e.kind, CombatEventKind::BasicAttack { .. } | CombatEventKind::AbilityDamage { .. }))
            .unwrap();
        assert_eq!(first_attack.source, "first");
    }

    #[test]
    fn mirror_match_ends_by_death() {
        // With identical builds and a shared RNG stream the tie-break tempo
        // advantage is decisive for side A's first strike; the match still
        // must end by death, not timeout.
        let catalogs = testkit::catalogs();
        let a = testkit::melee_snapshot("first");
        let b = testkit::melee_snapshot("second");
        let report = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::FastForward, &mut Pcg32::new(2))
            .unwrap();
        assert_ne!(report.verdict, Verdict::Timeout);
    }

    #[test]
    fn unkillable_pair_times_out_with_no_winner() {
        let catalogs = testkit::catalogs();
        let mut a = testkit::melee_snapshot("tank-a");
        let mut b = testkit::melee_snapshot("tank-b");
        // Pure constitution, no rotation: tiny basic hits against hundreds of
        // health cannot decide the fight inside a tight cap.
        for s in [&mut a, &mut b] {
            s.attributes = crate::stats::Attributes::new(0, 0, 40, 0, 0);
            s.rotation.clear();
            s.resources = crate::stats::ResourcePools::new(u32::MAX, 0, 0);
        }
        let tight = CombatSimulator::new(SimConfig::with_iteration_cap(50));
        let report = tight
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::FastForward, &mut Pcg32::new(9))
            .unwrap();
        assert_eq!(report.verdict, Verdict::Timeout);
        assert_eq!(report.turns, 50);
    }

    #[test]
    fn fast_forward_matches_live_aggregates() {
        let catalogs = testkit::catalogs();
        let a = testkit::melee_snapshot("warrior");
        let b = testkit::magic_snapshot("mage");
        let live = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::Live, &mut Pcg32::new(13))
            .unwrap();
        let fast = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::FastForward, &mut Pcg32::new(13))
            .unwrap();
        assert_eq!(live.verdict, fast.verdict);
        assert_eq!(live.duration, fast.duration);
        assert_eq!(live.damage_by, fast.damage_by);
        assert!(fast.events.is_empty());
    }

    #[test]
    fn stunned_turns_advance_the_clock() {
        let catalogs = testkit::catalogs();
        let a = testkit::melee_snapshot("staggered");
        let b = testkit::magic_snapshot("mage");
        // Pre-stun side A via a long opening stun from side B's rotation is
        // hard to arrange declaratively; instead run a normal battle and
        // assert any StunSkipped event is followed by later actions from the
        // same combatant.
        let report = sim()
            .run_duel(&a, &b, &catalogs, &catalogs, SimMode::Live, &mut Pcg32::new(21))
            .unwrap();
        if let Some(pos) = report
            .events
            .iter()
            .position(|e| matches!(e.kind, CombatEventKind::StunSkipped))
        {
            let stunned = report.events[pos].source.clone();
            let acted_later = report.events[pos + 1..]
                .iter()
                .any(|e| e.source == stunned && !matches!(e.kind, CombatEventKind::StunSkipped));
            let battle_ended_first = report.events[pos + 1..]
                .iter()
                .all(|e| e.source != stunned || matches!(e.kind, CombatEventKind::Defeated));
            assert!(acted_later || battle_ended_first);
        }
    }

    #[test]
    fn party_fights_a_boss() {
        let catalogs = testkit::catalogs();
        let party = [
            testkit::melee_snapshot("front"),
            testkit::magic_snapshot("back"),
        ];
        let mut boss = testkit::melee_snapshot("boss");
        boss.attributes = crate::stats::Attributes::new(14, 6, 14, 0, 0);
        boss.resources = crate::stats::ResourcePools::new(u32::MAX, 0, u32::MAX);
        let report = sim()
            .run(
                &party,
                core::slice::from_ref(&boss),
                &catalogs,
                &catalogs,
                SimMode::FastForward,
                &mut Pcg32::new(3),
            )
            .unwrap();
        assert!(matches!(
            report.verdict,
            Verdict::SideA | Verdict::SideB | Verdict::Timeout
        ));
        assert_eq!(report.side_a.len(), 2);
        assert_eq!(report.side_b.len(), 1);
    }
}
