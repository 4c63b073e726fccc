//! Evolutionary opponent generation.
//!
//! One [`EvolutionEngine::find_champion`] call is one generation: build a
//! population of genomes around the stored parents, evaluate every candidate
//! with a fast-forward battle against the current player, score fitness and
//! pick the champion and its breeding partner. The ~100 evaluations are
//! independent (each owns cloned snapshots and a decorrelated RNG stream)
//! and run concurrently on the blocking pool; selection sorts by fitness, so
//! completion order never changes the result.

use std::sync::Arc;

use game_core::genome::codec;
use game_core::{
    BattleReport, CharacterSnapshot, CombatRng, CombatSetupError, CombatSimulator, Genome,
    GenomeContext, Pcg32, ResourcePools, SimConfig, SimMode, Tick, Verdict, mix_seed,
};
use tokio::task::JoinSet;

use crate::error::{Result, RuntimeError};
use crate::oracle::CatalogManager;

/// Fitness weights applied to one evaluated battle.
#[derive(Clone, Copy, Debug)]
pub struct FitnessWeights {
    /// Per point of damage dealt to the player.
    pub damage: f64,
    /// Per second of battle duration.
    pub duration: f64,
    /// Flat bonus for defeating the player.
    pub win_bonus: f64,
    /// Per point of the candidate's remaining health.
    pub remaining_health: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            damage: 2.0,
            duration: 8.0,
            win_bonus: 400.0,
            remaining_health: 0.5,
        }
    }
}

/// Tunables for one generation.
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Share of fresh random genomes when both parents exist.
    pub random_share: f64,
    /// Share of single-parent mutants, per parent, when both parents exist.
    pub mutate_share: f64,
    /// Minimum gear budget for opponents of unequipped players.
    pub gear_budget_floor: u32,
    pub weights: FitnessWeights,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            random_share: 0.20,
            mutate_share: 0.24,
            gear_budget_floor: 50,
            weights: FitnessWeights::default(),
        }
    }
}

/// One scored member of a generation.
#[derive(Clone, Debug)]
pub struct EvaluatedCandidate {
    pub genome: Genome,
    pub fitness: f64,
    pub damage_to_player: u64,
    pub battle_duration: Tick,
    pub won: bool,
    /// The concrete opponent character the genome was evaluated as.
    pub character: CharacterSnapshot,
}

/// Champion of a generation plus the partner it will breed with next round.
#[derive(Clone, Debug)]
pub struct Champion {
    pub champion: EvaluatedCandidate,
    /// Rank-1 genome, or the champion's own when the population collapsed.
    pub partner_genome: Genome,
}

/// Executes one battle. Abstracted so progression and selection tests can
/// stub guaranteed outcomes; the production impl wraps [`CombatSimulator`].
pub trait BattleRunner: Send + Sync {
    /// Run `player` (side A) against `opponent` (side B).
    fn run(
        &self,
        player: &CharacterSnapshot,
        opponent: &CharacterSnapshot,
        mode: SimMode,
        seed: u64,
    ) -> std::result::Result<BattleReport, CombatSetupError>;
}

/// Production battle runner backed by the deterministic simulator.
pub struct SimulatorRunner {
    catalogs: Arc<CatalogManager>,
    simulator: CombatSimulator,
}

impl SimulatorRunner {
    pub fn new(catalogs: Arc<CatalogManager>) -> Self {
        Self {
            catalogs,
            simulator: CombatSimulator::new(SimConfig::default()),
        }
    }

    pub fn with_config(catalogs: Arc<CatalogManager>, config: SimConfig) -> Self {
        Self {
            catalogs,
            simulator: CombatSimulator::new(config),
        }
    }
}

impl BattleRunner for SimulatorRunner {
    fn run(
        &self,
        player: &CharacterSnapshot,
        opponent: &CharacterSnapshot,
        mode: SimMode,
        seed: u64,
    ) -> std::result::Result<BattleReport, CombatSetupError> {
        let mut rng = Pcg32::new(seed);
        self.simulator.run_duel(
            player,
            opponent,
            self.catalogs.as_ref(),
            self.catalogs.as_ref(),
            mode,
            &mut rng,
        )
    }
}

/// Breeds and evaluates opponent generations.
pub struct EvolutionEngine {
    catalogs: Arc<CatalogManager>,
    runner: Arc<dyn BattleRunner>,
    config: EvolutionConfig,
}

impl EvolutionEngine {
    pub fn new(
        catalogs: Arc<CatalogManager>,
        runner: Arc<dyn BattleRunner>,
        config: EvolutionConfig,
    ) -> Self {
        Self {
            catalogs,
            runner,
            config,
        }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Codec context for breeding opponents of `player`.
    pub fn genome_context(&self, player: &CharacterSnapshot) -> GenomeContext {
        self.catalogs
            .genome_context(player, self.config.gear_budget_floor)
    }

    /// Run one full generation and select champion + partner.
    pub async fn find_champion(
        &self,
        player: &CharacterSnapshot,
        parent_a: Option<&Genome>,
        parent_b: Option<&Genome>,
        round: u32,
        seed: u64,
    ) -> Result<Champion> {
        let ctx = self.genome_context(player);
        let population = self.build_population(&ctx, parent_a, parent_b, seed);
        let population_size = population.len();

        let mut tasks: JoinSet<std::result::Result<EvaluatedCandidate, CombatSetupError>> =
            JoinSet::new();
        for (index, genome) in population.into_iter().enumerate() {
            let runner = Arc::clone(&self.runner);
            let player = player.clone();
            let opponent = materialize_opponent(&genome, player.level, round, index);
            let weights = self.config.weights;
            let candidate_seed = mix_seed(seed, index as u64);
            tasks.spawn_blocking(move || {
                let report =
                    runner.run(&player, &opponent, SimMode::FastForward, candidate_seed)?;
                Ok(score_candidate(genome, opponent, &report, &weights))
            });
        }

        let mut evaluated = Vec::with_capacity(population_size);
        while let Some(joined) = tasks.join_next().await {
            let candidate = joined
                .map_err(|e| RuntimeError::EvaluationFailed(e.to_string()))?
                .map_err(RuntimeError::Setup)?;
            evaluated.push(candidate);
        }

        // Ties break on the stable opponent id so join order never matters.
        evaluated.sort_by(|a, b| {
            b.fitness
                .total_cmp(&a.fitness)
                .then_with(|| a.character.id.cmp(&b.character.id))
        });
        let mut ranked = evaluated.into_iter();
        let champion = ranked.next().ok_or(RuntimeError::EmptyPopulation)?;
        let partner_genome = ranked
            .next()
            .map(|second| second.genome)
            .unwrap_or_else(|| champion.genome.clone());

        tracing::info!(
            round,
            population = population_size,
            champion_fitness = champion.fitness,
            champion_won = champion.won,
            "generation evaluated"
        );

        Ok(Champion {
            champion,
            partner_genome,
        })
    }

    /// Seed the parents, then fill with the operator mix.
    fn build_population(
        &self,
        ctx: &GenomeContext,
        parent_a: Option<&Genome>,
        parent_b: Option<&Genome>,
        seed: u64,
    ) -> Vec<Genome> {
        let mut rng = Pcg32::new(mix_seed(seed, u64::from(u32::MAX)));
        let size = self.config.population_size.max(1);
        let mut population = Vec::with_capacity(size);

        for parent in [parent_a, parent_b].into_iter().flatten() {
            if population.len() < size {
                population.push(codec::normalize(parent.clone(), ctx, &mut rng));
            }
        }

        let lone_parent = match (parent_a, parent_b) {
            (Some(p), None) | (None, Some(p)) => Some(p),
            _ => None,
        };

        while population.len() < size {
            let genome = match (parent_a, parent_b) {
                (Some(a), Some(b)) => {
                    let roll = rng.next_f64();
                    if roll < self.config.random_share {
                        codec::random(ctx, &mut rng)
                    } else if roll < self.config.random_share + self.config.mutate_share {
                        codec::mutate(a, ctx, &mut rng)
                    } else if roll < self.config.random_share + 2.0 * self.config.mutate_share {
                        codec::mutate(b, ctx, &mut rng)
                    } else {
                        codec::breed(a, b, ctx, &mut rng)
                    }
                }
                _ => match lone_parent {
                    // Majority-random fill around a single survivor.
                    Some(p) if rng.chance(0.4) => codec::mutate(p, ctx, &mut rng),
                    _ => codec::random(ctx, &mut rng),
                },
            };
            population.push(genome);
        }

        population
    }
}

/// Turn a genome into a concrete opponent character.
///
/// The id is stable for a given round and population index, so re-running a
/// seeded generation materializes identical opponents.
pub fn materialize_opponent(
    genome: &Genome,
    level: u32,
    round: u32,
    index: usize,
) -> CharacterSnapshot {
    CharacterSnapshot {
        id: format!("challenger-r{round}-{index:03}"),
        name: format!("Challenger {round}.{index}"),
        level,
        basic_type: genome.basic_type.unwrap_or(game_core::BasicType::Melee),
        attributes: genome.attributes,
        rotation: genome.rotation.clone(),
        equipment: genome.equipment.clone(),
        // Full pools; the simulator clamps to computed maximums.
        resources: ResourcePools::new(u32::MAX, u32::MAX, u32::MAX),
        heal_threshold: genome.behavior.map(|b| b.heal_threshold),
    }
}

fn score_candidate(
    genome: Genome,
    character: CharacterSnapshot,
    report: &BattleReport,
    weights: &FitnessWeights,
) -> EvaluatedCandidate {
    let won = report.verdict == Verdict::SideB;
    let damage_to_player = report.damage_dealt_by(&character.id);
    let remaining_health = report
        .side_b
        .first()
        .map(|s| s.resources.health)
        .unwrap_or(0);
    let fitness = weights.damage * damage_to_player as f64
        + weights.duration * report.duration.as_secs_f64()
        + if won { weights.win_bonus } else { 0.0 }
        + weights.remaining_health * f64::from(remaining_health);
    EvaluatedCandidate {
        genome,
        fitness,
        damage_to_player,
        battle_duration: report.duration,
        won,
        character,
    }
}
