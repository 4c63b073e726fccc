//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use game_core::{
    AbilityDef, Attributes, BattleReport, CharacterSnapshot, CombatSetupError, CombatantSummary,
    CostKind, EffectKind, EquipSlot, ItemDef, ResourceCost, ResourcePools, Resistances, School,
    SimMode, Tick, Verdict,
};
use runtime::{
    BattleRunner, CatalogManager, ChallengeRepository, ChallengeService, CharacterService,
    EvolutionConfig, EvolutionEngine, InMemoryChallengeRepo,
};

/// Route tracing output through the test harness capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn catalogs() -> CatalogManager {
    let abilities = vec![
        AbilityDef {
            id: "strike".to_string(),
            name: "Strike".to_string(),
            school: School::Physical,
            cost: ResourceCost {
                kind: CostKind::Stamina,
                value: 10,
            },
            cooldown: Tick(4_000),
            effects: vec![EffectKind::PhysicalDamage { value: 8 }],
        },
        AbilityDef {
            id: "bolt".to_string(),
            name: "Bolt".to_string(),
            school: School::Magic,
            cost: ResourceCost {
                kind: CostKind::Mana,
                value: 12,
            },
            cooldown: Tick(3_000),
            effects: vec![EffectKind::MagicDamage { value: 10 }],
        },
        AbilityDef {
            id: "mend".to_string(),
            name: "Mend".to_string(),
            school: School::Magic,
            cost: ResourceCost {
                kind: CostKind::Mana,
                value: 20,
            },
            cooldown: Tick(6_000),
            effects: vec![EffectKind::Heal { value: 40 }],
        },
    ];
    let items = vec![
        ItemDef {
            id: "iron-helm".to_string(),
            name: "Iron Helm".to_string(),
            slot: EquipSlot::Head,
            cost: 25,
            attribute_bonuses: Attributes {
                constitution: 2,
                ..Attributes::default()
            },
            resistances: Resistances {
                physical: 0.05,
                magic: 0.0,
            },
            health_bonus: 10,
            mana_bonus: 0,
            stamina_bonus: 0,
        },
        ItemDef {
            id: "oak-shield".to_string(),
            name: "Oak Shield".to_string(),
            slot: EquipSlot::OffHand,
            cost: 30,
            attribute_bonuses: Attributes::default(),
            resistances: Resistances {
                physical: 0.10,
                magic: 0.05,
            },
            health_bonus: 0,
            mana_bonus: 0,
            stamina_bonus: 0,
        },
    ];
    CatalogManager::new(abilities, items)
}

pub fn player(id: &str) -> CharacterSnapshot {
    let mut equipment = BTreeMap::new();
    equipment.insert(EquipSlot::Head, "iron-helm".to_string());
    CharacterSnapshot {
        id: id.to_string(),
        name: "Hero".to_string(),
        level: 5,
        basic_type: game_core::BasicType::Melee,
        attributes: Attributes {
            strength: 8,
            dexterity: 6,
            constitution: 6,
            intellect: 2,
            willpower: 3,
        },
        rotation: vec!["strike".to_string(), "bolt".to_string(), "mend".to_string()],
        equipment,
        resources: ResourcePools::new(u32::MAX, u32::MAX, u32::MAX),
        heal_threshold: None,
    }
}

pub struct StaticCharacters(pub HashMap<String, CharacterSnapshot>);

impl StaticCharacters {
    pub fn with_hero() -> Self {
        let mut map = HashMap::new();
        map.insert("hero".to_string(), player("hero"));
        Self(map)
    }
}

impl CharacterService for StaticCharacters {
    fn snapshot(&self, id: &str) -> Option<CharacterSnapshot> {
        self.0.get(id).cloned()
    }

    fn xp_for_next_level(&self, level: u32) -> u64 {
        u64::from(level) * 200
    }
}

#[derive(Clone, Copy)]
pub enum Script {
    PlayerWins,
    OpponentWins,
    Timeout,
}

/// Battle runner with a scripted verdict and fixed aggregates.
pub struct ScriptedRunner(pub Script);

impl BattleRunner for ScriptedRunner {
    fn run(
        &self,
        player: &CharacterSnapshot,
        opponent: &CharacterSnapshot,
        _mode: SimMode,
        _seed: u64,
    ) -> Result<BattleReport, CombatSetupError> {
        let verdict = match self.0 {
            Script::PlayerWins => Verdict::SideA,
            Script::OpponentWins => Verdict::SideB,
            Script::Timeout => Verdict::Timeout,
        };
        let mut damage_by = BTreeMap::new();
        damage_by.insert(player.id.clone(), 300);
        damage_by.insert(opponent.id.clone(), 120);
        Ok(BattleReport {
            verdict,
            duration: Tick(45_000),
            turns: 60,
            events: Vec::new(),
            damage_by,
            side_a: vec![summary(player, 180)],
            side_b: vec![summary(opponent, 40)],
        })
    }
}

pub fn summary(snapshot: &CharacterSnapshot, health: u32) -> CombatantSummary {
    CombatantSummary {
        id: snapshot.id.clone(),
        name: snapshot.name.clone(),
        resources: ResourcePools::new(health, 50, 50),
        max_health: 200,
    }
}

/// Challenge service wired with an in-memory repository and the given
/// scripted runner.
pub fn scripted_service(script: Script) -> (Arc<ChallengeService>, Arc<InMemoryChallengeRepo>) {
    init_tracing();
    let catalogs = Arc::new(catalogs());
    let runner: Arc<dyn BattleRunner> = Arc::new(ScriptedRunner(script));
    let engine = Arc::new(EvolutionEngine::new(
        Arc::clone(&catalogs),
        Arc::clone(&runner),
        EvolutionConfig {
            population_size: 12,
            ..EvolutionConfig::default()
        },
    ));
    let repo = Arc::new(InMemoryChallengeRepo::new());
    let service = ChallengeService::new(
        Arc::clone(&repo) as Arc<dyn ChallengeRepository>,
        engine,
        Arc::new(StaticCharacters::with_hero()),
        catalogs,
        runner,
        7,
    );
    (Arc::new(service), repo)
}
