//! Genome construction, repair and breeding.
//!
//! [`normalize`] is the single legality gate: every operator output and every
//! genome read back from persistence passes through it, so drifted or
//! malformed data is silently repaired instead of rejected. The constructors
//! ([`random`], [`mutate`], [`breed`]) compose draws on top of it and always
//! return genomes that already satisfy the budget and catalog invariants.

use std::collections::BTreeMap;

use crate::character::BasicType;
use crate::config::SimConfig;
use crate::env::{AbilityId, CombatRng, EquipSlot, ItemId};
use crate::stats::{Attribute, Attributes};

use super::{Behavior, Genome, GenomeContext, SlotItem};

/// Exponent skewing random attribute splits toward specialist builds.
const SPLIT_BIAS: f64 = 1.4;
/// Chance a random genome fills any given equipment slot.
const EQUIP_CHANCE: f64 = 0.6;
/// Chance a mutation appends to the rotation rather than replacing a slot.
const ROTATION_APPEND_CHANCE: f64 = 0.4;
/// Chance a mutation clears the chosen equipment slot outright.
const EQUIP_CLEAR_CHANCE: f64 = 0.45;
/// Chance a mutation flips the basic attack type.
const TYPE_FLIP_CHANCE: f64 = 0.3;
/// Per-stat chance a bred attribute takes an extra ±1 nudge.
const BREED_STAT_MUTATION_CHANCE: f64 = 0.1;
/// Chance a bred genome gets a follow-up equipment mutation.
const BREED_EQUIP_MUTATION_CHANCE: f64 = 0.25;

/// Repair a genome into a game-legal one under `ctx`.
///
/// Idempotent: normalizing a normalized genome draws nothing from the RNG
/// and changes nothing.
pub fn normalize(mut genome: Genome, ctx: &GenomeContext, rng: &mut dyn CombatRng) -> Genome {
    normalize_attributes(&mut genome.attributes, ctx.total_points, rng);
    normalize_rotation(&mut genome.rotation, ctx, rng);
    normalize_equipment(&mut genome.equipment, ctx);
    if genome.basic_type.is_none() {
        genome.basic_type = Some(derive_basic_type(&genome.attributes, rng));
    }
    genome.behavior = genome.behavior.map(Behavior::clamped);
    genome
}

/// A fresh random genome.
pub fn random(ctx: &GenomeContext, rng: &mut dyn CombatRng) -> Genome {
    let mut weights = [0.0f64; 5];
    let mut weight_sum = 0.0;
    for w in &mut weights {
        *w = rng.next_f64().powf(SPLIT_BIAS);
        weight_sum += *w;
    }
    let mut attributes = Attributes::default();
    if weight_sum > 0.0 {
        for (attr, w) in Attribute::ALL.iter().zip(weights) {
            let share = (f64::from(ctx.total_points) * w / weight_sum).floor() as u32;
            attributes.set(*attr, share);
        }
    }

    let mut rotation = Vec::new();
    if !ctx.valid_ability_ids.is_empty() {
        let len = rng.range_u32(SimConfig::MIN_ROTATION as u32, SimConfig::MAX_ROTATION as u32);
        for _ in 0..len {
            rotation.push(random_ability(ctx, rng));
        }
    }

    let mut equipment = BTreeMap::new();
    for (slot, items) in &ctx.items_by_slot {
        if items.is_empty() || !rng.chance(EQUIP_CHANCE) {
            continue;
        }
        let id = match ctx.per_slot_reference_cost.get(slot) {
            Some(reference) => pick_near_cost(items, *reference, rng),
            None => items[rng.pick_index(items.len())].id.clone(),
        };
        equipment.insert(*slot, id);
    }

    let behavior = rng.chance(0.5).then(|| Behavior {
        heal_threshold: Behavior::THRESHOLD_MIN
            + rng.next_f64() * (Behavior::THRESHOLD_MAX - Behavior::THRESHOLD_MIN),
    });

    normalize(
        Genome {
            basic_type: None,
            attributes,
            rotation,
            equipment,
            behavior,
        },
        ctx,
        rng,
    )
}

/// One mutation step away from `genome`.
pub fn mutate(genome: &Genome, ctx: &GenomeContext, rng: &mut dyn CombatRng) -> Genome {
    let mut child = genome.clone();

    // Exactly one ±1 stat nudge; normalize rebalances the total.
    let attr = Attribute::ALL[rng.pick_index(Attribute::ALL.len())];
    if rng.chance(0.5) {
        child.attributes.add(attr, 1);
    } else {
        child.attributes.sub(attr, 1);
    }

    if !ctx.valid_ability_ids.is_empty() {
        let pick = random_ability(ctx, rng);
        if rng.chance(ROTATION_APPEND_CHANCE) && child.rotation.len() < SimConfig::MAX_ROTATION {
            child.rotation.push(pick);
        } else if !child.rotation.is_empty() {
            let i = rng.pick_index(child.rotation.len());
            child.rotation[i] = pick;
        } else {
            child.rotation.push(pick);
        }
    }

    mutate_equipment(&mut child.equipment, ctx, rng);

    if rng.chance(TYPE_FLIP_CHANCE) {
        child.basic_type = child.basic_type.map(|t| match t {
            BasicType::Melee => BasicType::Magic,
            BasicType::Magic => BasicType::Melee,
        });
    }

    if let Some(behavior) = &mut child.behavior
        && rng.chance(0.5)
    {
        behavior.heal_threshold += (rng.next_f64() - 0.5) * 0.2;
    }

    normalize(child, ctx, rng)
}

/// Recombine two parents into a child genome.
pub fn breed(
    parent_a: &Genome,
    parent_b: &Genome,
    ctx: &GenomeContext,
    rng: &mut dyn CombatRng,
) -> Genome {
    let mut attributes = Attributes::default();
    for attr in Attribute::ALL {
        let mut value = if rng.chance(0.5) {
            parent_a.attributes.get(attr)
        } else {
            parent_b.attributes.get(attr)
        };
        if rng.chance(BREED_STAT_MUTATION_CHANCE) {
            value = if rng.chance(0.5) {
                value.saturating_add(1)
            } else {
                value.saturating_sub(1)
            };
        }
        attributes.set(attr, value);
    }

    let mut rotation = Vec::new();
    if !ctx.valid_ability_ids.is_empty() {
        let average = (parent_a.rotation.len() + parent_b.rotation.len()) as f64 / 2.0;
        let drift = i64::from(rng.range_u32(0, 2)) - 1;
        let target = (average.round() as i64 + drift)
            .clamp(SimConfig::MIN_ROTATION as i64, SimConfig::MAX_ROTATION as i64)
            as usize;
        for _ in 0..target {
            let id = if rng.chance(0.5) && !parent_a.rotation.is_empty() {
                parent_a.rotation[rng.pick_index(parent_a.rotation.len())].clone()
            } else if rng.chance(0.7) && !parent_b.rotation.is_empty() {
                parent_b.rotation[rng.pick_index(parent_b.rotation.len())].clone()
            } else {
                random_ability(ctx, rng)
            };
            rotation.push(id);
        }
    }

    let mut equipment = BTreeMap::new();
    let slots: Vec<EquipSlot> = parent_a
        .equipment
        .keys()
        .chain(parent_b.equipment.keys())
        .copied()
        .collect();
    for slot in slots {
        let inherited = if rng.chance(0.5) {
            parent_a.equipment.get(&slot)
        } else {
            parent_b.equipment.get(&slot)
        };
        if let Some(id) = inherited {
            equipment.insert(slot, id.clone());
        }
    }
    if rng.chance(BREED_EQUIP_MUTATION_CHANCE) {
        mutate_equipment(&mut equipment, ctx, rng);
    }

    let basic_type = match rng.range_u32(0, 9) {
        0..=3 => parent_a.basic_type,
        4..=7 => parent_b.basic_type,
        // Re-derive from the bred attributes via normalize.
        _ => None,
    };

    let behavior = match (parent_a.behavior, parent_b.behavior) {
        (Some(a), Some(b)) => Some(Behavior {
            heal_threshold: (a.heal_threshold + b.heal_threshold) / 2.0,
        }),
        (one, other) => one.or(other),
    };

    normalize(
        Genome {
            basic_type,
            attributes,
            rotation,
            equipment,
            behavior,
        },
        ctx,
        rng,
    )
}

// ============================================================================
// Repair steps
// ============================================================================

fn normalize_attributes(attributes: &mut Attributes, budget: u32, rng: &mut dyn CombatRng) {
    if attributes.total() == 0 && budget > 0 {
        let attr = Attribute::ALL[rng.pick_index(Attribute::ALL.len())];
        attributes.set(attr, budget);
        return;
    }
    while attributes.total() > budget {
        let positive: Vec<Attribute> = Attribute::ALL
            .iter()
            .copied()
            .filter(|a| attributes.get(*a) > 0)
            .collect();
        let attr = positive[rng.pick_index(positive.len())];
        attributes.sub(attr, 1);
    }
    while attributes.total() < budget {
        let attr = Attribute::ALL[rng.pick_index(Attribute::ALL.len())];
        attributes.add(attr, 1);
    }
}

fn normalize_rotation(rotation: &mut Vec<AbilityId>, ctx: &GenomeContext, rng: &mut dyn CombatRng) {
    rotation.retain(|id| ctx.valid_ability_ids.contains(id));
    if ctx.valid_ability_ids.is_empty() {
        return;
    }
    while rotation.len() < SimConfig::MIN_ROTATION {
        rotation.push(random_ability(ctx, rng));
    }
    rotation.truncate(SimConfig::MAX_ROTATION);
}

fn normalize_equipment(equipment: &mut BTreeMap<EquipSlot, ItemId>, ctx: &GenomeContext) {
    equipment.retain(|slot, id| matches!(ctx.lookup(id), Some((item_slot, _)) if item_slot == *slot));
    // Most expensive first until the gold budget holds.
    while ctx.equipment_cost(equipment) > ctx.gear_budget {
        let Some(priciest) = equipment
            .iter()
            .max_by_key(|(_, id)| ctx.lookup(id).map(|(_, cost)| cost).unwrap_or(0))
            .map(|(slot, _)| *slot)
        else {
            break;
        };
        equipment.remove(&priciest);
    }
}

fn derive_basic_type(attributes: &Attributes, rng: &mut dyn CombatRng) -> BasicType {
    match attributes.strength.cmp(&attributes.intellect) {
        core::cmp::Ordering::Greater => BasicType::Melee,
        core::cmp::Ordering::Less => BasicType::Magic,
        core::cmp::Ordering::Equal => {
            if rng.chance(0.5) {
                BasicType::Melee
            } else {
                BasicType::Magic
            }
        }
    }
}

// ============================================================================
// Draw helpers
// ============================================================================

fn random_ability(ctx: &GenomeContext, rng: &mut dyn CombatRng) -> AbilityId {
    ctx.valid_ability_ids[rng.pick_index(ctx.valid_ability_ids.len())].clone()
}

/// Weighted pick favoring items priced near the reference cost.
fn pick_near_cost(items: &[SlotItem], reference: u32, rng: &mut dyn CombatRng) -> ItemId {
    let weights: Vec<f64> = items
        .iter()
        .map(|item| 1.0 / (1.0 + f64::from(item.cost.abs_diff(reference))))
        .collect();
    let total: f64 = weights.iter().sum();
    let mut roll = rng.next_f64() * total;
    for (item, weight) in items.iter().zip(&weights) {
        roll -= weight;
        if roll <= 0.0 {
            return item.id.clone();
        }
    }
    items[items.len() - 1].id.clone()
}

/// Clear (or reroll within the remaining budget) one random slot.
fn mutate_equipment(
    equipment: &mut BTreeMap<EquipSlot, ItemId>,
    ctx: &GenomeContext,
    rng: &mut dyn CombatRng,
) {
    let slots: Vec<EquipSlot> = ctx.items_by_slot.keys().copied().collect();
    if slots.is_empty() {
        return;
    }
    let slot = slots[rng.pick_index(slots.len())];

    if rng.chance(EQUIP_CLEAR_CHANCE) {
        equipment.remove(&slot);
        return;
    }
    let mut remainder = equipment.clone();
    remainder.remove(&slot);
    let cap = ctx.gear_budget.saturating_sub(ctx.equipment_cost(&remainder));
    let candidates: Vec<&SlotItem> = ctx
        .items_by_slot
        .get(&slot)
        .map(|items| items.iter().filter(|item| item.cost <= cap).collect())
        .unwrap_or_default();
    if let Some(item) = candidates.get(rng.pick_index(candidates.len())) {
        equipment.insert(slot, item.id.clone());
    }
}
