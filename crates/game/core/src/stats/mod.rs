//! Character attributes and the stats derived from them.
//!
//! Attributes are the five allocatable stat counts a character (or genome)
//! distributes over a fixed point budget. Everything the simulator actually
//! consumes (attack ranges, attack interval, resistances, resource maximums)
//! is computed from attributes plus equipment in [`derived`].

pub mod derived;
pub mod resources;

pub use derived::{AttackRange, DerivedStats};
pub use resources::{ResourceKind, ResourceMaximums, ResourcePools};

/// The five allocatable attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intellect,
    Willpower,
}

impl Attribute {
    /// All attributes in canonical order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Constitution,
        Attribute::Intellect,
        Attribute::Willpower,
    ];
}

/// Allocated attribute counts.
///
/// A legal allocation sums to the context's point budget; the genome codec
/// enforces that invariant, this type only stores and combines counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    pub strength: u32,
    pub dexterity: u32,
    pub constitution: u32,
    pub intellect: u32,
    pub willpower: u32,
}

impl Attributes {
    pub const fn new(
        strength: u32,
        dexterity: u32,
        constitution: u32,
        intellect: u32,
        willpower: u32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intellect,
            willpower,
        }
    }

    pub fn get(&self, attr: Attribute) -> u32 {
        match attr {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intellect => self.intellect,
            Attribute::Willpower => self.willpower,
        }
    }

    pub fn set(&mut self, attr: Attribute, value: u32) {
        match attr {
            Attribute::Strength => self.strength = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Constitution => self.constitution = value,
            Attribute::Intellect => self.intellect = value,
            Attribute::Willpower => self.willpower = value,
        }
    }

    pub fn add(&mut self, attr: Attribute, amount: u32) {
        self.set(attr, self.get(attr).saturating_add(amount));
    }

    pub fn sub(&mut self, attr: Attribute, amount: u32) {
        self.set(attr, self.get(attr).saturating_sub(amount));
    }

    /// Sum of all five counts.
    pub fn total(&self) -> u32 {
        self.strength + self.dexterity + self.constitution + self.intellect + self.willpower
    }

    /// Element-wise sum, saturating. Used to fold equipment bonuses in.
    #[must_use]
    pub fn combined(&self, other: &Attributes) -> Attributes {
        Attributes {
            strength: self.strength.saturating_add(other.strength),
            dexterity: self.dexterity.saturating_add(other.dexterity),
            constitution: self.constitution.saturating_add(other.constitution),
            intellect: self.intellect.saturating_add(other.intellect),
            willpower: self.willpower.saturating_add(other.willpower),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_access_roundtrips() {
        let mut attrs = Attributes::default();
        for (i, attr) in Attribute::ALL.iter().enumerate() {
            attrs.set(*attr, i as u32 + 1);
        }
        assert_eq!(attrs.get(Attribute::Strength), 1);
        assert_eq!(attrs.get(Attribute::Willpower), 5);
        assert_eq!(attrs.total(), 15);
    }

    #[test]
    fn sub_saturates_at_zero() {
        let mut attrs = Attributes::new(1, 0, 0, 0, 0);
        attrs.sub(Attribute::Dexterity, 3);
        assert_eq!(attrs.dexterity, 0);
    }
}
