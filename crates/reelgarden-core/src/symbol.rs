//! Symbol definitions, effects and symbol instances.
//!
//! A [`SymbolDefinition`] is the immutable, catalog-owned description of a
//! symbol kind. A [`Symbol`] is an instance of a definition occupying a slot
//! in the owned collection or a viewport cell. Instances are value copies:
//! cloning a definition into an instance never shares mutable state, and two
//! containers refer to "the same" instance only through its [`InstanceId`].
//!
//! # Example
//!
//! ```
//! use reelgarden_core::symbol::{
//!     ActionKind, Effect, LocationRule, Magnitude, Rarity, SymbolDefinition, SymbolKey,
//! };
//!
//! let bee = SymbolDefinition::new("bee", "Bee", 1, Rarity::Common).with_effect(
//!     Effect::new(LocationRule::Adjacent, ActionKind::MultiplyScore)
//!         .targeting(["flower"])
//!         .with_magnitude(Magnitude::whole(2)),
//! );
//!
//! assert_eq!(bee.key, SymbolKey::new("bee"));
//! assert!(bee.has_effects());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier of a symbol kind within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolKey(String);

impl SymbolKey {
    /// Creates a key from a string.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SymbolKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SymbolKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identity of one symbol instance within a game session.
///
/// Ids are handed out monotonically by [`InstanceAllocator`] and never reused.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out fresh [`InstanceId`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceAllocator {
    next: u64,
}

impl InstanceAllocator {
    /// Creates an allocator starting at id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id.
    pub fn allocate(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Clones a definition into a new instance with a fresh id.
    pub fn instantiate(&mut self, definition: &SymbolDefinition) -> Symbol {
        Symbol::from_definition(self.allocate(), definition)
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Rarity class used to filter reward candidates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Everyday symbols, the default reward pool
    Common,
    /// Less frequent symbols
    Uncommon,
    /// Rare symbols
    Rare,
    /// Very rare symbols
    VeryRare,
    /// Never offered as a reward (e.g. the filler)
    Special,
}

impl Rarity {
    /// All rarities in ascending order.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::VeryRare,
        Rarity::Special,
    ];

    /// Snake-case name, as used in serialized catalogs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::VeryRare => "very_rare",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Effects
// =============================================================================

/// Which cells an effect considers as candidate targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRule {
    /// Every other cell
    Anywhere,
    /// The orthogonal neighbours
    Adjacent,
    /// Every other cell in the same row
    SameRow,
    /// Every other cell in the same column
    SameColumn,
    /// The symbol itself, only while it sits on a grid corner
    SelfCorner,
}

/// What an effect does to each target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Replace the target with a filler
    Destroy,
    /// Replace the target with a new instance of the action symbol
    Add,
    /// Scale the target's score by the magnitude
    MultiplyScore,
    /// Add the magnitude to the target's score
    IncreaseScore,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Destroy => "destroy",
            Self::Add => "add",
            Self::MultiplyScore => "multiply_score",
            Self::IncreaseScore => "increase_score",
        };
        f.write_str(name)
    }
}

/// Exact non-negative rational used for score arithmetic.
///
/// Results are truncated toward zero, so `3 × 3/2` yields `4`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Magnitude {
    numerator: u64,
    denominator: u64,
}

impl Magnitude {
    /// The identity multiplier and unit increment.
    pub const ONE: Magnitude = Magnitude {
        numerator: 1,
        denominator: 1,
    };

    /// A whole-number magnitude.
    #[must_use]
    pub const fn whole(value: u64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    /// A rational magnitude. A zero denominator is treated as one.
    #[must_use]
    pub const fn ratio(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator: if denominator == 0 { 1 } else { denominator },
        }
    }

    /// `score × self`, truncated.
    #[must_use]
    pub fn scale(self, score: u64) -> u64 {
        let product =
            u128::from(score) * u128::from(self.numerator) / u128::from(self.denominator.max(1));
        u64::try_from(product).unwrap_or(u64::MAX)
    }

    /// `score + self`, with the magnitude truncated to a whole number.
    #[must_use]
    pub fn offset(self, score: u64) -> u64 {
        score.saturating_add(self.numerator / self.denominator.max(1))
    }
}

impl Default for Magnitude {
    fn default() -> Self {
        Self::ONE
    }
}

/// A rule attached to a symbol that acts on other cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Candidate cell selection
    pub location: LocationRule,
    /// Action applied to each target
    pub action: ActionKind,
    /// Keys the effect applies to; `None` targets every candidate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<SymbolKey>>,
    /// Multiplier or increment; defaults to [`Magnitude::ONE`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<Magnitude>,
    /// Symbol placed by an `add` action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolKey>,
    /// Chance in `[0, 1]` that one application fires; `None` always fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl Effect {
    /// Creates an unfiltered, always-firing effect.
    #[must_use]
    pub fn new(location: LocationRule, action: ActionKind) -> Self {
        Self {
            location,
            action,
            targets: None,
            magnitude: None,
            symbol: None,
            probability: None,
        }
    }

    /// Restricts the effect to the given target keys.
    #[must_use]
    pub fn targeting<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SymbolKey>,
    {
        self.targets = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the magnitude.
    #[must_use]
    pub fn with_magnitude(mut self, magnitude: Magnitude) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    /// Sets the symbol placed by an `add` action.
    #[must_use]
    pub fn adding(mut self, key: impl Into<SymbolKey>) -> Self {
        self.symbol = Some(key.into());
        self
    }

    /// Sets the firing probability.
    #[must_use]
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Returns the magnitude, defaulting to one.
    #[must_use]
    pub fn magnitude(&self) -> Magnitude {
        self.magnitude.unwrap_or_default()
    }

    /// Returns true if a symbol with `key` passes the target filter.
    #[must_use]
    pub fn accepts(&self, key: &SymbolKey) -> bool {
        self.targets
            .as_ref()
            .map_or(true, |targets| targets.contains(key))
    }
}

// =============================================================================
// Definitions and instances
// =============================================================================

/// Immutable description of a symbol kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    /// Unique key
    pub key: SymbolKey,
    /// Display name
    pub name: String,
    /// Base score
    pub score: u64,
    /// Rarity class
    pub rarity: Rarity,
    /// Appearance hint, opaque to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Effects in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl SymbolDefinition {
    /// Creates a definition without effects or color.
    #[must_use]
    pub fn new(key: &str, name: &str, score: u64, rarity: Rarity) -> Self {
        Self {
            key: SymbolKey::new(key),
            name: name.to_string(),
            score,
            rarity,
            color: None,
            effects: Vec::new(),
        }
    }

    /// Sets the color hint.
    #[must_use]
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    /// Appends an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Returns true if the definition carries at least one effect.
    #[must_use]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// A symbol instance occupying a collection slot or a viewport cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    id: InstanceId,
    definition: SymbolDefinition,
    score: u64,
}

impl Symbol {
    /// Clones `definition` into an instance with the given id.
    #[must_use]
    pub fn from_definition(id: InstanceId, definition: &SymbolDefinition) -> Self {
        Self {
            id,
            definition: definition.clone(),
            score: definition.score,
        }
    }

    /// Instance identity.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Key of the underlying definition.
    #[must_use]
    pub fn key(&self) -> &SymbolKey {
        &self.definition.key
    }

    /// The definition this instance was cloned from.
    #[must_use]
    pub fn definition(&self) -> &SymbolDefinition {
        &self.definition
    }

    /// Current score, including effect modifications.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Overwrites the current score.
    pub fn set_score(&mut self, score: u64) {
        self.score = score;
    }

    /// Effects of the underlying definition.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.definition.effects
    }

    /// Returns true if this instance is of kind `key`.
    #[must_use]
    pub fn is(&self, key: &SymbolKey) -> bool {
        &self.definition.key == key
    }
}
