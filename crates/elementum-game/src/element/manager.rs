//! Element assignment, the roll animation, passives, and ability dispatch
//!
//! The slot-machine roll is a small state machine driven from the tick loop:
//! the displayed element changes at a decelerating rate, and whatever is
//! showing when the steps run out becomes the committed element. Committing
//! (or any other element change) clears the old element's passives and halts
//! its running abilities before the new upsides are applied.

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;
use tracing::info;

use elementum_core::PlayerId;

use crate::ability::engine::AbilityEngine;
use crate::ability::{AbilityError, AbilitySlot};
use crate::cooldown::CooldownManager;
use crate::element::catalog::AbilityCatalog;
use crate::element::{Element, PassiveEffect};
use crate::mana::ManaManager;
use crate::sidetable::SideTable;
use crate::store::DataStore;
use crate::world::EffectEvent;

/// Display steps in one roll
const ROLL_STEPS: u32 = 12;
/// Ticks between the first two display changes
const ROLL_BASE_INTERVAL: u64 = 2;
/// Added to the interval after each step, producing the slow-down
const ROLL_DECELERATION: u64 = 2;

/// Why a roll could not start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RollError {
    #[error("A roll is already in progress")]
    AlreadyRolling,
}

/// Observable roll progress, for the host to render
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollEvent {
    /// The displayed element changed
    Display { player: PlayerId, element: Element },
    /// The roll finished and this element is now assigned
    Committed { player: PlayerId, element: Element },
}

#[derive(Debug)]
struct RollState {
    /// Currently displayed element; committed when the steps run out
    current: Element,
    next_update: u64,
    interval: u64,
    steps_left: u32,
    /// Keep the upgrade level across the change (element swap item)
    preserve_level: bool,
}

/// Owns the ability catalog, in-flight rolls, and per-player passive sets
#[derive(Debug)]
pub struct ElementManager {
    catalog: AbilityCatalog,
    rolls: HashMap<PlayerId, RollState>,
    passives: HashMap<PlayerId, Vec<PassiveEffect>>,
}

impl ElementManager {
    pub fn new(catalog: AbilityCatalog) -> Self {
        Self {
            catalog,
            rolls: HashMap::new(),
            passives: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    /// Begin a roll for `player`. At most one roll per player at a time.
    pub fn start_roll(
        &mut self,
        player: PlayerId,
        preserve_level: bool,
        now: u64,
    ) -> Result<(), RollError> {
        if self.rolls.contains_key(&player) {
            return Err(RollError::AlreadyRolling);
        }
        self.rolls.insert(
            player,
            RollState {
                current: random_element(),
                next_update: now + ROLL_BASE_INTERVAL,
                interval: ROLL_BASE_INTERVAL,
                steps_left: ROLL_STEPS,
                preserve_level,
            },
        );
        Ok(())
    }

    pub fn is_rolling(&self, player: PlayerId) -> bool {
        self.rolls.contains_key(&player)
    }

    /// Abort a roll without committing (disconnect). Returns whether one was
    /// in progress.
    pub fn cancel_roll(&mut self, player: PlayerId) -> bool {
        self.rolls.remove(&player).is_some()
    }

    /// Advance every in-flight roll by one tick. Commits clear the previous
    /// element's effects, so the engine and side-table come along.
    pub fn tick_rolls(
        &mut self,
        now: u64,
        store: &mut DataStore,
        engine: &mut AbilityEngine,
        sidetable: &mut SideTable,
    ) -> (Vec<RollEvent>, Vec<EffectEvent>) {
        let mut roll_events = Vec::new();
        let mut effects = Vec::new();
        let players: Vec<PlayerId> = self.rolls.keys().copied().collect();

        for player in players {
            let Some(state) = self.rolls.get_mut(&player) else {
                continue;
            };
            if now < state.next_update {
                continue;
            }

            if state.steps_left > 0 {
                state.current = random_element();
                state.steps_left -= 1;
                state.interval += ROLL_DECELERATION;
                state.next_update = now + state.interval;
                roll_events.push(RollEvent::Display {
                    player,
                    element: state.current,
                });
                continue;
            }

            let element = state.current;
            let preserve_level = state.preserve_level;
            self.rolls.remove(&player);

            effects.extend(self.clear_effects(player, engine, sidetable));
            let data = store.load_mut(player);
            if preserve_level {
                data.set_current_element_preserving_level(Some(element));
            } else {
                data.set_current_element(Some(element));
            }
            self.apply_upsides(store, player);
            info!("{} rolled {}", player, element);
            roll_events.push(RollEvent::Committed { player, element });
        }

        (roll_events, effects)
    }

    /// Assign an element directly (admin path), bypassing the roll. Clears
    /// the old element's effects first.
    pub fn set_element(
        &mut self,
        player: PlayerId,
        element: Option<Element>,
        store: &mut DataStore,
        engine: &mut AbilityEngine,
        sidetable: &mut SideTable,
    ) -> Vec<EffectEvent> {
        self.rolls.remove(&player);
        let effects = self.clear_effects(player, engine, sidetable);
        store.load_mut(player).set_current_element(element);
        self.apply_upsides(store, player);
        effects
    }

    /// Invoke the ability in `slot` for the player's current element
    #[allow(clippy::too_many_arguments)]
    pub fn use_ability(
        &self,
        player: PlayerId,
        slot: AbilitySlot,
        now: u64,
        store: &mut DataStore,
        cooldowns: &mut CooldownManager,
        mana: &ManaManager,
        engine: &mut AbilityEngine,
    ) -> Result<String, AbilityError> {
        let data = store.load(player);
        let element = data.current_element().ok_or(AbilityError::NoElement)?;
        let level = data.upgrade_level();
        // The default catalog is total over (element, slot); a trimmed
        // config can leave holes
        let def = self
            .catalog
            .get(element, slot)
            .ok_or(AbilityError::NoSuchAbility { element, slot })?
            .clone();

        engine.try_activate(player, &def, level, now, store, mana, cooldowns)?;
        Ok(format!("{} activated", def.name))
    }

    /// Rebuild the player's passive set from their current element. Wholesale
    /// replacement, so re-applying is idempotent.
    pub fn apply_upsides(&mut self, store: &mut DataStore, player: PlayerId) {
        match store.load(player).current_element() {
            Some(element) => {
                self.passives.insert(player, element.passives().to_vec());
            }
            None => {
                self.passives.remove(&player);
            }
        }
    }

    /// Drop the player's passives and halt their running abilities
    pub fn clear_effects(
        &mut self,
        player: PlayerId,
        engine: &mut AbilityEngine,
        sidetable: &mut SideTable,
    ) -> Vec<EffectEvent> {
        self.passives.remove(&player);
        engine.deactivate_player(player, sidetable)
    }

    pub fn passives_of(&self, player: PlayerId) -> &[PassiveEffect] {
        self.passives.get(&player).map_or(&[], Vec::as_slice)
    }
}

fn random_element() -> Element {
    let i = rand::thread_rng().gen_range(0..Element::all().len());
    Element::all()[i]
}
