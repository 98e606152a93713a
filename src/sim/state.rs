//! Game state and core simulation types
//!
//! `GameState` is the single simulation context: every system takes it by `&mut`
//! and communicates outward only through the event queue.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::economy::{Economy, ShopItem};
use super::geometry::WorldGeometry;
use super::player::Player;
use super::projectile::Projectile;
use super::schedule::Schedule;
use super::wave::WaveState;
use super::weapon::{Armory, WeaponKind};
use crate::error::Rejection;
use crate::persistence::CurrencyStore;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Top-level phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen, nothing simulated yet
    Title,
    /// Active gameplay
    Playing,
    /// Paused by the player
    Paused,
    /// Player died; only restart is accepted
    GameOver,
}

/// Overlay that suspends gameplay while open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Modal {
    #[default]
    None,
    Shop,
    Settings,
}

/// One-shot notification for the render/UI sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A player action was refused
    Rejected(Rejection),
    /// Short informational message
    Toast(String),
    /// Shot trail from the muzzle to the impact (or max range)
    Tracer { from: Vec3, to: Vec3 },
    Explosion { center: Vec3, radius: f32 },
    /// Agent was hit and should flash
    HitFlash { agent: u32 },
    ScreenShake { intensity: f32 },
    DamageNumber { pos: Vec3, amount: f32, headshot: bool },
    PlayerHurt { damage: f32, health: f32 },
    AgentAttack { agent: u32 },
    AgentSpawned { agent: u32, pos: Vec3 },
    AgentKilled { agent: u32, reward: u64 },
    AgentRemoved { agent: u32 },
    GrenadeThrown { projectile: u32 },
    WaveStarted { wave: u32, target: u32 },
    WaveCleared { wave: u32, reward: u64 },
    GameOver { wave: u32, kills: u32, currency: u64 },
    Purchased { item: ShopItem, balance: u64 },
    PurchaseFailed { item: ShopItem, reason: Rejection },
    ReloadStateChanged { weapon: WeaponKind, reloading: bool },
    WeaponSwitched(WeaponKind),
    PhaseChanged(GamePhase),
    ModalChanged(Modal),
    /// Preferences were replaced and should be persisted
    SettingsChanged,
}

/// Complete simulation state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub settings: Settings,
    pub world: WorldGeometry,
    /// Simulation clock in seconds; frozen while paused or a modal is open
    pub time: f64,
    /// Ticks processed (including frozen ones)
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub modal: Modal,
    pub player: Player,
    /// Agents in the world, alive or dying (sorted by id)
    pub agents: Vec<Agent>,
    /// Grenades in flight (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub armory: Armory,
    pub economy: Economy,
    pub wave: WaveState,
    pub kills: u32,
    pub schedule: Schedule,
    /// Trigger state seen by the previous tick; firing happens on the press only
    pub trigger_down: bool,
    events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// New session on the default arena, sitting at the title screen
    pub fn new(seed: u64, tuning: Tuning, store: Box<dyn CurrencyStore>) -> Self {
        Self::with_world(seed, tuning, store, WorldGeometry::arena())
    }

    pub fn with_world(
        seed: u64,
        tuning: Tuning,
        store: Box<dyn CurrencyStore>,
        world: WorldGeometry,
    ) -> Self {
        let player = Player::new(tuning.player_max_health);
        Self {
            seed,
            settings: Settings::default(),
            world,
            time: 0.0,
            time_ticks: 0,
            phase: GamePhase::Title,
            modal: Modal::None,
            player,
            agents: Vec::new(),
            projectiles: Vec::new(),
            armory: Armory::default(),
            economy: Economy::load(store),
            wave: WaveState::default(),
            kills: 0,
            schedule: Schedule::new(),
            trigger_down: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Gameplay input is accepted and the world moves
    pub fn is_live(&self) -> bool {
        self.phase == GamePhase::Playing && self.modal == Modal::None
    }

    /// The simulation clock advances
    pub fn clock_running(&self) -> bool {
        self.is_live() || self.phase == GamePhase::GameOver
    }

    pub fn agent(&self, id: u32) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: u32) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn alive_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    // === Events ===

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand all pending events to the sink
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record a refused action
    pub fn reject(&mut self, reason: Rejection) {
        log::debug!("Rejected: {reason:?}");
        if !reason.is_quiet() {
            self.events.push(GameEvent::Rejected(reason));
        }
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.events.push(GameEvent::Toast(message.into()));
    }

    pub fn shake(&mut self, intensity: f32) {
        if self.settings.effective_screen_shake() {
            self.events.push(GameEvent::ScreenShake { intensity });
        }
    }

    pub fn damage_number(&mut self, pos: Vec3, amount: f32, headshot: bool) {
        if self.settings.damage_numbers {
            self.events.push(GameEvent::DamageNumber {
                pos,
                amount,
                headshot,
            });
        }
    }

    // === Phase transitions ===

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    pub fn set_modal(&mut self, modal: Modal) {
        if self.modal != modal {
            self.modal = modal;
            self.events.push(GameEvent::ModalChanged(modal));
        }
    }

    /// Abandon the reload in progress, if any. Its scheduled completion becomes a no-op.
    pub fn cancel_reload(&mut self) {
        if let Some(reload) = self.armory.reloading.take() {
            self.events.push(GameEvent::ReloadStateChanged {
                weapon: reload.weapon,
                reloading: false,
            });
        }
    }

    /// Terminal transition after the player's health reaches zero
    pub fn enter_game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.cancel_reload();
        self.set_modal(Modal::None);
        self.set_phase(GamePhase::GameOver);
        let currency = self.economy.balance();
        log::info!(
            "Game over on wave {} with {} kills ({} currency)",
            self.wave.number,
            self.kills,
            currency
        );
        self.events.push(GameEvent::GameOver {
            wave: self.wave.number,
            kills: self.kills,
            currency,
        });
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.agents.sort_by_key(|a| a.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
impl GameState {
    /// Flat-world session already in `Playing`, with a shared handle on its store
    pub(crate) fn for_test(balance: u64) -> (Self, crate::persistence::MemoryStore) {
        let store = crate::persistence::MemoryStore::with_balance(balance);
        let mut state = Self::with_world(
            7,
            Tuning::default(),
            Box::new(store.clone()),
            WorldGeometry::flat(60.0),
        );
        state.phase = GamePhase::Playing;
        (state, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_new_state_sits_at_title() {
        let state = GameState::new(1, Tuning::default(), Box::new(MemoryStore::with_balance(250)));
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.economy.balance(), 250);
        assert_eq!(state.wave.number, 1);
        assert!(!state.clock_running());
    }

    #[test]
    fn test_cooldown_rejection_is_silent() {
        let (mut state, _) = GameState::for_test(0);
        state.reject(Rejection::Cooldown);
        assert!(state.events().is_empty());
        state.reject(Rejection::OutOfAmmo);
        assert_eq!(state.drain_events(), vec![GameEvent::Rejected(Rejection::OutOfAmmo)]);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_feedback_events_follow_settings() {
        let (mut state, _) = GameState::for_test(0);
        state.settings.reduced_motion = true;
        state.settings.damage_numbers = false;
        state.shake(0.5);
        state.damage_number(Vec3::ZERO, 10.0, false);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_game_over_cancels_reload_and_closes_modal() {
        let (mut state, _) = GameState::for_test(0);
        state.modal = Modal::Shop;
        state.armory.reloading = Some(crate::sim::weapon::Reload {
            weapon: WeaponKind::Assault,
            until: 2.0,
        });
        state.enter_game_over();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.modal, Modal::None);
        assert!(state.armory.reloading.is_none());
        assert!(state.clock_running());
        assert!(
            state
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { wave: 1, kills: 0, .. }))
        );
    }
}
