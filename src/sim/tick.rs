//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::agent::{remove_agent, update_agents};
use super::combat::{complete_reload, fire, reload, select_slot};
use super::economy::{ShopItem, purchase};
use super::player::{MoveIntent, apply_look, update_player};
use super::projectile::{expire_fuse, update_projectiles};
use super::schedule::Deferred;
use super::state::{GameEvent, GamePhase, GameState, Modal};
use super::wave::{check_wave_complete, restart, spawn_scheduled_agent, start_game, start_next_wave};
use super::weapon::WeaponKind;
use crate::consts::PLAYER_HEIGHT;
use crate::settings::Settings;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub movement: MoveIntent,
    pub jump: bool,
    /// Mouse movement in pixels since the last tick
    pub look_delta: Vec2,
    /// Trigger held; a shot is fired on the press only
    pub fire: bool,
    /// Aim pressed (`Some(true)`) or released (`Some(false)`)
    pub aim: Option<bool>,
    /// Weapon hotkey 1..=8
    pub select_slot: Option<u8>,
    pub reload: bool,
    /// Leave the title screen
    pub start: bool,
    pub toggle_shop: bool,
    pub toggle_settings: bool,
    /// Pause toggle (closes an open overlay instead)
    pub pause: bool,
    pub next_wave: bool,
    pub restart: bool,
    /// Shop purchases, processed only while the shop is open
    pub purchases: Vec<ShopItem>,
    /// New preferences from the settings screen
    pub settings: Option<Settings>,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    if let Some(settings) = input.settings.take() {
        if settings != state.settings {
            state.settings = settings;
            state.push_event(GameEvent::SettingsChanged);
        }
    }
    handle_session_input(state, &input);

    // Semi-automatic: one shot per press, and a press while gated is used up
    let trigger_pressed = input.fire && !state.trigger_down;
    state.trigger_down = input.fire;

    // Paused or modal time is frozen along with every timer in the schedule
    if state.clock_running() {
        state.time += f64::from(dt);
        drain_schedule(state);
    }

    if !state.is_live() {
        state.normalize_order();
        return;
    }

    apply_look(&mut state.player, input.look_delta, &state.settings);
    if let Some(aiming) = input.aim {
        state.player.aiming = aiming;
    }
    if let Some(slot) = input.select_slot {
        if let Err(reason) = select_slot(state, slot) {
            state.reject(reason);
        }
    }
    if input.reload {
        if let Err(reason) = reload(state) {
            state.reject(reason);
        }
    }
    if trigger_pressed {
        if let Err(reason) = fire(state) {
            state.reject(reason);
        }
    }

    update_player(state, input.movement, input.jump, dt);
    update_agents(state, dt);

    // An attack may have ended the game this tick
    if state.phase == GamePhase::Playing {
        update_projectiles(state, dt);
        check_wave_complete(state);
    }

    state.normalize_order();
}

/// Start, restart, pause, overlays, shop and wave progression
fn handle_session_input(state: &mut GameState, input: &TickInput) {
    if input.start {
        start_game(state);
    }
    if input.restart && state.phase != GamePhase::Title {
        restart(state);
    }

    if input.pause {
        match (state.phase, state.modal) {
            (GamePhase::Playing, Modal::None) => state.set_phase(GamePhase::Paused),
            (GamePhase::Playing, _) => state.set_modal(Modal::None),
            (GamePhase::Paused, _) => state.set_phase(GamePhase::Playing),
            _ => {}
        }
    }
    if input.toggle_shop {
        toggle_modal(state, Modal::Shop);
    }
    if input.toggle_settings {
        toggle_modal(state, Modal::Settings);
    }

    if !input.purchases.is_empty() {
        if state.modal == Modal::Shop {
            for &item in &input.purchases {
                // Failures are reported as events by `purchase`
                let _ = purchase(state, item);
            }
        } else {
            log::debug!("Ignoring {} purchases outside the shop", input.purchases.len());
        }
    }

    if input.next_wave {
        if let Err(reason) = start_next_wave(state) {
            state.reject(reason);
        }
    }
}

fn toggle_modal(state: &mut GameState, modal: Modal) {
    if state.modal == modal {
        state.set_modal(Modal::None);
    } else if state.phase == GamePhase::Playing {
        state.set_modal(modal);
    }
}

/// Run every deferred effect that is due. After game over only cleanup runs.
fn drain_schedule(state: &mut GameState) {
    let now = state.time;
    while let Some(event) = state.schedule.pop_due(now) {
        let live = state.phase != GamePhase::GameOver;
        match event {
            Deferred::ReloadComplete(kind) if live => complete_reload(state, kind),
            Deferred::SpawnAgent { wave } if live => spawn_scheduled_agent(state, wave),
            Deferred::RemoveAgent(id) => remove_agent(state, id),
            Deferred::FuseExpired(id) => expire_fuse(state, id, live),
            Deferred::ReloadComplete(_) | Deferred::SpawnAgent { .. } => {}
        }
    }
}

/// Fill `input` with demo-mode decisions
fn autopilot(state: &GameState, input: &mut TickInput) {
    match state.phase {
        GamePhase::Title => {
            input.start = true;
            return;
        }
        GamePhase::Playing => {}
        _ => return,
    }
    if state.modal != Modal::None {
        input.pause = true;
        return;
    }
    if state.wave.waiting_for_next() {
        input.next_wave = true;
        return;
    }

    let player = &state.player;
    let eye = player.eye_position();
    let Some(target) = state
        .agents
        .iter()
        .filter(|a| a.alive)
        .min_by(|a, b| a.pos.distance(eye).total_cmp(&b.pos.distance(eye)))
    else {
        return;
    };

    // Turn toward the target's head, limited to a natural turn rate
    let dx = target.pos.x - player.pos.x;
    let dz = target.pos.z - player.pos.z;
    let distance = (dx * dx + dz * dz).sqrt();
    let desired_yaw = (-dx).atan2(-dz);
    let desired_pitch = (1.5 - PLAYER_HEIGHT).atan2(distance);

    let mut yaw_error = (desired_yaw - player.yaw) % TAU;
    if yaw_error > PI {
        yaw_error -= TAU;
    } else if yaw_error < -PI {
        yaw_error += TAU;
    }
    let pitch_error = desired_pitch - player.pitch;
    let turn = Vec2::new(yaw_error, pitch_error).clamp_length_max(0.15);

    let sensitivity = state.settings.mouse_sensitivity.max(f32::EPSILON);
    let invert = if state.settings.invert_y { -1.0 } else { 1.0 };
    input.look_delta = Vec2::new(-turn.x / sensitivity, -turn.y * invert / sensitivity);

    if distance < 4.0 {
        input.movement = MoveIntent::BACK;
    }

    let weapon = state.armory.active_weapon();
    if state.armory.is_reloading() {
        return;
    }
    if weapon.current_ammo == 0 {
        if weapon.reserve_ammo > 0 {
            input.reload = true;
        } else if let Some(kind) = [WeaponKind::Pistol, WeaponKind::Assault, WeaponKind::Knife]
            .into_iter()
            .find(|&k| {
                let w = state.armory.get(k);
                state.economy.owns(k) && (w.current_ammo > 0 || w.reserve_ammo > 0)
            })
        {
            input.select_slot = Some(kind.index() as u8 + 1);
        }
        return;
    }
    // Release between shots so every shot is a fresh press
    input.fire = yaw_error.abs() < 0.05 && !state.trigger_down;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::error::Rejection;
    use crate::persistence::MemoryStore;
    use crate::sim::agent::Agent;
    use crate::sim::wave::WavePhase;
    use crate::tuning::Tuning;
    use glam::Vec3;
    use proptest::prelude::*;

    fn step(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
        tick(state, input, SIM_DT);
        state.drain_events()
    }

    fn idle(state: &mut GameState, ticks: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(step(state, &TickInput::default()));
        }
        events
    }

    #[test]
    fn test_tick_title_to_playing() {
        let (mut state, _) = GameState::for_test(0);
        state.phase = GamePhase::Title;

        idle(&mut state, 3);
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.time, 0.0);

        let events = step(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(events.contains(&GameEvent::WaveStarted { wave: 1, target: 1 }));
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.wave.phase, WavePhase::Active);
    }

    #[test]
    fn test_sniper_headshot_clears_wave_one() {
        let (mut state, store) = GameState::for_test(7000);
        state.phase = GamePhase::Title;
        step(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );

        let events = step(
            &mut state,
            &TickInput {
                toggle_shop: true,
                purchases: vec![ShopItem::Weapon(WeaponKind::Sniper)],
                ..Default::default()
            },
        );
        assert!(events.contains(&GameEvent::Purchased {
            item: ShopItem::Weapon(WeaponKind::Sniper),
            balance: 0,
        }));
        step(
            &mut state,
            &TickInput {
                toggle_shop: true,
                ..Default::default()
            },
        );
        assert_eq!(state.modal, Modal::None);
        assert_eq!(state.armory.active, WeaponKind::Sniper);

        state.agents[0].pos = Vec3::new(0.0, 0.0, -6.0);
        state.agents[0].facing = 0.0;
        let events = step(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::DamageNumber { amount, headshot: true, .. } if *amount == 500.0
        )));
        assert!(!state.agents[0].alive);
        assert_eq!(state.economy.balance(), 100);

        // The corpse stays for the removal delay, then the wave clears exactly once
        let events = idle(&mut state, 60);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::WaveCleared { .. })));
        let events = idle(&mut state, 180);
        let cleared: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveCleared { .. }))
            .collect();
        assert_eq!(cleared, vec![&GameEvent::WaveCleared { wave: 1, reward: 500 }]);
        assert_eq!(state.wave.phase, WavePhase::WaveClear);
        assert_eq!(state.economy.balance(), 600);
        assert_eq!(store.value(), Some(600));
    }

    #[test]
    fn test_reload_completes_on_schedule() {
        let (mut state, _) = GameState::for_test(0);
        state.armory.get_mut(WeaponKind::Assault).current_ammo = 10;
        let events = step(
            &mut state,
            &TickInput {
                reload: true,
                ..Default::default()
            },
        );
        assert!(events.contains(&GameEvent::ReloadStateChanged {
            weapon: WeaponKind::Assault,
            reloading: true,
        }));

        // Trigger pulls during the reload are refused and change nothing
        let events = step(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert!(events.contains(&GameEvent::Rejected(Rejection::Reloading)));
        let rifle = state.armory.get(WeaponKind::Assault);
        assert_eq!((rifle.current_ammo, rifle.reserve_ammo), (10, 90));

        let events = idle(&mut state, 125);
        assert!(events.contains(&GameEvent::ReloadStateChanged {
            weapon: WeaponKind::Assault,
            reloading: false,
        }));
        let rifle = state.armory.get(WeaponKind::Assault);
        assert_eq!((rifle.current_ammo, rifle.reserve_ammo), (30, 70));
    }

    #[test]
    fn test_pause_freezes_clock_and_timers() {
        let (mut state, _) = GameState::for_test(0);
        state.armory.get_mut(WeaponKind::Assault).current_ammo = 0;
        step(
            &mut state,
            &TickInput {
                reload: true,
                pause: true,
                ..Default::default()
            },
        );
        // Pause is handled before gameplay input, so the reload never started
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(!state.armory.is_reloading());

        let frozen = state.time;
        let events = step(
            &mut state,
            &TickInput {
                fire: true,
                reload: true,
                ..Default::default()
            },
        );
        assert!(events.is_empty());
        assert_eq!(state.time, frozen);

        step(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
        );
        step(
            &mut state,
            &TickInput {
                reload: true,
                ..Default::default()
            },
        );
        assert!(state.armory.is_reloading());

        // Opening the shop stops the reload timer
        step(
            &mut state,
            &TickInput {
                toggle_shop: true,
                ..Default::default()
            },
        );
        idle(&mut state, 300);
        assert!(state.armory.is_reloading());
        step(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
        );
        assert_eq!(state.modal, Modal::None);
        idle(&mut state, 125);
        assert!(!state.armory.is_reloading());
    }

    #[test]
    fn test_purchases_need_open_shop() {
        let (mut state, _) = GameState::for_test(3000);
        let buy = TickInput {
            purchases: vec![ShopItem::Weapon(WeaponKind::Revolver)],
            ..Default::default()
        };
        step(&mut state, &buy);
        assert_eq!(state.economy.balance(), 3000);

        let events = step(
            &mut state,
            &TickInput {
                toggle_shop: true,
                purchases: vec![
                    ShopItem::Weapon(WeaponKind::Revolver),
                    ShopItem::Weapon(WeaponKind::Revolver),
                ],
                ..Default::default()
            },
        );
        assert_eq!(state.economy.balance(), 0);
        assert!(events.contains(&GameEvent::PurchaseFailed {
            item: ShopItem::Weapon(WeaponKind::Revolver),
            reason: Rejection::AlreadyOwned,
        }));
    }

    #[test]
    fn test_game_over_stops_gameplay_but_cleans_up() {
        let (mut state, _) = GameState::for_test(0);
        state.player.health = 10.0;
        state.agents.push(Agent::new(90, Vec3::new(0.0, 0.0, -1.0), 100.0, 1.8, 0.0));
        let mut corpse = Agent::new(91, Vec3::new(5.0, 0.0, 5.0), 100.0, 1.8, 0.0);
        corpse.alive = false;
        state.agents.push(corpse);
        state.schedule.push(0.5, Deferred::RemoveAgent(91));
        state.schedule.push(0.5, Deferred::SpawnAgent { wave: 1 });
        state.wave.target = 2;

        let events = step(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::GameOver {
            wave: 1,
            kills: 0,
            currency: 0,
        }));

        let ammo = state.armory.get(WeaponKind::Assault).current_ammo;
        let events = idle(&mut state, 60);
        assert_eq!(state.armory.get(WeaponKind::Assault).current_ammo, ammo);
        assert!(events.contains(&GameEvent::AgentRemoved { agent: 91 }));
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.wave.spawned, 0);
        assert!(state.time > 0.5);

        step(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.agents.len() <= 1);
        assert_eq!(state.player.health, 100.0);
    }

    #[test]
    fn test_next_wave_while_fighting_is_rejected() {
        let (mut state, _) = GameState::for_test(0);
        state.phase = GamePhase::Title;
        step(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );
        let events = step(
            &mut state,
            &TickInput {
                next_wave: true,
                ..Default::default()
            },
        );
        assert!(events.contains(&GameEvent::Rejected(Rejection::WaveInProgress)));
        assert_eq!(state.wave.number, 1);
    }

    #[test]
    fn test_held_trigger_fires_once() {
        let (mut state, _) = GameState::for_test(0);
        step(
            &mut state,
            &TickInput {
                select_slot: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(state.armory.active, WeaponKind::Pistol);

        let held = TickInput {
            fire: true,
            ..Default::default()
        };
        for _ in 0..60 {
            step(&mut state, &held);
        }
        assert_eq!(state.armory.get(WeaponKind::Pistol).current_ammo, 11);

        // Release and press again
        step(&mut state, &TickInput::default());
        step(&mut state, &held);
        assert_eq!(state.armory.get(WeaponKind::Pistol).current_ammo, 10);
    }

    #[test]
    fn test_held_trigger_on_empty_magazine_rejects_once() {
        let (mut state, _) = GameState::for_test(0);
        state.armory.get_mut(WeaponKind::Assault).current_ammo = 0;
        let held = TickInput {
            fire: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        for _ in 0..60 {
            events.extend(step(&mut state, &held));
        }
        let rejections = events
            .iter()
            .filter(|e| **e == GameEvent::Rejected(Rejection::OutOfAmmo))
            .count();
        assert_eq!(rejections, 1);
    }

    #[test]
    fn test_trigger_held_through_pause_needs_new_press() {
        let (mut state, _) = GameState::for_test(0);
        step(
            &mut state,
            &TickInput {
                fire: true,
                pause: true,
                ..Default::default()
            },
        );
        step(
            &mut state,
            &TickInput {
                fire: true,
                pause: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.armory.get(WeaponKind::Assault).current_ammo, 30);
    }

    #[test]
    fn test_agent_attack_sees_this_ticks_player_move() {
        // 2.05 away: out of range until the player steps 0.1 forward
        let (mut state, _) = GameState::for_test(0);
        state
            .agents
            .push(Agent::new(1, Vec3::new(0.0, 0.0, -2.05), 100.0, 1.8, 0.0));
        let events = step(
            &mut state,
            &TickInput {
                movement: MoveIntent::FORWARD,
                ..Default::default()
            },
        );
        assert!((state.player.pos.z + 0.1).abs() < 1e-4);
        assert_eq!(state.player.health, 90.0);
        assert!(events.contains(&GameEvent::AgentAttack { agent: 1 }));

        let (mut still, _) = GameState::for_test(0);
        still.tuning.agent_wobble = 0.0;
        still
            .agents
            .push(Agent::new(1, Vec3::new(0.0, 0.0, -2.05), 100.0, 1.8, 0.0));
        step(&mut still, &TickInput::default());
        assert_eq!(still.player.health, 100.0);
    }

    #[test]
    fn test_changed_settings_are_announced() {
        let (mut state, _) = GameState::for_test(0);
        let settings = Settings {
            invert_y: true,
            ..Settings::default()
        };
        let input = TickInput {
            settings: Some(settings.clone()),
            ..Default::default()
        };
        assert!(step(&mut state, &input).contains(&GameEvent::SettingsChanged));
        assert_eq!(state.settings, settings);
        assert!(!step(&mut state, &input).contains(&GameEvent::SettingsChanged));
    }

    #[test]
    fn test_autopilot_survives_early_waves() {
        let mut state = GameState::new(42, Tuning::default(), Box::new(MemoryStore::new()));
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..60 * 60 {
            tick(&mut state, &input, SIM_DT);
        }
        state.drain_events();
        assert!(state.wave.number >= 2, "stuck on wave {}", state.wave.number);
        assert!(state.kills >= 1);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (
            0u8..16,
            any::<bool>(),
            (-40.0f32..40.0, -20.0f32..20.0),
            any::<bool>(),
            proptest::option::of(0u8..10),
            any::<bool>(),
        )
            .prop_map(|(moves, jump, (dx, dy), fire, slot, reload)| TickInput {
                movement: MoveIntent::from_bits(moves),
                jump,
                look_delta: Vec2::new(dx, dy),
                fire,
                select_slot: slot,
                reload,
                ..Default::default()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn counters_stay_consistent(inputs in proptest::collection::vec(arb_input(), 50..300)) {
            let mut state = GameState::new(9, Tuning::default(), Box::new(MemoryStore::new()));
            tick(&mut state, &TickInput { start: true, ..Default::default() }, SIM_DT);

            for input in &inputs {
                let ammo_before: Vec<u32> = state
                    .armory
                    .weapons()
                    .iter()
                    .map(|w| w.current_ammo + w.reserve_ammo)
                    .collect();
                let health_before: Vec<(u32, f32)> =
                    state.agents.iter().map(|a| (a.id, a.health)).collect();
                let balance_before = state.economy.balance();

                tick(&mut state, input, SIM_DT);

                for (before, weapon) in ammo_before.iter().zip(state.armory.weapons()) {
                    prop_assert!(weapon.current_ammo + weapon.reserve_ammo <= *before);
                }
                for (id, before) in health_before {
                    if let Some(agent) = state.agent(id) {
                        prop_assert!(agent.health <= before);
                        prop_assert!(agent.health >= 0.0);
                    }
                }
                prop_assert!(state.wave.spawned <= state.wave.target);
                prop_assert!(state.economy.balance() >= balance_before);
                prop_assert!((0.0..=100.0).contains(&state.player.health));
            }
        }
    }
}
