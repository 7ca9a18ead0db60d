#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Control.
//!
//! The world is the only place where simulation state is mutated. Systems
//! observe it through [`query`] and request changes by submitting
//! [`Command`] values to [`apply`], which validates each request against the
//! current state and reports what actually happened through [`Event`] values.

mod turrets;
mod units;

use std::time::Duration;

use lane_control_core::{
    config::SimConfig, Attacker, AttackStyle, Command, Event, Health, KillCause, MarkerKind,
    MinionId, ProjectileId, ProjectileSource, SpawnId, SpawnPlan, SpeedMultiplier, TargetRef,
    Team, ToolEffect, ToolKind, ToolRequest, Vec2, WaveSample, WaveState, WaveTrend,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    turrets::TurretRegistry,
    units::{Marker, MinionState, PendingSpawn, ProjectileState},
};

/// Represents the authoritative Lane Control world state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    config: SimConfig,
    minions: Vec<MinionState>,
    turrets: TurretRegistry,
    projectiles: Vec<ProjectileState>,
    pending: Vec<PendingSpawn>,
    markers: Vec<Marker>,
    elapsed: Duration,
    tick: u64,
    wave_number: u32,
    next_wave_at: Duration,
    paused: bool,
    speed: SpeedMultiplier,
    selected_tool: ToolKind,
    tank: Option<Vec2>,
    next_id: u32,
    wave_state: WaveState,
    trend: WaveTrend,
}

impl World {
    /// Creates a new world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Creates a new world using the provided configuration.
    #[must_use]
    pub fn with_config(config: SimConfig) -> Self {
        let mut next_id = 0_u32;
        let turrets = TurretRegistry::new(&config, || {
            let id = next_id;
            next_id = next_id.saturating_add(1);
            id
        });
        let next_wave_at = config.waves.first_wave();
        Self {
            config,
            minions: Vec::new(),
            turrets,
            projectiles: Vec::new(),
            pending: Vec::new(),
            markers: Vec::new(),
            elapsed: Duration::ZERO,
            tick: 0,
            wave_number: 0,
            next_wave_at,
            paused: false,
            speed: SpeedMultiplier::Normal,
            selected_tool: ToolKind::default(),
            tank: None,
            next_id,
            wave_state: WaveState::Neutral,
            trend: WaveTrend::default(),
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn minion_index(&self, id: MinionId) -> Option<usize> {
        self.minions
            .binary_search_by_key(&id, |minion| minion.id)
            .ok()
    }

    fn minion(&self, id: MinionId) -> Option<&MinionState> {
        self.minions.get(self.minion_index(id)?)
    }

    fn minion_mut(&mut self, id: MinionId) -> Option<&mut MinionState> {
        let index = self.minion_index(id)?;
        self.minions.get_mut(index)
    }

    fn alive_count(&self, team: Team) -> u32 {
        let count = self
            .minions
            .iter()
            .filter(|minion| minion.team == team && minion.is_alive())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn attacker_team(&self, attacker: Attacker) -> Option<Team> {
        match attacker {
            Attacker::Minion(id) => self
                .minion(id)
                .filter(|minion| minion.is_alive())
                .map(|minion| minion.team),
            Attacker::Turret(id) => self
                .turrets
                .get(id)
                .filter(|turret| turret.is_alive())
                .map(|turret| turret.team),
        }
    }

    /// Team of an attacker allowed to strike this tick.
    ///
    /// Units downed by combat during the current tick still resolve the
    /// attacks they started with, so simultaneous trades land on both sides.
    fn striker_team(&self, attacker: Attacker) -> Option<Team> {
        let tick = self.tick;
        match attacker {
            Attacker::Minion(id) => self
                .minion(id)
                .filter(|minion| minion.can_strike_on(tick))
                .map(|minion| minion.team),
            Attacker::Turret(id) => self
                .turrets
                .get(id)
                .filter(|turret| turret.can_strike_on(tick))
                .map(|turret| turret.team),
        }
    }

    fn attacker_position(&self, attacker: Attacker) -> Option<Vec2> {
        match attacker {
            Attacker::Minion(id) => self.minion(id).map(|minion| minion.position),
            Attacker::Turret(id) => self.turrets.get(id).map(|turret| turret.position),
        }
    }

    /// Position of a valid target for an attacker of `team`, if the target is still valid.
    fn target_position(&self, team: Team, attacker: Attacker, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Minion(id) => self
                .minion(id)
                .filter(|minion| minion.is_alive() && minion.team != team)
                .map(|minion| minion.position),
            TargetRef::Turret(id) => self
                .turrets
                .get(id)
                .filter(|turret| turret.is_alive() && turret.team != team)
                .map(|turret| turret.position),
            TargetRef::TankPoint => {
                let tankable = matches!(attacker, Attacker::Minion(_))
                    && team != self.config.operator_team;
                self.tank.filter(|_| tankable)
            }
        }
    }

    fn push_marker(&mut self, kind: MarkerKind, position: Vec2, radius: f32) {
        let ttl = self.config.tools.marker_ttl();
        self.markers.push(Marker {
            kind,
            position,
            radius,
            created_at: self.elapsed,
            expires_at: self.elapsed.saturating_add(ttl),
        });
    }

    fn release_tank(&mut self, out_events: &mut Vec<Event>) {
        if self.tank.take().is_some() {
            out_events.push(Event::TankReleased);
        }
    }

    fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        if self.paused != paused {
            self.paused = paused;
            debug!(paused, "pause toggled");
            out_events.push(Event::PauseChanged { paused });
        }
    }

    fn schedule_wave(
        &mut self,
        wave: u32,
        next_wave_at: Duration,
        spawns: Vec<SpawnPlan>,
        out_events: &mut Vec<Event>,
    ) {
        if wave <= self.wave_number {
            return;
        }

        let blue_alive = self.alive_count(Team::Blue);
        let red_alive = self.alive_count(Team::Red);
        self.trend.record_spawn_cycle(blue_alive, red_alive);

        let count = u32::try_from(spawns.len()).unwrap_or(u32::MAX);
        for plan in spawns {
            let id = SpawnId::new(self.allocate_id());
            self.pending.push(PendingSpawn {
                id,
                team: plan.team,
                kind: plan.kind,
                spawn_at: plan.spawn_at,
                lateral_offset: plan.lateral_offset,
            });
        }
        self.pending
            .sort_by(|a, b| a.spawn_at.cmp(&b.spawn_at).then(a.id.cmp(&b.id)));

        self.wave_number = wave;
        self.next_wave_at = next_wave_at;
        debug!(wave, spawns = count, blue_alive, red_alive, "wave scheduled");
        out_events.push(Event::WaveScheduled {
            wave,
            spawns: count,
            next_wave_at,
        });
    }

    fn materialize_spawn(&mut self, spawn: SpawnId, out_events: &mut Vec<Event>) {
        let Some(index) = self.pending.iter().position(|pending| pending.id == spawn) else {
            return;
        };
        if self.pending[index].spawn_at > self.elapsed {
            return;
        }

        let pending = self.pending.remove(index);
        let bounds = self.config.bounds();
        let origin = self.config.spawn_point(pending.team);
        let position = bounds.clamp(origin + Vec2::new(0.0, pending.lateral_offset));
        let stats = self.config.minion_stats(pending.kind).clone();
        let minion = MinionId::new(self.allocate_id());
        self.minions.push(MinionState::spawn(
            minion,
            pending.team,
            pending.kind,
            position,
            &stats,
        ));
        trace!(minion = minion.get(), team = ?pending.team, kind = ?pending.kind, "minion spawned");
        out_events.push(Event::MinionSpawned {
            minion,
            team: pending.team,
            kind: pending.kind,
            position,
        });
    }

    fn set_target(
        &mut self,
        attacker: Attacker,
        target: Option<TargetRef>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(team) = self.attacker_team(attacker) else {
            return;
        };
        let target = target.filter(|candidate| {
            self.target_position(team, attacker, *candidate).is_some()
        });

        let changed = match attacker {
            Attacker::Minion(id) => match self.minion_mut(id) {
                Some(minion) if minion.target != target => {
                    minion.target = target;
                    true
                }
                _ => false,
            },
            Attacker::Turret(id) => {
                let turret_target = match target {
                    Some(TargetRef::Minion(minion)) => Some(minion),
                    _ => None,
                };
                match self.turrets.get_mut(id) {
                    Some(turret) if turret.target != turret_target => {
                        turret.target = turret_target;
                        true
                    }
                    _ => false,
                }
            }
        };

        if changed {
            out_events.push(Event::TargetChanged { attacker, target });
        }
    }

    fn strike(&mut self, attacker: Attacker, target: TargetRef, out_events: &mut Vec<Event>) {
        let Some(team) = self.striker_team(attacker) else {
            return;
        };
        let Some(target_position) = self.target_position(team, attacker, target) else {
            return;
        };
        let Some(origin) = self.attacker_position(attacker) else {
            return;
        };

        let now = self.elapsed;
        let (style, damage, speed) = match attacker {
            Attacker::Minion(id) => {
                let Some(minion) = self.minion_mut(id) else {
                    return;
                };
                if !minion.snapshot().ready_at(now) {
                    return;
                }
                minion.last_attack = Some(now);
                (
                    minion.kind.attack_style(),
                    minion.stats.damage,
                    minion.stats.projectile_speed,
                )
            }
            Attacker::Turret(id) => {
                let config = &self.config;
                let Some(turret) = self.turrets.get_mut(id) else {
                    return;
                };
                if !turret.snapshot(config).ready_at(now) {
                    return;
                }
                turret.last_attack = Some(now);
                (
                    AttackStyle::Projectile,
                    config.turret.damage,
                    config.turret.projectile_speed,
                )
            }
        };

        match style {
            AttackStyle::Instant => {
                if target == TargetRef::TankPoint {
                    self.push_marker(MarkerKind::TankAbsorb, target_position, 10.0);
                    out_events.push(Event::DamageAbsorbed {
                        attacker,
                        amount: damage,
                    });
                } else {
                    self.push_marker(MarkerKind::MeleeSwing, target_position, 8.0);
                    self.deal_damage(target, damage, KillCause::Attack(attacker), out_events);
                }
            }
            AttackStyle::Projectile => {
                let source = match attacker {
                    Attacker::Minion(_) => ProjectileSource::Caster,
                    Attacker::Turret(_) => ProjectileSource::Turret,
                };
                let projectile = ProjectileId::new(self.allocate_id());
                self.projectiles.push(ProjectileState {
                    id: projectile,
                    attacker,
                    team,
                    source,
                    origin,
                    position: origin,
                    target,
                    speed,
                    damage,
                });
                out_events.push(Event::ProjectileLaunched {
                    projectile,
                    attacker,
                    target,
                });
            }
        }
    }

    fn deal_damage(
        &mut self,
        target: TargetRef,
        amount: u32,
        cause: KillCause,
        out_events: &mut Vec<Event>,
    ) {
        let tick = self.tick;
        match target {
            TargetRef::Minion(id) => {
                let Some(minion) = self.minion_mut(id).filter(|minion| minion.is_alive()) else {
                    return;
                };
                minion.health = minion.health.saturating_sub(amount);
                let remaining = minion.health;
                if remaining.is_zero() {
                    minion.downed_on = Some(tick);
                }
                let (team, kind) = (minion.team, minion.kind);
                out_events.push(Event::DamageDealt {
                    target,
                    amount,
                    remaining,
                });
                if remaining.is_zero() {
                    debug!(minion = id.get(), ?team, ?kind, ?cause, "minion killed");
                    out_events.push(Event::MinionKilled {
                        minion: id,
                        team,
                        kind,
                        cause,
                    });
                }
            }
            TargetRef::Turret(id) => {
                let Some(turret) = self.turrets.get_mut(id).filter(|turret| turret.is_alive())
                else {
                    return;
                };
                turret.health = turret.health.saturating_sub(amount);
                let remaining = turret.health;
                let team = turret.team;
                if remaining.is_zero() {
                    turret.target = None;
                    turret.destroyed_on = Some(tick);
                }
                out_events.push(Event::DamageDealt {
                    target,
                    amount,
                    remaining,
                });
                if remaining.is_zero() {
                    debug!(turret = id.get(), ?team, "turret destroyed");
                    out_events.push(Event::TurretDestroyed { turret: id, team });
                }
            }
            TargetRef::TankPoint => {}
        }
    }

    fn land_projectile(&mut self, projectile: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(index) = self
            .projectiles
            .iter()
            .position(|candidate| candidate.id == projectile)
        else {
            return;
        };
        let landed = self.projectiles.remove(index);
        let still_valid = self.target_position(landed.team, landed.attacker, landed.target);

        match (still_valid, landed.target) {
            (Some(position), TargetRef::TankPoint) => {
                self.push_marker(MarkerKind::TankAbsorb, position, 10.0);
                out_events.push(Event::DamageAbsorbed {
                    attacker: landed.attacker,
                    amount: landed.damage,
                });
            }
            (Some(_), target) => {
                self.deal_damage(
                    target,
                    landed.damage,
                    KillCause::Projectile(projectile),
                    out_events,
                );
            }
            (None, _) => out_events.push(Event::ProjectileWasted { projectile }),
        }
    }

    fn discard_projectile(&mut self, projectile: ProjectileId, out_events: &mut Vec<Event>) {
        let before = self.projectiles.len();
        self.projectiles.retain(|candidate| candidate.id != projectile);
        if self.projectiles.len() != before {
            out_events.push(Event::ProjectileWasted { projectile });
        }
    }

    fn apply_tool(
        &mut self,
        request: ToolRequest,
        effects: Vec<ToolEffect>,
        out_events: &mut Vec<Event>,
    ) {
        let victims = request.team.opponent();
        let mut affected = 0_u32;

        for effect in effects {
            match effect {
                ToolEffect::Kill { minion } => {
                    let Some(state) = self
                        .minion_mut(minion)
                        .filter(|state| state.is_alive() && state.team == victims)
                    else {
                        continue;
                    };
                    state.health = Health::ZERO;
                    let (team, kind) = (state.team, state.kind);
                    affected = affected.saturating_add(1);
                    out_events.push(Event::MinionKilled {
                        minion,
                        team,
                        kind,
                        cause: KillCause::Tool(request.tool),
                    });
                }
                ToolEffect::Wound {
                    minion,
                    amount,
                    floor,
                } => {
                    let Some(state) = self
                        .minion_mut(minion)
                        .filter(|state| state.is_alive() && state.team == victims)
                    else {
                        continue;
                    };
                    let floor = floor.max(Health::new(1)).min(state.health);
                    let wounded = state.health.saturating_sub(amount).max(floor);
                    let dealt = state.health.get().saturating_sub(wounded.get());
                    state.health = wounded;
                    affected = affected.saturating_add(1);
                    out_events.push(Event::DamageDealt {
                        target: TargetRef::Minion(minion),
                        amount: dealt,
                        remaining: wounded,
                    });
                }
                ToolEffect::Tank { position } => {
                    let position = self.config.bounds().clamp(position);
                    self.tank = Some(position);
                    debug!(x = position.x, y = position.y, "tank point engaged");
                    out_events.push(Event::TankEngaged { position });
                }
            }
        }

        let radius = self.config.tools.radius(request.tool);
        self.push_marker(MarkerKind::Tool(request.tool), request.position, radius);
        debug!(tool = request.tool.label(), affected, "tool applied");
        out_events.push(Event::ToolApplied {
            tool: request.tool,
            position: request.position,
            affected,
        });
    }

    fn cleanup(&mut self, out_events: &mut Vec<Event>) {
        let mut removed: Vec<MinionId> = Vec::new();
        self.minions.retain(|minion| {
            if minion.is_alive() {
                true
            } else {
                removed.push(minion.id);
                false
            }
        });

        if !removed.is_empty() {
            for minion in &mut self.minions {
                if let Some(TargetRef::Minion(target)) = minion.target {
                    if removed.binary_search(&target).is_ok() {
                        minion.target = None;
                    }
                }
            }
            for turret in self.turrets.iter_mut() {
                if let Some(target) = turret.target {
                    if removed.binary_search(&target).is_ok() {
                        turret.target = None;
                    }
                }
            }
            for minion in removed {
                out_events.push(Event::MinionRemoved { minion });
            }
        }

        let now = self.elapsed;
        self.markers.retain(|marker| !marker.is_expired(now));
    }

    fn record_sample(&mut self, sample: WaveSample) {
        let history = self.config.classifier.history();
        self.trend.record_sample(sample, history);
    }

    fn publish_wave_state(&mut self, state: WaveState, out_events: &mut Vec<Event>) {
        if self.wave_state != state {
            let from = self.wave_state;
            self.wave_state = state;
            debug!(from = from.label(), to = state.label(), "wave state changed");
            out_events.push(Event::WaveStateChanged { from, to: state });
        }
    }

    fn debug_check_invariants(&self) {
        debug_assert!(query::is_consistent(self), "world invariants violated");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick = world.tick.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SetPaused { paused } => world.set_paused(paused, out_events),
        Command::SetSpeed { speed } => {
            if world.speed != speed {
                world.speed = speed;
                debug!(factor = speed.factor(), "speed changed");
                out_events.push(Event::SpeedChanged { speed });
            }
        }
        Command::SelectTool { tool } => {
            if world.selected_tool != tool {
                world.selected_tool = tool;
                out_events.push(Event::ToolSelected { tool });
                if tool != ToolKind::Tank {
                    world.release_tank(out_events);
                }
            }
        }
        Command::ReleaseTank => world.release_tank(out_events),
        Command::ScheduleWave {
            wave,
            next_wave_at,
            spawns,
        } => world.schedule_wave(wave, next_wave_at, spawns, out_events),
        Command::MaterializeSpawn { spawn } => world.materialize_spawn(spawn, out_events),
        Command::SetTarget { attacker, target } => world.set_target(attacker, target, out_events),
        Command::MoveMinion { minion, to } => {
            let bounds = world.config.bounds();
            if let Some(state) = world.minion_mut(minion).filter(|state| state.is_alive()) {
                state.position = bounds.clamp(to);
            }
        }
        Command::Strike { attacker, target } => world.strike(attacker, target, out_events),
        Command::AdvanceProjectile { projectile, to } => {
            if let Some(state) = world
                .projectiles
                .iter_mut()
                .find(|candidate| candidate.id == projectile)
            {
                state.position = to;
            }
        }
        Command::LandProjectile { projectile } => world.land_projectile(projectile, out_events),
        Command::DiscardProjectile { projectile } => {
            world.discard_projectile(projectile, out_events);
        }
        Command::ApplyTool { request, effects } => world.apply_tool(request, effects, out_events),
        Command::RejectTool { request, reason } => {
            debug!(tool = request.tool.label(), ?reason, "tool ignored");
            out_events.push(Event::ToolIgnored {
                tool: request.tool,
                position: request.position,
                reason,
            });
        }
        Command::Cleanup => world.cleanup(out_events),
        Command::RecordWaveSample { sample } => world.record_sample(sample),
        Command::PublishWaveState { state } => world.publish_wave_state(state, out_events),
    }
    world.debug_check_invariants();
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use lane_control_core::{
        config::SimConfig, geometry::LaneBounds, ClockSnapshot, MarkerSnapshot, MinionView,
        PendingSpawnSnapshot, ProjectileView, ToolKind, TurretView, Vec2, WaveState, WaveTrend,
    };

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimConfig {
        &world.config
    }

    /// Playable bounds of the lane.
    #[must_use]
    pub fn bounds(world: &World) -> LaneBounds {
        world.config.bounds()
    }

    /// Captures a read-only view of the minions on the lane.
    #[must_use]
    pub fn minion_view(world: &World) -> MinionView {
        MinionView::from_snapshots(world.minions.iter().map(|minion| minion.snapshot()).collect())
    }

    /// Captures a read-only view of both turrets.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        TurretView::from_snapshots(
            world
                .turrets
                .iter()
                .map(|turret| turret.snapshot(&world.config))
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Pending spawns ordered by due time.
    #[must_use]
    pub fn pending_spawns(world: &World) -> Vec<PendingSpawnSnapshot> {
        world.pending.iter().map(|pending| pending.snapshot()).collect()
    }

    /// Markers that have not yet expired.
    #[must_use]
    pub fn markers(world: &World) -> Vec<MarkerSnapshot> {
        world
            .markers
            .iter()
            .filter(|marker| !marker.is_expired(world.elapsed))
            .map(|marker| marker.snapshot(world.elapsed))
            .collect()
    }

    /// Clock, wave counter, and control flags.
    #[must_use]
    pub fn clock(world: &World) -> ClockSnapshot {
        ClockSnapshot {
            elapsed: world.elapsed,
            tick: world.tick,
            wave_number: world.wave_number,
            next_wave_at: world.next_wave_at,
            paused: world.paused,
            speed: world.speed,
        }
    }

    /// Simulated time elapsed since the start.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Tool currently selected by the operator.
    #[must_use]
    pub fn selected_tool(world: &World) -> ToolKind {
        world.selected_tool
    }

    /// Position of the tank point while it is engaged.
    #[must_use]
    pub fn tank_point(world: &World) -> Option<Vec2> {
        world.tank
    }

    /// Most recently published wave-state label.
    #[must_use]
    pub fn wave_state(world: &World) -> WaveState {
        world.wave_state
    }

    /// Rolling history used by the classifier.
    #[must_use]
    pub fn trend(world: &World) -> &WaveTrend {
        &world.trend
    }

    /// Checks structural invariants of a world, typically one loaded from storage.
    ///
    /// Health never exceeds its maximum, identifiers are unique and below the
    /// allocation counter, minions sit inside the lane, and exactly one turret
    /// exists per team.
    #[must_use]
    pub fn is_consistent(world: &World) -> bool {
        let bounds = world.config.bounds();
        let counter = world.next_id;

        let minions_ok = world.minions.windows(2).all(|pair| pair[0].id < pair[1].id)
            && world.minions.iter().all(|minion| {
                minion.id.get() < counter
                    && minion.health <= minion.max_health()
                    && bounds.contains(minion.position)
            });

        let turrets: Vec<_> = world.turrets.iter().collect();
        let turrets_ok = turrets.len() == 2
            && turrets[0].team != turrets[1].team
            && turrets.iter().all(|turret| {
                turret.id.get() < counter && turret.health.get() <= world.config.turret.max_hp
            });

        let mut ids: Vec<u32> = world
            .minions
            .iter()
            .map(|minion| minion.id.get())
            .chain(turrets.iter().map(|turret| turret.id.get()))
            .chain(world.projectiles.iter().map(|projectile| projectile.id.get()))
            .chain(world.pending.iter().map(|pending| pending.id.get()))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        let unique = ids.len() == total && ids.iter().all(|id| *id < counter);

        minions_ok && turrets_ok && unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_control_core::{MinionKind, TurretId};

    fn spawn(world: &mut World, team: Team, kind: MinionKind, x: f32) -> MinionId {
        let wave = world.wave_number + 1;
        let next_wave_at = world.next_wave_at;
        let spawn_at = world.elapsed;
        let mut events = Vec::new();
        apply(
            world,
            Command::ScheduleWave {
                wave,
                next_wave_at,
                spawns: vec![SpawnPlan {
                    team,
                    kind,
                    spawn_at,
                    lateral_offset: 0.0,
                }],
            },
            &mut events,
        );
        let spawn = world.pending.last().expect("pending spawn").id;
        apply(world, Command::MaterializeSpawn { spawn }, &mut events);
        let id = world.minions.last().expect("spawned minion").id;
        apply(
            world,
            Command::MoveMinion {
                minion: id,
                to: Vec2::new(x, 200.0),
            },
            &mut events,
        );
        id
    }

    #[test]
    fn new_world_places_full_health_turrets() {
        let world = World::new();
        let turrets = query::turret_view(&world).into_vec();
        assert_eq!(turrets.len(), 2);
        assert!(turrets
            .iter()
            .all(|turret| turret.health == Health::new(5_000)));
        assert!(query::is_consistent(&world));
        assert_eq!(query::clock(&world).wave_number, 0);
    }

    #[test]
    fn stale_wave_schedule_is_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        let plan = SpawnPlan {
            team: Team::Blue,
            kind: MinionKind::Melee,
            spawn_at: Duration::ZERO,
            lateral_offset: 0.0,
        };
        apply(
            &mut world,
            Command::ScheduleWave {
                wave: 1,
                next_wave_at: Duration::from_secs(30),
                spawns: vec![plan],
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ScheduleWave {
                wave: 1,
                next_wave_at: Duration::from_secs(30),
                spawns: vec![plan],
            },
            &mut events,
        );
        assert_eq!(query::pending_spawns(&world).len(), 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn spawns_do_not_materialize_early() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ScheduleWave {
                wave: 1,
                next_wave_at: Duration::from_secs(30),
                spawns: vec![SpawnPlan {
                    team: Team::Red,
                    kind: MinionKind::Caster,
                    spawn_at: Duration::from_secs(1),
                    lateral_offset: 4.0,
                }],
            },
            &mut events,
        );
        let spawn = query::pending_spawns(&world)[0].id;
        apply(&mut world, Command::MaterializeSpawn { spawn }, &mut events);
        assert!(query::minion_view(&world).is_empty());

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        apply(&mut world, Command::MaterializeSpawn { spawn }, &mut events);
        let minions = query::minion_view(&world).into_vec();
        assert_eq!(minions.len(), 1);
        assert_eq!(minions[0].position, Vec2::new(1_170.0, 204.0));
    }

    #[test]
    fn instant_strike_respects_cooldown() {
        let mut world = World::new();
        let blue = spawn(&mut world, Team::Blue, MinionKind::Melee, 590.0);
        let red = spawn(&mut world, Team::Red, MinionKind::Melee, 610.0);
        let mut events = Vec::new();

        let strike = Command::Strike {
            attacker: Attacker::Minion(blue),
            target: TargetRef::Minion(red),
        };
        apply(&mut world, strike.clone(), &mut events);
        apply(&mut world, strike, &mut events);

        let damage: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::DamageDealt { .. }))
            .collect();
        assert_eq!(damage.len(), 1, "second strike must wait for the cooldown");
        let red_health = query::minion_view(&world)
            .get(red)
            .map(|minion| minion.health);
        assert_eq!(red_health, Some(Health::new(477 - 12)));
        assert_eq!(query::markers(&world).len(), 1);
    }

    #[test]
    fn simultaneous_lethal_strikes_both_land() {
        let mut config = SimConfig::default();
        config.minions.melee.max_hp = 12;
        config.minions.melee.damage = 12;
        let mut world = World::with_config(config);
        let blue = spawn(&mut world, Team::Blue, MinionKind::Melee, 600.0);
        let red = spawn(&mut world, Team::Red, MinionKind::Melee, 620.0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(blue),
                target: TargetRef::Minion(red),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(red),
                target: TargetRef::Minion(blue),
            },
            &mut events,
        );

        let killed: Vec<Team> = events
            .iter()
            .filter_map(|event| match event {
                Event::MinionKilled { team, .. } => Some(*team),
                _ => None,
            })
            .collect();
        assert_eq!(killed, vec![Team::Red, Team::Blue]);
    }

    #[test]
    fn downed_minion_cannot_strike_on_a_later_tick() {
        let mut config = SimConfig::default();
        config.minions.melee.max_hp = 12;
        config.minions.melee.damage = 12;
        let mut world = World::with_config(config);
        let blue = spawn(&mut world, Team::Blue, MinionKind::Melee, 600.0);
        let red = spawn(&mut world, Team::Red, MinionKind::Melee, 620.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(blue),
                target: TargetRef::Minion(red),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(red),
                target: TargetRef::Minion(blue),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn projectile_lands_after_its_caster_is_removed() {
        let mut config = SimConfig::default();
        config.operator_team = Team::Red;
        let mut world = World::with_config(config);
        let caster = spawn(&mut world, Team::Blue, MinionKind::Caster, 560.0);
        let red = spawn(&mut world, Team::Red, MinionKind::Melee, 640.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(caster),
                target: TargetRef::Minion(red),
            },
            &mut events,
        );
        let projectile = query::projectile_view(&world)
            .iter()
            .next()
            .expect("projectile launched")
            .id;

        apply(
            &mut world,
            Command::ApplyTool {
                request: ToolRequest {
                    tool: ToolKind::FullClear,
                    position: Vec2::new(560.0, 200.0),
                    team: Team::Red,
                },
                effects: vec![ToolEffect::Kill { minion: caster }],
            },
            &mut events,
        );
        apply(&mut world, Command::Cleanup, &mut events);
        assert!(query::minion_view(&world).get(caster).is_none());
        events.clear();
        apply(&mut world, Command::LandProjectile { projectile }, &mut events);

        assert_eq!(
            events,
            vec![Event::DamageDealt {
                target: TargetRef::Minion(red),
                amount: 23,
                remaining: Health::new(477 - 23),
            }]
        );
    }

    #[test]
    fn strikes_against_allies_are_rejected() {
        let mut world = World::new();
        let first = spawn(&mut world, Team::Blue, MinionKind::Melee, 590.0);
        let second = spawn(&mut world, Team::Blue, MinionKind::Melee, 600.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(first),
                target: TargetRef::Minion(second),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn projectile_to_removed_target_is_wasted() {
        let mut world = World::new();
        let caster = spawn(&mut world, Team::Blue, MinionKind::Caster, 560.0);
        let red = spawn(&mut world, Team::Red, MinionKind::Melee, 640.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(caster),
                target: TargetRef::Minion(red),
            },
            &mut events,
        );
        let projectile = query::projectile_view(&world)
            .iter()
            .next()
            .expect("projectile launched")
            .id;

        apply(
            &mut world,
            Command::ApplyTool {
                request: ToolRequest {
                    tool: ToolKind::FullClear,
                    position: Vec2::new(640.0, 200.0),
                    team: Team::Blue,
                },
                effects: vec![ToolEffect::Kill { minion: red }],
            },
            &mut events,
        );
        apply(&mut world, Command::Cleanup, &mut events);
        events.clear();
        apply(&mut world, Command::LandProjectile { projectile }, &mut events);

        assert_eq!(events, vec![Event::ProjectileWasted { projectile }]);
        assert!(query::projectile_view(&world).iter().next().is_none());
    }

    #[test]
    fn wound_never_kills() {
        let mut world = World::new();
        let red = spawn(&mut world, Team::Red, MinionKind::Caster, 600.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyTool {
                request: ToolRequest {
                    tool: ToolKind::AoE,
                    position: Vec2::new(600.0, 200.0),
                    team: Team::Blue,
                },
                effects: vec![ToolEffect::Wound {
                    minion: red,
                    amount: 10_000,
                    floor: Health::new(1),
                }],
            },
            &mut events,
        );
        let health = query::minion_view(&world).get(red).map(|minion| minion.health);
        assert_eq!(health, Some(Health::new(1)));
    }

    #[test]
    fn tool_effects_skip_operator_minions() {
        let mut world = World::new();
        let blue = spawn(&mut world, Team::Blue, MinionKind::Melee, 600.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyTool {
                request: ToolRequest {
                    tool: ToolKind::FullClear,
                    position: Vec2::new(600.0, 200.0),
                    team: Team::Blue,
                },
                effects: vec![ToolEffect::Kill { minion: blue }],
            },
            &mut events,
        );
        assert!(query::minion_view(&world)
            .get(blue)
            .is_some_and(|minion| minion.is_alive()));
    }

    #[test]
    fn selecting_another_tool_releases_tank() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SelectTool {
                tool: ToolKind::Tank,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ApplyTool {
                request: ToolRequest {
                    tool: ToolKind::Tank,
                    position: Vec2::new(700.0, 200.0),
                    team: Team::Blue,
                },
                effects: vec![ToolEffect::Tank {
                    position: Vec2::new(700.0, 200.0),
                }],
            },
            &mut events,
        );
        assert_eq!(query::tank_point(&world), Some(Vec2::new(700.0, 200.0)));

        events.clear();
        apply(
            &mut world,
            Command::SelectTool {
                tool: ToolKind::AoE,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::ToolSelected { tool: ToolKind::AoE },
                Event::TankReleased
            ]
        );
        assert_eq!(query::tank_point(&world), None);
    }

    #[test]
    fn destroyed_turret_stops_attacking_and_is_untargetable() {
        let mut config = SimConfig::default();
        config.turret.max_hp = 10;
        let mut world = World::with_config(config);
        let red_turret = TurretId::new(1);
        let cannon = spawn(&mut world, Team::Blue, MinionKind::Cannon, 1_050.0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Strike {
                attacker: Attacker::Minion(cannon),
                target: TargetRef::Turret(red_turret),
            },
            &mut events,
        );
        assert!(events.contains(&Event::TurretDestroyed {
            turret: red_turret,
            team: Team::Red,
        }));

        let retaliate = Command::Strike {
            attacker: Attacker::Turret(red_turret),
            target: TargetRef::Minion(cannon),
        };
        events.clear();
        apply(&mut world, retaliate.clone(), &mut events);
        assert!(
            matches!(events.as_slice(), [Event::ProjectileLaunched { .. }]),
            "the shot started on the tick it fell still lands"
        );

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, retaliate, &mut events);
        assert!(events.is_empty());
        let red = query::turret_view(&world)
            .get(red_turret)
            .copied()
            .expect("destroyed turret stays registered");
        assert!(!red.is_alive());
        assert_eq!(red.target, None);
    }

    #[test]
    fn cleanup_removes_dead_minions_and_stale_targets() {
        let mut world = World::new();
        let blue = spawn(&mut world, Team::Blue, MinionKind::Melee, 590.0);
        let red = spawn(&mut world, Team::Red, MinionKind::Melee, 610.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetTarget {
                attacker: Attacker::Minion(blue),
                target: Some(TargetRef::Minion(red)),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ApplyTool {
                request: ToolRequest {
                    tool: ToolKind::FullClear,
                    position: Vec2::new(610.0, 200.0),
                    team: Team::Blue,
                },
                effects: vec![ToolEffect::Kill { minion: red }],
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::Cleanup, &mut events);

        assert_eq!(events, vec![Event::MinionRemoved { minion: red }]);
        let view = query::minion_view(&world);
        assert_eq!(view.len(), 1);
        assert_eq!(view.get(blue).and_then(|minion| minion.target), None);
    }

    #[test]
    fn world_survives_json_round_trip() {
        let mut world = World::new();
        let _ = spawn(&mut world, Team::Red, MinionKind::Cannon, 800.0);
        let encoded = serde_json::to_string(&world).expect("encode world");
        let decoded: World = serde_json::from_str(&encoded).expect("decode world");
        assert_eq!(decoded, world);
        assert!(query::is_consistent(&decoded));
    }
}
