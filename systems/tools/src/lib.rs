#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system resolving operator tool clicks into world effects.
//!
//! Tools only ever touch minions of the team opposing the issuer. All
//! effects of a click are emitted in a single `ApplyTool` command so the
//! world applies them within one tick.

use lane_control_core::{
    config::{SimConfig, ToolConfig},
    geometry::{self, LaneBounds},
    Command, Health, MinionKind, MinionSnapshot, MinionView, Team, ToolEffect, ToolKind,
    ToolRejection, ToolRequest, Vec2,
};

/// Configuration parameters required to construct the tool system.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    tools: ToolConfig,
    bounds: LaneBounds,
    operator_team: Team,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(tools: ToolConfig, bounds: LaneBounds, operator_team: Team) -> Self {
        Self {
            tools,
            bounds,
            operator_team,
        }
    }

    /// Derives the tool configuration from the simulation configuration.
    #[must_use]
    pub fn from_sim_config(config: &SimConfig) -> Self {
        Self::new(config.tools.clone(), config.bounds(), config.operator_team)
    }
}

/// Tool system translating clicks into `ApplyTool` and `RejectTool` commands.
#[derive(Debug)]
pub struct Tools {
    config: Config,
}

impl Tools {
    /// Creates a new tool system.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Builds the request issued by the operator clicking at `position`.
    #[must_use]
    pub fn request(&self, tool: ToolKind, position: Vec2) -> ToolRequest {
        ToolRequest {
            tool,
            position,
            team: self.config.operator_team,
        }
    }

    /// Resolves a tool request against the current minion snapshot.
    ///
    /// Clicks are validated against the playable lane band (y between the
    /// lane top and bottom, x across the full width), not the whole canvas:
    /// a click above or below the lane is rejected as out of bounds.
    pub fn handle(&self, request: ToolRequest, minions: &MinionView, out: &mut Vec<Command>) {
        if !self.config.bounds.contains(request.position) {
            out.push(Command::RejectTool {
                request,
                reason: ToolRejection::OutOfBounds,
            });
            return;
        }

        let tools = &self.config.tools;
        let radius = tools.radius(request.tool);
        let victims = request.team.opponent();
        let in_reach = |minion: &&MinionSnapshot| {
            minion.team == victims && geometry::within_radius(request.position, minion.position, radius)
        };
        let kill = |minion: &MinionSnapshot| ToolEffect::Kill { minion: minion.id };

        let effects: Vec<ToolEffect> = match request.tool {
            ToolKind::LastHit => minions
                .alive()
                .filter(in_reach)
                .filter(|minion| minion.health.get() < tools.lasthit_threshold)
                .map(kill)
                .collect(),
            ToolKind::AoE => minions
                .alive()
                .filter(in_reach)
                .map(|minion| ToolEffect::Wound {
                    minion: minion.id,
                    amount: tools.aoe_damage,
                    floor: Health::new(1),
                })
                .collect(),
            ToolKind::KillCasters => minions
                .alive()
                .filter(in_reach)
                .filter(|minion| minion.kind == MinionKind::Caster)
                .map(kill)
                .collect(),
            ToolKind::FullClear => minions.alive().filter(in_reach).map(kill).collect(),
            ToolKind::Tank => vec![ToolEffect::Tank {
                position: request.position,
            }],
        };

        out.push(Command::ApplyTool { request, effects });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_control_core::MinionId;
    use std::time::Duration;

    fn minion(id: u32, team: Team, kind: MinionKind, x: f32, hp: u32) -> MinionSnapshot {
        MinionSnapshot {
            id: MinionId::new(id),
            team,
            kind,
            position: Vec2::new(x, 200.0),
            health: Health::new(hp),
            max_health: Health::new(477),
            damage: 12,
            range: 28.0,
            attack_interval: Duration::from_millis(800),
            last_attack: None,
            move_speed: 40.0,
            projectile_speed: 0.0,
            target: None,
        }
    }

    fn system() -> Tools {
        Tools::new(Config::from_sim_config(&SimConfig::default()))
    }

    fn effects(commands: &[Command]) -> Vec<ToolEffect> {
        match commands {
            [Command::ApplyTool { effects, .. }] => effects.clone(),
            other => panic!("expected a single ApplyTool, got {other:?}"),
        }
    }

    #[test]
    fn click_outside_lane_is_rejected() {
        let tools = system();
        let request = tools.request(ToolKind::FullClear, Vec2::new(600.0, 20.0));
        let mut out = Vec::new();
        tools.handle(request, &MinionView::default(), &mut out);
        assert_eq!(
            out,
            vec![Command::RejectTool {
                request,
                reason: ToolRejection::OutOfBounds,
            }]
        );
    }

    #[test]
    fn canvas_clicks_beside_the_lane_band_are_rejected() {
        let tools = system();
        let mut out = Vec::new();
        let below = tools.request(ToolKind::AoE, Vec2::new(600.0, 300.0));
        tools.handle(below, &MinionView::default(), &mut out);
        let edge = tools.request(ToolKind::AoE, Vec2::new(600.0, 140.0));
        tools.handle(edge, &MinionView::default(), &mut out);

        assert!(matches!(
            out.as_slice(),
            [
                Command::RejectTool {
                    reason: ToolRejection::OutOfBounds,
                    ..
                },
                Command::ApplyTool { .. },
            ]
        ));
    }

    #[test]
    fn kill_casters_leaves_other_kinds_and_allies() {
        let tools = system();
        let minions = MinionView::from_snapshots(vec![
            minion(1, Team::Red, MinionKind::Caster, 650.0, 296),
            minion(2, Team::Red, MinionKind::Melee, 640.0, 477),
            minion(3, Team::Blue, MinionKind::Caster, 600.0, 296),
            minion(4, Team::Red, MinionKind::Caster, 900.0, 296),
        ]);
        let mut out = Vec::new();
        tools.handle(
            tools.request(ToolKind::KillCasters, Vec2::new(600.0, 200.0)),
            &minions,
            &mut out,
        );
        assert_eq!(
            effects(&out),
            vec![ToolEffect::Kill {
                minion: MinionId::new(1)
            }]
        );
    }

    #[test]
    fn full_clear_kills_every_enemy_in_range() {
        let tools = system();
        let minions = MinionView::from_snapshots(vec![
            minion(1, Team::Red, MinionKind::Caster, 650.0, 296),
            minion(2, Team::Red, MinionKind::Cannon, 799.0, 912),
            minion(3, Team::Red, MinionKind::Melee, 801.0, 477),
        ]);
        let mut out = Vec::new();
        tools.handle(
            tools.request(ToolKind::FullClear, Vec2::new(600.0, 200.0)),
            &minions,
            &mut out,
        );
        assert_eq!(
            effects(&out),
            vec![
                ToolEffect::Kill {
                    minion: MinionId::new(1)
                },
                ToolEffect::Kill {
                    minion: MinionId::new(2)
                },
            ]
        );
    }

    #[test]
    fn tank_plants_point_at_click() {
        let tools = system();
        let mut out = Vec::new();
        tools.handle(
            tools.request(ToolKind::Tank, Vec2::new(700.0, 210.0)),
            &MinionView::default(),
            &mut out,
        );
        assert_eq!(
            effects(&out),
            vec![ToolEffect::Tank {
                position: Vec2::new(700.0, 210.0)
            }]
        );
    }
}
