use lane_control_core::{MinionView, Team, TurretSnapshot, Vec2};
use lane_control_rendering::{
    palette, Color, Hud, LanePresentation, MarkerPresentation, MinionPresentation,
    ProjectilePresentation, Scene, TurretPresentation,
};
use lane_control_world::{query, World};

/// Captures the read-only scene handed to render sinks.
#[must_use]
pub fn capture_scene(world: &World) -> Scene {
    let minions = query::minion_view(world);
    let clock = query::clock(world);
    let alive = |team: Team| {
        let count = minions.alive().filter(|minion| minion.team == team).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    };

    let hud = Hud {
        elapsed: clock.elapsed,
        wave_number: clock.wave_number,
        next_wave_in: clock.next_wave_at.saturating_sub(clock.elapsed),
        paused: clock.paused,
        speed: clock.speed,
        tool: query::selected_tool(world),
        tank: query::tank_point(world),
        wave_state: query::wave_state(world),
        blue_alive: alive(Team::Blue),
        red_alive: alive(Team::Red),
    };
    let lane = LanePresentation {
        bounds: query::bounds(world),
        color: palette::LANE,
    };
    let mut scene = Scene::new(lane, hud);

    scene.minions = minions
        .alive()
        .map(|minion| MinionPresentation {
            id: minion.id,
            team: minion.team,
            kind: minion.kind,
            position: minion.position,
            health_fraction: fraction(minion.health.get(), minion.max_health.get()),
            color: palette::team(minion.team),
        })
        .collect();

    scene.turrets = query::turret_view(world)
        .iter()
        .map(|turret| TurretPresentation {
            id: turret.id,
            team: turret.team,
            position: turret.position,
            range: turret.range,
            body_radius: turret.body_radius,
            health_fraction: fraction(turret.health.get(), turret.max_health.get()),
            target: turret_target(turret, &minions),
            color: turret_color(turret),
        })
        .collect();

    scene.projectiles = query::projectile_view(world)
        .iter()
        .map(|projectile| ProjectilePresentation {
            id: projectile.id,
            position: projectile.position,
            source: projectile.source,
            color: palette::projectile(projectile.source),
        })
        .collect();

    scene.markers = query::markers(world)
        .into_iter()
        .map(|marker| MarkerPresentation {
            kind: marker.kind,
            position: marker.position,
            radius: marker.radius,
            color: palette::marker(marker.kind).fade(1.0 - marker.age),
        })
        .collect();

    scene
}

fn turret_target(turret: &TurretSnapshot, minions: &MinionView) -> Option<Vec2> {
    let target = minions.get(turret.target?)?;
    target.is_alive().then_some(target.position)
}

fn turret_color(turret: &TurretSnapshot) -> Color {
    let base = palette::team(turret.team);
    if turret.is_alive() {
        base
    } else {
        base.washed(0.6).fade(0.5)
    }
}

fn fraction(current: u32, max: u32) -> f32 {
    if max == 0 {
        0.0
    } else {
        (current as f32 / max as f32).clamp(0.0, 1.0)
    }
}
