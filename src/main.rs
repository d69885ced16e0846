//! Ledge headless demo
//!
//! Loads a level, spawns the player and a few enemies at seeded positions and
//! plays a scripted session through the fixed-step loop, logging what happens.
//!
//! Usage: `ledge [level.json] [seed]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use ledge::consts::*;
use ledge::sim::{BodyKind, Control, LevelDesc, SimEvent, Spawn, TickInput, World};
use ledge::{Settings, SimError};

const DEMO_LEVEL: &str = include_str!("../assets/levels/demo.json");
const SETTINGS_PATH: &str = "ledge-settings.json";
const DEFAULT_SEED: u64 = 7;
const ENEMY_COUNT: usize = 4;
/// Distance kept from the room edges when placing enemies
const ENEMY_MARGIN: f32 = 64.0;
const SESSION_SECONDS: f32 = 20.0;

/// Fixed-step driver: accumulates frame time and runs whole ticks
struct Runner {
    world: World,
    input: TickInput,
    accumulator: f32,
}

impl Runner {
    fn new(world: World) -> Self {
        Self {
            world,
            input: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Run as many ticks as the elapsed frame time allows
    fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.world.tick(&self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Jump is an edge, not a held state
            self.input.player.jump = false;
        }
    }
}

/// Player intent for the scripted session at time `t`
fn script(t: f32, previous: f32, world: &World) -> Control {
    let from = world
        .player()
        .map(|p| p.bounds().center())
        .unwrap_or_default();
    let aim = nearest_enemy(world, from);

    let direction = match t {
        t if t < 9.0 => 1,
        t if t < 12.0 => -1,
        _ => 0,
    };
    Control {
        direction,
        jump: previous < 4.0 && t >= 4.0,
        fall_through: (12.0..13.0).contains(&t),
        fire: t >= 4.0 && aim.is_some(),
        aim,
    }
}

fn nearest_enemy(world: &World, from: Vec2) -> Option<Vec2> {
    world
        .bodies()
        .iter()
        .filter(|b| b.kind() == BodyKind::Enemy)
        .map(|b| b.bounds().center())
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

/// Seeded enemy drop point near the top of the room, away from the side walls
fn enemy_position(rng: &mut impl Rng, width: f32, height: f32) -> Vec2 {
    let margin = (width * 0.25).min(ENEMY_MARGIN);
    let x = rng.random_range(margin..width - margin);
    Vec2::new(x, (height * 0.25).min(ENEMY_MARGIN))
}

fn run() -> Result<(), SimError> {
    let mut args = std::env::args().skip(1);
    let desc = match args.next() {
        Some(path) => {
            log::info!("Loading level {path}");
            LevelDesc::load(&path)?
        }
        None => LevelDesc::from_json(DEMO_LEVEL)?,
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let settings = Settings::load_or_default(SETTINGS_PATH);
    let mut world = World::from_level(&desc, settings)?;
    let start = world
        .room
        .spawn
        .unwrap_or(Vec2::new(world.room.width * 0.5, 0.0));
    world.spawn(Spawn::Player, start);

    let mut rng = Pcg32::seed_from_u64(seed);
    for _ in 0..ENEMY_COUNT {
        let position = enemy_position(&mut rng, world.room.width, world.room.height);
        world.spawn(Spawn::Enemy, position);
    }
    log::info!("Session started with seed {seed}");

    let mut runner = Runner::new(world);
    let mut elapsed = 0.0f32;
    let mut next_report = 1.0f32;
    let mut kills = 0;

    while elapsed < SESSION_SECONDS {
        // Uneven frame times exercise the accumulator
        let frame = rng.random_range(0.010..0.025);
        let previous = elapsed;
        elapsed += frame;

        let control = script(elapsed, previous, &runner.world);
        runner.input.player = Control {
            jump: control.jump || runner.input.player.jump,
            ..control
        };
        runner.update(frame);

        let mut defeated = false;
        for event in runner.world.drain_events() {
            match event {
                SimEvent::Killed { id } => {
                    kills += 1;
                    log::info!("Enemy {id} down ({kills} so far)");
                }
                SimEvent::PlayerDefeated { id } => {
                    log::info!("Player {id} defeated");
                    defeated = true;
                }
                SimEvent::Hit(hit) => log::debug!("{} hit {}", hit.projectile, hit.target),
                SimEvent::Despawned { .. } => {}
            }
        }
        if defeated {
            break;
        }

        if elapsed >= next_report {
            next_report += 1.0;
            report(&runner.world, elapsed);
        }
    }

    log::info!(
        "Session over after {} ticks: {} enemies down, {} bodies live",
        runner.world.time_ticks,
        kills,
        runner.world.bodies().len()
    );
    Ok(())
}

fn report(world: &World, elapsed: f32) {
    let count = |kind: BodyKind| world.bodies().iter().filter(|b| b.kind() == kind).count();
    match world.player() {
        Some(player) => log::info!(
            "t={:.1}s player ({:.0}, {:.0}) v=({:.0}, {:.0}) grounded={} enemies={} projectiles={} camera ({:.0}, {:.0})",
            elapsed,
            player.position.x,
            player.position.y,
            player.velocity.x,
            player.velocity.y,
            player.grounded,
            count(BodyKind::Enemy),
            count(BodyKind::Projectile),
            world.camera.center.x,
            world.camera.center.y
        ),
        None => log::info!("t={elapsed:.1}s no player"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ledge (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
