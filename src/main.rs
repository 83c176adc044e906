//! Arcade Sim headless demo
//!
//! Runs one game at a simulated 60 Hz host cadence with a simple autopilot
//! and prints the final render snapshot as JSON.
//!
//! Usage: `arcade-sim [game] [seed] [frames]`. A tuning file can be supplied
//! through `ARCADE_SIM_TUNING`.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::PathBuf;

    use arcade_sim::Engine;
    use arcade_sim::games::GameKind;
    use arcade_sim::sim::{Game, InputEvent, Key, Lifecycle, PlayerView, Snapshot};
    use arcade_sim::tuning::Tuning;

    const HOST_HZ: f64 = 60.0;
    const DEFAULT_SEED: u64 = 42;
    const DEFAULT_FRAMES: u64 = 3600;
    /// Frames between pins fired by the autopilot
    const PIN_INTERVAL: u64 = 45;

    struct Args {
        kind: GameKind,
        seed: u64,
        frames: u64,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = std::env::args().skip(1);
        let kind = match args.next() {
            Some(name) => GameKind::parse(&name).ok_or_else(|| format!("unknown game '{name}'"))?,
            None => GameKind::Breakout,
        };
        let seed = match args.next() {
            Some(s) => s.parse().map_err(|_| format!("invalid seed '{s}'"))?,
            None => DEFAULT_SEED,
        };
        let frames = match args.next() {
            Some(s) => s.parse().map_err(|_| format!("invalid frame count '{s}'"))?,
            None => DEFAULT_FRAMES,
        };
        Ok(Args { kind, seed, frames })
    }

    /// Inputs a competent player would send after seeing `snap`
    fn autopilot(kind: GameKind, snap: &Snapshot, frame: u64) -> Vec<InputEvent> {
        match kind {
            GameKind::Breakout | GameKind::Pong => follow_ball(snap),
            GameKind::Flap => flap(snap),
            GameKind::Runner => dodge(snap),
            GameKind::Pins => {
                if frame % PIN_INTERVAL == 0 {
                    vec![InputEvent::KeyDown { key: Key::Space }]
                } else {
                    Vec::new()
                }
            }
            GameKind::Tiles => tap_lowest(snap),
            GameKind::Reflex => {
                if snap.lifecycle == Lifecycle::Running {
                    vec![InputEvent::PointerDown { x: 1.0, y: 1.0 }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn follow_ball(snap: &Snapshot) -> Vec<InputEvent> {
        let (Some(ball), Some(paddle)) = (snap.with_role("ball").next(), snap.player_body()) else {
            return Vec::new();
        };
        let target = ball.center();
        vec![InputEvent::PointerMove {
            x: target.x,
            y: paddle.pos.y,
        }]
    }

    fn flap(snap: &Snapshot) -> Vec<InputEvent> {
        let Some(bird) = snap.player_body() else {
            return Vec::new();
        };
        let gap_bottom = snap
            .with_role("pipe_bottom")
            .find(|pipe| pipe.max().x >= bird.min().x)
            .map_or(snap.playfield.height * 0.6, |pipe| pipe.pos.y);
        if bird.vel.y >= 0.0 && bird.max().y > gap_bottom - 25.0 {
            vec![InputEvent::KeyDown { key: Key::Space }]
        } else {
            Vec::new()
        }
    }

    fn dodge(snap: &Snapshot) -> Vec<InputEvent> {
        let Some(PlayerView::Lane { index }) = snap.player else {
            return Vec::new();
        };
        let near = snap.playfield.height * 0.45..snap.playfield.height;
        let blocked = |lane: i32| {
            snap.entities
                .iter()
                .any(|view| view.body.lane() == Some(lane) && near.contains(&view.body.pos.y))
        };
        if !blocked(index) {
            return Vec::new();
        }
        // Shifts past the outer lanes are ignored by the game
        let key = if !blocked(index - 1) { Key::Left } else { Key::Right };
        vec![InputEvent::KeyDown { key }]
    }

    fn tap_lowest(snap: &Snapshot) -> Vec<InputEvent> {
        snap.with_role("tile")
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .filter(|tile| tile.pos.y > snap.playfield.height * 0.4)
            .map(|tile| {
                let c = tile.center();
                InputEvent::PointerDown { x: c.x, y: c.y }
            })
            .into_iter()
            .collect()
    }

    pub fn run() -> i32 {
        let args = match parse_args() {
            Ok(args) => args,
            Err(e) => {
                eprintln!("error: {e}");
                eprintln!("usage: arcade-sim [game] [seed] [frames]");
                return 2;
            }
        };

        let tuning_path = std::env::var_os("ARCADE_SIM_TUNING").map(PathBuf::from);
        let tuning = Tuning::load_or_default(tuning_path.as_deref());

        log::info!(
            "Arcade Sim (native) running {} with seed {} for {} frames",
            args.kind.as_str(),
            args.seed,
            args.frames
        );

        let game = args.kind.build(&tuning, args.seed);
        let mut engine = Engine::new(game, &tuning.engine);
        engine.attach();
        engine.start();

        let mut last = engine.game().lifecycle();
        let mut ticks = 0;
        for frame in 0..args.frames {
            let now = frame as f64 / HOST_HZ;
            let snap = engine.snapshot();
            for event in autopilot(args.kind, &snap, frame) {
                engine.push_input(event);
            }
            ticks += engine.frame(now);

            let lifecycle = engine.game().lifecycle();
            if lifecycle != last {
                log::info!("Frame {frame}: {last:?} -> {lifecycle:?}");
                last = lifecycle;
            }
            if lifecycle.is_ended() {
                break;
            }
        }
        engine.detach();

        log::info!("Ran {ticks} ticks, final score {}", engine.snapshot().score);
        match serde_json::to_string_pretty(&engine.snapshot()) {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(e) => {
                log::error!("Failed to serialize snapshot: {e}");
                1
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    std::process::exit(demo::run());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the embedding host on wasm
}
