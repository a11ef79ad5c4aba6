//! Credit Rush entry point
//!
//! The web build is driven from `web::GameHandle`. Natively this runs a
//! headless autopilot session and logs the outcome.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use credit_rush::{Settings, Variant};

    env_logger::init();
    log::info!("Credit Rush (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(arg) if arg.ends_with(".json") => {
            match Settings::load_from(std::path::Path::new(&arg)) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!("{err}; using default settings");
                    Settings::default()
                }
            }
        }
        Some(arg) => match Variant::from_str(&arg) {
            Some(variant) => Settings::from_variant(variant),
            None => {
                log::warn!("Unknown variant `{arg}`; using Classic");
                Settings::default()
            }
        },
        None => Settings::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .or(settings.seed)
        .unwrap_or(12345);

    run_autopilot(&settings, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}

/// Play one session with a simple tilt-following bot
#[cfg(not(target_arch = "wasm32"))]
fn run_autopilot(settings: &credit_rush::Settings, seed: u64) {
    use credit_rush::consts::{TILT_MAX_DEG, TILT_MAX_STEP};
    use credit_rush::sim::{GamePhase, GameSession, Sample};

    const SAMPLE_MS: u32 = 20;
    const MAX_RUN_MS: u32 = 20 * 60 * 1000;

    let mut session = GameSession::new(settings.effective_rules(), seed);
    session.on_connected("autopilot");
    session.start();

    let mut elapsed = 0;
    while !session.phase().is_terminal() && elapsed < MAX_RUN_MS {
        let state = session.state();
        // Chase the token closest to the bottom
        let target = state
            .tokens
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|t| t.pos.x)
            .unwrap_or(50.0);
        let dx = target - state.player.x;
        let roll = (dx / TILT_MAX_STEP * TILT_MAX_DEG).clamp(-TILT_MAX_DEG, TILT_MAX_DEG);
        let roll = roll.to_radians();

        if let Err(err) = session.on_sample(Sample::from_accel(0.0, roll.sin(), roll.cos())) {
            log::warn!("autopilot sample rejected: {err}");
        }
        session.advance(SAMPLE_MS);
        elapsed += SAMPLE_MS;
    }

    let view = session.view();
    match &view.phase {
        GamePhase::Graduated => println!("Graduated with {} / {}", view.score, view.max_score),
        GamePhase::GameOver { .. } => println!(
            "Game over in {}: {}",
            view.grade_label,
            view.reason.as_deref().unwrap_or("")
        ),
        other => println!("Stopped after {} s in {:?}", elapsed / 1000, other),
    }
    let tally = session.session_tally();
    println!(
        "Tokens: {} spawned, {} collected, {} dropped; courses: {}/{}",
        tally.spawned,
        tally.collected,
        tally.dropped,
        view.courses.iter().filter(|c| c.obtained).count(),
        view.courses.len()
    );
}
