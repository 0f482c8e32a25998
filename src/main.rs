//! Saber Slash entry point
//!
//! The web build is driven from the page through `platform::web::WebGame`.
//! The native binary runs a short headless session and prints the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use saber_slash::consts::SIM_DT;
    use saber_slash::input::Key;
    use saber_slash::sim::{GameState, SessionMode, TickInput, tick};
    use saber_slash::Settings;

    env_logger::init();
    log::info!("Saber Slash (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    let mut state = GameState::new(seed, Settings::default(), SessionMode::Desktop);
    log::info!("Game initialized with seed: {}", seed);

    // Sweep the left saber back and forth across the lane
    for i in 0..1200u32 {
        let key = if (i / 16) % 2 == 0 { Key::D } else { Key::A };
        let input = TickInput {
            keys: vec![key],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            log::debug!("tick {}: {:?}", state.time_ticks, event);
        }
    }

    println!("Seed:       {}", seed);
    println!("Ticks:      {}", state.time_ticks);
    println!("Score:      {}", state.score);
    println!("Spawned:    {}", state.stats.spawned);
    println!("Hits:       {}", state.stats.hits);
    println!("Mismatches: {}", state.stats.mismatches);
    println!("Misses:     {}", state.stats.misses);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start
}
