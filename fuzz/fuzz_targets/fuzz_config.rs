#![no_main]

//! Configuration loading fuzzer.
//!
//! Arbitrary JSON must either be rejected with an error or produce a
//! configuration that builds a consistent world.

use libfuzzer_sys::fuzz_target;
use skirmish::game::invariants::check_invariants;
use skirmish::{BattleConfig, BattleWorld};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = BattleConfig::from_json_str(text) else {
        return;
    };

    // Keep runtime bounded: huge grids are valid but slow.
    if u32::from(config.width) * u32::from(config.height) > 4096 || config.units_per_team > 64 {
        return;
    }

    // Placement may legitimately fail on crowded maps; it must not panic.
    let Ok(world) = BattleWorld::create(config) else {
        return;
    };
    assert!(check_invariants(&world).is_empty());

    let json = serde_json::to_string(&config).unwrap_or_default();
    let reparsed = BattleConfig::from_json_str(&json);
    assert!(reparsed.is_ok(), "serialized config failed to reload: {json}");
});
