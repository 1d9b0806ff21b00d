use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    // Zero marks an empty driver slot, so never hand it out.
    nanos.max(1)
}

/// Returns a process-unique, non-zero connection id.
///
/// Seeded from the clock once, then incremented, so ids handed out in the same
/// instant never collide.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(seed()));
    counter.fetch_add(1, Ordering::Relaxed)
}
