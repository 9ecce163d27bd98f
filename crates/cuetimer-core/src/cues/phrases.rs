//! Static spoken-cue text.

pub const WARN: &str = "uwaga!";
pub const START: &str = "start!";
pub const HALFWAY: &str = "połowa czasu!";
pub const FINISHED: &str = "koniec! ... czas na przerwę...";

/// Words for the last five seconds, highest first.
pub const COUNTDOWN: [(u64, &str); 5] = [
    (5, "pięć..."),
    (4, "cztery..."),
    (3, "trzy..."),
    (2, "dwa..."),
    (1, "jeden..."),
];
