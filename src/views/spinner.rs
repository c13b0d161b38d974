use std::time::Instant;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MS: u128 = 80;

/// Braille spinner frame for the time elapsed since `start`.
pub fn spinner_frame(start: Option<Instant>) -> &'static str {
    let elapsed = start.map(|s| s.elapsed().as_millis()).unwrap_or(0);
    FRAMES[(elapsed / FRAME_MS) as usize % FRAMES.len()]
}
