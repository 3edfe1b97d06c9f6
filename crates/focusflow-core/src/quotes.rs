//! Motivational quotes shown beside the timers.

pub const DEFAULT_ROTATION_SECS: u64 = 10;

pub const MOTIVATIONAL_QUOTES: [&str; 8] = [
    "The secret of getting ahead is getting started.",
    "Don't watch the clock; do what it does. Keep going.",
    "The expert in anything was once a beginner.",
    "The only way to do great work is to love what you do.",
    "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    "Believe you can and you're halfway there.",
    "Code is like humor. When you have to explain it, it\u{2019}s bad.",
    "Focus on being productive instead of busy.",
];

/// Quote on display `elapsed_secs` after the view appeared, moving to the
/// next one every `rotation_secs` and wrapping around.
pub fn quote_at(elapsed_secs: u64, rotation_secs: u64) -> &'static str {
    let step = elapsed_secs / rotation_secs.max(1);
    let index = (step % MOTIVATIONAL_QUOTES.len() as u64) as usize;
    MOTIVATIONAL_QUOTES[index]
}
