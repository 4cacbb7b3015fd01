//! Progress reporting utilities: count-style progress bars for file and post loops.

use indicatif::{ProgressBar, ProgressStyle};

/// Count-style progress bar (items processed out of total), with an optional label.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}"
    )
    .unwrap()
    .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// A small wrapper around an `indicatif` count bar.
/// - `inc_items(delta)` increments progress
/// - `finish(msg)` finalizes the bar with a message
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn count<T: Into<String>>(label: T, total: u64) -> Self {
        let label = label.into();
        Self { pb: make_count_progress(total, &label) }
    }

    /// Build a scope only when `enabled`; callers hold `Option<ProgressScope>`.
    pub fn count_if<T: Into<String>>(enabled: bool, label: T, total: u64) -> Option<Self> {
        if enabled { Some(Self::count(label, total)) } else { None }
    }

    #[inline] pub fn inc_items(&self, delta: u64) { self.pb.inc(delta); }
    pub fn set_message<T: Into<String>>(&self, msg: T) { self.pb.set_message(msg.into()); }
    pub fn finish<T: Into<String>>(&self, msg: T) { self.pb.finish_with_message(msg.into()); }
}
