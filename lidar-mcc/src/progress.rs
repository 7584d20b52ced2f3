use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Returns a bar counting classified points out of `length`.
pub fn bar(header: String, length: u64, quiet: bool) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(length), draw_target(quiet));
    pb.set_prefix(header);
    pb.set_style(
        ProgressStyle::with_template("{prefix}... {msg}\n[{wide_bar:.cyan/blue}] {pos}/{len}")
            .expect("incorrect progress bar format string")
            .progress_chars("#>-"),
    );
    pb
}

fn draw_target(quiet: bool) -> ProgressDrawTarget {
    if quiet {
        ProgressDrawTarget::hidden()
    } else {
        ProgressDrawTarget::stderr_with_hz(4)
    }
}
