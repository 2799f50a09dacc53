//! Text written to the client on each stream tick.

use ascii_video_core::ansi::{FULL_CLEAR, MAGENTA, RESET, YELLOW};
use ascii_video_core::{Animation, StreamParams};

/// Interval as shown in the metadata line: whole numbers keep one decimal (`1.0`).
pub fn format_interval(seconds: f64) -> String {
    if seconds.is_finite() && seconds.fract() == 0.0 {
        format!("{seconds:.1}")
    } else {
        format!("{seconds}")
    }
}

/// One tick: clear, frame body, blank line, status line, metadata line, blank line.
///
/// `position` is the 0-based cursor into a selection of `selected` frames.
pub fn tick(
    animation: &Animation,
    frame_index: usize,
    position: usize,
    selected: usize,
    params: &StreamParams,
) -> String {
    let body = animation.frame(frame_index).map(|f| f.body()).unwrap_or("");
    format!(
        "{FULL_CLEAR}{body}\n\n\
         {YELLOW}🎉 Animation '{name}' #{pos}/{selected} - Use Ctrl+C to stop! 🎉{RESET}\n\
         {MAGENTA}Interval: {interval}s | Stride: {stride} | Total frames: {total}{RESET}\n\
         {RESET}\n",
        name = animation.name(),
        pos = position + 1,
        interval = format_interval(params.interval()),
        stride = params.stride(),
        total = animation.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascii_video_core::{Dimensions, RenderedFrame};

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0.1), "0.1");
        assert_eq!(format_interval(0.05), "0.05");
        assert_eq!(format_interval(1.0), "1.0");
        assert_eq!(format_interval(10.0), "10.0");
    }

    #[test]
    fn test_tick_text() {
        let frames = vec![
            RenderedFrame::new("A", Dimensions::new(1, 1)),
            RenderedFrame::new("B", Dimensions::new(1, 1)),
            RenderedFrame::new("C", Dimensions::new(1, 1)),
        ];
        let anim = Animation::new("demo", frames).unwrap();
        let params = StreamParams::new(0.5, 2);

        let text = tick(&anim, 2, 1, 2, &params);
        assert_eq!(
            text,
            "\x1b[2J\x1b[3J\x1b[HC\n\n\
             \x1b[93m🎉 Animation 'demo' #2/2 - Use Ctrl+C to stop! 🎉\x1b[0m\n\
             \x1b[95mInterval: 0.5s | Stride: 2 | Total frames: 3\x1b[0m\n\
             \x1b[0m\n"
        );
    }
}
