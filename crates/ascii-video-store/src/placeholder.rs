//! Synthetic single-frame animations.

use ascii_video_core::ansi::{GREEN, RED, RESET, YELLOW};
use ascii_video_core::{Animation, RenderedFrame};
use ascii_video_render::measure;

fn text_frame(body: String) -> RenderedFrame {
    let dims = measure(&body);
    RenderedFrame::new(body, dims)
}

/// Stand-in for an animation that yielded no frames.
pub fn placeholder(name: &str) -> Animation {
    let body = format!("{GREEN}🐦 No frames found in '{name}' directory! 🐦{RESET}");
    Animation::single(name, text_frame(body))
}

/// In-band error shown for a name that is not registered.
///
/// Lists the known names so the user can pick one from the terminal.
pub fn unknown_animation(name: &str, known: &[String]) -> Animation {
    let body = format!(
        "{RED}❌ Folder '{name}' not found!{RESET}\n\n{YELLOW}Available folders: {}{RESET}",
        known.join(", ")
    );
    Animation::single(name, text_frame(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_single_frame() {
        let anim = placeholder("parrot");
        assert_eq!(anim.len(), 1);
        assert_eq!(anim.name(), "parrot");
        assert_eq!(
            anim.frames()[0].body(),
            "\x1b[92m🐦 No frames found in 'parrot' directory! 🐦\x1b[0m"
        );
    }

    #[test]
    fn test_unknown_lists_known_names() {
        let known = vec!["overdrive".to_string(), "parrot".to_string()];
        let anim = unknown_animation("nope", &known);
        assert_eq!(anim.len(), 1);
        let body = anim.frames()[0].body();
        assert!(body.contains("Folder 'nope' not found!"));
        assert!(body.contains("Available folders: overdrive, parrot"));
        assert_eq!(anim.dimensions().rows, 3);
    }
}
