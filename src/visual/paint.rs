use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::visual::state::{FlashMode, VisualState};

pub const CLASS_HIGHLIGHT: &str = "fl-highlight";
pub const CLASS_HIGHLIGHT_STRONG: &str = "fl-highlight-strong";
pub const CLASS_FLASH_ONCE: &str = "fl-flash-once";
pub const CLASS_FLASH_INFINITE: &str = "fl-flash-infinite";

/// Alpha of the background tint derived from a hex color.
const TINT_ALPHA: f32 = 0.15;

/// Concrete presentation of a [`VisualState`] on a label node.
///
/// Derived wholesale from the state on every transition, so repainting with the
/// same state never stacks effects.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LabelPaint {
    pub classes: BTreeSet<&'static str>,
    pub outline_color: Option<String>,
    pub background: Option<String>,
}

impl LabelPaint {
    pub fn from_state(state: &VisualState) -> Self {
        let mut classes = BTreeSet::new();
        if state.highlighted {
            classes.insert(CLASS_HIGHLIGHT);
        }
        if state.strong {
            classes.insert(CLASS_HIGHLIGHT_STRONG);
        }
        match state.flash {
            FlashMode::None => {}
            FlashMode::Once => {
                classes.insert(CLASS_FLASH_ONCE);
            }
            FlashMode::Continuous => {
                classes.insert(CLASS_FLASH_INFINITE);
            }
        }
        Self {
            classes,
            outline_color: state.color.clone(),
            background: state.color.as_deref().and_then(|c| hex_to_rgba(c, TINT_ALPHA)),
        }
    }

    pub fn has(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn is_blank(&self) -> bool {
        *self == LabelPaint::default()
    }
}

fn hex_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static hex color pattern")
    })
}

/// `#rgb` / `#rrggbb` to an `rgba(...)` string. Named colors yield `None`
/// and are left to the renderer.
pub fn hex_to_rgba(color: &str, alpha: f32) -> Option<String> {
    let c = color.trim();
    let caps = hex_color_re().captures(c)?;
    let hex = caps.get(1)?.as_str();
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = if hex.len() == 3 {
        let expand = |i: usize| {
            let d = &hex[i..i + 1];
            channel(&format!("{d}{d}"))
        };
        (expand(0)?, expand(1)?, expand(2)?)
    } else {
        (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)
    };
    Some(format!("rgba({r}, {g}, {b}, {alpha})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_become_tints() {
        assert_eq!(hex_to_rgba("#f5c542", 0.15).as_deref(), Some("rgba(245, 197, 66, 0.15)"));
        assert_eq!(hex_to_rgba(" #fff ", 0.15).as_deref(), Some("rgba(255, 255, 255, 0.15)"));
        assert_eq!(hex_to_rgba("yellow", 0.15), None);
        assert_eq!(hex_to_rgba("#12345", 0.15), None);
        assert_eq!(hex_to_rgba("#ggg", 0.15), None);
    }

    #[test]
    fn paint_follows_state() {
        let state = VisualState {
            highlighted: true,
            strong: true,
            flash: FlashMode::Continuous,
            color: Some("#000000".into()),
        };
        let paint = LabelPaint::from_state(&state);
        assert!(paint.has(CLASS_HIGHLIGHT));
        assert!(paint.has(CLASS_HIGHLIGHT_STRONG));
        assert!(paint.has(CLASS_FLASH_INFINITE));
        assert!(!paint.has(CLASS_FLASH_ONCE));
        assert_eq!(paint.background.as_deref(), Some("rgba(0, 0, 0, 0.15)"));

        assert!(LabelPaint::from_state(&VisualState::default()).is_blank());
    }
}
