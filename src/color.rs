//! Runtime ANSI gate and the fixed style set used by the help renderer.

use owo_colors::{OwoColorize, Style};

use crate::context::RunContext;

/// Any non-"0" value disables ANSI styling everywhere.
pub const NO_COLOR_ENV: &str = "STRICLI_NO_COLOR";

/// Styling happens only when the application allows it, the environment
/// does not veto it, and the stream reports at least 16 colors.
pub(crate) fn should_use_ansi_color(
    config_allows: bool,
    ctx: &RunContext,
    depth: Option<u16>,
) -> bool {
    config_allows && !ctx.env_enabled(NO_COLOR_ENV) && depth.map_or(false, |d| d >= 4)
}

/// Applies the help palette, or nothing when styling is off.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Painter {
    enabled: bool,
}

impl Painter {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn apply(&self, style: Style, text: &str) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn header(&self, text: &str) -> String {
        self.apply(Style::new().bold(), text)
    }

    pub(crate) fn brief(&self, text: &str) -> String {
        self.apply(Style::new().italic(), text)
    }

    pub(crate) fn dim(&self, text: &str) -> String {
        self.apply(Style::new().dimmed(), text)
    }

    pub(crate) fn route(&self, text: &str) -> String {
        self.apply(Style::new().cyan(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_requires_config_env_and_depth() {
        let (mut ctx, _, _) = RunContext::in_memory();
        assert!(should_use_ansi_color(true, &ctx, Some(4)));
        assert!(should_use_ansi_color(true, &ctx, Some(24)));
        assert!(!should_use_ansi_color(true, &ctx, Some(1)));
        assert!(!should_use_ansi_color(true, &ctx, None));
        assert!(!should_use_ansi_color(false, &ctx, Some(24)));

        ctx.env.insert(NO_COLOR_ENV.to_string(), "1".to_string());
        assert!(!should_use_ansi_color(true, &ctx, Some(24)));
        ctx.env.insert(NO_COLOR_ENV.to_string(), "0".to_string());
        assert!(should_use_ansi_color(true, &ctx, Some(24)));
    }

    #[test]
    fn disabled_painter_passes_text_through() {
        let plain = Painter::new(false);
        assert_eq!(plain.header("FLAGS"), "FLAGS");
        let ansi = Painter::new(true);
        assert_ne!(ansi.header("FLAGS"), "FLAGS");
        assert!(ansi.header("FLAGS").contains("FLAGS"));
    }
}
