//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::scoring::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Pick a palette from the terminal background. Falls back to dark when the
/// terminal does not answer the query.
pub fn resolve_theme() -> Theme {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => Theme::Light,
        _ => Theme::Dark,
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Risk level badge (success / warning / error)
    pub level_low: Color,
    pub level_medium: Color,
    pub level_high: Color,

    // Attribution bars
    pub bar_raises_risk: Color,
    pub bar_lowers_risk: Color,
    pub bar_empty: Color,

    // Form
    pub field_selected: Style,
    pub field_editing: Style,
    pub field_label: Color,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub border: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            level_low: Color::Green,
            level_medium: Color::Yellow,
            level_high: Color::Red,
            bar_raises_risk: Color::Red,
            bar_lowers_risk: Color::Green,
            bar_empty: Color::DarkGray,
            field_selected: Style::new().reversed(),
            field_editing: Style::new().fg(Color::Yellow).bold(),
            field_label: Color::Gray,
            muted: Color::Gray,
            title_color: Color::Cyan,
            border: Color::Indexed(238),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    pub fn light() -> Self {
        Self {
            level_low: Color::Rgb(0, 128, 0),
            level_medium: Color::Rgb(176, 120, 0),
            level_high: Color::Rgb(180, 0, 0),
            bar_raises_risk: Color::Rgb(180, 0, 0),
            bar_lowers_risk: Color::Rgb(0, 128, 0),
            bar_empty: Color::Indexed(250),
            field_selected: Style::new().reversed(),
            field_editing: Style::new().fg(Color::Rgb(176, 120, 0)).bold(),
            field_label: Color::DarkGray,
            muted: Color::DarkGray,
            title_color: Color::Blue,
            border: Color::Indexed(250),
            status_bar_bg: Color::Indexed(254),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 128, 0),
            flash_error: Color::Rgb(180, 0, 0),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    pub fn level_color(&self, level: RiskLevel) -> Color {
        match level {
            RiskLevel::Low => self.level_low,
            RiskLevel::Medium => self.level_medium,
            RiskLevel::High => self.level_high,
        }
    }

    /// Color for a contribution: positive values push toward default.
    pub fn contribution_color(&self, contribution: f64) -> Color {
        if contribution > 0.0 {
            self.bar_raises_risk
        } else {
            self.bar_lowers_risk
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_colors_follow_traffic_light() {
        let colors = ThemeColors::dark();
        assert_eq!(colors.level_color(RiskLevel::Low), Color::Green);
        assert_eq!(colors.level_color(RiskLevel::Medium), Color::Yellow);
        assert_eq!(colors.level_color(RiskLevel::High), Color::Red);
    }

    #[test]
    fn test_contribution_color() {
        let colors = ThemeColors::light();
        assert_eq!(colors.contribution_color(0.3), colors.bar_raises_risk);
        assert_eq!(colors.contribution_color(-0.3), colors.bar_lowers_risk);
    }
}
