//! Sidebar geometry for the documentation page layout.
//!
//! Pure arithmetic over pixel sizes reported by the host; the only side effect is
//! persisting the sidebar width through [`Settings`].

use crate::config::{Config, DEFAULT_SIDEBAR_WIDTH};
use crate::error::Result;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

/// Settings key holding the sidebar width.
pub const WIDTH_KEY: &str = "width";

const BAR_WIDTH: u32 = 6;
const TOUCH_BAR_WIDTH: u32 = 20;

/// Page layout generated by the documentation tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageLayout {
    /// Header above both the sidebar and the content.
    #[default]
    Default,
    /// The top index is disabled; the sidebar spans the full window height and
    /// the footer sits beside it.
    IndexDisabled,
}

/// Horizontal placement after a width change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthLayout {
    pub content_margin: u32,
    /// Only set for [`PageLayout::IndexDisabled`].
    pub footer_margin: Option<u32>,
    pub sidebar_width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightLayout {
    pub content: u32,
    pub nav_tree: u32,
    pub sidebar: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarLayout {
    page_layout: PageLayout,
    bar_width: u32,
    default_width: u32,
}

impl SidebarLayout {
    pub fn new(page_layout: PageLayout, touch: bool) -> Self {
        Self {
            page_layout,
            bar_width: if touch { TOUCH_BAR_WIDTH } else { BAR_WIDTH },
            default_width: DEFAULT_SIDEBAR_WIDTH,
        }
    }

    pub fn from_config(config: &Config, page_layout: PageLayout) -> Self {
        Self {
            default_width: config.default_width,
            ..Self::new(page_layout, config.touch)
        }
    }

    pub fn bar_width(&self) -> u32 {
        self.bar_width
    }

    pub fn page_layout(&self) -> PageLayout {
        self.page_layout
    }

    fn footer_margin(&self, margin: u32) -> Option<u32> {
        (self.page_layout == PageLayout::IndexDisabled).then_some(margin)
    }

    /// Place the sidebar at `nav_width`, leaving room for the split bar.
    pub fn restore_width(&self, nav_width: u32) -> WidthLayout {
        let margin = nav_width.saturating_add(self.bar_width);
        WidthLayout {
            content_margin: margin,
            footer_margin: self.footer_margin(margin),
            sidebar_width: nav_width,
        }
    }

    /// The user dragged the split bar; `sidenav_outer_width` includes the bar.
    pub fn resize_width(&self, sidenav_outer_width: u32, settings: &mut Settings) -> Result<WidthLayout> {
        let width = sidenav_outer_width.saturating_sub(self.bar_width);
        settings.write_setting_default(WIDTH_KEY, &width.to_string())?;
        Ok(WidthLayout {
            content_margin: sidenav_outer_width,
            footer_margin: self.footer_margin(sidenav_outer_width),
            sidebar_width: width,
        })
    }

    /// Heights of the content pane, navigation tree and sidebar for a window.
    pub fn resize_height(&self, header: u32, footer: u32, window: u32) -> HeightLayout {
        match self.page_layout {
            PageLayout::Default => {
                let content = window.saturating_sub(header).saturating_sub(footer);
                HeightLayout {
                    content,
                    nav_tree: content,
                    sidebar: content,
                }
            }
            PageLayout::IndexDisabled => HeightLayout {
                content: window.saturating_sub(footer),
                nav_tree: window.saturating_sub(header),
                sidebar: window,
            },
        }
    }

    /// Width the sidebar toggles to: closed when open, otherwise the saved width
    /// if it fits the window, else the default.
    pub fn collapse_expand(&self, current: u32, saved: u32, window: u32) -> u32 {
        if current > 0 {
            0
        } else if saved > self.default_width && saved < window {
            saved
        } else {
            self.default_width
        }
    }

    /// Layout for the saved width, or the default when nothing is saved.
    pub fn restore_saved(&self, settings: &Settings) -> WidthLayout {
        self.restore_width(settings.read_parsed(WIDTH_KEY, self.default_width))
    }

    /// Toggle the sidebar and persist the resulting width.
    pub fn toggle(&self, current: u32, window: u32, settings: &mut Settings) -> Result<WidthLayout> {
        let saved = settings.read_parsed(WIDTH_KEY, self.default_width);
        let width = self.collapse_expand(current, saved, window);
        tracing::debug!("Sidebar toggled from {} to {}", current, width);
        settings.write_setting_default(WIDTH_KEY, &width.to_string())?;
        Ok(self.restore_width(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn settings() -> Settings {
        Settings::in_memory("doxygen_")
    }

    #[rstest]
    #[case(false, 6)]
    #[case(true, 20)]
    fn test_bar_width(#[case] touch: bool, #[case] expected: u32) {
        check!(SidebarLayout::new(PageLayout::Default, touch).bar_width() == expected);
    }

    #[test]
    fn test_restore_width() {
        let layout = SidebarLayout::new(PageLayout::Default, false);
        let placed = layout.restore_width(300);
        check!(placed.content_margin == 306);
        check!(placed.footer_margin == None);
        check!(placed.sidebar_width == 300);

        let layout = SidebarLayout::new(PageLayout::IndexDisabled, true);
        check!(layout.restore_width(300).footer_margin == Some(320));
    }

    #[test]
    fn test_resize_width_persists() {
        let layout = SidebarLayout::new(PageLayout::Default, false);
        let mut settings = settings();
        let placed = layout.resize_width(318, &mut settings).unwrap();
        check!(placed.content_margin == 318);
        check!(placed.sidebar_width == 312);
        check!(settings.read_setting(WIDTH_KEY, "") == "312");
        check!(layout.restore_saved(&settings).content_margin == 318);
    }

    #[rstest]
    #[case(PageLayout::Default, HeightLayout { content: 700, nav_tree: 700, sidebar: 700 })]
    #[case(PageLayout::IndexDisabled, HeightLayout { content: 770, nav_tree: 870, sidebar: 900 })]
    fn test_resize_height(#[case] page_layout: PageLayout, #[case] expected: HeightLayout) {
        let layout = SidebarLayout::new(page_layout, false);
        check!(layout.resize_height(30, 130, 900) == expected);
    }

    #[test]
    fn test_resize_height_tiny_window() {
        let layout = SidebarLayout::new(PageLayout::Default, false);
        check!(layout.resize_height(100, 100, 50).content == 0);
    }

    #[rstest]
    #[case::open(300, 400, 1000, 0)]
    #[case::saved_fits(0, 400, 1000, 400)]
    #[case::saved_too_small(0, 250, 1000, 250)]
    #[case::saved_too_wide(0, 1200, 1000, 250)]
    #[case::nothing_saved(0, 0, 1000, 250)]
    fn test_collapse_expand(
        #[case] current: u32,
        #[case] saved: u32,
        #[case] window: u32,
        #[case] expected: u32,
    ) {
        let layout = SidebarLayout::new(PageLayout::Default, false);
        check!(layout.collapse_expand(current, saved, window) == expected);
    }

    #[test]
    fn test_toggle_round_trip() {
        let layout = SidebarLayout::new(PageLayout::Default, false);
        let mut settings = settings();
        settings.write_setting_default(WIDTH_KEY, "420").unwrap();

        let closed = layout.toggle(420, 1200, &mut settings).unwrap();
        check!(closed.sidebar_width == 0);
        check!(closed.content_margin == 6);

        // Closing saved zero, so reopening falls back to the default.
        let opened = layout.toggle(0, 1200, &mut settings).unwrap();
        check!(opened.sidebar_width == 250);
    }

    #[test]
    fn test_default_width_from_config() {
        let config = Config {
            default_width: 280,
            ..Config::default()
        };
        let layout = SidebarLayout::from_config(&config, PageLayout::Default);
        check!(layout.collapse_expand(0, 0, 1000) == 280);
        check!(layout.restore_saved(&settings()).sidebar_width == 280);
    }
}
