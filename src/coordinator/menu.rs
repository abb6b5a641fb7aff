//! Context menu model
//!
//! A snapshot of the commands and check states at the moment the menu opens.
//! The platform only renders it and reports which entry was chosen.

use super::events::MenuAction;
use crate::border::CATALOG;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Entry {
        label: String,
        checked: bool,
        action: MenuAction,
    },
    Separator,
}

/// State the menu labels depend on
#[derive(Debug, Clone, Copy)]
pub struct MenuContext<'a> {
    pub playing: bool,
    pub resize_mode: bool,
    pub hide_when_not_desktop: bool,
    pub wallpaper_sync: bool,
    pub border_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuModel {
    pub items: Vec<MenuItem>,
}

impl MenuModel {
    pub fn build(ctx: &MenuContext<'_>) -> Self {
        let mut items = vec![
            entry("Select New GIF", false, MenuAction::SelectSource),
            entry(
                if ctx.playing { "Pause Animation" } else { "Play Animation" },
                false,
                MenuAction::TogglePlayback,
            ),
            MenuItem::Separator,
            entry(
                if ctx.resize_mode { "Exit Resize Mode" } else { "Resize Mode" },
                false,
                MenuAction::ToggleResizeMode,
            ),
            MenuItem::Separator,
            entry("Hide when not on desktop", ctx.hide_when_not_desktop, MenuAction::ToggleHidePolicy),
            MenuItem::Separator,
        ];

        for preset in CATALOG.iter() {
            items.push(entry(
                &format!("Border: {}", preset.name),
                preset.name == ctx.border_name,
                MenuAction::SetBorder(preset.name),
            ));
        }
        items.push(entry("Next Border Style", false, MenuAction::NextBorder));
        items.push(entry("Wallpaper Sync", ctx.wallpaper_sync, MenuAction::ToggleWallpaperSync));

        items.extend([
            MenuItem::Separator,
            entry("Reset Position", false, MenuAction::ResetPosition),
            MenuItem::Separator,
            entry("Exit", false, MenuAction::Exit),
        ]);

        Self { items }
    }

    /// Action of the item at `index`, if it is an entry
    pub fn action_at(&self, index: usize) -> Option<MenuAction> {
        match self.items.get(index)? {
            MenuItem::Entry { action, .. } => Some(*action),
            MenuItem::Separator => None,
        }
    }
}

fn entry(label: &str, checked: bool, action: MenuAction) -> MenuItem {
    MenuItem::Entry {
        label: label.to_string(),
        checked,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_labels(model: &MenuModel) -> Vec<&str> {
        model
            .items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Entry { label, checked: true, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_current_preset_is_checked() {
        let model = MenuModel::build(&MenuContext {
            playing: true,
            resize_mode: false,
            hide_when_not_desktop: true,
            wallpaper_sync: false,
            border_name: "Gold Double",
        });
        assert_eq!(checked_labels(&model), vec!["Hide when not on desktop", "Border: Gold Double"]);
    }

    #[test]
    fn test_wallpaper_sync_checks_no_preset() {
        let model = MenuModel::build(&MenuContext {
            playing: false,
            resize_mode: true,
            hide_when_not_desktop: false,
            wallpaper_sync: true,
            border_name: "Wallpaper Sync",
        });
        assert_eq!(checked_labels(&model), vec!["Wallpaper Sync"]);
        assert!(model.items.contains(&entry("Exit Resize Mode", false, MenuAction::ToggleResizeMode)));
        assert!(model.items.contains(&entry("Play Animation", false, MenuAction::TogglePlayback)));
    }

    #[test]
    fn test_action_at() {
        let model = MenuModel::build(&MenuContext {
            playing: true,
            resize_mode: false,
            hide_when_not_desktop: true,
            wallpaper_sync: false,
            border_name: "None",
        });
        assert_eq!(model.action_at(0), Some(MenuAction::SelectSource));
        assert_eq!(model.action_at(2), None);
        assert_eq!(model.action_at(model.items.len() - 1), Some(MenuAction::Exit));
        assert_eq!(model.action_at(999), None);
    }
}
