//! Border style catalog
//!
//! Ordered list of named presets. Order matters: `cycle_style` walks it.

use crate::shared::Rgb;

/// Display name of the synthetic wallpaper-derived preset
pub const WALLPAPER_SYNC_NAME: &str = "Wallpaper Sync";
/// Border width used for wallpaper-derived borders
pub const WALLPAPER_SYNC_WIDTH: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Solid,
    Double,
    Dashed,
    Gradient,
}

impl BorderStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Double => "double",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Gradient => "gradient",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(BorderStyle::Solid),
            "double" => Some(BorderStyle::Double),
            "dashed" => Some(BorderStyle::Dashed),
            "gradient" => Some(BorderStyle::Gradient),
            _ => None,
        }
    }
}

/// A named enabled/style/color/width combination applied as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderPreset {
    pub name: &'static str,
    pub enabled: bool,
    pub style: BorderStyle,
    pub color: Rgb,
    pub width: u32,
}

pub const CATALOG: [BorderPreset; 7] = [
    BorderPreset {
        name: "None",
        enabled: false,
        style: BorderStyle::Solid,
        color: Rgb::BLACK,
        width: 0,
    },
    BorderPreset {
        name: "Classic Black",
        enabled: true,
        style: BorderStyle::Solid,
        color: Rgb::BLACK,
        width: 2,
    },
    BorderPreset {
        name: "Ocean Blue",
        enabled: true,
        style: BorderStyle::Solid,
        color: Rgb::new(0x1e, 0x90, 0xff),
        width: 3,
    },
    BorderPreset {
        name: "Gold Double",
        enabled: true,
        style: BorderStyle::Double,
        color: Rgb::new(0xff, 0xd7, 0x00),
        width: 4,
    },
    BorderPreset {
        name: "Neon Dashed",
        enabled: true,
        style: BorderStyle::Dashed,
        color: Rgb::new(0x39, 0xff, 0x14),
        width: 3,
    },
    BorderPreset {
        name: "Crimson",
        enabled: true,
        style: BorderStyle::Solid,
        color: Rgb::new(0xdc, 0x14, 0x3c),
        width: 3,
    },
    BorderPreset {
        name: "Rainbow",
        enabled: true,
        style: BorderStyle::Gradient,
        color: Rgb::RED,
        width: 4,
    },
];

/// Colors the gradient style cycles through
pub const GRADIENT_SPECTRUM: [Rgb; 7] = [
    Rgb::new(0xff, 0x00, 0x00), // red
    Rgb::new(0xff, 0x7f, 0x00), // orange
    Rgb::new(0xff, 0xff, 0x00), // yellow
    Rgb::new(0x00, 0xff, 0x00), // green
    Rgb::new(0x00, 0x00, 0xff), // blue
    Rgb::new(0x4b, 0x00, 0x82), // indigo
    Rgb::new(0x94, 0x00, 0xd3), // violet
];

/// Position of `name` in the catalog
pub fn index_of(name: &str) -> Option<usize> {
    CATALOG.iter().position(|preset| preset.name == name)
}

pub fn find(name: &str) -> Option<&'static BorderPreset> {
    index_of(name).map(|i| &CATALOG[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = CATALOG.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), CATALOG.len());
        assert!(!names.contains(WALLPAPER_SYNC_NAME));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(index_of("None"), Some(0));
        assert_eq!(find("Gold Double").map(|p| p.style), Some(BorderStyle::Double));
        assert!(find("Plaid").is_none());
    }

    #[test]
    fn test_style_parse() {
        for style in [BorderStyle::Solid, BorderStyle::Double, BorderStyle::Dashed, BorderStyle::Gradient] {
            assert_eq!(BorderStyle::parse(style.as_str()), Some(style));
        }
        assert_eq!(BorderStyle::parse("Dashed"), Some(BorderStyle::Dashed));
        assert_eq!(BorderStyle::parse("groove"), None);
    }
}
