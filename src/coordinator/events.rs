//! Input events and menu commands

/// Pointer gestures, in root-window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Primary button pressed on the widget
    DragStart { x: i32, y: i32 },
    /// Pointer moved with the primary button held
    DragMove { x: i32, y: i32 },
    /// Pointer moved with the primary button and the resize modifier held
    ModifierDrag { x: i32, y: i32 },
    /// Primary button released
    DragEnd,
    DoubleClick,
    /// Secondary button pressed on the widget
    ContextMenuRequest { x: i32, y: i32 },
    /// The context menu went away, optionally with a chosen command
    MenuClosed(Option<MenuAction>),
    /// The window was exposed and needs repainting
    Redraw,
}

/// Context menu commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SelectSource,
    TogglePlayback,
    ToggleResizeMode,
    ToggleHidePolicy,
    SetBorder(&'static str),
    NextBorder,
    ToggleWallpaperSync,
    ResetPosition,
    Exit,
}
