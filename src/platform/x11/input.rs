//! Raw X events to widget gestures

use std::time::{Duration, Instant};

use x11rb::protocol::xproto::{KeyButMask, Window};
use x11rb::protocol::Event;

use super::surface::X11Surface;
use crate::coordinator::InputEvent;

/// Two presses closer than this in time and space are a double click
pub const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(400);
pub const DOUBLE_CLICK_DISTANCE: i32 = 4;

const BUTTON_PRIMARY: u8 = 1;
const BUTTON_SECONDARY: u8 = 3;

#[derive(Debug, Clone, Copy)]
struct Press {
    at: Instant,
    x: i32,
    y: i32,
}

pub struct InputTranslator {
    widget: Window,
    menu: Window,
    last_press: Option<Press>,
    dragging: bool,
}

impl InputTranslator {
    pub fn new(widget: Window, menu: Window) -> Self {
        Self {
            widget,
            menu,
            last_press: None,
            dragging: false,
        }
    }

    /// Map one X event to a gesture. Events for other windows, and those that
    /// mean nothing to the coordinator, give `None`.
    pub fn translate(&mut self, event: &Event, now: Instant, surface: &X11Surface) -> Option<InputEvent> {
        match event {
            Event::ButtonPress(press) if press.event == self.menu || surface.menu_showing() => {
                // The menu holds the grab, so every press lands here
                let action = if press.event == self.menu {
                    surface.menu_action_at(press.event_x, press.event_y)
                } else {
                    None
                };
                Some(InputEvent::MenuClosed(action))
            }
            Event::ButtonPress(press) if press.event == self.widget => {
                let (x, y) = (press.root_x as i32, press.root_y as i32);
                match press.detail {
                    BUTTON_PRIMARY => Some(self.primary_press(now, x, y)),
                    BUTTON_SECONDARY => {
                        self.dragging = false;
                        Some(InputEvent::ContextMenuRequest { x, y })
                    }
                    _ => None,
                }
            }
            Event::MotionNotify(motion) if motion.event == self.widget && self.dragging => {
                let (x, y) = (motion.root_x as i32, motion.root_y as i32);
                if motion.state.contains(KeyButMask::CONTROL) {
                    Some(InputEvent::ModifierDrag { x, y })
                } else {
                    Some(InputEvent::DragMove { x, y })
                }
            }
            Event::ButtonRelease(release) if release.event == self.widget && release.detail == BUTTON_PRIMARY => {
                if std::mem::take(&mut self.dragging) {
                    Some(InputEvent::DragEnd)
                } else {
                    None
                }
            }
            Event::Expose(expose) if expose.window == self.widget && expose.count == 0 => Some(InputEvent::Redraw),
            _ => None,
        }
    }

    fn primary_press(&mut self, now: Instant, x: i32, y: i32) -> InputEvent {
        let is_double = self.last_press.is_some_and(|last| {
            now.duration_since(last.at) <= DOUBLE_CLICK_TIME
                && (x - last.x).abs() <= DOUBLE_CLICK_DISTANCE
                && (y - last.y).abs() <= DOUBLE_CLICK_DISTANCE
        });

        if is_double {
            self.last_press = None;
            self.dragging = false;
            return InputEvent::DoubleClick;
        }

        self.last_press = Some(Press { at: now, x, y });
        self.dragging = true;
        InputEvent::DragStart { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> InputTranslator {
        InputTranslator::new(10, 20)
    }

    #[test]
    fn test_double_click_window() {
        let mut input = translator();
        let now = Instant::now();

        assert_eq!(input.primary_press(now, 100, 100), InputEvent::DragStart { x: 100, y: 100 });
        assert_eq!(
            input.primary_press(now + Duration::from_millis(300), 102, 97),
            InputEvent::DoubleClick
        );
        // A third press starts over
        assert_eq!(
            input.primary_press(now + Duration::from_millis(350), 102, 97),
            InputEvent::DragStart { x: 102, y: 97 }
        );
    }

    #[test]
    fn test_slow_or_distant_press_is_not_double() {
        let mut input = translator();
        let now = Instant::now();

        input.primary_press(now, 100, 100);
        assert!(matches!(
            input.primary_press(now + Duration::from_millis(500), 100, 100),
            InputEvent::DragStart { .. }
        ));
        assert!(matches!(
            input.primary_press(now + Duration::from_millis(600), 110, 100),
            InputEvent::DragStart { .. }
        ));
    }
}
