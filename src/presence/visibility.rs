//! Visibility controller

/// Show/hide action for the widget window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityDecision {
    NoChange,
    Show,
    Hide,
}

/// Reconcile the menu flag, hide policy and presence signal against the
/// current visibility.
///
/// An open menu freezes visibility, a disabled policy always shows, otherwise
/// the widget follows the presence signal. Only real transitions produce a
/// decision, so repeated identical signals cause no redundant toggles.
pub fn reconcile(
    menu_open: bool,
    hide_when_not_desktop: bool,
    on_desktop: bool,
    currently_visible: bool,
) -> VisibilityDecision {
    if menu_open {
        return VisibilityDecision::NoChange;
    }

    let want_visible = !hide_when_not_desktop || on_desktop;
    match (want_visible, currently_visible) {
        (true, false) => VisibilityDecision::Show,
        (false, true) => VisibilityDecision::Hide,
        _ => VisibilityDecision::NoChange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_open_never_hides() {
        for policy in [true, false] {
            for on_desktop in [true, false] {
                for visible in [true, false] {
                    assert_eq!(reconcile(true, policy, on_desktop, visible), VisibilityDecision::NoChange);
                }
            }
        }
    }

    #[test]
    fn test_policy_off_always_shows() {
        assert_eq!(reconcile(false, false, false, false), VisibilityDecision::Show);
        assert_eq!(reconcile(false, false, false, true), VisibilityDecision::NoChange);
    }

    #[test]
    fn test_follows_presence_idempotently() {
        assert_eq!(reconcile(false, true, false, true), VisibilityDecision::Hide);
        assert_eq!(reconcile(false, true, false, false), VisibilityDecision::NoChange);
        assert_eq!(reconcile(false, true, true, false), VisibilityDecision::Show);
        assert_eq!(reconcile(false, true, true, true), VisibilityDecision::NoChange);
    }
}
