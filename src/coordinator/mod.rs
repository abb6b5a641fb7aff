//! Widget State Coordinator
//!
//! The single writer of all widget state. Input events are handled
//! synchronously; worker results are queued with [`Coordinator::post`] and
//! applied at the start of the next [`Coordinator::tick`], followed by any due
//! timers. Nothing here blocks: decoding, picking and sampling are delegated
//! through [`Jobs`].

pub mod events;
pub mod jobs;
pub mod menu;
pub mod messages;
#[cfg(test)]
pub mod testing;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::animation::{AnimationScheduler, TickOutcome};
use crate::border::{ApplyOutcome, BorderConfig, BorderEngine, BorderSource};
use crate::config::WidgetConfig;
use crate::platform::{ResizeHighlight, Surface};
use crate::presence::{reconcile, VisibilityDecision};
use crate::shared::{Rgb, Screen, WidgetGeometry};
use crate::timers::{TimerKind, Timers};
use crate::wallpaper::WallpaperSample;

pub use events::{InputEvent, MenuAction};
pub use jobs::Jobs;
use menu::{MenuContext, MenuModel};
pub use messages::{WorkerMessage, WorkerSnapshot};

/// How long the menu flag outlives the menu itself. Absorbs the close event
/// racing the next click; tunable, not a contract.
pub const MENU_GRACE: Duration = Duration::from_millis(300);
/// Gradient border repaint period
pub const GRADIENT_PERIOD: Duration = Duration::from_millis(500);
/// Resize banner lifetime
pub const RESIZE_BANNER: Duration = Duration::from_secs(3);
/// Delay before the forced wallpaper sample after a drag starts
pub const DRAG_SAMPLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    /// Suppresses presence-driven hiding; stays set through the grace period
    pub open: bool,
    /// The popup is on screen
    pub showing: bool,
    pub last_open_position: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallpaperSyncState {
    pub enabled: bool,
    pub last_sampled_position: Option<(i32, i32)>,
    pub update_interval: Duration,
    pub dominant_color: Rgb,
}

/// Pointer anchor of the current press
#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    pointer: (i32, i32),
    origin: (i32, i32),
}

pub struct Coordinator<S, J> {
    surface: S,
    jobs: J,
    screen: Screen,
    config: WidgetConfig,
    config_path: Option<PathBuf>,

    geometry: WidgetGeometry,
    default_position: (i32, i32),
    animation: AnimationScheduler,
    border: BorderEngine,
    menu: MenuState,
    hide_when_not_desktop: bool,
    wallpaper: WallpaperSyncState,
    source: Option<PathBuf>,
    /// Bumped for every decode request; older results are dropped
    decode_generation: u64,
    drag: Option<DragAnchor>,
    /// The last press was swallowed by the menu grace period
    absorbed_press: bool,

    timers: Timers,
    inbox: VecDeque<WorkerMessage>,
    snapshot: watch::Sender<WorkerSnapshot>,
    rng: StdRng,
    exit_requested: bool,
}

impl<S: Surface, J: Jobs> Coordinator<S, J> {
    /// Build the coordinator from persisted settings. The default position is
    /// always recomputed from the current screen size.
    pub fn new(
        surface: S,
        jobs: J,
        screen: Screen,
        config: WidgetConfig,
        config_path: Option<PathBuf>,
        snapshot: watch::Sender<WorkerSnapshot>,
    ) -> Self {
        let geometry = WidgetGeometry::anchored(screen, config.width, config.height);
        let wallpaper = WallpaperSyncState {
            enabled: config.wallpaper_sync_enabled,
            last_sampled_position: None,
            update_interval: config.update_interval(),
            dominant_color: config.wallpaper_dominant_color(),
        };

        let coordinator = Self {
            surface,
            jobs,
            screen,
            geometry,
            default_position: geometry.position(),
            animation: AnimationScheduler::new(config.speed),
            border: BorderEngine::new(BorderConfig::from_widget_config(&config)),
            menu: MenuState::default(),
            hide_when_not_desktop: config.hide_when_not_desktop,
            wallpaper,
            source: None,
            decode_generation: 0,
            drag: None,
            absorbed_press: false,
            timers: Timers::new(),
            inbox: VecDeque::new(),
            snapshot,
            rng: StdRng::from_entropy(),
            exit_requested: false,
            config,
            config_path,
        };
        coordinator.publish_snapshot();
        coordinator
    }

    /// Show the widget and kick off loading the configured source (or the
    /// picker when there is none)
    pub fn start(&mut self, now: Instant) {
        if let Err(e) = self.surface.set_geometry(self.geometry) {
            warn!("Failed to place widget: {:#}", e);
        }
        self.set_visible_or_fail_safe(true);
        self.apply_border(now);

        match self.config.existing_gif_path() {
            Some(path) => {
                info!("Loading {:?}", path);
                self.request_decode(path);
            }
            None => {
                info!("No GIF configured, opening picker");
                self.jobs.pick_source();
            }
        }

        if self.wallpaper.enabled {
            self.jobs.request_sample();
        }
        self.persist();
        self.flush();
    }

    /// Queue a worker result; applied on the next tick
    pub fn post(&mut self, message: WorkerMessage) {
        self.inbox.push_back(message);
    }

    /// Drain queued worker results in arrival order, then fire due timers
    pub fn tick(&mut self, now: Instant) {
        while let Some(message) = self.inbox.pop_front() {
            self.handle_message(message, now);
        }
        for kind in self.timers.pop_due(now) {
            self.fire_timer(kind, now);
        }
        self.flush();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn geometry(&self) -> WidgetGeometry {
        self.geometry
    }

    pub fn menu(&self) -> MenuState {
        self.menu
    }

    pub fn border(&self) -> &BorderConfig {
        self.border.config()
    }

    pub fn wallpaper(&self) -> WallpaperSyncState {
        self.wallpaper
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[cfg(test)]
    pub fn jobs(&self) -> &J {
        &self.jobs
    }

    #[cfg(test)]
    pub fn animation(&self) -> &AnimationScheduler {
        &self.animation
    }

    /// Save config before the process goes away
    pub fn shutdown(&mut self) {
        info!("Saving state before exit");
        self.persist();
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        debug!("Input: {:?}", event);
        match event {
            InputEvent::DragStart { x, y } => self.on_drag_start(x, y, now),
            InputEvent::DragMove { x, y } => self.on_drag_move(x, y),
            InputEvent::ModifierDrag { x, y } => self.on_modifier_drag(x, y),
            InputEvent::DragEnd => {
                if self.drag.take().is_some() {
                    self.persist();
                }
            }
            InputEvent::DoubleClick => {
                self.drag = None;
                // The second half of an absorbed click is absorbed too
                let paired = std::mem::take(&mut self.absorbed_press);
                if !self.absorb_grace_click() && !paired {
                    self.reset_position();
                }
            }
            InputEvent::ContextMenuRequest { x, y } => self.open_menu(x, y, now),
            InputEvent::MenuClosed(action) => self.close_menu(action, now),
            InputEvent::Redraw => self.redraw(now),
        }
        self.flush();
    }

    /// The first click after the menu closed only ends the grace period
    fn absorb_grace_click(&mut self) -> bool {
        if !self.menu.open || self.menu.showing {
            return false;
        }
        debug!("Click absorbed by menu grace period");
        self.timers.cancel(TimerKind::MenuGrace);
        self.menu.open = false;
        self.publish_snapshot();
        true
    }

    fn on_drag_start(&mut self, x: i32, y: i32, now: Instant) {
        self.absorbed_press = self.absorb_grace_click();
        if self.absorbed_press {
            return;
        }

        self.drag = Some(DragAnchor {
            pointer: (x, y),
            origin: self.geometry.position(),
        });

        if self.wallpaper.enabled {
            self.timers.schedule(TimerKind::DragSample, now + DRAG_SAMPLE_DELAY);
        }
    }

    fn on_drag_move(&mut self, x: i32, y: i32) {
        let Some(anchor) = self.drag else {
            return;
        };

        let new_x = anchor.origin.0 + x - anchor.pointer.0;
        let new_y = anchor.origin.1 + y - anchor.pointer.1;
        if (new_x, new_y) == self.geometry.position() {
            return;
        }

        self.set_geometry(self.geometry.moved_to(new_x, new_y));
        if self.wallpaper.enabled {
            self.jobs.request_sample();
        }
    }

    fn on_modifier_drag(&mut self, x: i32, y: i32) {
        if !self.border.is_resize_mode() {
            return;
        }
        let Some(anchor) = self.drag.as_mut() else {
            return;
        };

        let delta_x = x - anchor.pointer.0;
        let delta_y = y - anchor.pointer.1;
        let Some(resized) = self.geometry.resized(delta_x, delta_y, self.screen) else {
            return;
        };

        anchor.pointer = (x, y);
        anchor.origin = resized.position();
        debug!("Resized to {}x{}", resized.width, resized.height);
        self.default_position = resized.position();
        self.set_geometry(resized);
    }

    fn reset_position(&mut self) {
        let (x, y) = self.default_position;
        self.set_geometry(self.geometry.moved_to(x, y));
    }

    // ------------------------------------------------------------------
    // Menu
    // ------------------------------------------------------------------

    fn open_menu(&mut self, x: i32, y: i32, now: Instant) {
        self.drag = None;
        self.timers.cancel(TimerKind::MenuGrace);
        self.menu = MenuState {
            open: true,
            showing: true,
            last_open_position: (x, y),
        };
        self.publish_snapshot();

        let model = MenuModel::build(&MenuContext {
            playing: self.animation.is_playing(),
            resize_mode: self.border.is_resize_mode(),
            hide_when_not_desktop: self.hide_when_not_desktop,
            wallpaper_sync: self.wallpaper.enabled,
            border_name: self.border.config().preset_name(),
        });

        if let Err(e) = self.surface.show_menu(&model, x, y) {
            warn!("Failed to show context menu: {:#}", e);
            self.menu.showing = false;
            self.timers.schedule(TimerKind::MenuGrace, now + MENU_GRACE);
        }
    }

    fn close_menu(&mut self, action: Option<MenuAction>, now: Instant) {
        debug!("Menu opened at {:?} closed with {:?}", self.menu.last_open_position, action);
        self.menu.showing = false;
        if let Err(e) = self.surface.close_menu() {
            warn!("Failed to close context menu: {:#}", e);
        }
        self.timers.schedule(TimerKind::MenuGrace, now + MENU_GRACE);

        if let Some(action) = action {
            self.handle_menu_action(action, now);
        }
    }

    fn handle_menu_action(&mut self, action: MenuAction, now: Instant) {
        info!("Menu action: {:?}", action);
        match action {
            MenuAction::SelectSource => self.jobs.pick_source(),
            MenuAction::TogglePlayback => {
                if self.animation.toggle() {
                    self.ensure_animation(now);
                } else {
                    self.timers.cancel(TimerKind::AnimationFrame);
                }
            }
            MenuAction::ToggleResizeMode => self.toggle_resize_mode(now),
            MenuAction::ToggleHidePolicy => self.toggle_hide_policy(),
            MenuAction::SetBorder(name) => {
                if let Some(outcome) = self.border.set_style(name) {
                    self.leave_wallpaper_sync();
                    self.carry_out(outcome, now);
                    self.persist();
                }
            }
            MenuAction::NextBorder => {
                let outcome = self.border.cycle_style();
                self.leave_wallpaper_sync();
                self.carry_out(outcome, now);
                self.persist();
            }
            MenuAction::ToggleWallpaperSync => self.toggle_wallpaper_sync(),
            MenuAction::ResetPosition => self.reset_position(),
            MenuAction::Exit => {
                self.persist();
                self.exit_requested = true;
            }
        }
    }

    fn toggle_resize_mode(&mut self, now: Instant) {
        let entering = !self.border.is_resize_mode();
        self.border.set_resize_mode(entering);

        if entering {
            info!("Resize mode on");
            self.timers.cancel(TimerKind::GradientCycle);
            self.set_highlight(Some(ResizeHighlight { banner: true }));
            self.timers.schedule(TimerKind::ResizeBanner, now + RESIZE_BANNER);
            return;
        }

        info!("Resize mode off at {}x{}", self.geometry.width, self.geometry.height);
        self.drag = None;
        self.timers.cancel(TimerKind::ResizeBanner);
        self.set_highlight(None);

        let anchored = WidgetGeometry::anchored(self.screen, self.geometry.width, self.geometry.height);
        self.default_position = anchored.position();
        self.set_geometry(anchored);

        if let Some(source) = self.source.clone() {
            self.request_decode(source);
        }
        self.apply_border(now);
        self.persist();
    }

    fn toggle_hide_policy(&mut self) {
        self.hide_when_not_desktop = !self.hide_when_not_desktop;
        info!("Hide when not on desktop: {}", self.hide_when_not_desktop);
        if !self.hide_when_not_desktop && !self.surface.is_visible() {
            self.set_visible_or_fail_safe(true);
        }
        self.publish_snapshot();
        self.persist();
    }

    fn toggle_wallpaper_sync(&mut self) {
        self.wallpaper.enabled = !self.wallpaper.enabled;
        info!("Wallpaper sync: {}", self.wallpaper.enabled);
        if self.wallpaper.enabled {
            self.wallpaper.last_sampled_position = None;
            self.publish_snapshot();
            self.jobs.request_sample();
        } else {
            self.publish_snapshot();
        }
        self.persist();
    }

    /// Picking a fixed preset ends wallpaper sync
    fn leave_wallpaper_sync(&mut self) {
        if self.wallpaper.enabled {
            info!("Fixed border chosen, turning wallpaper sync off");
            self.wallpaper.enabled = false;
            self.publish_snapshot();
        }
    }

    // ------------------------------------------------------------------
    // Worker results
    // ------------------------------------------------------------------

    fn handle_message(&mut self, message: WorkerMessage, now: Instant) {
        match message {
            WorkerMessage::Presence(on_desktop) => self.apply_presence(on_desktop),
            WorkerMessage::WallpaperSample(sample) => self.apply_wallpaper_sample(sample, now),
            WorkerMessage::FramesDecoded {
                generation,
                path,
                size,
                result,
            } => {
                if generation != self.decode_generation {
                    debug!("Dropping superseded decode of {:?} (generation {})", path, generation);
                    return;
                }
                if size != (self.geometry.width, self.geometry.height) {
                    debug!("Dropping frames decoded at stale size {:?}", size);
                    return;
                }
                let loaded = result.and_then(|frames| self.animation.replace_frames(frames, &path));
                match loaded {
                    Ok(()) => {
                        info!("Loaded {:?}", path);
                        self.config.gif_path = Some(path.to_string_lossy().into_owned());
                        self.source = Some(path);
                        self.ensure_animation(now);
                        self.persist();
                    }
                    Err(e) => {
                        warn!("Could not load GIF, keeping the current one: {}", e);
                        if !self.animation.has_frames() {
                            self.jobs.pick_source();
                        }
                    }
                }
            }
            WorkerMessage::SourcePicked(Some(path)) => self.request_decode(path),
            WorkerMessage::SourcePicked(None) => {
                if !self.animation.has_frames() {
                    info!("No GIF selected and nothing loaded, exiting");
                    self.exit_requested = true;
                }
            }
        }
    }

    /// Menu state is checked here, at apply time, so a signal computed before
    /// the menu opened cannot hide the widget
    fn apply_presence(&mut self, on_desktop: bool) {
        let decision = reconcile(
            self.menu.open,
            self.hide_when_not_desktop,
            on_desktop,
            self.surface.is_visible(),
        );
        match decision {
            VisibilityDecision::NoChange => {}
            VisibilityDecision::Show => self.set_visible_or_fail_safe(true),
            VisibilityDecision::Hide => self.set_visible_or_fail_safe(false),
        }
    }

    fn apply_wallpaper_sample(&mut self, sample: WallpaperSample, now: Instant) {
        if !self.wallpaper.enabled {
            debug!("Ignoring wallpaper sample taken before sync was turned off");
            return;
        }

        self.wallpaper.last_sampled_position = Some(sample.position);
        let changed = sample.color != self.wallpaper.dominant_color
            || self.border.config().source != BorderSource::WallpaperSync;

        if changed {
            info!("Wallpaper color {} applied to border", sample.color);
            self.wallpaper.dominant_color = sample.color;
            let outcome = self.border.apply_wallpaper_color(sample.color);
            self.carry_out(outcome, now);
            self.persist();
        }
        self.publish_snapshot();
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    fn fire_timer(&mut self, kind: TimerKind, now: Instant) {
        match kind {
            TimerKind::AnimationFrame => {
                if let TickOutcome::Continue(delay) = self.animation.tick(&mut self.surface) {
                    self.timers.schedule(TimerKind::AnimationFrame, now + delay);
                }
            }
            TimerKind::GradientCycle => {
                if let Some(paint) = self.border.gradient_tick(&mut self.rng) {
                    if let Err(e) = self.surface.paint_border(Some(paint)) {
                        warn!("Failed to paint gradient border: {:#}", e);
                    }
                    self.timers.schedule(TimerKind::GradientCycle, now + GRADIENT_PERIOD);
                }
            }
            TimerKind::MenuGrace => {
                if !self.menu.showing {
                    self.menu.open = false;
                    self.publish_snapshot();
                }
            }
            TimerKind::ResizeBanner => {
                if self.border.is_resize_mode() {
                    self.set_highlight(Some(ResizeHighlight { banner: false }));
                }
            }
            TimerKind::DragSample => {
                if self.wallpaper.enabled {
                    self.jobs.request_sample();
                }
            }
        }
    }

    /// Start decoding `path` at the current size, superseding any decode in flight
    fn request_decode(&mut self, path: PathBuf) {
        self.decode_generation += 1;
        self.jobs
            .decode_source(self.decode_generation, path, self.geometry.width, self.geometry.height);
    }

    fn ensure_animation(&mut self, now: Instant) {
        if self.animation.is_playing() && !self.timers.is_pending(TimerKind::AnimationFrame) {
            self.timers.schedule(TimerKind::AnimationFrame, now);
        }
    }

    // ------------------------------------------------------------------
    // Rendering helpers
    // ------------------------------------------------------------------

    fn apply_border(&mut self, now: Instant) {
        let outcome = self.border.apply();
        self.carry_out(outcome, now);
    }

    fn carry_out(&mut self, outcome: ApplyOutcome, now: Instant) {
        let paint = match outcome {
            ApplyOutcome::Deferred => return,
            ApplyOutcome::Cleared => None,
            ApplyOutcome::Painted(paint) => Some(paint),
            ApplyOutcome::Gradient(paint) => {
                if !self.timers.is_pending(TimerKind::GradientCycle) {
                    self.timers.schedule(TimerKind::GradientCycle, now + GRADIENT_PERIOD);
                }
                Some(paint)
            }
        };
        if let Err(e) = self.surface.paint_border(paint) {
            warn!("Failed to paint border: {:#}", e);
        }
    }

    fn redraw(&mut self, now: Instant) {
        if let Some(frame) = self.animation.last_frame() {
            if let Err(e) = self.surface.present_frame(frame) {
                debug!("Redraw failed: {:#}", e);
            }
        }
        if self.border.is_resize_mode() {
            let banner = self.timers.is_pending(TimerKind::ResizeBanner);
            self.set_highlight(Some(ResizeHighlight { banner }));
        } else {
            self.apply_border(now);
        }
    }

    fn set_highlight(&mut self, highlight: Option<ResizeHighlight>) {
        if let Err(e) = self.surface.set_resize_highlight(highlight) {
            warn!("Failed to update resize highlight: {:#}", e);
        }
    }

    fn set_geometry(&mut self, geometry: WidgetGeometry) {
        self.geometry = geometry;
        if let Err(e) = self.surface.set_geometry(geometry) {
            warn!("Failed to move widget: {:#}", e);
        }
        self.publish_snapshot();
    }

    /// Any failure while toggling visibility leaves the widget shown
    fn set_visible_or_fail_safe(&mut self, visible: bool) {
        if let Err(e) = self.surface.set_visible(visible) {
            warn!("Visibility toggle failed, forcing widget visible: {:#}", e);
            if let Err(e) = self.surface.set_visible(true) {
                error!("Failed to force widget visible: {:#}", e);
            }
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.surface.flush() {
            debug!("Surface flush failed: {:#}", e);
        }
    }

    fn publish_snapshot(&self) {
        self.snapshot.send_replace(WorkerSnapshot {
            geometry: self.geometry,
            menu_open: self.menu.open,
            hide_when_not_desktop: self.hide_when_not_desktop,
            wallpaper_sync_enabled: self.wallpaper.enabled,
            last_sampled_position: self.wallpaper.last_sampled_position,
        });
    }

    /// Write current state back to the config document and save it
    fn persist(&mut self) {
        self.config.width = self.geometry.width;
        self.config.height = self.geometry.height;
        self.config.default_x = Some(self.default_position.0);
        self.config.default_y = Some(self.default_position.1);
        self.config.speed = self.animation.interval().as_millis() as u64;
        self.config.hide_when_not_desktop = self.hide_when_not_desktop;
        self.config.wallpaper_sync_enabled = self.wallpaper.enabled;
        self.config.wallpaper_dominant_color = self.wallpaper.dominant_color.to_hex();
        self.config.update_interval_s = self.wallpaper.update_interval.as_secs_f64();
        self.border.config().write_to(&mut self.config);

        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save(path) {
                warn!("Config saving error: {:#}", e);
            }
        }
    }
}
