//! The Doom marine watchface
//!
//! [`DoomMarine`] owns the window contents while loaded and reacts to the
//! events the host delivers. Drawing is separate from event handling: the
//! handlers only update state and mark layers dirty, [`DoomMarine::draw`]
//! renders whatever changed.

use chrono::NaiveDateTime;
use embedded_graphics::{draw_target::DrawTarget, pixelcolor::BinaryColor};
use enumset::EnumSet;

use super::{
    marine::{GraphicsContext, MarineLayer},
    rounded_text::{RoundedTextPanel, CORNERS_BOTTOM, CORNERS_TOP, TEXT_CAPACITY},
    sprite::{AnimationState, Pose},
    WatchFace,
};
use crate::{
    assets::Resources,
    config::{
        ANIMATION_INTERVAL, DATE_BOUNDS, MARINE_BOUNDS, PANEL_CORNER_RADIUS, TIME_BOUNDS,
        WINDOW_BACKGROUND,
    },
    fmt::{debug, error, info},
    system::{
        services::{Host, WatchEvent},
        time::{format_date, format_time, TimeUnit},
    },
    BatteryChargeState, Error,
};

/// Contents of the loaded window.
///
/// Fields drop in declaration order, the reverse of the order they are
/// acquired in [`DoomMarine::load`].
struct Window<'a> {
    date_panel: RoundedTextPanel<'a>,
    time_panel: RoundedTextPanel<'a>,
    marine: MarineLayer,
    resources: Resources<'a>,
}

impl Window<'_> {
    fn update_time(&mut self, time: &NaiveDateTime, use_24h: bool) -> Result<(), Error> {
        let mut buf = [0u8; TEXT_CAPACITY];
        let text = format_time(&mut buf, time, use_24h)?;
        self.time_panel.set_text(text)
    }

    fn update_date(&mut self, time: &NaiveDateTime) -> Result<(), Error> {
        let mut buf = [0u8; TEXT_CAPACITY];
        let text = format_date(&mut buf, time)?;
        self.date_panel.set_text(text)
    }

    fn is_dirty(&self) -> bool {
        self.marine.is_dirty() || self.time_panel.is_dirty() || self.date_panel.is_dirty()
    }
}

/// Watchface state machine driven by host events
pub struct DoomMarine<'a, H> {
    host: H,
    window: Option<Window<'a>>,
}

impl<'a, H: Host> DoomMarine<'a, H> {
    pub fn new(host: H) -> Self {
        Self { host, window: None }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Subscribe to battery changes and to minute and day ticks
    pub fn init(&mut self) {
        self.host.subscribe_battery();
        self.host.subscribe_ticks(TimeUnit::Minute | TimeUnit::Day);
        info!("Watchface initialized");
    }

    /// Unload the window and drop all subscriptions
    pub fn deinit(&mut self) {
        self.unload();
        self.host.unsubscribe_ticks();
        self.host.unsubscribe_battery();
        info!("Watchface deinitialized");
    }

    /// Build the window from `resources` and start the animation.
    ///
    /// A window that is already loaded is unloaded first.
    pub fn load(&mut self, resources: Resources<'a>) -> Result<(), Error> {
        self.unload();

        let battery = self.host.peek();
        let mut marine = MarineLayer::new(MARINE_BOUNDS, battery);
        marine.restore(AnimationState::with_poses(
            Pose::Middle as u8,
            Pose::Middle as u8,
            battery,
        ));

        let mut time_panel = RoundedTextPanel::new(TIME_BOUNDS, PANEL_CORNER_RADIUS, CORNERS_TOP);
        time_panel.set_font(resources.font);
        let mut date_panel =
            RoundedTextPanel::new(DATE_BOUNDS, PANEL_CORNER_RADIUS, CORNERS_BOTTOM);
        date_panel.set_font(resources.font);

        let mut window = Window {
            date_panel,
            time_panel,
            marine,
            resources,
        };
        let now = self.host.now();
        window.update_time(&now, self.host.is_24h_style())?;
        window.update_date(&now)?;
        window.marine.mark_dirty();

        self.window = Some(window);
        self.host.register(ANIMATION_INTERVAL);
        info!("Window loaded, battery at {}%", battery.charge_percent);
        Ok(())
    }

    /// Load the bitmaps and font compiled into the crate
    pub fn load_bundled(&mut self) -> Result<(), Error> {
        self.load(Resources::bundled()?)
    }

    /// Stop the animation and release the window. Does nothing when unloaded.
    pub fn unload(&mut self) {
        if self.window.take().is_some() {
            self.host.cancel();
            info!("Window unloaded");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.window.is_some()
    }

    /// Animation state of the marine, `None` when unloaded
    pub fn animation(&self) -> Option<&AnimationState> {
        self.window.as_ref().map(|w| w.marine.state())
    }

    pub fn time_text(&self) -> Option<&str> {
        self.window.as_ref().and_then(|w| w.time_panel.text())
    }

    pub fn date_text(&self) -> Option<&str> {
        self.window.as_ref().and_then(|w| w.date_panel.text())
    }

    /// Whether the next [`draw`](Self::draw) renders anything
    pub fn needs_redraw(&self) -> bool {
        self.window.as_ref().is_some_and(Window::is_dirty)
    }

    /// Cache the new battery state and request a marine redraw
    pub fn on_battery_state(&mut self, battery: BatteryChargeState) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        debug!(
            "Battery {}%, charging {}, plugged {}",
            battery.charge_percent, battery.is_charging, battery.is_plugged
        );
        window.marine.set_battery(battery);
        window.marine.mark_dirty();
    }

    /// Refresh the panels whose unit changed, showing the tick's `time`
    pub fn on_tick(&mut self, time: &NaiveDateTime, units: EnumSet<TimeUnit>) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        if units.contains(TimeUnit::Minute) {
            if let Err(err) = window.update_time(time, self.host.is_24h_style()) {
                error!("Failed to update time: {}", err);
            }
        }
        if units.contains(TimeUnit::Day) {
            if let Err(err) = window.update_date(time) {
                error!("Failed to update date: {}", err);
            }
        }
    }

    /// Step the animation and arm the timer again
    pub fn on_animation_timer(&mut self) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        window.marine.mark_dirty();
        self.host.register(ANIMATION_INTERVAL);
    }

    /// Dispatch a host event to its handler
    pub fn handle(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Battery(battery) => self.on_battery_state(battery),
            WatchEvent::Tick { time, units } => self.on_tick(&time, units),
            WatchEvent::AnimationTimer => self.on_animation_timer(),
        }
    }

    /// Render the window if anything changed.
    ///
    /// The whole face is recomposed: background, marine, time panel, date
    /// panel. Returns whether anything was drawn.
    pub fn draw<D>(&mut self, target: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let Some(window) = self.window.as_mut() else {
            return Ok(false);
        };
        if !window.is_dirty() {
            return Ok(false);
        }

        target.clear(WINDOW_BACKGROUND)?;
        window
            .marine
            .draw(&window.resources.sprites, &mut GraphicsContext::new(target))?;
        window.time_panel.draw(target)?;
        window.date_panel.draw(target)?;
        Ok(true)
    }
}

impl<H: Host> WatchFace for DoomMarine<'_, H> {
    fn handle(&mut self, event: WatchEvent) {
        DoomMarine::handle(self, event);
    }

    fn draw<D>(&mut self, target: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        DoomMarine::draw(self, target)
    }
}
