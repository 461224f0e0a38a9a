#![no_std]
#![no_main]

mod peripherals;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    peripherals::SPI2,
    saadc::{self, ChannelConfig, Resolution, Saadc},
    spim,
};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use embassy_time::{Duration, Instant, Ticker, Timer};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use doom_marine::{
    system::{
        services::{AppTimer, BatteryStateService, TickTimerService, WallClock, WatchEvent},
        time::{units_changed, PendingTick, TimeManager, TimeReference, TimeUnit},
    },
    ui::{framebuffer::FrameBuffer, watchface::DoomMarine, WatchFace},
    BatteryChargeState,
};
use peripherals::{
    backlight::Backlight, battery::Battery, config::system_config, display::Display,
};

// Others
use chrono::NaiveDateTime;
use enumset::EnumSet;

// Include current local time as epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

/// Clock format shown by the face
const CLOCK_24H: bool = true;
const BACKLIGHT_LEVEL: u8 = 2;

// Communication channels
static BATTERY_STATE: Signal<ThreadModeRawMutex, BatteryChargeState> = Signal::new();
static TICK: Signal<ThreadModeRawMutex, PendingTick> = Signal::new();

static FRAME: StaticCell<FrameBuffer> = StaticCell::new();

fn clock() -> TimeManager {
    TimeManager::init(TimeReference::from_timestamp(UTC_EPOCH, 0))
}

fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}

/// Host services backed by the embassy tasks
struct PineTime {
    clock: TimeManager,
    battery: BatteryChargeState,
    battery_subscribed: bool,
    tick_units: EnumSet<TimeUnit>,
    timer_deadline: Option<Instant>,
}

impl PineTime {
    fn new(battery: BatteryChargeState) -> Self {
        Self {
            clock: clock(),
            battery,
            battery_subscribed: false,
            tick_units: EnumSet::empty(),
            timer_deadline: None,
        }
    }
}

impl BatteryStateService for PineTime {
    fn peek(&self) -> BatteryChargeState {
        self.battery
    }

    fn subscribe_battery(&mut self) {
        self.battery_subscribed = true;
    }

    fn unsubscribe_battery(&mut self) {
        self.battery_subscribed = false;
    }
}

impl TickTimerService for PineTime {
    fn subscribe_ticks(&mut self, units: EnumSet<TimeUnit>) {
        self.tick_units = units;
    }

    fn unsubscribe_ticks(&mut self) {
        self.tick_units = EnumSet::empty();
    }
}

impl AppTimer for PineTime {
    fn register(&mut self, timeout: core::time::Duration) {
        let timeout = Duration::from_millis(timeout.as_millis() as u64);
        self.timer_deadline = Some(Instant::now() + timeout);
    }

    fn cancel(&mut self) {
        self.timer_deadline = None;
    }
}

impl WallClock for PineTime {
    fn now(&self) -> NaiveDateTime {
        self.clock.get_time(uptime_ms())
    }

    fn is_24h_style(&self) -> bool {
        CLOCK_24H
    }
}

/// Sample the battery every second, reporting changes.
#[embassy_executor::task(pool_size = 1)]
async fn update_battery_status(mut battery: Battery, mut last: BatteryChargeState) {
    let mut tick = Ticker::every(Duration::from_secs(1));
    loop {
        tick.next().await;

        match battery.state().await {
            Ok(state) if state != last => {
                defmt::info!("Battery status updated: {}", state);
                last = state;
                BATTERY_STATE.signal(state);
            }
            Ok(_) => {}
            Err(err) => defmt::warn!("Ignoring battery sample: {}", err),
        }
    }
}

/// Report which calendar units changed, once per second.
#[embassy_executor::task(pool_size = 1)]
async fn update_time() {
    let clock = clock();
    let mut previous = clock.get_time(uptime_ms());
    let mut tick = Ticker::every(Duration::from_secs(1));
    loop {
        tick.next().await;

        let now = clock.get_time(uptime_ms());
        let units = units_changed(&previous, &now);
        previous = now;
        if !units.is_empty() {
            // A tick the watchface has not picked up yet must not lose its units
            let tick = PendingTick { time: now, units }.merge(TICK.try_take());
            TICK.signal(tick);
        }
    }
}

/// Run the watchface, redrawing the LCD whenever it changed.
///
/// Owns the backlight so its pins stay driven.
#[embassy_executor::task(pool_size = 1)]
async fn run_watchface(
    mut display: Display,
    _backlight: Backlight,
    frame: &'static mut FrameBuffer,
    battery: BatteryChargeState,
) {
    let mut face = DoomMarine::new(PineTime::new(battery));
    face.init();
    if let Err(err) = face.load_bundled() {
        defmt::panic!("Failed to load watchface: {}", err);
    }

    loop {
        // FrameBuffer drawing is infallible
        if let Ok(true) = WatchFace::draw(&mut face, frame) {
            if display.flush(frame).is_err() {
                defmt::error!("Failed to flush frame");
            }
        }

        let deadline = face.host().timer_deadline.unwrap_or(Instant::MAX);
        let event = match select3(BATTERY_STATE.wait(), TICK.wait(), Timer::at(deadline)).await {
            Either3::First(state) => {
                let host = face.host_mut();
                host.battery = state;
                host.battery_subscribed.then_some(WatchEvent::Battery(state))
            }
            Either3::Second(PendingTick { time, units }) => {
                let units = units & face.host().tick_units;
                (!units.is_empty()).then_some(WatchEvent::Tick { time, units })
            }
            Either3::Third(()) => {
                face.host_mut().timer_deadline = None;
                Some(WatchEvent::AnimationTimer)
            }
        };

        if let Some(event) = event {
            face.handle(event);
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(system_config());
    defmt::info!("Initializing");

    // Initialize SAADC
    let mut saadc_config = saadc::Config::default();
    // Set resolution to 12bit, necessary for correct battery status calculation
    saadc_config.resolution = Resolution::_12BIT;
    // Pin P0.31: Voltage level
    let channel_config = ChannelConfig::single_ended(p.P0_31);
    let saadc = Saadc::new(p.SAADC, Irqs, saadc_config, [channel_config]);
    saadc.calibrate().await;

    // Initialize battery
    let mut battery = Battery::init(
        saadc,
        Input::new(p.P0_12.degrade(), Pull::None),
        Input::new(p.P0_19.degrade(), Pull::None),
    );
    let initial = match battery.state().await {
        Ok(state) => state,
        Err(err) => {
            defmt::warn!("No initial battery sample: {}", err);
            BatteryChargeState::default()
        }
    };

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let Some(display) = Display::init(
        spim,
        Output::new(p.P0_25.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26.degrade(), Level::Low, OutputDrive::Standard),
    ) else {
        defmt::panic!("LCD initialization failed");
    };

    // Backlight stays on at a fixed level
    let backlight = Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        BACKLIGHT_LEVEL,
    );
    defmt::info!("Backlight at level {}", backlight.brightness());

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(update_battery_status(battery, initial)));
    unwrap!(spawner.spawn(update_time()));
    unwrap!(spawner.spawn(run_watchface(
        display,
        backlight,
        FRAME.init(FrameBuffer::new()),
        initial
    )));
}
