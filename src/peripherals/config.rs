//! General system configuration

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::Priority,
};

/// Board configuration for `embassy_nrf::init`
pub fn system_config() -> Config {
    // Config is `non_exhaustive`, start from the defaults
    let mut config = Config::default();

    // Both clocks run from the external crystals
    config.hfclk_source = HfclkSource::ExternalXtal;
    config.lfclk_source = LfclkSource::ExternalXtal;

    // DC/DC regulator massively reduces runtime current consumption
    config.dcdc.reg1 = true;

    // GPIOTE and the time driver share one priority level
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;

    config.debug = Debug::Allowed;

    config
}
