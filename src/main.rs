#![no_std]
#![no_main]

mod network;

use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_futures::select::select;
use embassy_net::{Config, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::{Duration, Timer};
use rp_rtc_alarm::rp::RpClock;
use rp_rtc_alarm::{Clock, EpochSeconds, Rtc, SharedRtc};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

// Firmware und CLM-Daten
const FW: &[u8] = include_bytes!("../cyw43-firmware/43439A0.bin");
const CLM: &[u8] = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

const WIFI_NETWORK: &str = match option_env!("WIFI_NETWORK") {
    Some(network) => network,
    None => "pico-rtc",
};
const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

const WATCH_INTERVAL: Duration = Duration::from_secs(1);
const LED_PULSE: Duration = Duration::from_millis(200);

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

#[embassy_executor::task]
async fn cyw43_runner_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

static RESOURCES: StaticCell<StackResources<2>> = StaticCell::new();
static RTC: StaticCell<SharedRtc<RpClock<'static>>> = StaticCell::new();

/// Pulses the LED once for every expiry the alarm reaches.
///
/// Only looks at the slot; reloading and consuming stay with `alarm_left`.
async fn watch_alarm<C: Clock>(rtc: &SharedRtc<C>, control: &mut cyw43::Control<'_>) -> ! {
    let mut signalled: Option<EpochSeconds> = None;

    loop {
        Timer::after(WATCH_INTERVAL).await;

        let due = rtc.lock(|rtc| rtc.is_alarm_due().then(|| rtc.alarm().expiry()));
        let Some(expiry) = due else {
            continue;
        };
        if signalled == Some(expiry) {
            continue;
        }
        signalled = Some(expiry);
        info!("alarm due at {}", expiry);

        control.gpio_set(0, true).await;
        Timer::after(LED_PULSE).await;
        control.gpio_set(0, false).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let rtc: &'static SharedRtc<RpClock<'static>> =
        RTC.init(SharedRtc::new(Rtc::new(RpClock::new(p.RTC))));
    rtc.lock(|rtc| {
        if !rtc.is_running() {
            rtc.reset_clock_to_reference();
        }
        info!("rtc at {}, running {}", rtc.now(), rtc.is_running());
    });

    // CYW43-Power und SPI via PIO initialisieren
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24, // MOSI
        p.PIN_29, // MISO
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());

    // CYW43 initialisieren
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, FW).await;
    unwrap!(spawner.spawn(cyw43_runner_task(runner)));

    control.init(CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let config = Config::dhcpv4(Default::default());

    // MAC-Adresse als Seed verwenden (liefert ein [u8; 6])
    let mac = control.address().await;
    let seed = u64::from_le_bytes([mac[0], mac[1], mac[2], mac[3], mac[4], mac[5], 0, 0]);

    let (stack, net_runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::<2>::new()),
        seed,
    );
    unwrap!(spawner.spawn(net_task(net_runner)));

    while let Err(err) = control
        .join(WIFI_NETWORK, JoinOptions::new(WIFI_PASSWORD.as_bytes()))
        .await
    {
        warn!("join {} failed with status {}", WIFI_NETWORK, err.status);
        Timer::after(Duration::from_secs(2)).await;
    }

    info!("waiting for DHCP");
    stack.wait_config_up().await;

    select(
        network::run_command_server(stack, rtc),
        watch_alarm(rtc, &mut control),
    )
    .await;
}
