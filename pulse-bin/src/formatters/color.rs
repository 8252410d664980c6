//! Defines the colors used in the output of the CLI.

use console::Style;
use log::Level;
use once_cell::sync::Lazy;
use pulse_lib::Availability;

use crate::options::OutputMode;

pub(crate) static NORMAL: Lazy<Style> = Lazy::new(Style::new);
pub(crate) static DIM: Lazy<Style> = Lazy::new(|| Style::new().dim());

pub(crate) static GREEN: Lazy<Style> = Lazy::new(|| Style::new().color256(2).bold().bright());
pub(crate) static YELLOW: Lazy<Style> = Lazy::new(|| Style::new().yellow().bright());
pub(crate) static BOLD_YELLOW: Lazy<Style> = Lazy::new(|| Style::new().yellow().bold().bright());
pub(crate) static PINK: Lazy<Style> = Lazy::new(|| Style::new().color256(197));
pub(crate) static BOLD_PINK: Lazy<Style> = Lazy::new(|| Style::new().color256(197).bold());

// Used for debug log messages
pub(crate) static BLUE: Lazy<Style> = Lazy::new(|| Style::new().blue().bright());

/// Availability at or above this percentage is shown in green
const HEALTHY_PERCENT: u8 = 99;
/// Availability at or above this percentage is shown in yellow, below in pink
const DEGRADED_PERCENT: u8 = 90;

/// Style of a log level prefix
pub(crate) fn color_for_level(level: Level) -> &'static Style {
    match level {
        Level::Error => &*BOLD_PINK,
        Level::Warn => &*BOLD_YELLOW,
        Level::Info => &*NORMAL,
        Level::Debug => &*BLUE,
        Level::Trace => &*DIM,
    }
}

/// Style of an availability value
pub(crate) fn color_for_availability(availability: Availability) -> &'static Style {
    match availability {
        Availability::NoData => &*DIM,
        Availability::Percent(p) if p >= HEALTHY_PERCENT => &*GREEN,
        Availability::Percent(p) if p >= DEGRADED_PERCENT => &*YELLOW,
        Availability::Percent(_) => &*PINK,
    }
}

/// Style of an availability value in the given output mode
pub(crate) fn availability_style(availability: Availability, mode: &OutputMode) -> &'static Style {
    if mode.is_plain() {
        &*NORMAL
    } else {
        color_for_availability(availability)
    }
}

// Write output using predefined colors
macro_rules! color {
    ($f:ident, $color:expr, $text:tt, $($tts:tt)*) => {
        write!($f, "{}", $color.apply_to(format!($text, $($tts)*)))
    };
}

pub(crate) use color;
