//! Menu-bar clock: `1:05 PM` / `Thu Aug 7`, recomputed every second.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::Result;
use crate::runtime::timer::RepeatingTimer;
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};

const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Broken-down local instant, the only thing the clock needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
    /// 0 = Sunday.
    pub weekday: u8,
    /// 1 = January.
    pub month: u8,
    pub day: u8,
}

pub trait TimeSource: Send {
    fn now(&self) -> LocalTime;
}

/// System-time source with a fixed UTC offset. The terminal has no timezone
/// database; hosts pass the offset they want local time rendered in.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock {
    utc_offset_minutes: i32,
}

impl WallClock {
    pub fn utc() -> Self {
        Self::default()
    }

    pub fn with_offset_minutes(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> LocalTime {
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        local_time_from_epoch(epoch_secs + self.utc_offset_minutes as i64 * 60)
    }
}

fn local_time_from_epoch(secs: i64) -> LocalTime {
    let days = secs.div_euclid(86_400);
    let secs_of_day = secs.rem_euclid(86_400);
    let (month, day) = civil_from_days(days);
    LocalTime {
        hour: (secs_of_day / 3600) as u8,
        minute: ((secs_of_day % 3600) / 60) as u8,
        weekday: (days + 4).rem_euclid(7) as u8,
        month,
        day,
    }
}

/// Gregorian month/day for a day count since 1970-01-01 (Hinnant's
/// civil-from-days).
fn civil_from_days(days: i64) -> (u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    (month as u8, day as u8)
}

pub fn format_time(t: LocalTime) -> String {
    let meridiem = if t.hour >= 12 { "PM" } else { "AM" };
    let display_hour = match t.hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, t.minute, meridiem)
}

pub fn format_date(t: LocalTime) -> String {
    let weekday = DAYS[(t.weekday % 7) as usize];
    let month = MONTHS[((t.month.clamp(1, 12) - 1)) as usize];
    format!("{} {} {}", weekday, month, t.day)
}

/// Renders the menu-bar time/date zones at init and then once per second.
pub struct ClockController {
    time_zone: String,
    date_zone: String,
    source: Box<dyn TimeSource>,
    timer: RepeatingTimer,
    time_present: bool,
    date_present: bool,
}

impl ClockController {
    pub fn new(
        time_zone: impl Into<String>,
        date_zone: impl Into<String>,
        source: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            time_zone: time_zone.into(),
            date_zone: date_zone.into(),
            source,
            timer: RepeatingTimer::new(Duration::from_secs(1)),
            time_present: false,
            date_present: false,
        }
    }

    fn render(&self, ctx: &mut RuntimeContext<'_>) {
        let now = self.source.now();
        if self.time_present {
            ctx.set_zone(&self.time_zone, format_time(now));
        }
        if self.date_present {
            ctx.set_zone(&self.date_zone, format_date(now));
        }
    }
}

impl ShellController for ClockController {
    fn name(&self) -> &str {
        "shell.clock"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        // Absence of either display zone is a per-field no-op.
        self.time_present = ctx.rect(&self.time_zone).is_some();
        self.date_present = ctx.rect(&self.date_zone).is_some();
        self.render(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        if let ShellEvent::Tick { elapsed } = event {
            if self.timer.advance(*elapsed) {
                self.render(ctx);
            }
        }
        Ok(EventFlow::Continue)
    }
}
