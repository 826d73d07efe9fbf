//! Shift-register multiplexed seven-segment renderer
//!
//! Each display unit sits behind a pair of chained 74HC595s (16 bits). All
//! units share the clock and latch lines; each has its own data line, so
//! one 16-clock transfer updates every unit at once.
//!
//! Segment lines are active-high. Digit lines are active-low: a cleared
//! digit bit enables that digit.
//!
//! # Scanning
//!
//! Only one plane is lit at a time and [`MultiDisplay::refresh`] advances
//! to the next plane once the on interval has elapsed:
//!
//! - [`ScanMode::Segment`]: 8 planes, one per segment line. Every digit whose
//!   code contains that segment is enabled together.
//! - [`ScanMode::Digit`]: 4 planes, one per digit, with its full code.
//!
//! A nonzero off interval inserts a dark phase between planes, trading
//! brightness for less power and glare.

use canary_core::config::{DisplayConfig, ScanMode};
use canary_core::traits::{Radix, SegmentDisplay, DIGITS_PER_UNIT};
use embedded_hal::digital::{OutputPin, PinState};

/// Bits shifted per unit
const REGISTER_BITS: u32 = 16;

/// Segment lines per digit (A..G and P)
const SEGMENTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Current plane is shown
    Lit,
    /// All lines off between planes
    Dark,
}

/// Renderer for `K` four-digit units
pub struct MultiDisplay<P, const K: usize> {
    data: [P; K],
    clock: P,
    latch: P,
    codes: [[u8; DIGITS_PER_UNIT]; K],
    image: [u16; K],
    digit_bits: [u8; DIGITS_PER_UNIT],
    segment_bits: [u8; SEGMENTS],
    digit_mask: u16,
    mode: ScanMode,
    plane: usize,
    phase: Phase,
    last_switch_us: u64,
    on_interval_us: u32,
    off_interval_us: u32,
    step_us: u32,
}

impl<P: OutputPin, const K: usize> MultiDisplay<P, K> {
    /// Create a renderer with all digits blank
    ///
    /// `config` is expected to have passed [`DisplayConfig::validate`].
    pub fn new(data: [P; K], clock: P, latch: P, config: &DisplayConfig) -> Self {
        let digit_mask = config.digit_mask();
        Self {
            data,
            clock,
            latch,
            codes: [[0; DIGITS_PER_UNIT]; K],
            image: [digit_mask; K],
            digit_bits: config.digit_bits,
            segment_bits: config.segment_bits,
            digit_mask,
            mode: config.scan_mode,
            plane: 0,
            phase: Phase::Lit,
            last_switch_us: 0,
            on_interval_us: config.on_interval_us,
            off_interval_us: config.off_interval_us,
            step_us: config.brightness_step_us,
        }
    }

    /// Turn every unit dark
    pub fn blank(&mut self) -> Result<(), P::Error> {
        self.image = [self.digit_mask; K];
        self.shift_out()
    }

    /// Advance the scan if its interval has elapsed
    ///
    /// Returns `Ok(true)` when a new image was shifted out. `now_us` is a
    /// monotonic microsecond clock.
    pub fn refresh(&mut self, now_us: u64) -> Result<bool, P::Error> {
        let elapsed = now_us.saturating_sub(self.last_switch_us);
        let interval = match self.phase {
            Phase::Lit => self.on_interval_us,
            Phase::Dark => self.off_interval_us,
        };
        if elapsed <= interval as u64 {
            return Ok(false);
        }
        self.last_switch_us = now_us;

        if self.phase == Phase::Lit && self.off_interval_us > 0 {
            self.phase = Phase::Dark;
            self.image = [self.digit_mask; K];
        } else {
            self.phase = Phase::Lit;
            self.advance_plane();
        }

        self.shift_out()?;
        Ok(true)
    }

    /// Lengthen the dark phase by one step (dimmer)
    ///
    /// Capped one step below the on interval.
    pub fn increase_off_interval(&mut self) -> u32 {
        self.off_interval_us = self.off_interval_us.saturating_add(self.step_us);
        if self.off_interval_us >= self.on_interval_us {
            self.off_interval_us = self.on_interval_us.saturating_sub(self.step_us);
        }
        self.off_interval_us
    }

    /// Shorten the dark phase by one step (brighter)
    pub fn decrease_off_interval(&mut self) -> u32 {
        self.off_interval_us = self.off_interval_us.saturating_sub(self.step_us);
        self.off_interval_us
    }

    /// Current dark phase length in µs
    pub fn off_interval_us(&self) -> u32 {
        self.off_interval_us
    }

    /// Toggle between segment and digit scanning
    ///
    /// The last unit shows the new mode until it is next written: `1` for
    /// digit scanning, `2` for segment scanning.
    pub fn switch_mode(&mut self) -> ScanMode {
        self.mode = self.mode.toggled();
        self.plane = 0;
        self.phase = Phase::Lit;
        let indicator = match self.mode {
            ScanMode::Digit => 1,
            ScanMode::Segment => 2,
        };
        if let Some(unit) = K.checked_sub(1) {
            self.set_number(unit, indicator, None, Radix::Decimal);
        }
        self.mode
    }

    /// Current scan mode
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Register image last shifted out, one word per unit
    pub fn register_image(&self) -> &[u16; K] {
        &self.image
    }

    fn advance_plane(&mut self) {
        self.plane = (self.plane + 1) % self.mode.planes();
        for (image, codes) in self.image.iter_mut().zip(self.codes.iter()) {
            *image = match self.mode {
                ScanMode::Segment => {
                    segment_plane(codes, self.plane, &self.digit_bits, &self.segment_bits)
                }
                ScanMode::Digit => digit_plane(
                    codes,
                    self.plane,
                    self.digit_mask,
                    &self.digit_bits,
                    &self.segment_bits,
                ),
            };
        }
    }

    /// Clock the image out MSB first, all units in lock-step, then latch
    fn shift_out(&mut self) -> Result<(), P::Error> {
        for bit in (0..REGISTER_BITS).rev() {
            for (pin, word) in self.data.iter_mut().zip(self.image.iter()) {
                pin.set_state(PinState::from(word & (1 << bit) != 0))?;
            }
            self.clock.set_low()?;
            self.clock.set_high()?;
        }
        self.latch.set_low()?;
        self.latch.set_high()
    }
}

/// Image lighting segment `plane` on every digit that uses it
fn segment_plane(
    codes: &[u8; DIGITS_PER_UNIT],
    plane: usize,
    digit_bits: &[u8; DIGITS_PER_UNIT],
    segment_bits: &[u8; SEGMENTS],
) -> u16 {
    let mut word = 1 << segment_bits[plane];
    for (code, &bit) in codes.iter().zip(digit_bits.iter()) {
        if code & (1 << plane) == 0 {
            word |= 1 << bit;
        }
    }
    word
}

/// Image lighting digit `plane` with its full code
fn digit_plane(
    codes: &[u8; DIGITS_PER_UNIT],
    plane: usize,
    digit_mask: u16,
    digit_bits: &[u8; DIGITS_PER_UNIT],
    segment_bits: &[u8; SEGMENTS],
) -> u16 {
    let mut word = digit_mask & !(1 << digit_bits[plane]);
    let code = codes[plane];
    for (segment, &bit) in segment_bits.iter().enumerate() {
        if code & (1 << segment) != 0 {
            word |= 1 << bit;
        }
    }
    word
}

impl<P: OutputPin, const K: usize> SegmentDisplay for MultiDisplay<P, K> {
    fn unit_count(&self) -> usize {
        K
    }

    fn set_segments(&mut self, unit: usize, codes: [u8; DIGITS_PER_UNIT]) {
        if let Some(slot) = self.codes.get_mut(unit) {
            *slot = codes;
        }
    }

    fn segments(&self, unit: usize) -> [u8; DIGITS_PER_UNIT] {
        self.codes.get(unit).copied().unwrap_or([0; DIGITS_PER_UNIT])
    }
}
