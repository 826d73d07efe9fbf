//! SCD4x over I2C
//!
//! Sensirion framing: 16-bit big-endian commands, responses as 16-bit
//! big-endian words each followed by a CRC-8 byte (polynomial 0x31,
//! init 0xFF).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c};

use super::scd4x::{ChipStatus, RawMeasurement, Scd4xChip};

/// Fixed SCD4x bus address
pub const SCD4X_ADDR: u8 = 0x62;

// Commands
const CMD_START_PERIODIC: u16 = 0x21b1;
const CMD_STOP_PERIODIC: u16 = 0x3f86;
const CMD_READ_MEASUREMENT: u16 = 0xec05;
const CMD_GET_SERIAL: u16 = 0x3682;
const CMD_GET_DATA_READY: u16 = 0xe4b8;
const CMD_REINIT: u16 = 0x3646;
const CMD_POWER_DOWN: u16 = 0x36e0;
const CMD_WAKE_UP: u16 = 0x36f6;

// Command execution times in ms
const EXEC_READ_MS: u32 = 1;
const EXEC_REINIT_MS: u32 = 20;
const EXEC_WAKE_UP_MS: u32 = 30;

/// CRC-8 over a response word
///
/// Polynomial 0x31 (x^8 + x^5 + x^4 + 1), init 0xFF, no final XOR.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Decode `N` CRC-protected words from `buf` (3 bytes per word)
pub fn parse_words<const N: usize>(buf: &[u8]) -> Result<[u16; N], ChipStatus> {
    let mut words = [0u16; N];
    for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(ChipStatus::CRC_MISMATCH);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

/// Raw temperature word to m°C: `-45 + 175 * raw / 2^16`
pub fn temperature_milli_c(raw: u16) -> i32 {
    ((21875 * raw as i32) >> 13) - 45000
}

/// Raw humidity word to m%RH: `100 * raw / 2^16`
pub fn humidity_milli(raw: u16) -> i32 {
    (12500 * raw as i32) >> 13
}

fn bus_status<E: embedded_hal::i2c::Error>(e: E) -> ChipStatus {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => ChipStatus::TRANSIENT_FAULT,
        _ => ChipStatus::BUS_FAULT,
    }
}

/// SCD4x chip layer on a blocking I2C bus
pub struct Scd4xI2c<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Scd4xI2c<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Give the bus back
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u16) -> Result<(), ChipStatus> {
        self.i2c
            .write(SCD4X_ADDR, &cmd.to_be_bytes())
            .map_err(bus_status)
    }

    fn read<const N: usize>(&mut self, cmd: u16, buf: &mut [u8]) -> Result<[u16; N], ChipStatus> {
        self.command(cmd)?;
        self.delay.delay_ms(EXEC_READ_MS);
        self.i2c.read(SCD4X_ADDR, buf).map_err(bus_status)?;
        parse_words::<N>(buf)
    }
}

impl<I: I2c, D: DelayNs> Scd4xChip for Scd4xI2c<I, D> {
    fn data_ready(&mut self) -> Result<bool, ChipStatus> {
        let [status] = self.read::<1>(CMD_GET_DATA_READY, &mut [0u8; 3])?;
        Ok(status & 0x07FF != 0)
    }

    fn read_measurement(&mut self) -> Result<RawMeasurement, ChipStatus> {
        let [co2, temp, hum] = self.read::<3>(CMD_READ_MEASUREMENT, &mut [0u8; 9])?;
        Ok(RawMeasurement {
            co2,
            temperature_milli_c: temperature_milli_c(temp),
            humidity_milli: humidity_milli(hum),
        })
    }

    fn wake_up(&mut self) -> Result<(), ChipStatus> {
        // The chip does not acknowledge wake_up
        let result = self.command(CMD_WAKE_UP);
        self.delay.delay_ms(EXEC_WAKE_UP_MS);
        result
    }

    fn power_down(&mut self) -> Result<(), ChipStatus> {
        self.command(CMD_POWER_DOWN)?;
        self.delay.delay_ms(EXEC_READ_MS);
        Ok(())
    }

    fn reinit(&mut self) -> Result<(), ChipStatus> {
        self.command(CMD_REINIT)?;
        self.delay.delay_ms(EXEC_REINIT_MS);
        Ok(())
    }

    fn start_periodic(&mut self) -> Result<(), ChipStatus> {
        self.command(CMD_START_PERIODIC)
    }

    fn stop_periodic(&mut self) -> Result<(), ChipStatus> {
        self.command(CMD_STOP_PERIODIC)
    }

    fn serial_number(&mut self) -> Result<u64, ChipStatus> {
        let [w0, w1, w2] = self.read::<3>(CMD_GET_SERIAL, &mut [0u8; 9])?;
        Ok((w0 as u64) << 32 | (w1 as u64) << 16 | w2 as u64)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::i2c::{NoAcknowledgeSource, Operation};
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockBusError(ErrorKind);

    impl embedded_hal::i2c::Error for MockBusError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    /// Bus that records writes and answers reads from a fixed response
    #[derive(Default)]
    struct MockBus {
        writes: Vec<Vec<u8>>,
        response: Vec<u8>,
        fail: Option<ErrorKind>,
    }

    impl embedded_hal::i2c::ErrorType for MockBus {
        type Error = MockBusError;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            assert_eq!(address, SCD4X_ADDR);
            if let Some(kind) = self.fail {
                return Err(MockBusError(kind));
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push(bytes.to_vec()),
                    Operation::Read(buf) => buf.copy_from_slice(&self.response[..buf.len()]),
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn word(value: u16) -> [u8; 3] {
        let [hi, lo] = value.to_be_bytes();
        [hi, lo, crc8(&[hi, lo])]
    }

    fn chip_with(words: &[u16]) -> Scd4xI2c<MockBus, NoDelay> {
        let response = words.iter().flat_map(|&w| word(w)).collect();
        Scd4xI2c::new(
            MockBus {
                response,
                ..Default::default()
            },
            NoDelay,
        )
    }

    #[test]
    fn test_crc_reference_vector() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(temperature_milli_c(0), -45_000);
        assert_eq!(temperature_milli_c(0x8000), 42_500);
        assert_eq!(temperature_milli_c(0xFFFF), 129_997);
        assert_eq!(humidity_milli(0), 0);
        assert_eq!(humidity_milli(0x8000), 50_000);
    }

    #[test]
    fn test_read_measurement() {
        let mut chip = chip_with(&[812, 0x8000, 0x8000]);
        let m = chip.read_measurement().unwrap();

        assert_eq!(m.co2, 812);
        assert_eq!(m.temperature_milli_c, 42_500);
        assert_eq!(m.humidity_milli, 50_000);
        assert_eq!(chip.i2c.writes, [std::vec![0xec, 0x05]]);
    }

    #[test]
    fn test_data_ready_mask() {
        assert_eq!(chip_with(&[0x8000]).data_ready(), Ok(false));
        assert_eq!(chip_with(&[0x0001]).data_ready(), Ok(true));
        assert_eq!(chip_with(&[0x07FF]).data_ready(), Ok(true));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut chip = chip_with(&[812, 0x6667, 0x8000]);
        chip.i2c.response[5] ^= 0xFF;
        assert_eq!(chip.read_measurement(), Err(ChipStatus::CRC_MISMATCH));
    }

    #[test]
    fn test_nack_is_transient() {
        let mut chip = chip_with(&[]);
        chip.i2c.fail = Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        assert_eq!(chip.data_ready(), Err(ChipStatus::TRANSIENT_FAULT));

        chip.i2c.fail = Some(ErrorKind::ArbitrationLoss);
        assert_eq!(chip.data_ready(), Err(ChipStatus::BUS_FAULT));
    }

    #[test]
    fn test_serial_number() {
        let mut chip = chip_with(&[0x1234, 0x5678, 0x9ABC]);
        assert_eq!(chip.serial_number(), Ok(0x1234_5678_9ABC));
    }
}
