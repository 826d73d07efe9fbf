//! Line protocol to the network co-processor
//!
//! The co-processor owns the WiFi association and the MQTT client. It is
//! driven over a UART with newline-terminated ASCII lines, fields separated
//! by single spaces.
//!
//! To the co-processor:
//! ```text
//! WIFI <ssid> <password>
//! BROKER <host> <port> <client_id> <keep_alive_s> [<username> <password>]
//! PUB <id> <qos> <topic> <payload>
//! ```
//!
//! From the co-processor:
//! ```text
//! CONNECTED
//! DISCONNECTED
//! PUBACK <id> <status>   0 = delivered, negative = client error code
//! ```
//!
//! Exactly one `PUBACK` answers each `PUB` and echoes its id. Fields
//! cannot contain spaces.

use core::fmt::Write;

use heapless::{String, Vec};

/// Longest line in either direction, newline included
pub const MAX_LINE_LEN: usize = 192;

/// An encoded outgoing line
pub type Line = String<MAX_LINE_LEN>;

/// Errors from encoding or parsing link lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Line does not fit in [`MAX_LINE_LEN`]
    LineTooLong,
    /// Incoming line starts with an unknown keyword or is not ASCII
    UnknownCommand,
    /// `PUBACK` id or status missing or out of range
    InvalidStatus,
    /// Outgoing field is empty or contains whitespace
    InvalidField,
}

/// Event reported by the co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Broker session is up
    Connected,
    /// Broker session is down
    Disconnected,
    /// Publish `id` finished with `status`
    PublishAck { id: u16, status: i8 },
}

impl LinkEvent {
    /// Parse one line without its terminator
    pub fn parse(line: &str) -> Result<Self, LinkError> {
        let mut fields = line.split(' ');
        match fields.next() {
            Some("CONNECTED") => Ok(LinkEvent::Connected),
            Some("DISCONNECTED") => Ok(LinkEvent::Disconnected),
            Some("PUBACK") => {
                let id = fields
                    .next()
                    .and_then(|s| s.parse::<u16>().ok())
                    .ok_or(LinkError::InvalidStatus)?;
                let status = fields
                    .next()
                    .and_then(|s| s.parse::<i8>().ok())
                    .ok_or(LinkError::InvalidStatus)?;
                Ok(LinkEvent::PublishAck { id, status })
            }
            _ => Err(LinkError::UnknownCommand),
        }
    }

    /// `Ok` for a delivered publish, the client error code otherwise
    pub fn ack_result(status: i8) -> Result<(), i8> {
        if status == 0 {
            Ok(())
        } else {
            Err(status)
        }
    }
}

/// Command sent to the co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCommand<'a> {
    /// Join a WiFi network
    Wifi { ssid: &'a str, password: &'a str },
    /// Connect to an MQTT broker; empty `username` means anonymous
    Broker {
        host: &'a str,
        port: u16,
        client_id: &'a str,
        keep_alive_s: u16,
        username: &'a str,
        password: &'a str,
    },
    /// Publish `payload` under `topic`, acknowledged with `id`
    Publish {
        id: u16,
        qos: u8,
        topic: &'a str,
        payload: &'a str,
    },
}

impl LinkCommand<'_> {
    /// Encode as a newline-terminated line
    pub fn encode(&self) -> Result<Line, LinkError> {
        let mut line = Line::new();
        let written = match *self {
            LinkCommand::Wifi { ssid, password } => {
                write!(line, "WIFI {} {}", field(ssid)?, field(password)?)
            }
            LinkCommand::Broker {
                host,
                port,
                client_id,
                keep_alive_s,
                username,
                password,
            } => {
                let login = if username.is_empty() {
                    None
                } else {
                    Some((field(username)?, field(password)?))
                };
                write!(
                    line,
                    "BROKER {} {} {} {}",
                    field(host)?,
                    port,
                    field(client_id)?,
                    keep_alive_s
                )
                .and_then(|_| match login {
                    Some((user, pass)) => write!(line, " {} {}", user, pass),
                    None => Ok(()),
                })
            }
            LinkCommand::Publish {
                id,
                qos,
                topic,
                payload,
            } => write!(
                line,
                "PUB {} {} {} {}",
                id,
                qos,
                field(topic)?,
                field(payload)?
            ),
        };
        written
            .and_then(|_| line.push('\n').map_err(|_| core::fmt::Error))
            .map_err(|_| LinkError::LineTooLong)?;
        Ok(line)
    }
}

fn field(value: &str) -> Result<&str, LinkError> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        Err(LinkError::InvalidField)
    } else {
        Ok(value)
    }
}

/// Byte-at-a-time line splitter for incoming events
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineParser {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(event))` at the end of a valid line, `Ok(None)`
    /// mid-line or on blank lines, and `Err` for a line that could not be
    /// parsed. The parser is ready for the next line after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<LinkEvent>, LinkError> {
        match byte {
            b'\r' => Ok(None),
            b'\n' => {
                let result = if self.overflowed {
                    Err(LinkError::LineTooLong)
                } else if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    core::str::from_utf8(&self.buffer)
                        .map_err(|_| LinkError::UnknownCommand)
                        .and_then(LinkEvent::parse)
                        .map(Some)
                };
                self.buffer.clear();
                self.overflowed = false;
                result
            }
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut LineParser, bytes: &[u8]) -> Vec<Result<LinkEvent, LinkError>, 8> {
        let mut out = Vec::new();
        for &b in bytes {
            match parser.feed(b) {
                Ok(None) => {}
                Ok(Some(event)) => out.push(Ok(event)).unwrap(),
                Err(e) => out.push(Err(e)).unwrap(),
            }
        }
        out
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(LinkEvent::parse("CONNECTED"), Ok(LinkEvent::Connected));
        assert_eq!(LinkEvent::parse("DISCONNECTED"), Ok(LinkEvent::Disconnected));
        assert_eq!(
            LinkEvent::parse("PUBACK 17 -4"),
            Ok(LinkEvent::PublishAck { id: 17, status: -4 })
        );
        assert_eq!(LinkEvent::parse("PUBACK"), Err(LinkError::InvalidStatus));
        assert_eq!(LinkEvent::parse("PUBACK 3"), Err(LinkError::InvalidStatus));
        assert_eq!(LinkEvent::parse("PUBACK x 0"), Err(LinkError::InvalidStatus));
        assert_eq!(LinkEvent::parse("PUBACK -1 0"), Err(LinkError::InvalidStatus));
        assert_eq!(LinkEvent::parse("HELLO"), Err(LinkError::UnknownCommand));
    }

    #[test]
    fn test_ack_result() {
        assert_eq!(LinkEvent::ack_result(0), Ok(()));
        assert_eq!(LinkEvent::ack_result(-1), Err(-1));
    }

    #[test]
    fn test_parser_splits_lines() {
        let mut parser = LineParser::new();
        let events = feed_all(&mut parser, b"CONNECTED\r\n\nPUBACK 5 0\nBOGUS\nDISCONNECTED\n");
        assert_eq!(
            events.as_slice(),
            &[
                Ok(LinkEvent::Connected),
                Ok(LinkEvent::PublishAck { id: 5, status: 0 }),
                Err(LinkError::UnknownCommand),
                Ok(LinkEvent::Disconnected),
            ]
        );
    }

    #[test]
    fn test_parser_recovers_from_overflow() {
        let mut parser = LineParser::new();
        for _ in 0..MAX_LINE_LEN + 10 {
            assert_eq!(parser.feed(b'A'), Ok(None));
        }
        assert_eq!(parser.feed(b'\n'), Err(LinkError::LineTooLong));
        assert_eq!(feed_all(&mut parser, b"CONNECTED\n")[0], Ok(LinkEvent::Connected));
    }

    #[test]
    fn test_encode_publish() {
        let line = LinkCommand::Publish {
            id: 42,
            qos: 1,
            topic: "home/weather_station/co2",
            payload: "812",
        }
        .encode()
        .unwrap();
        assert_eq!(line.as_str(), "PUB 42 1 home/weather_station/co2 812\n");
    }

    #[test]
    fn test_encode_broker() {
        let anonymous = LinkCommand::Broker {
            host: "mqtt.local",
            port: 1883,
            client_id: "pico-1",
            keep_alive_s: 60,
            username: "",
            password: "",
        };
        assert_eq!(
            anonymous.encode().unwrap().as_str(),
            "BROKER mqtt.local 1883 pico-1 60\n"
        );

        let with_login = LinkCommand::Broker {
            host: "mqtt.local",
            port: 1883,
            client_id: "pico-1",
            keep_alive_s: 60,
            username: "canary",
            password: "hunter2",
        };
        assert_eq!(
            with_login.encode().unwrap().as_str(),
            "BROKER mqtt.local 1883 pico-1 60 canary hunter2\n"
        );
    }

    #[test]
    fn test_encode_rejects_bad_fields() {
        let wifi = LinkCommand::Wifi {
            ssid: "my net",
            password: "pw",
        };
        assert_eq!(wifi.encode(), Err(LinkError::InvalidField));

        let empty = LinkCommand::Publish {
            id: 1,
            qos: 0,
            topic: "",
            payload: "1",
        };
        assert_eq!(empty.encode(), Err(LinkError::InvalidField));
    }

    #[test]
    fn test_encode_too_long() {
        let long = [b'x'; MAX_LINE_LEN];
        let topic = core::str::from_utf8(&long).unwrap();
        let cmd = LinkCommand::Publish {
            id: 1,
            qos: 0,
            topic,
            payload: "1",
        };
        assert_eq!(cmd.encode(), Err(LinkError::LineTooLong));
    }
}
