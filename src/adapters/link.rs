//! Command link over the process's standard streams.
//!
//! A reader thread pulls bytes from stdin and forwards them over a
//! channel; the control loop polls the channel without ever blocking.
//! Status lines go to stdout, one `write` + `flush` per line so a line is
//! never split.
//!
//! ```text
//!   stdin ──▶ reader thread ──▶ mpsc ──▶ has_data / read_byte
//!   write_line ──▶ stdout (locked, flushed)
//! ```

use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::app::ports::LinkPort;
use crate::error::{Error, Result};

pub struct StdioLink {
    rx: Receiver<u8>,
    peeked: Option<u8>,
    closed: bool,
}

impl StdioLink {
    /// Spawn the stdin reader.
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for byte in stdin.lock().bytes() {
                    match byte {
                        Ok(b) => {
                            if tx.send(b).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("stdin read failed: {e}");
                            break;
                        }
                    }
                }
                debug!("stdin closed");
            })?;
        Ok(Self::from_receiver(rx))
    }

    /// Wrap an existing byte channel.
    pub fn from_receiver(rx: Receiver<u8>) -> Self {
        Self {
            rx,
            peeked: None,
            closed: false,
        }
    }

    fn fill(&mut self) {
        if self.peeked.is_some() || self.closed {
            return;
        }
        match self.rx.try_recv() {
            Ok(b) => self.peeked = Some(b),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                debug!("command link closed");
                self.closed = true;
            }
        }
    }
}

impl LinkPort for StdioLink {
    fn has_data(&mut self) -> bool {
        self.fill();
        self.peeked.is_some()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.fill();
        self.peeked.take()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(line.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|_| Error::Hal("stdout write"))
    }
}
