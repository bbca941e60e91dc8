// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory hardware for tests and the simulation daemon.
//!
//! Both types are cheap handles over shared state: clone one, hand the clone
//! to the controller, and keep the original to inspect or perturb the
//! "hardware" from the outside.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{OutputPin, RegisterBus};

/// Error returned by [`SimulatedBus`] when reads are set to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

#[derive(Debug, Default)]
struct BusState {
    raw: Option<u16>,
    last_read: Option<(u8, u8)>,
}

/// A register bus that returns a configurable raw word.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBus {
    state: Arc<Mutex<BusState>>,
}

impl SimulatedBus {
    /// Creates a bus that answers every read with `raw`.
    #[must_use]
    pub fn new(raw: u16) -> Self {
        let bus = Self::default();
        bus.set_raw(raw);
        bus
    }

    /// Sets the word returned by subsequent reads.
    pub fn set_raw(&self, raw: u16) {
        self.state.lock().raw = Some(raw);
    }

    /// Makes subsequent reads fail until [`set_raw`](Self::set_raw) is called.
    pub fn fail_reads(&self) {
        self.state.lock().raw = None;
    }

    /// Returns the `(address, register)` of the most recent read.
    #[must_use]
    pub fn last_read(&self) -> Option<(u8, u8)> {
        self.state.lock().last_read
    }
}

impl RegisterBus for SimulatedBus {
    type Error = BusFault;

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        let mut state = self.state.lock();
        state.last_read = Some((address, register));
        state.raw.ok_or(BusFault)
    }
}

/// A digital pin backed by a shared flag.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPin {
    level: Arc<AtomicBool>,
    output: Arc<AtomicBool>,
}

impl SimulatedPin {
    /// Creates a low, unconfigured pin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current level.
    #[must_use]
    pub fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    /// Returns `true` once the pin has been configured as an output.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.output.load(Ordering::SeqCst)
    }

    /// Changes the level behind the driver's back, as a manual switch would.
    pub fn force_level(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }
}

impl OutputPin for SimulatedPin {
    fn set_output_mode(&mut self) {
        self.output.store(true, Ordering::SeqCst);
    }

    fn write(&mut self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }

    fn read(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}
