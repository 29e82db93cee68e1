// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// cdb.rs
//
// This file contains the Common Data Bus: a single broadcast slot shared by
// every functional unit. Only one station's result can occupy the bus per
// cycle (§4.3), so the scheduler's arbitration step picks at most one
// winner among the stations that finished executing this cycle.

use super::register_status::ProducerTag;

/// One in-flight broadcast: the producing station's tag, the register it
/// targets (if any — STORE and BEQ produce no register result), and the
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdbMessage {
    pub tag: ProducerTag,
    pub dest: Option<u8>,
    pub value: u16,
}

/// Single-slot broadcast bus. `busy` is true for exactly the cycle between
/// a winning station's arbitration and the next cycle's drain.
#[derive(Debug, Clone, Default)]
pub struct CommonDataBus {
    slot: Option<CdbMessage>,
}

impl CommonDataBus {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    /// Occupies the bus. Caller (the scheduler's arbitration step) is
    /// responsible for ensuring at most one broadcast happens per cycle.
    pub fn broadcast(&mut self, message: CdbMessage) {
        self.slot = Some(message);
    }

    /// Removes and returns the current broadcast, if any (the scheduler's
    /// drain step, run at the start of the next cycle).
    pub fn drain(&mut self) -> Option<CdbMessage> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<CdbMessage> {
        self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instruction::FunctionalUnitClass;

    #[test]
    fn broadcast_then_drain_round_trips_and_clears() {
        let mut bus = CommonDataBus::new();
        let msg = CdbMessage { tag: ProducerTag::new(FunctionalUnitClass::Mul, 0), dest: Some(3), value: 42 };
        bus.broadcast(msg);
        assert!(bus.is_busy());
        assert_eq!(bus.drain(), Some(msg));
        assert!(!bus.is_busy());
        assert_eq!(bus.drain(), None);
    }

    #[test]
    fn store_and_beq_broadcast_with_no_destination_register() {
        let mut bus = CommonDataBus::new();
        let msg = CdbMessage { tag: ProducerTag::new(FunctionalUnitClass::Store, 0), dest: None, value: 0 };
        bus.broadcast(msg);
        assert_eq!(bus.peek().unwrap().dest, None);
    }
}
