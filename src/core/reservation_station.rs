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

// reservation_station.rs
//
// This file contains the reservation station and its fixed-size per-class
// pool. A station holds one in-flight instruction between issue and
// write-back: its operands (literal values or producer tags waiting on the
// CDB), its destination register, and the cycles remaining before it
// finishes executing.

use super::instruction::{FunctionalUnitClass, Instruction, RegId};
use super::register_status::ProducerTag;

/// Either a ready 16-bit value or the tag of the station that will produce
/// it. Mirrors the classic Tomasulo Vj/Qj and Vk/Qk pairing in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Value(u16),
    Waiting(ProducerTag),
}

impl Operand {
    pub fn is_ready(&self) -> bool {
        matches!(self, Operand::Value(_))
    }

    pub fn value(&self) -> Option<u16> {
        match self {
            Operand::Value(v) => Some(*v),
            Operand::Waiting(_) => None,
        }
    }
}

/// One reservation station. A free station has `busy == false` and every
/// other field at its reset default.
#[derive(Debug, Clone)]
pub struct ReservationStation {
    pub busy: bool,
    pub instruction: Option<Instruction>,
    pub vj: Option<Operand>,
    pub vk: Option<Operand>,
    pub dest: Option<RegId>,
    pub executing: bool,
    pub cycles_left: u32,
    /// Set by a flush; the station keeps occupying its slot until its
    /// in-flight result (if any) is drained from the CDB pipeline, but it
    /// is no longer dispatched, ticked, or eligible to win CDB arbitration.
    pub flushed: bool,
    /// Index of this station's row in the Timeline Recorder, so the
    /// scheduler can update it in place without a separate lookup table.
    pub timeline_index: Option<usize>,
    /// The architectural effect's result value, computed eagerly at
    /// dispatch (§4.2 step 4) and held until this station wins CDB
    /// arbitration. `None` for STORE/BEQ/RET, which write no register.
    pub result: Option<u16>,
    /// Set at dispatch for a BEQ station: whether the captured operands
    /// compare equal. Consulted at branch resolution (§4.2 step 3) instead
    /// of re-reading the register file, which may have moved on by then.
    pub branch_taken: Option<bool>,
}

impl ReservationStation {
    pub fn new() -> Self {
        Self {
            busy: false,
            instruction: None,
            vj: None,
            vk: None,
            dest: None,
            executing: false,
            cycles_left: 0,
            flushed: false,
            timeline_index: None,
            result: None,
            branch_taken: None,
        }
    }

    /// True once both operands are known values and the station has not
    /// already started executing.
    pub fn is_ready(&self) -> bool {
        self.busy
            && !self.flushed
            && !self.executing
            && self.vj.map(|v| v.is_ready()).unwrap_or(true)
            && self.vk.map(|v| v.is_ready()).unwrap_or(true)
    }

    /// Occupies the station with a freshly issued instruction.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &mut self,
        instruction: Instruction,
        vj: Option<Operand>,
        vk: Option<Operand>,
        dest: Option<RegId>,
        latency: u32,
        timeline_index: usize,
    ) {
        self.busy = true;
        self.instruction = Some(instruction);
        self.vj = vj;
        self.vk = vk;
        self.dest = dest;
        self.executing = false;
        self.cycles_left = latency;
        self.flushed = false;
        self.timeline_index = Some(timeline_index);
        self.result = None;
        self.branch_taken = None;
    }

    /// Begins execution once the station is ready, recording the
    /// instruction's eagerly computed effect (§4.2 dispatch step).
    pub fn start_execution(&mut self, result: Option<u16>, branch_taken: Option<bool>) {
        if self.is_ready() {
            self.executing = true;
            self.result = result;
            self.branch_taken = branch_taken;
        }
    }

    /// Advances the in-flight countdown by one cycle. Returns `true` the
    /// cycle it reaches zero (result is ready for CDB arbitration).
    pub fn tick(&mut self) -> bool {
        if self.executing && self.cycles_left > 0 {
            self.cycles_left -= 1;
            return self.cycles_left == 0;
        }
        false
    }

    /// Fills in any operand slot waiting on `tag`, called on every CDB
    /// broadcast so waiting stations observe the new value immediately.
    pub fn forward(&mut self, tag: ProducerTag, value: u16) {
        if self.vj == Some(Operand::Waiting(tag)) {
            self.vj = Some(Operand::Value(value));
        }
        if self.vk == Some(Operand::Waiting(tag)) {
            self.vk = Some(Operand::Value(value));
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Cancels this station as part of a branch flush (§4.2 `flush`):
    /// the slot is freed immediately (`busy = false`) but `flushed` stays
    /// set through the reset so any late CDB traffic already in flight for
    /// this tag cannot be mistaken for a legitimate completion.
    pub fn flush(&mut self) {
        self.busy = false;
        self.flushed = true;
        self.executing = false;
        self.cycles_left = 0;
        self.instruction = None;
        self.vj = None;
        self.vk = None;
        self.dest = None;
        self.result = None;
        self.branch_taken = None;
    }
}

impl Default for ReservationStation {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed-size pool of stations belonging to one functional-unit class
/// (§6 defaults: e.g. `ADD_SUB` gets 4 stations of latency 2).
#[derive(Debug, Clone)]
pub struct StationPool {
    pub class: FunctionalUnitClass,
    pub latency: u32,
    pub stations: Vec<ReservationStation>,
}

impl StationPool {
    pub fn new(class: FunctionalUnitClass, latency: u32, count: usize) -> Self {
        Self { class, latency, stations: vec![ReservationStation::new(); count] }
    }

    /// Lowest-index free station, per §9's "lowest-index free station"
    /// tie-break rule for issue.
    pub fn free_index(&self) -> Option<usize> {
        self.stations.iter().position(|s| !s.busy)
    }
}
