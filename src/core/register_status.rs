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

// register_status.rs
//
// This file implements the Register Status Table (RST): for each of
// R0..R7, either READY or a producer tag naming the reservation station
// that will write it. The RST is the single source of truth for
// producer/consumer relationships; only the scheduler mutates it.

use super::instruction::{FunctionalUnitClass, RegId, NUM_REGISTERS, R0};

/// Names the reservation station that will produce a register's next
/// value: the station's functional-unit class plus its index within that
/// class's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProducerTag {
    pub class: FunctionalUnitClass,
    pub index: usize,
}

impl ProducerTag {
    pub fn new(class: FunctionalUnitClass, index: usize) -> Self {
        Self { class, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ready,
    Producer(ProducerTag),
}

/// Tomasulo-style register renaming table. Invariant: if an entry is
/// non-READY, exactly one busy station carries that tag as its
/// destination (enforced by the scheduler, the table's only writer).
#[derive(Debug, Clone)]
pub struct RegisterStatusTable {
    status: [Status; NUM_REGISTERS],
}

impl Default for RegisterStatusTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStatusTable {
    pub fn new() -> Self {
        Self { status: [Status::Ready; NUM_REGISTERS] }
    }

    /// True iff the entry is READY. R0 is always ready.
    pub fn is_ready(&self, r: RegId) -> bool {
        r == R0 || self.status[r as usize] == Status::Ready
    }

    /// The producer tag for `r`, or `None` if it is READY.
    pub fn status(&self, r: RegId) -> Option<ProducerTag> {
        if r == R0 {
            return None;
        }
        match self.status[r as usize] {
            Status::Ready => None,
            Status::Producer(tag) => Some(tag),
        }
    }

    /// Stores `tag` as the producer of `r`, overwriting any prior tag
    /// (later issue owns the register). Writing R0 is a no-op:
    /// `set_busy(R0)` is an invariant violation absorbed by the
    /// scheduler rather than propagated.
    pub fn set_busy(&mut self, r: RegId, tag: ProducerTag) {
        if r != R0 {
            self.status[r as usize] = Status::Producer(tag);
        }
    }

    /// Marks `r` READY. Idempotent.
    pub fn set_ready(&mut self, r: RegId) {
        if r != R0 {
            self.status[r as usize] = Status::Ready;
        }
    }

    /// Marks `r` READY only if its current producer tag is exactly `tag`.
    /// Used by flush (§4.2/§9 Open Question resolution (b)): a station
    /// being cancelled must not clear a tag that a later, still-live
    /// station has since overwritten.
    pub fn set_ready_if_owned_by(&mut self, r: RegId, tag: ProducerTag) {
        if r != R0 && self.status(r) == Some(tag) {
            self.set_ready(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r0_is_always_ready_and_unaffected_by_set_busy() {
        let mut rst = RegisterStatusTable::new();
        rst.set_busy(R0, ProducerTag::new(FunctionalUnitClass::AddSub, 0));
        assert!(rst.is_ready(R0));
        assert_eq!(rst.status(R0), None);
    }

    #[test]
    fn set_busy_then_set_ready_round_trips() {
        let mut rst = RegisterStatusTable::new();
        let tag = ProducerTag::new(FunctionalUnitClass::Mul, 1);
        rst.set_busy(1, tag);
        assert!(!rst.is_ready(1));
        assert_eq!(rst.status(1), Some(tag));
        rst.set_ready(1);
        assert!(rst.is_ready(1));
    }

    #[test]
    fn later_issue_overwrites_earlier_producer_tag() {
        let mut rst = RegisterStatusTable::new();
        let first = ProducerTag::new(FunctionalUnitClass::AddSub, 0);
        let second = ProducerTag::new(FunctionalUnitClass::AddSub, 1);
        rst.set_busy(2, first);
        rst.set_busy(2, second);
        assert_eq!(rst.status(2), Some(second));
    }

    #[test]
    fn set_ready_if_owned_by_ignores_stale_tag() {
        let mut rst = RegisterStatusTable::new();
        let first = ProducerTag::new(FunctionalUnitClass::AddSub, 0);
        let second = ProducerTag::new(FunctionalUnitClass::AddSub, 1);
        rst.set_busy(3, first);
        rst.set_busy(3, second);
        // A flush of the station that owned `first` must not clear `second`'s claim.
        rst.set_ready_if_owned_by(3, first);
        assert_eq!(rst.status(3), Some(second));
        rst.set_ready_if_owned_by(3, second);
        assert!(rst.is_ready(3));
    }
}
