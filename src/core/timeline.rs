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

// timeline.rs
//
// This file contains the Timeline Recorder: an append-only, issue-ordered
// log of every instruction's lifecycle, updated in place as the
// instruction moves through execution. `display_string` formatting
// follows the per-opcode shapes used by the original debugger output
// (`ExecutionUnit.get_instruction_timeline`), adapted to the new Op type.

use super::instruction::{Instruction, Op};

/// One instruction's lifecycle record, indexed by issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRecord {
    pub display_string: String,
    pub issue_cycle: u64,
    pub exec_start: Option<u64>,
    pub exec_end: Option<u64>,
    pub write_cycle: Option<u64>,
    pub flushed: bool,
}

impl TimelineRecord {
    fn new(instruction: &Instruction, issue_cycle: u64) -> Self {
        Self {
            display_string: display_string(instruction),
            issue_cycle,
            exec_start: None,
            exec_end: None,
            write_cycle: None,
            flushed: false,
        }
    }
}

/// Formats an instruction per §4.5's op-shape table.
fn display_string(instruction: &Instruction) -> String {
    match &instruction.op {
        Op::Load { dest, base, offset } => format!("LOAD r{dest}, {offset}(r{base})"),
        Op::Store { src, base, offset } => format!("STORE r{src}, {offset}(r{base})"),
        Op::Add { dest, a, b } => format!("ADD r{dest}, r{a}, r{b}"),
        Op::Sub { dest, a, b } => format!("SUB r{dest}, r{a}, r{b}"),
        Op::Mul { dest, a, b } => format!("MUL r{dest}, r{a}, r{b}"),
        Op::Nor { dest, a, b } => format!("NOR r{dest}, r{a}, r{b}"),
        Op::Beq { a, b, offset } => format!("BEQ r{a}, r{b}, {offset}"),
        Op::Call { label } => format!("CALL {label}"),
        Op::Ret => "RET".to_string(),
    }
}

/// Append-only log, indexed by issue order. Each appended record is
/// later updated in place by index as its instruction progresses.
#[derive(Debug, Clone, Default)]
pub struct TimelineRecorder {
    records: Vec<TimelineRecord>,
}

impl TimelineRecorder {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Appends a new record for a just-issued instruction, returning its
    /// index for later in-place updates.
    pub fn issue(&mut self, instruction: &Instruction, cycle: u64) -> usize {
        self.records.push(TimelineRecord::new(instruction, cycle));
        self.records.len() - 1
    }

    pub fn set_exec_start(&mut self, index: usize, cycle: u64) {
        self.records[index].exec_start = Some(cycle);
    }

    pub fn set_exec_end(&mut self, index: usize, cycle: u64) {
        self.records[index].exec_end = Some(cycle);
    }

    pub fn set_write_cycle(&mut self, index: usize, cycle: u64) {
        self.records[index].write_cycle = Some(cycle);
    }

    pub fn mark_flushed(&mut self, index: usize) {
        self.records[index].flushed = true;
    }

    pub fn records(&self) -> &[TimelineRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TimelineRecord> {
        self.records
    }
}
