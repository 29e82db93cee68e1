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

// instruction.rs
//
// This file contains the decoded instruction representation consumed by the
// scheduler. It defines the Op enum (a tagged variant per opcode, each with
// its own operand fields) and the Instruction struct that wraps an Op with
// its program-counter-relative bookkeeping.

use std::fmt;

/// One of the eight general-purpose registers. R0 is wired to the constant 0.
pub type RegId = u8;

pub const R0: RegId = 0;
pub const NUM_REGISTERS: usize = 8;

/// Decoded opcode. Each variant carries exactly the operand fields that
/// opcode needs, so there is no `get("key")` duck typing anywhere above this
/// layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Load { dest: RegId, base: RegId, offset: i32 },
    Store { src: RegId, base: RegId, offset: i32 },
    Add { dest: RegId, a: RegId, b: RegId },
    Sub { dest: RegId, a: RegId, b: RegId },
    Mul { dest: RegId, a: RegId, b: RegId },
    Nor { dest: RegId, a: RegId, b: RegId },
    Beq { a: RegId, b: RegId, offset: i32 },
    Call { label: String },
    Ret,
}

impl Op {
    /// The functional-unit class that executes this opcode (§4.2).
    pub fn fu_class(&self) -> FunctionalUnitClass {
        match self {
            Op::Load { .. } => FunctionalUnitClass::Load,
            Op::Store { .. } => FunctionalUnitClass::Store,
            Op::Add { .. } | Op::Sub { .. } => FunctionalUnitClass::AddSub,
            Op::Mul { .. } => FunctionalUnitClass::Mul,
            Op::Nor { .. } => FunctionalUnitClass::Nor,
            Op::Beq { .. } => FunctionalUnitClass::Beq,
            Op::Call { .. } | Op::Ret => FunctionalUnitClass::CallRet,
        }
    }

    /// True for BEQ/CALL/RET, the three opcodes that stall later issue
    /// while a branch is in flight (§4.2, §9 design note).
    pub fn is_branch(&self) -> bool {
        matches!(self, Op::Beq { .. } | Op::Call { .. } | Op::Ret)
    }

    /// The destination register this opcode writes, if any. STORE, BEQ and
    /// RET never write a register.
    pub fn dest(&self) -> Option<RegId> {
        match self {
            Op::Load { dest, .. } => Some(*dest),
            Op::Add { dest, .. } | Op::Sub { dest, .. } | Op::Mul { dest, .. } | Op::Nor { dest, .. } => {
                Some(*dest)
            },
            Op::Call { .. } => Some(1), // R1 holds the return address
            Op::Store { .. } | Op::Beq { .. } | Op::Ret => None,
        }
    }

    /// Source registers read by this opcode, in `(first, second)` order
    /// used for the RS's `vj`/`vk`/`qj`/`qk` slots.
    pub fn srcs(&self) -> Vec<RegId> {
        match self {
            Op::Load { base, .. } => vec![*base],
            Op::Store { src, base, .. } => vec![*base, *src],
            Op::Add { a, b, .. } | Op::Sub { a, b, .. } | Op::Mul { a, b, .. } | Op::Nor { a, b, .. } => {
                vec![*a, *b]
            },
            Op::Beq { a, b, .. } => vec![*a, *b],
            Op::Call { .. } | Op::Ret => vec![],
        }
    }
}

/// A fully decoded instruction as it enters the scheduler: the opcode plus
/// the program address it was fetched from, used for flush ordering (§9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub pc: u16,
}

impl Instruction {
    pub fn new(op: Op, pc: u16) -> Self {
        Self { op, pc }
    }
}

/// Functional-unit class. Each class has its own fixed pool of reservation
/// stations and a single latency shared by every instruction routed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionalUnitClass {
    Load,
    Store,
    AddSub,
    Mul,
    Nor,
    Beq,
    CallRet,
}

impl FunctionalUnitClass {
    pub const ALL: [FunctionalUnitClass; 7] = [
        FunctionalUnitClass::Load,
        FunctionalUnitClass::Store,
        FunctionalUnitClass::AddSub,
        FunctionalUnitClass::Mul,
        FunctionalUnitClass::Nor,
        FunctionalUnitClass::Beq,
        FunctionalUnitClass::CallRet,
    ];
}

impl fmt::Display for FunctionalUnitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FunctionalUnitClass::Load => "LOAD",
            FunctionalUnitClass::Store => "STORE",
            FunctionalUnitClass::AddSub => "ADD_SUB",
            FunctionalUnitClass::Mul => "MUL",
            FunctionalUnitClass::Nor => "NOR",
            FunctionalUnitClass::Beq => "BEQ",
            FunctionalUnitClass::CallRet => "CALL_RET",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_share_a_functional_unit_class() {
        let add = Op::Add { dest: 1, a: 2, b: 3 };
        let sub = Op::Sub { dest: 1, a: 2, b: 3 };
        assert_eq!(add.fu_class(), sub.fu_class());
        assert_eq!(add.fu_class(), FunctionalUnitClass::AddSub);
    }

    #[test]
    fn call_writes_r1_and_ret_writes_nothing() {
        let call = Op::Call { label: "f".to_string() };
        assert_eq!(call.dest(), Some(1));
        assert_eq!(Op::Ret.dest(), None);
    }

    #[test]
    fn store_and_beq_have_no_destination() {
        let store = Op::Store { src: 2, base: 3, offset: 0 };
        assert_eq!(store.dest(), None);
        let beq = Op::Beq { a: 1, b: 2, offset: -1 };
        assert_eq!(beq.dest(), None);
        assert!(beq.is_branch());
    }

    #[test]
    fn load_reads_only_its_base_register() {
        let load = Op::Load { dest: 1, base: 2, offset: 4 };
        assert_eq!(load.srcs(), vec![2]);
    }
}
