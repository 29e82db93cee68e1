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

// lib.rs
//
// This file is the main library file for the tomasulo_core crate. It
// re-exports the core (scheduler, reservation stations, register status
// table, architectural state), the frontend text parsers, and the shared
// utils.

pub mod core;
pub mod errors;
pub mod frontend;
pub mod utils;

// Re-export the types a caller reaches for most often.
pub use crate::core::{
    ArchitecturalState, FunctionalUnitClass, FunctionalUnitConfig, Instruction, Op, RegId, RunReport, Scheduler,
    SchedulerConfig, SchedulerSnapshot, Statistics, TimelineRecord,
};
pub use crate::errors::{CoreError, Diagnostic, Diagnostics};
pub use crate::frontend::{parse_memory, parse_program};
