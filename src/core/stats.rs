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

// stats.rs
//
// This file contains the run's performance counters and the two derived
// laws from §4.6: IPC and branch prediction accuracy.

use std::fmt;

/// Run-level performance counters, accumulated by the scheduler as it
/// ticks and finalized once the run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub instructions_completed: u64,
    pub total_cycles: u64,
    pub branches_resolved: u64,
    pub mispredictions: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// `completed / total_cycles`, 0 when no cycles have elapsed.
    pub fn ipc(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.instructions_completed as f64 / self.total_cycles as f64
        }
    }

    /// `(branches - mispredictions) / branches`, 1.0 when no branches
    /// resolved (§8 law: "branch accuracy = 1.0 when total_branches = 0").
    pub fn branch_accuracy(&self) -> f64 {
        if self.branches_resolved == 0 {
            1.0
        } else {
            (self.branches_resolved - self.mispredictions) as f64 / self.branches_resolved as f64
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cycles: {}", self.total_cycles)?;
        writeln!(f, "Instructions completed: {}", self.instructions_completed)?;
        writeln!(f, "IPC: {:.3}", self.ipc())?;
        writeln!(f, "Branches resolved: {}", self.branches_resolved)?;
        writeln!(f, "Mispredictions: {}", self.mispredictions)?;
        write!(f, "Branch accuracy: {:.1}%", self.branch_accuracy() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipc_is_zero_with_no_elapsed_cycles() {
        let stats = Statistics::new();
        assert_eq!(stats.ipc(), 0.0);
    }

    #[test]
    fn ipc_matches_completed_over_cycles() {
        let stats = Statistics { instructions_completed: 3, total_cycles: 9, ..Statistics::new() };
        assert!((stats.ipc() - (3.0 / 9.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn branch_accuracy_is_one_with_no_branches() {
        let stats = Statistics::new();
        assert_eq!(stats.branch_accuracy(), 1.0);
    }

    #[test]
    fn branch_accuracy_reflects_mispredictions() {
        let stats = Statistics { branches_resolved: 4, mispredictions: 1, ..Statistics::new() };
        assert!((stats.branch_accuracy() - 0.75).abs() < f64::EPSILON);
    }
}
