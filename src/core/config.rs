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

// config.rs
//
// This file contains the scheduler's configuration surface: the
// (latency, station_count) pair per functional-unit class, and the
// scheduler-wide defaults from the external-interfaces table (§6).

use std::collections::HashMap;

use super::instruction::FunctionalUnitClass;

/// Per-class station pool sizing and latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionalUnitConfig {
    pub latency_cycles: u32,
    pub station_count: usize,
}

impl FunctionalUnitConfig {
    pub fn new(latency_cycles: u32, station_count: usize) -> Self {
        Self { latency_cycles, station_count }
    }
}

/// Full scheduler configuration: one `FunctionalUnitConfig` per class plus
/// a safety-valve cycle bound for `run_program`.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    units: HashMap<FunctionalUnitClass, FunctionalUnitConfig>,
    max_cycles: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let mut units = HashMap::new();
        units.insert(FunctionalUnitClass::Load, FunctionalUnitConfig::new(6, 2));
        units.insert(FunctionalUnitClass::Store, FunctionalUnitConfig::new(6, 2));
        units.insert(FunctionalUnitClass::AddSub, FunctionalUnitConfig::new(2, 4));
        units.insert(FunctionalUnitClass::Mul, FunctionalUnitConfig::new(10, 2));
        units.insert(FunctionalUnitClass::Nor, FunctionalUnitConfig::new(1, 2));
        units.insert(FunctionalUnitClass::Beq, FunctionalUnitConfig::new(1, 2));
        units.insert(FunctionalUnitClass::CallRet, FunctionalUnitConfig::new(1, 1));
        Self { units, max_cycles: 100_000 }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides one class's (latency, station_count) pair.
    pub fn with_unit(mut self, class: FunctionalUnitClass, config: FunctionalUnitConfig) -> Self {
        self.units.insert(class, config);
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn unit(&self, class: FunctionalUnitClass) -> FunctionalUnitConfig {
        self.units[&class]
    }

    pub fn max_cycles(&self) -> u64 {
        self.max_cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_external_interface_table() {
        let config = SchedulerConfig::new();
        assert_eq!(config.unit(FunctionalUnitClass::Load), FunctionalUnitConfig::new(6, 2));
        assert_eq!(config.unit(FunctionalUnitClass::AddSub), FunctionalUnitConfig::new(2, 4));
        assert_eq!(config.unit(FunctionalUnitClass::Mul), FunctionalUnitConfig::new(10, 2));
        assert_eq!(config.unit(FunctionalUnitClass::CallRet), FunctionalUnitConfig::new(1, 1));
    }

    #[test]
    fn with_unit_overrides_a_single_class_without_touching_others() {
        let config = SchedulerConfig::new()
            .with_unit(FunctionalUnitClass::AddSub, FunctionalUnitConfig::new(2, 1));
        assert_eq!(config.unit(FunctionalUnitClass::AddSub), FunctionalUnitConfig::new(2, 1));
        assert_eq!(config.unit(FunctionalUnitClass::Mul), FunctionalUnitConfig::new(10, 2));
    }
}
