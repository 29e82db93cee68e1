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

// arch_state.rs
//
// This file contains the architectural (value-side) state of the machine:
// the eight-register file, sparse word-addressed memory, the program
// counter, and the label table. ArchitecturalState exposes only pure value
// operations (load, store, add, ..., beq, call, ret) so the scheduler never
// reaches into a sibling module's globals (§9 design note: the source's
// direct import of a sibling "backend" module is inverted into this
// explicit, passed-around value).

use std::collections::HashMap;

use super::instruction::{RegId, NUM_REGISTERS, R0};

const WORD_MASK: u32 = 0xFFFF;

/// Fixed-size register file plus sparse memory, program counter and label
/// table. A run is a pure function of this state and the program text
/// (§6): no module-level mutable globals anywhere in the core.
#[derive(Debug, Clone)]
pub struct ArchitecturalState {
    registers: [u16; NUM_REGISTERS],
    memory: HashMap<u16, u16>,
    pc: u16,
    labels: HashMap<String, u16>,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchitecturalState {
    pub fn new() -> Self {
        Self {
            registers: [0; NUM_REGISTERS],
            memory: HashMap::new(),
            pc: 0,
            labels: HashMap::new(),
        }
    }

    pub fn with_labels(labels: HashMap<String, u16>) -> Self {
        let mut state = Self::new();
        state.labels = labels;
        state
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn read_register(&self, r: RegId) -> u16 {
        if r == R0 {
            0
        } else {
            self.registers[r as usize]
        }
    }

    /// Writes to R0 are silently dropped (§3).
    pub fn write_register(&mut self, r: RegId, value: u16) {
        if r != R0 {
            self.registers[r as usize] = value;
        }
    }

    /// Memory reads return 0 for absent addresses (§9).
    pub fn read_memory(&self, address: u16) -> u16 {
        self.memory.get(&address).copied().unwrap_or(0)
    }

    pub fn write_memory(&mut self, address: u16, value: u16) {
        self.memory.insert(address, value);
    }

    pub fn set_memory_image(&mut self, image: HashMap<u16, u16>) {
        self.memory = image;
    }

    pub fn label(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    pub fn set_labels(&mut self, labels: HashMap<String, u16>) {
        self.labels = labels;
    }

    // -- Value-semantics operations (§4.4). All 16-bit wrapping with an
    // explicit `& 0xFFFF` mask even though `u16` arithmetic already wraps,
    // to keep the table in §4.4 legible as the authoritative source.
    //
    // Each register-id-taking op delegates to a `*_values` counterpart
    // operating on bare `u16`s. The scheduler uses the `*_values` forms
    // directly: a reservation station's operands are values captured at
    // issue or forwarded off the CDB, never a live register re-read, so
    // dispatch must compute from those captured values rather than from
    // `self.registers` (which may since have been renamed to a new
    // producer).

    pub fn load(&self, base: RegId, offset: i32) -> u16 {
        self.load_at(self.read_register(base), offset)
    }

    pub fn store(&mut self, base: RegId, offset: i32, value: u16) {
        self.store_at(self.read_register(base), offset, value);
    }

    pub fn load_at(&self, base_value: u16, offset: i32) -> u16 {
        self.read_memory(Self::effective_address(base_value, offset))
    }

    pub fn store_at(&mut self, base_value: u16, offset: i32, value: u16) {
        self.write_memory(Self::effective_address(base_value, offset), value);
    }

    pub fn add(&self, a: RegId, b: RegId) -> u16 {
        Self::add_values(self.read_register(a), self.read_register(b))
    }

    pub fn sub(&self, a: RegId, b: RegId) -> u16 {
        Self::sub_values(self.read_register(a), self.read_register(b))
    }

    pub fn mul(&self, a: RegId, b: RegId) -> u16 {
        Self::mul_values(self.read_register(a), self.read_register(b))
    }

    pub fn nor(&self, a: RegId, b: RegId) -> u16 {
        Self::nor_values(self.read_register(a), self.read_register(b))
    }

    pub fn add_values(a: u16, b: u16) -> u16 {
        ((a as u32 + b as u32) & WORD_MASK) as u16
    }

    pub fn sub_values(a: u16, b: u16) -> u16 {
        (a as u32).wrapping_sub(b as u32) as u16
    }

    pub fn mul_values(a: u16, b: u16) -> u16 {
        ((a as u32 * b as u32) & WORD_MASK) as u16
    }

    pub fn nor_values(a: u16, b: u16) -> u16 {
        (!(a | b)) & (WORD_MASK as u16)
    }

    /// Returns true iff the branch is taken (rA == rB). The caller is
    /// responsible for comparing this against the prediction and updating
    /// the PC (§4.2 step 3 and §4.4).
    pub fn beq_taken(&self, a: RegId, b: RegId) -> bool {
        Self::beq_taken_values(self.read_register(a), self.read_register(b))
    }

    pub fn beq_taken_values(a: u16, b: u16) -> bool {
        a == b
    }

    /// Applies the PC update for a resolved BEQ: `pc + 1 + offset` if taken,
    /// `pc + 1` otherwise. `at_pc` is the BEQ's own address.
    pub fn beq_resolve_pc(&mut self, at_pc: u16, offset: i32, taken: bool) {
        self.pc = if taken {
            ((at_pc as i32) + 1 + offset) as u16
        } else {
            at_pc.wrapping_add(1)
        };
    }

    /// `R1 <- pc + 1; pc <- labels[label]`. An unresolved label leaves R1
    /// untouched and advances the PC by one (§7: unknown label on CALL
    /// advances PC by 1; treated as not-taken when resolving a branch).
    pub fn call(&mut self, at_pc: u16, label: &str) -> bool {
        match self.label(label) {
            Some(target) => {
                self.write_register(1, at_pc.wrapping_add(1));
                self.pc = target;
                true
            },
            None => {
                self.pc = at_pc.wrapping_add(1);
                false
            },
        }
    }

    /// `pc <- R1`.
    pub fn ret(&mut self) {
        self.pc = self.read_register(1);
    }

    fn effective_address(base: u16, offset: i32) -> u16 {
        ((base as i32 + offset) & (WORD_MASK as i32)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r0_reads_as_zero_and_ignores_writes() {
        let mut s = ArchitecturalState::new();
        s.write_register(R0, 42);
        assert_eq!(s.read_register(R0), 0);
    }

    #[test]
    fn arithmetic_wraps_at_16_bits() {
        let mut s = ArchitecturalState::new();
        s.write_register(1, 0xFFFF);
        s.write_register(2, 2);
        assert_eq!(s.add(1, 2), 1);
    }

    #[test]
    fn sub_wraps_on_underflow() {
        let mut s = ArchitecturalState::new();
        s.write_register(1, 0);
        s.write_register(2, 1);
        assert_eq!(s.sub(1, 2), 0xFFFF);
    }

    #[test]
    fn nor_matches_bitwise_definition() {
        let mut s = ArchitecturalState::new();
        s.write_register(1, 0b1010);
        s.write_register(2, 0b0101);
        assert_eq!(s.nor(1, 2), !(0b1010u16 | 0b0101u16));
    }

    #[test]
    fn load_store_round_trip_through_effective_address() {
        let mut s = ArchitecturalState::new();
        s.write_register(1, 0x00AB);
        s.store(0, 4, 0x00AB);
        assert_eq!(s.load(0, 4), 0x00AB);
    }

    #[test]
    fn call_to_unknown_label_advances_pc_and_does_not_taken() {
        let mut s = ArchitecturalState::new();
        s.set_pc(10);
        let taken = s.call(10, "missing");
        assert!(!taken);
        assert_eq!(s.pc(), 11);
    }

    #[test]
    fn call_then_ret_round_trips() {
        let mut labels = HashMap::new();
        labels.insert("fn1".to_string(), 20);
        let mut s = ArchitecturalState::with_labels(labels);
        s.set_pc(5);
        assert!(s.call(5, "fn1"));
        assert_eq!(s.read_register(1), 6);
        assert_eq!(s.pc(), 20);
        s.ret();
        assert_eq!(s.pc(), 6);
    }
}
