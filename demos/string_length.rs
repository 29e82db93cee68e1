// string_length.rs
//
// Counts the non-zero cells preceding the first zero in a fixed-size
// buffer — this ISA's only usable stand-in for a null-terminated
// string scan, since LOAD/STORE addressing is a static offset from r0
// rather than an indexed pointer. Each character position is guarded
// by a forward BEQ that skips the increment when the cell is zero;
// BEQ with a non-negative offset is predicted not-taken (§9), so the
// first zero cell in the buffer triggers a genuine misprediction and
// flush, which this demo's cycle count makes visible.

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

const BUFFER_LEN: u16 = 8;

fn main() {
    println!("=== Tomasulo String Length Example ===\n");

    let buffer: [u16; BUFFER_LEN as usize] = [b'h', b'e', b'l', b'l', b'o', 0, 0, 0].map(|b| b as u16);
    let mut arch = ArchitecturalState::new();
    for (i, &value) in buffer.iter().enumerate() {
        arch.write_memory(i as u16, value);
    }
    arch.write_memory(BUFFER_LEN, 1); // constant 1, for the increment

    println!("Buffer: {buffer:?}");
    let expected = buffer.iter().take_while(|&&c| c != 0).count() as u16;
    println!("Expected length: {expected}\n");

    let mut program = vec![
        Instruction::new(Op::Add { dest: 7, a: 0, b: 0 }, 0),                     // r7 = 0 (count)
        Instruction::new(Op::Load { dest: 6, base: 0, offset: BUFFER_LEN as i32 }, 1), // r6 = 1
    ];
    let mut pc = 2u16;
    for offset in 0..BUFFER_LEN as i32 {
        program.push(Instruction::new(Op::Load { dest: 1, base: 0, offset }, pc));
        program.push(Instruction::new(Op::Beq { a: 1, b: 0, offset: 1 }, pc + 1)); // skip the increment on a zero cell
        program.push(Instruction::new(Op::Add { dest: 7, a: 7, b: 6 }, pc + 2));
        pc += 3;
    }
    program.push(Instruction::new(Op::Store { src: 7, base: 0, offset: 15 }, pc));

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let result = scheduler.arch().read_memory(15);
    println!("Computed length: {result}");
    println!("Cycles taken: {}", report.stats.total_cycles);
    println!("Mispredictions: {}", report.stats.mispredictions);

    if result == expected {
        println!("\n✓ String length matches.");
    } else {
        println!("\n✗ Mismatch: expected {expected}, got {result}");
    }
}
