// factorial.rs
//
// Computes 5! = 120 through a chain of MULs, each one RAW-dependent on
// the accumulator register r6 from the one before it. Driven by a
// hand-built instruction stream, since this ISA has no
// branch-and-decrement construct cheap enough to express a real loop
// over such a short sequence.

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn main() {
    println!("=== Tomasulo Factorial Example ===\n");

    let mut arch = ArchitecturalState::new();
    arch.write_memory(0, 1);
    arch.write_memory(1, 2);
    arch.write_memory(2, 3);
    arch.write_memory(3, 4);
    arch.write_memory(4, 5);

    println!("Computing 5! = 1 * 2 * 3 * 4 * 5\n");

    let program = vec![
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 0 }, 0), // r1 = 1
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 1 }, 1), // r2 = 2
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 2 }, 2), // r3 = 3
        Instruction::new(Op::Load { dest: 4, base: 0, offset: 3 }, 3), // r4 = 4
        Instruction::new(Op::Load { dest: 5, base: 0, offset: 4 }, 4), // r5 = 5
        Instruction::new(Op::Mul { dest: 6, a: 1, b: 2 }, 5),          // r6 = 1*2
        Instruction::new(Op::Mul { dest: 6, a: 6, b: 3 }, 6),          // r6 *= 3
        Instruction::new(Op::Mul { dest: 6, a: 6, b: 4 }, 7),          // r6 *= 4
        Instruction::new(Op::Mul { dest: 6, a: 6, b: 5 }, 8),          // r6 *= 5
        Instruction::new(Op::Store { src: 6, base: 0, offset: 10 }, 9),
    ];

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let result = scheduler.arch().read_memory(10);
    println!("Computed 5! = {result}");
    println!("Cycles taken: {}", report.stats.total_cycles);

    if result == 120 {
        println!("\n✓ Factorial matches.");
    } else {
        println!("\n✗ Mismatch: expected 120, got {result}");
    }
}
