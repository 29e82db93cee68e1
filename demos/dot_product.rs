// dot_product.rs
//
// Computes the dot product of two length-3 vectors. Each MUL/ADD pair
// reuses r1..r4, so the scheduler has to rename r1-r4 across iterations
// via the register status table rather than serializing on the
// architectural register names — a small, concrete demonstration of
// why Tomasulo renaming exists.

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn main() {
    println!("=== Tomasulo Dot Product Example ===\n");

    let a = [2u16, 3, 4];
    let b = [5u16, 6, 7];
    let mut arch = ArchitecturalState::new();
    for (i, &value) in a.iter().enumerate() {
        arch.write_memory(i as u16, value);
    }
    for (i, &value) in b.iter().enumerate() {
        arch.write_memory(3 + i as u16, value);
    }

    println!("a = {a:?}");
    println!("b = {b:?}");
    let expected: u32 = a.iter().zip(b.iter()).map(|(&x, &y)| x as u32 * y as u32).sum();
    println!("Expected dot product: {expected}\n");

    let program = vec![
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 0 }, 0),  // r1 = a[0]
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 3 }, 1),  // r2 = b[0]
        Instruction::new(Op::Mul { dest: 3, a: 1, b: 2 }, 2),           // r3 = a[0]*b[0]
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 1 }, 3),  // r1 = a[1]
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 4 }, 4),  // r2 = b[1]
        Instruction::new(Op::Mul { dest: 4, a: 1, b: 2 }, 5),           // r4 = a[1]*b[1]
        Instruction::new(Op::Add { dest: 3, a: 3, b: 4 }, 6),           // r3 += r4
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 2 }, 7),  // r1 = a[2]
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 5 }, 8),  // r2 = b[2]
        Instruction::new(Op::Mul { dest: 4, a: 1, b: 2 }, 9),           // r4 = a[2]*b[2]
        Instruction::new(Op::Add { dest: 3, a: 3, b: 4 }, 10),          // r3 += r4
        Instruction::new(Op::Store { src: 3, base: 0, offset: 10 }, 11),
    ];

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let result = scheduler.arch().read_memory(10);
    println!("Computed dot product: {result}");
    println!("Cycles taken: {}", report.stats.total_cycles);

    if result as u32 == expected {
        println!("\n✓ Dot product matches.");
    } else {
        println!("\n✗ Mismatch: expected {expected}, got {result}");
    }
}
