// matrix_multiply.rs
//
// Multiplies two 2x2 matrices. Each output cell is computed and stored
// before the next cell's loads reuse r1-r4, the same register-reuse
// pattern as the dot product demo.

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn main() {
    println!("=== Tomasulo 2x2 Matrix Multiply Example ===\n");

    // A = [[1, 2], [3, 4]], B = [[5, 6], [7, 8]]
    let a = [1u16, 2, 3, 4];
    let b = [5u16, 6, 7, 8];
    let mut arch = ArchitecturalState::new();
    for (i, &value) in a.iter().enumerate() {
        arch.write_memory(i as u16, value);
    }
    for (i, &value) in b.iter().enumerate() {
        arch.write_memory(4 + i as u16, value);
    }

    println!("A = {:?}", [[a[0], a[1]], [a[2], a[3]]]);
    println!("B = {:?}\n", [[b[0], b[1]], [b[2], b[3]]]);

    let program = vec![
        // c00 = a00*b00 + a01*b10
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 0 }, 0),
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 1 }, 1),
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 4 }, 2),
        Instruction::new(Op::Load { dest: 4, base: 0, offset: 6 }, 3),
        Instruction::new(Op::Mul { dest: 5, a: 1, b: 3 }, 4),
        Instruction::new(Op::Mul { dest: 6, a: 2, b: 4 }, 5),
        Instruction::new(Op::Add { dest: 7, a: 5, b: 6 }, 6),
        Instruction::new(Op::Store { src: 7, base: 0, offset: 10 }, 7),
        // c01 = a00*b01 + a01*b11
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 5 }, 8),
        Instruction::new(Op::Load { dest: 4, base: 0, offset: 7 }, 9),
        Instruction::new(Op::Mul { dest: 5, a: 1, b: 3 }, 10),
        Instruction::new(Op::Mul { dest: 6, a: 2, b: 4 }, 11),
        Instruction::new(Op::Add { dest: 7, a: 5, b: 6 }, 12),
        Instruction::new(Op::Store { src: 7, base: 0, offset: 11 }, 13),
        // c10 = a10*b00 + a11*b10
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 2 }, 14),
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 3 }, 15),
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 4 }, 16),
        Instruction::new(Op::Load { dest: 4, base: 0, offset: 6 }, 17),
        Instruction::new(Op::Mul { dest: 5, a: 1, b: 3 }, 18),
        Instruction::new(Op::Mul { dest: 6, a: 2, b: 4 }, 19),
        Instruction::new(Op::Add { dest: 7, a: 5, b: 6 }, 20),
        Instruction::new(Op::Store { src: 7, base: 0, offset: 12 }, 21),
        // c11 = a10*b01 + a11*b11
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 5 }, 22),
        Instruction::new(Op::Load { dest: 4, base: 0, offset: 7 }, 23),
        Instruction::new(Op::Mul { dest: 5, a: 1, b: 3 }, 24),
        Instruction::new(Op::Mul { dest: 6, a: 2, b: 4 }, 25),
        Instruction::new(Op::Add { dest: 7, a: 5, b: 6 }, 26),
        Instruction::new(Op::Store { src: 7, base: 0, offset: 13 }, 27),
    ];

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let c = [
        scheduler.arch().read_memory(10),
        scheduler.arch().read_memory(11),
        scheduler.arch().read_memory(12),
        scheduler.arch().read_memory(13),
    ];
    println!("C = {:?}", [[c[0], c[1]], [c[2], c[3]]]);
    println!("Cycles taken: {}", report.stats.total_cycles);

    let expected = [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
    ];
    if c == expected {
        println!("\n✓ Matrix product matches.");
    } else {
        println!("\n✗ Mismatch: expected {expected:?}, got {c:?}");
    }
}
