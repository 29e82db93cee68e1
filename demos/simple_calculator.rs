// simple_calculator.rs
//
// Runs all four ALU opcodes (ADD, SUB, MUL, NOR) against the same pair
// of operands and stores each result to its own memory cell — a
// showcase program rather than a single computation, exercising four
// independent functional-unit classes that the scheduler is free to
// run concurrently.

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn main() {
    println!("=== Tomasulo Simple Calculator Example ===\n");

    let (x, y) = (15u16, 4u16);
    let mut arch = ArchitecturalState::new();
    arch.write_memory(0, x);
    arch.write_memory(1, y);

    println!("x = {x}, y = {y}\n");

    let program = vec![
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 0 }, 0), // r1 = x
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 1 }, 1), // r2 = y
        Instruction::new(Op::Add { dest: 3, a: 1, b: 2 }, 2),          // r3 = x + y
        Instruction::new(Op::Sub { dest: 4, a: 1, b: 2 }, 3),          // r4 = x - y
        Instruction::new(Op::Mul { dest: 5, a: 1, b: 2 }, 4),          // r5 = x * y
        Instruction::new(Op::Nor { dest: 6, a: 1, b: 2 }, 5),          // r6 = x NOR y
        Instruction::new(Op::Store { src: 3, base: 0, offset: 10 }, 6),
        Instruction::new(Op::Store { src: 4, base: 0, offset: 11 }, 7),
        Instruction::new(Op::Store { src: 5, base: 0, offset: 12 }, 8),
        Instruction::new(Op::Store { src: 6, base: 0, offset: 13 }, 9),
    ];

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let sum = scheduler.arch().read_memory(10);
    let diff = scheduler.arch().read_memory(11);
    let product = scheduler.arch().read_memory(12);
    let nor = scheduler.arch().read_memory(13);

    println!("x + y    = {sum} (expected {})", x.wrapping_add(y));
    println!("x - y    = {diff} (expected {})", x.wrapping_sub(y));
    println!("x * y    = {product} (expected {})", x.wrapping_mul(y));
    println!("x NOR y  = {nor} (expected {})", !(x | y));
    println!("Cycles taken: {}", report.stats.total_cycles);
}
