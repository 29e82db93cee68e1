// fibonacci.rs
//
// Computes F(10) by unrolling the classic three-variable iteration
// (next = a + b; a = b; b = next) entirely at issue time, since this
// ISA has no loop-control instruction cheap enough for a runtime loop
// over ten steps. "a = b" is expressed as `ADD a, b, r0`, the usual
// move-via-add idiom on a register file with no dedicated MOV.

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn main() {
    println!("=== Tomasulo Fibonacci Example ===\n");

    let n = 10;
    println!("Calculating F({n}) via unrolled iteration");

    let mut arch = ArchitecturalState::new();
    arch.write_memory(0, 0); // F(0)
    arch.write_memory(1, 1); // F(1)

    // r1 = F(i-2), r2 = F(i-1), r3 = F(i); each step: r3 = r1+r2, then
    // shift r1 <- r2, r2 <- r3 via ADD-with-r0 moves.
    let mut program = vec![
        Instruction::new(Op::Load { dest: 1, base: 0, offset: 0 }, 0),
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 1 }, 1),
    ];
    let mut pc = 2u16;
    for _ in 2..=n {
        program.push(Instruction::new(Op::Add { dest: 3, a: 1, b: 2 }, pc));
        program.push(Instruction::new(Op::Add { dest: 1, a: 2, b: 0 }, pc + 1));
        program.push(Instruction::new(Op::Add { dest: 2, a: 3, b: 0 }, pc + 2));
        pc += 3;
    }
    program.push(Instruction::new(Op::Store { src: 2, base: 0, offset: 10 }, pc));

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let result = scheduler.arch().read_memory(10);
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 2..=n {
        let next = a + b;
        a = b;
        b = next;
    }
    let expected = if n == 0 { 0 } else { b };

    println!("\nFibonacci F({n}) = {result}");
    println!("Expected result: {expected}");
    println!("Cycles taken: {}", report.stats.total_cycles);

    if result as u32 == expected {
        println!("\n✓ Fibonacci calculation matches.");
    } else {
        println!("\n✗ Mismatch: expected {expected}, got {result}");
    }
}
