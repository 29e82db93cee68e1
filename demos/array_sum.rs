// array_sum.rs
//
// Sums the array [10, 20, 30, 40, 50] through the Tomasulo core. Each
// element lives at a fixed offset from r0 (the ISA has no indexed
// addressing, so a real array walk isn't expressible; this unrolls the
// load/add chain instead), accumulating the running total into r2.
// Expected result: 10 + 20 + 30 + 40 + 50 = 150

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn main() {
    println!("=== Tomasulo Array Sum Example ===\n");

    let array = [10u16, 20, 30, 40, 50];
    let mut arch = ArchitecturalState::new();
    for (i, &value) in array.iter().enumerate() {
        arch.write_memory(i as u16, value);
    }

    println!("Array: {array:?}");
    println!("Expected sum: 10 + 20 + 30 + 40 + 50 = 150\n");

    let program = vec![
        Instruction::new(Op::Load { dest: 2, base: 0, offset: 0 }, 0), // r2 = array[0]
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 1 }, 1), // r3 = array[1]
        Instruction::new(Op::Add { dest: 2, a: 2, b: 3 }, 2),          // r2 += r3
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 2 }, 3),
        Instruction::new(Op::Add { dest: 2, a: 2, b: 3 }, 4),
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 3 }, 5),
        Instruction::new(Op::Add { dest: 2, a: 2, b: 3 }, 6),
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 4 }, 7),
        Instruction::new(Op::Add { dest: 2, a: 2, b: 3 }, 8),
        Instruction::new(Op::Store { src: 2, base: 0, offset: 10 }, 9), // memory[10] = sum
    ];

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let sum = scheduler.arch().read_memory(10);
    let expected: u16 = array.iter().sum();

    println!("Computed sum: {sum}");
    println!("Expected sum: {expected}");
    println!("Cycles taken: {}", report.stats.total_cycles);
    println!("IPC: {:.3}", report.stats.ipc());

    if sum == expected {
        println!("\n✓ Array sum matches.");
    } else {
        println!("\n✗ Mismatch: expected {expected}, got {sum}");
    }
}
