// bubble_sort.rs
//
// Demonstrates the compare-and-exchange step a bubble sort pass is
// built from, via a CALL'd subroutine — but honestly: this ISA has
// BEQ (equality only) and no less-than comparison, so it cannot
// express "swap only if out of order". What it *can* express is "skip
// the swap when the pair is already equal, otherwise exchange them",
// which this program does, exercising CALL/RET and a predicted branch
// together rather than a full sorting network.

use std::collections::HashMap;

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

const SWAP_LABEL_PC: u16 = 10;

fn main() {
    println!("=== Tomasulo Compare-and-Exchange Example ===\n");

    let pair = [9u16, 3u16];
    let mut arch = ArchitecturalState::new();
    arch.write_memory(0, pair[0]);
    arch.write_memory(1, pair[1]);
    let mut labels = HashMap::new();
    labels.insert("swap".to_string(), SWAP_LABEL_PC);
    arch.set_labels(labels);

    println!("Pair before: {pair:?}");

    let program = vec![
        Instruction::new(Op::Load { dest: 3, base: 0, offset: 0 }, 0),
        Instruction::new(Op::Load { dest: 4, base: 0, offset: 1 }, 1),
        Instruction::new(Op::Beq { a: 3, b: 4, offset: 1 }, 2), // already equal: skip the CALL
        Instruction::new(Op::Call { label: "swap".to_string() }, 3),
        Instruction::new(Op::Store { src: 3, base: 0, offset: 10 }, 4),
        Instruction::new(Op::Store { src: 4, base: 0, offset: 11 }, 5),
        // -- swap subroutine --
        Instruction::new(Op::Add { dest: 5, a: 3, b: 0 }, SWAP_LABEL_PC),
        Instruction::new(Op::Add { dest: 3, a: 4, b: 0 }, SWAP_LABEL_PC + 1),
        Instruction::new(Op::Add { dest: 4, a: 5, b: 0 }, SWAP_LABEL_PC + 2),
        Instruction::new(Op::Ret, SWAP_LABEL_PC + 3),
    ];

    let mut scheduler = Scheduler::new(SchedulerConfig::new(), arch);
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler
        .run_program(&program, 0, &mut diagnostics)
        .expect("start pc 0 is in range");

    let result = [scheduler.arch().read_memory(10), scheduler.arch().read_memory(11)];
    println!("Pair after:  {result:?}");
    println!("Cycles taken: {}", report.stats.total_cycles);

    if result == [pair[1], pair[0]] {
        println!("\n✓ Pair exchanged via the CALL'd subroutine.");
    } else {
        println!("\n✗ Unexpected result: {result:?}");
    }
}
