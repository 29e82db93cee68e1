// tick_bench.rs
//
// Benchmarks a dependency-chain program through the scheduler's tick
// loop: build a small fixed program, run it end to end inside
// `Criterion::iter`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tomasulo_core::core::instruction::Op;
use tomasulo_core::errors::DiagnosticLog;
use tomasulo_core::{ArchitecturalState, Instruction, Scheduler, SchedulerConfig};

fn dependency_chain_program(length: u16) -> Vec<Instruction> {
    let mut program = Vec::with_capacity(length as usize);
    program.push(Instruction::new(Op::Add { dest: 1, a: 0, b: 0 }, 0));
    for pc in 1..length {
        let prev = ((pc - 1) % 7) + 1;
        let dest = (pc % 7) + 1;
        program.push(Instruction::new(Op::Add { dest, a: prev, b: 0 }, pc));
    }
    program
}

fn run_program(length: u16) {
    let program = dependency_chain_program(length);
    let mut scheduler = Scheduler::new(SchedulerConfig::new(), ArchitecturalState::new());
    let mut diagnostics = DiagnosticLog::default();
    let report = scheduler.run_program(&program, 0, &mut diagnostics).expect("valid start pc");
    black_box(report);
}

fn scheduler_benchmark(c: &mut Criterion) {
    c.bench_function("dependency_chain_64_instructions", |b| {
        b.iter(|| run_program(black_box(64)));
    });
    c.bench_function("dependency_chain_512_instructions", |b| {
        b.iter(|| run_program(black_box(512)));
    });
}

criterion_group!(benches, scheduler_benchmark);
criterion_main!(benches);
