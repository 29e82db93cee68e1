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

// main.rs
//
// Command-line front end for the Tomasulo core. Loads a program file (and
// an optional memory image), runs the scheduler to completion or a
// `--max-cycles` bound, then prints the instruction timeline and run
// statistics (§6 "scheduler output").

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use tomasulo_core::core::config::FunctionalUnitConfig;
use tomasulo_core::core::instruction::FunctionalUnitClass;
use tomasulo_core::core::scheduler::SchedulerSnapshot;
use tomasulo_core::frontend::{parse_memory, parse_program};
use tomasulo_core::utils::logger::{LogLevel, Logger, LoggerDiagnostics};
use tomasulo_core::{ArchitecturalState, Scheduler, SchedulerConfig, TimelineRecord};

#[derive(Parser)]
#[command(name = "tomasulo-sim")]
#[command(about = "Cycle-accurate Tomasulo out-of-order execution simulator")]
#[command(version)]
struct Cli {
    /// Assembly program file (label/instruction grammar, see README)
    #[arg(short, long)]
    program: PathBuf,

    /// Optional memory image file (`<address> <value>` lines)
    #[arg(short, long)]
    memory: Option<PathBuf>,

    /// Starting program counter
    #[arg(long, default_value_t = 0)]
    start_pc: u16,

    /// Safety-valve cycle bound
    #[arg(long, default_value_t = 100_000)]
    max_cycles: u64,

    /// Functional-unit override, repeatable: `--fu mul=8:1` sets MUL to
    /// latency 8 with 1 station. Recognized classes: load, store,
    /// add_sub, mul, nor, beq, call_ret.
    #[arg(long = "fu", value_name = "CLASS=LATENCY:STATIONS")]
    fu_overrides: Vec<String>,

    /// Log level for diagnostics (error, warn, info, debug)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log file; logs to stdout when omitted
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug)]
struct CliError(String);

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for CliError {}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = parse_log_level(&cli.log_level);
    let log_file = cli.log_file.as_ref().map(|p| p.to_string_lossy().into_owned());
    let mut logger = Logger::new(log_file.as_deref(), level)?;
    let mut diagnostics = LoggerDiagnostics::new(&mut logger);

    let program_text = fs::read_to_string(&cli.program)?;
    let memory_text = match &cli.memory {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };

    let mut config = SchedulerConfig::new().with_max_cycles(cli.max_cycles);
    for raw in &cli.fu_overrides {
        let (class, unit) = parse_fu_override(raw)?;
        config = config.with_unit(class, unit);
    }

    let (program, labels) = parse_program(&program_text, 0, &mut diagnostics);
    let memory_image = parse_memory(&memory_text, &mut diagnostics);

    let mut arch = ArchitecturalState::with_labels(labels);
    arch.set_memory_image(memory_image);
    arch.set_pc(cli.start_pc);

    let mut scheduler = Scheduler::new(config, arch);
    let report = scheduler.run_program(&program, cli.start_pc, &mut diagnostics)?;

    print_timeline(&report.timeline);
    println!();
    print_registers(&report.final_snapshot);
    println!();
    println!("{}", report.stats);

    Ok(())
}

fn parse_log_level(raw: &str) -> LogLevel {
    match raw.to_lowercase().as_str() {
        "error" => LogLevel::Error,
        "warn" | "warning" => LogLevel::Warning,
        "info" => LogLevel::Info,
        "debug" => LogLevel::Debug,
        _ => LogLevel::Warning,
    }
}

/// Parses `CLASS=LATENCY:STATIONS`, e.g. `mul=8:1`.
fn parse_fu_override(raw: &str) -> Result<(FunctionalUnitClass, FunctionalUnitConfig), CliError> {
    let (class_str, rest) =
        raw.split_once('=').ok_or_else(|| CliError(format!("malformed --fu override: '{raw}'")))?;
    let (latency_str, stations_str) =
        rest.split_once(':').ok_or_else(|| CliError(format!("malformed --fu override: '{raw}'")))?;
    let class = match class_str.to_lowercase().as_str() {
        "load" => FunctionalUnitClass::Load,
        "store" => FunctionalUnitClass::Store,
        "add_sub" | "addsub" => FunctionalUnitClass::AddSub,
        "mul" => FunctionalUnitClass::Mul,
        "nor" => FunctionalUnitClass::Nor,
        "beq" => FunctionalUnitClass::Beq,
        "call_ret" | "callret" => FunctionalUnitClass::CallRet,
        other => return Err(CliError(format!("unrecognized functional-unit class: '{other}'"))),
    };
    let latency: u32 =
        latency_str.parse().map_err(|_| CliError(format!("invalid latency in --fu override: '{raw}'")))?;
    let stations: usize =
        stations_str.parse().map_err(|_| CliError(format!("invalid station count in --fu override: '{raw}'")))?;
    Ok((class, FunctionalUnitConfig::new(latency, stations)))
}

fn print_timeline(timeline: &[TimelineRecord]) {
    println!("{}", "Timeline".bold());
    println!("{:<4} {:<22} {:>6} {:>6} {:>6} {:>6}", "#", "instruction", "issue", "start", "end", "write");
    for (index, record) in timeline.iter().enumerate() {
        let row = format!(
            "{:<4} {:<22} {:>6} {:>6} {:>6} {:>6}",
            index,
            record.display_string,
            record.issue_cycle,
            format_cycle(record.exec_start),
            format_cycle(record.exec_end),
            format_cycle(record.write_cycle),
        );
        if record.flushed {
            println!("{}", format!("{row}  (flushed)").dimmed());
        } else {
            println!("{row}");
        }
    }
}

fn format_cycle(cycle: Option<u64>) -> String {
    cycle.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_registers(snapshot: &SchedulerSnapshot) {
    println!("{}", "Final registers".bold());
    for (i, value) in snapshot.registers.iter().enumerate() {
        print!("r{i}: {value}\t");
        if i % 4 == 3 {
            println!();
        }
    }
    println!("pc: {}", snapshot.pc);
}
