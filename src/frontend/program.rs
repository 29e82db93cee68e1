// program.rs
//
// Text-mode assembler front end for the program grammar of §6: lines are
// either a bare `LABEL:` or one of the nine instructions. This module is a
// client of the core, not a collaborator it reaches into (SPEC_FULL §1/§2
// expansion) — it only ever produces `Instruction`/`Op` values and a label
// table, handed to `Scheduler::issue`/`run_program` by the caller.

use std::collections::HashMap;

use crate::core::instruction::{Instruction, Op, RegId};
use crate::errors::{Diagnostic, Diagnostics};

const MIN_OFFSET: i32 = -16;
const MAX_OFFSET: i32 = 15;

/// Parses the program-text grammar of §6, resolving labels to
/// `base_address + instruction_index_at_definition` in a first pass
/// (mirroring `original_source/backend.py`'s two-pass `main`), then
/// decoding each remaining line into an `Instruction` in a second pass.
/// Malformed lines are skipped and recorded as a `Diagnostic`; they never
/// abort the parse (§7).
pub fn parse_program(
    text: &str,
    base_address: u16,
    diagnostics: &mut dyn Diagnostics,
) -> (Vec<Instruction>, HashMap<String, u16>) {
    let mut labels = HashMap::new();
    let mut executable_lines = Vec::new();

    for raw_line in text.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = line.strip_suffix(':') {
            labels.insert(label.trim().to_string(), base_address.wrapping_add(executable_lines.len() as u16));
        } else {
            executable_lines.push(line.to_string());
        }
    }

    let mut program = Vec::with_capacity(executable_lines.len());
    for (index, line) in executable_lines.iter().enumerate() {
        let pc = base_address.wrapping_add(index as u16);
        if let Some(op) = parse_instruction_line(line, diagnostics) {
            program.push(Instruction::new(op, pc));
        }
    }

    (program, labels)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_instruction_line(line: &str, diagnostics: &mut dyn Diagnostics) -> Option<Op> {
    let parts: Vec<&str> = line.replace(',', " ").split_whitespace().map(|s| s.to_owned()).collect::<Vec<_>>();
    let parts: Vec<&str> = parts.iter().map(|s| s.as_str()).collect();
    let (opcode, rest) = parts.split_first()?;
    let opcode = opcode.to_uppercase();

    match opcode.as_str() {
        "LOAD" | "STORE" => parse_load_store(&opcode, rest, line, diagnostics),
        "BEQ" => parse_beq(rest, line, diagnostics),
        "CALL" => parse_call(rest, line, diagnostics),
        "RET" => {
            if rest.is_empty() {
                Some(Op::Ret)
            } else {
                diagnostics.record(Diagnostic::ParseError(format!("RET takes no operands: '{line}'")));
                None
            }
        },
        "ADD" | "SUB" | "NOR" | "MUL" => parse_arith(&opcode, rest, line, diagnostics),
        _ => {
            diagnostics.record(Diagnostic::ParseError(format!("unrecognized instruction: '{line}'")));
            None
        },
    }
}

fn parse_load_store(opcode: &str, rest: &[&str], line: &str, diagnostics: &mut dyn Diagnostics) -> Option<Op> {
    if rest.len() != 2 {
        diagnostics.record(Diagnostic::ParseError(format!("{opcode} missing operands: '{line}'")));
        return None;
    }
    let data_reg = parse_register(rest[0], diagnostics)?;
    let (offset, base_reg) = parse_offset_base(rest[1], diagnostics)?;
    if !(MIN_OFFSET..=MAX_OFFSET).contains(&offset) {
        diagnostics.record(Diagnostic::OffsetOutOfRange { offset });
        return None;
    }
    if opcode == "STORE" {
        Some(Op::Store { src: data_reg, base: base_reg, offset })
    } else {
        Some(Op::Load { dest: data_reg, base: base_reg, offset })
    }
}

fn parse_beq(rest: &[&str], line: &str, diagnostics: &mut dyn Diagnostics) -> Option<Op> {
    if rest.len() != 3 {
        diagnostics.record(Diagnostic::ParseError(format!("BEQ missing operands: '{line}'")));
        return None;
    }
    let a = parse_register(rest[0], diagnostics)?;
    let b = parse_register(rest[1], diagnostics)?;
    let offset = parse_immediate(rest[2], diagnostics)?;
    Some(Op::Beq { a, b, offset })
}

fn parse_call(rest: &[&str], line: &str, diagnostics: &mut dyn Diagnostics) -> Option<Op> {
    if rest.len() != 1 {
        diagnostics.record(Diagnostic::ParseError(format!("CALL missing a label: '{line}'")));
        return None;
    }
    Some(Op::Call { label: rest[0].to_string() })
}

fn parse_arith(opcode: &str, rest: &[&str], line: &str, diagnostics: &mut dyn Diagnostics) -> Option<Op> {
    if rest.len() != 3 {
        diagnostics.record(Diagnostic::ParseError(format!("{opcode} missing operands: '{line}'")));
        return None;
    }
    let dest = parse_register(rest[0], diagnostics)?;
    let a = parse_register(rest[1], diagnostics)?;
    let b = parse_register(rest[2], diagnostics)?;
    match opcode {
        "ADD" => Some(Op::Add { dest, a, b }),
        "SUB" => Some(Op::Sub { dest, a, b }),
        "NOR" => Some(Op::Nor { dest, a, b }),
        "MUL" => Some(Op::Mul { dest, a, b }),
        _ => unreachable!("caller only dispatches the four arithmetic opcodes"),
    }
}

/// `r0`..`r7`, case-insensitive.
fn parse_register(token: &str, diagnostics: &mut dyn Diagnostics) -> Option<RegId> {
    let t = token.trim();
    if let Some(digits) = t.strip_prefix(['r', 'R']) {
        if let Ok(n) = digits.parse::<u32>() {
            if n < 8 {
                return Some(n as RegId);
            }
        }
    }
    diagnostics.record(Diagnostic::ParseError(format!("invalid register: '{token}'")));
    None
}

/// Integer literal; `0x` hex accepted via Rust's radix-prefixed parsing.
fn parse_immediate(token: &str, diagnostics: &mut dyn Diagnostics) -> Option<i32> {
    let t = token.trim();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i32::from_str_radix(hex, 16).ok()
    } else {
        digits.parse::<i32>().ok()
    };
    match parsed {
        Some(value) => Some(if negative { -value } else { value }),
        None => {
            diagnostics.record(Diagnostic::ParseError(format!("invalid immediate: '{token}'")));
            None
        },
    }
}

/// Splits `offset(rB)` notation into its two parts.
fn parse_offset_base(token: &str, diagnostics: &mut dyn Diagnostics) -> Option<(i32, RegId)> {
    let open = token.find('(')?;
    if !token.ends_with(')') {
        diagnostics.record(Diagnostic::ParseError(format!("invalid offset notation: '{token}'")));
        return None;
    }
    let offset_str = &token[..open];
    let base_str = &token[open + 1..token.len() - 1];
    let offset = parse_immediate(offset_str, diagnostics)?;
    let base = parse_register(base_str, diagnostics)?;
    Some((offset, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DiagnosticLog;

    fn parse(text: &str) -> (Vec<Instruction>, HashMap<String, u16>, DiagnosticLog) {
        let mut log = DiagnosticLog::default();
        let (program, labels) = parse_program(text, 0, &mut log);
        (program, labels, log)
    }

    #[test]
    fn parses_every_opcode_shape() {
        let text = "LOAD r1, 4(r0)\nSTORE r1, -3(r2)\nADD r1, r2, r3\nSUB r1, r2, r3\n\
                    MUL r1, r2, r3\nNOR r1, r2, r3\nBEQ r1, r2, -2\nCALL loop\nRET\n";
        let (program, _, log) = parse(text);
        assert!(log.0.is_empty());
        assert_eq!(program.len(), 9);
        assert_eq!(program[0].op, Op::Load { dest: 1, base: 0, offset: 4 });
        assert_eq!(program[1].op, Op::Store { src: 1, base: 2, offset: -3 });
        assert_eq!(program[6].op, Op::Beq { a: 1, b: 2, offset: -2 });
        assert_eq!(program[7].op, Op::Call { label: "loop".to_string() });
        assert_eq!(program[8].op, Op::Ret);
    }

    #[test]
    fn labels_map_to_base_address_plus_instruction_index() {
        let text = "ADD r1, r0, r0\nloop:\nADD r2, r0, r0\nBEQ r1, r2, -1\n";
        let (program, labels, log) = parse(text);
        assert!(log.0.is_empty());
        assert_eq!(labels.get("loop"), Some(&1));
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn comments_are_stripped_and_blank_lines_skipped() {
        let text = "# a full-line comment\nADD r1, r0, r0  # trailing comment\n\n";
        let (program, _, log) = parse(text);
        assert!(log.0.is_empty());
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn offsets_outside_the_declared_range_are_skipped_and_reported() {
        let (program, _, log) = parse("LOAD r1, 16(r0)\n");
        assert!(program.is_empty());
        assert_eq!(log.0.len(), 1);
        assert!(matches!(log.0[0], Diagnostic::OffsetOutOfRange { offset: 16 }));
    }

    #[test]
    fn bad_register_name_is_skipped_and_reported() {
        let (program, _, log) = parse("ADD r9, r0, r0\n");
        assert!(program.is_empty());
        assert_eq!(log.0.len(), 1);
        assert!(matches!(log.0[0], Diagnostic::ParseError(_)));
    }

    #[test]
    fn hex_immediates_are_accepted() {
        let (program, _, log) = parse("BEQ r0, r0, 0xa\n");
        assert!(log.0.is_empty());
        assert_eq!(program[0].op, Op::Beq { a: 0, b: 0, offset: 10 });
    }

    #[test]
    fn malformed_line_is_skipped_without_aborting_the_rest_of_the_parse() {
        let (program, _, log) = parse("GARBLE r1, r2\nADD r1, r0, r0\n");
        assert_eq!(program.len(), 1);
        assert_eq!(log.0.len(), 1);
    }
}
