//! Tests for the opcode table, program parser, decoder and code memory.

use apex_sim::common::SimError;
use apex_sim::core::pipeline::signals::AluOp;
use apex_sim::isa::parser::{parse_line, parse_program};
use apex_sim::isa::{CodeMemory, Condition, Instruction, Opcode, RawInstruction};
use pretty_assertions::assert_eq;

fn raw(text: &str) -> RawInstruction {
    parse_line(text)
        .expect("line should parse")
        .expect("line should hold an instruction")
}

fn decode(text: &str) -> Instruction {
    Instruction::decode(&raw(text), 4000).expect("instruction should decode")
}

/// Tests that every opcode survives code and mnemonic lookups.
#[test]
fn test_opcode_table_consistent() {
    for op in Opcode::ALL {
        assert_eq!(Opcode::from_code(op.code()), Some(op));
        assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        assert_eq!(
            Opcode::from_mnemonic(&op.mnemonic().to_lowercase()),
            Some(op),
            "mnemonics are case-insensitive"
        );
    }
    assert_eq!(Opcode::from_code(0xff), None);
    assert_eq!(Opcode::from_mnemonic("FOO"), None);
}

/// Tests parsing of each operand layout.
#[test]
fn test_parse_layouts() {
    let add = raw("ADD,R3,R1,R2");
    assert_eq!((add.rd, add.rs1, add.rs2), (3, 1, 2));
    assert_eq!(add.opcode, Opcode::Add.code());

    let movc = raw("MOVC,R7,#-12");
    assert_eq!((movc.rd, movc.imm), (7, -12));

    let store = raw("STORE,R1,R2,#8");
    assert_eq!((store.rs1, store.rs2, store.imm), (1, 2, 8));

    let bnz = raw("bnz #-16");
    assert_eq!(bnz.opcode, Opcode::Bnz.code());
    assert_eq!(bnz.imm, -16);

    let halt = raw("HALT");
    assert_eq!(halt.opcode, Opcode::Halt.code());
}

/// Tests that comments and blank lines are skipped.
#[test]
fn test_parse_comments() {
    let program = "\
; header comment
MOVC,R1,#5   ; trailing

// another
HALT
";
    let insns = parse_program(program).expect("program should parse");
    assert_eq!(insns.len(), 2);
    assert_eq!(insns[0].mnemonic, "MOVC");
    assert_eq!(insns[1].mnemonic, "HALT");
}

/// Tests parser diagnostics carry the offending line number.
#[test]
fn test_parse_errors() {
    let err = parse_program("MOVC,R1,#1\nFROB,R1\n").unwrap_err();
    assert!(matches!(err, SimError::Parse { line: 2, .. }), "{:?}", err);

    let err = parse_program("ADD,R1,R2\n").unwrap_err();
    assert!(matches!(err, SimError::Parse { line: 1, .. }));

    assert!(parse_line("MOVC,R32,#1").is_err(), "R32 is out of range");
    assert!(parse_line("MOVC,R1,5").is_err(), "literal needs '#'");
    assert!(parse_line("ADDL,R1,X2,#1").is_err());
}

/// Tests that branch offsets must be whole instructions.
#[test]
fn test_branch_offset_alignment() {
    assert!(parse_line("BNZ,#-8").unwrap().is_some());
    assert!(parse_line("BZ,#0").unwrap().is_some());
    for text in ["BZ,#6", "BNZ,#-2", "BP,#1", "BNN,#4003"] {
        let err = parse_line(text).unwrap_err();
        assert!(err.contains("multiple of 4"), "{}: {}", text, err);
    }

    let err = parse_program("MOVC,R1,#0\nBZ,#10\nHALT\n").unwrap_err();
    assert!(matches!(err, SimError::Parse { line: 2, .. }), "{:?}", err);
}

/// Tests decoding into instruction kinds.
#[test]
fn test_decode_kinds() {
    assert_eq!(
        decode("SUB,R1,R2,R3"),
        Instruction::Arith {
            op: AluOp::Sub,
            rd: 1,
            rs1: 2,
            rs2: 3
        }
    );
    assert_eq!(
        decode("SUBL,R1,R2,#3"),
        Instruction::ArithImm {
            op: AluOp::Sub,
            rd: 1,
            rs1: 2,
            imm: 3
        }
    );
    assert_eq!(
        decode("LOADP,R1,R2,#4"),
        Instruction::Load {
            rd: 1,
            rs1: 2,
            imm: 4,
            post_increment: true
        }
    );
    assert_eq!(
        decode("BN,#8"),
        Instruction::Branch {
            cond: Condition::Negative,
            offset: 8
        }
    );
    assert_eq!(decode("NOP"), Instruction::Nop);
}

/// Tests register read and write sets used by the hazard unit.
#[test]
fn test_register_sets() {
    let storep = decode("STOREP,R1,R2,#0");
    assert_eq!(storep.sources().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(storep.dest(), None);
    assert_eq!(storep.writes().collect::<Vec<_>>(), vec![2]);

    let loadp = decode("LOADP,R3,R4,#0");
    assert_eq!(loadp.sources().collect::<Vec<_>>(), vec![4]);
    assert_eq!(loadp.writes().collect::<Vec<_>>(), vec![3, 4]);

    let movc = decode("MOVC,R5,#1");
    assert_eq!(movc.sources().count(), 0);

    let cmp = decode("CMP,R1,R2");
    assert_eq!(cmp.writes().count(), 0);
}

/// Tests that unknown opcodes and registers are rejected at decode.
#[test]
fn test_decode_rejects_invalid() {
    let bad_opcode = RawInstruction {
        mnemonic: "???".into(),
        opcode: 0xff,
        ..Default::default()
    };
    assert_eq!(
        Instruction::decode(&bad_opcode, 4008),
        Err(SimError::InvalidOpcode {
            pc: 4008,
            opcode: 0xff
        })
    );

    let bad_reg = RawInstruction {
        mnemonic: "ADD".into(),
        opcode: Opcode::Add.code(),
        rd: 40,
        ..Default::default()
    };
    assert_eq!(
        Instruction::decode(&bad_reg, 4000),
        Err(SimError::InvalidRegister {
            pc: 4000,
            register: 40
        })
    );
}

/// Tests that formatting matches the parser's input syntax.
#[test]
fn test_disassembly() {
    for text in [
        "ADD,R1,R2,R3",
        "ADDL,R1,R2,#-4",
        "MOVC,R1,#5",
        "STOREP,R1,R2,#4",
        "CML,R3,#7",
        "BZ,#8",
        "JALR,R1,R2,#0",
        "HALT",
    ] {
        assert_eq!(decode(text).to_string(), text);
        assert_eq!(raw(text).to_string(), text);
    }
}

/// Tests code memory addressing.
#[test]
fn test_code_memory() {
    let insns = parse_program("NOP\nNOP\nHALT\n").unwrap();
    let code = CodeMemory::new(4000, insns).unwrap();
    assert_eq!(code.len(), 3);
    assert_eq!(code.last_pc(), 4008);
    assert!(code.contains(4000) && code.contains(4008));
    assert!(!code.contains(4012) && !code.contains(3996));

    assert_eq!(code.fetch(4008).unwrap().map(|r| r.opcode), Some(Opcode::Halt.code()));
    assert_eq!(code.fetch(4012).unwrap(), None, "past the end is not a fault");
    assert_eq!(code.fetch(4002), Err(SimError::MisalignedFetch { pc: 4002 }));

    assert_eq!(CodeMemory::new(4000, Vec::new()).unwrap_err(), SimError::EmptyProgram);

    let top = u32::MAX - 3;
    let two = parse_program("NOP\nHALT\n").unwrap();
    assert_eq!(
        CodeMemory::new(top, two).unwrap_err(),
        SimError::CodeRange { base: top, len: 2 }
    );
    let one = CodeMemory::new(top, parse_program("HALT\n").unwrap()).unwrap();
    assert!(one.contains(top) && !one.contains(0));
}
