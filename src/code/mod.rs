use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;

/// One opcode of the stack machine. Encoded as a single byte, followed by
/// its operands in big endian order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// push constants[operand]
    Constant = 0,
    /// drop the top of the stack
    Pop,
    Add,
    Sub,
    Mul,
    Div,
    Minus,
    Bang,
    True,
    False,
    Null,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// unconditional jump to an absolute offset
    Jump,
    /// pop; jump when the popped value is not truthy
    JumpNotTruthy,
    /// store the top of the stack into globals[operand]
    SetGlobal,
    /// push globals[operand]
    GetGlobal,
}

/// Printable name and operand byte widths of an opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: Vec<usize>,
}

static DEFINITIONS: Lazy<HashMap<Opcode, Definition>> = Lazy::new(|| {
    let mut m = HashMap::new();

    let mut define = |opcode: Opcode, name: &'static str, operand_widths: Vec<usize>| {
        m.insert(
            opcode,
            Definition {
                name,
                operand_widths,
            },
        );
    };

    define(Opcode::Constant, "OpConstant", vec![2]);
    define(Opcode::Pop, "OpPop", vec![]);
    define(Opcode::Add, "OpAdd", vec![]);
    define(Opcode::Sub, "OpSub", vec![]);
    define(Opcode::Mul, "OpMul", vec![]);
    define(Opcode::Div, "OpDiv", vec![]);
    define(Opcode::Minus, "OpMinus", vec![]);
    define(Opcode::Bang, "OpBang", vec![]);
    define(Opcode::True, "OpTrue", vec![]);
    define(Opcode::False, "OpFalse", vec![]);
    define(Opcode::Null, "OpNull", vec![]);
    define(Opcode::Equal, "OpEqual", vec![]);
    define(Opcode::NotEqual, "OpNotEqual", vec![]);
    define(Opcode::GreaterThan, "OpGT", vec![]);
    define(Opcode::GreaterThanOrEqual, "OpGTE", vec![]);
    define(Opcode::Jump, "OpJump", vec![2]);
    define(Opcode::JumpNotTruthy, "OpJumpNotTruthy", vec![2]);
    define(Opcode::SetGlobal, "OpSetGlobal", vec![2]);
    define(Opcode::GetGlobal, "OpGetGlobal", vec![2]);

    m
});

impl TryFrom<u8> for Opcode {
    type Error = String;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        let opcode = match byte {
            0 => Opcode::Constant,
            1 => Opcode::Pop,
            2 => Opcode::Add,
            3 => Opcode::Sub,
            4 => Opcode::Mul,
            5 => Opcode::Div,
            6 => Opcode::Minus,
            7 => Opcode::Bang,
            8 => Opcode::True,
            9 => Opcode::False,
            10 => Opcode::Null,
            11 => Opcode::Equal,
            12 => Opcode::NotEqual,
            13 => Opcode::GreaterThan,
            14 => Opcode::GreaterThanOrEqual,
            15 => Opcode::Jump,
            16 => Opcode::JumpNotTruthy,
            17 => Opcode::SetGlobal,
            18 => Opcode::GetGlobal,
            other => return Err(format!("opcode {other} undefined")),
        };
        Ok(opcode)
    }
}

/// Look an opcode definition up by its encoded byte.
pub fn lookup(byte: u8) -> Result<&'static Definition, String> {
    let opcode = Opcode::try_from(byte)?;
    DEFINITIONS
        .get(&opcode)
        .ok_or_else(|| format!("opcode {byte} undefined"))
}

/// Assemble a single instruction from an opcode and its operands.
pub fn make(opcode: Opcode, operands: &[usize]) -> Vec<u8> {
    let Some(definition) = DEFINITIONS.get(&opcode) else {
        return vec![];
    };

    let mut instruction = vec![opcode as u8];
    for (operand, width) in operands.iter().zip(&definition.operand_widths) {
        match width {
            2 => instruction.extend((*operand as u16).to_be_bytes()),
            _ => unreachable!(),
        }
    }
    instruction
}

/// Decode the operands of an instruction (without its opcode byte).
/// Returns the operands and the number of bytes read.
pub fn read_operands(definition: &Definition, instructions: &[u8]) -> (Vec<usize>, usize) {
    let mut operands = Vec::with_capacity(definition.operand_widths.len());
    let mut offset = 0;
    for width in &definition.operand_widths {
        match width {
            2 => operands.push(read_u16(&instructions[offset..]) as usize),
            _ => unreachable!(),
        }
        offset += width;
    }
    (operands, offset)
}

pub fn read_u16(instructions: &[u8]) -> u16 {
    u16::from_be_bytes([instructions[0], instructions[1]])
}

/// A buffer of encoded instructions. Its `Display` implementation is the
/// disassembler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instructions(pub Vec<u8>);

impl Instructions {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut i = 0;
        while i < self.0.len() {
            let definition = match lookup(self.0[i]) {
                Ok(definition) => definition,
                Err(err) => {
                    writeln!(f, "ERROR: {err}")?;
                    i += 1;
                    continue;
                }
            };
            let (operands, read) = read_operands(definition, &self.0[i + 1..]);
            writeln!(f, "{i:04} {}", fmt_instruction(definition, &operands))?;
            i += 1 + read;
        }
        Ok(())
    }
}

fn fmt_instruction(definition: &Definition, operands: &[usize]) -> String {
    let operand_count = definition.operand_widths.len();
    if operand_count != operands.len() {
        return format!(
            "ERROR: operand read length {} does not match defined {}",
            operands.len(),
            operand_count
        );
    }
    match operand_count {
        0 => definition.name.to_owned(),
        1 => format!("{} {}", definition.name, operands[0]),
        _ => format!("ERROR: unhandled operand count for {}", definition.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make() {
        let tests: &[(Opcode, &[usize], &[u8])] = &[
            (Opcode::Constant, &[65534], &[0, 255, 254]),
            (Opcode::Add, &[], &[Opcode::Add as u8]),
            (Opcode::Jump, &[7], &[Opcode::Jump as u8, 0, 7]),
        ];
        for (opcode, operands, expected) in tests {
            assert_eq!(*expected, make(*opcode, operands).as_slice());
        }
    }

    #[test]
    fn test_read_operands() {
        let tests: &[(Opcode, &[usize], usize)] = &[
            (Opcode::Constant, &[65535], 2),
            (Opcode::SetGlobal, &[1], 2),
        ];
        for (opcode, operands, bytes_read) in tests {
            let instruction = make(*opcode, operands);
            let definition = lookup(*opcode as u8).expect("definition should exist");
            let (operands_read, read) = read_operands(definition, &instruction[1..]);
            assert_eq!(*bytes_read, read);
            assert_eq!(*operands, operands_read.as_slice());
        }
    }

    #[test]
    fn test_lookup_undefined_opcode() {
        assert_eq!(Err("opcode 255 undefined".to_string()), Opcode::try_from(255).map(|_| ()));
    }

    #[test]
    fn test_disassemble() {
        let mut concatted = vec![];
        for instruction in [
            make(Opcode::Constant, &[1]),
            make(Opcode::Constant, &[2]),
            make(Opcode::Constant, &[65535]),
            make(Opcode::Add, &[]),
        ] {
            concatted.extend(instruction);
        }

        let expected = "0000 OpConstant 1\n0003 OpConstant 2\n0006 OpConstant 65535\n0009 OpAdd\n";
        assert_eq!(expected, Instructions(concatted).to_string());
    }
}
