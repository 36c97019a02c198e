use std::fmt;

use crate::error::Fault;

/// A decoded instruction. Operands are already pulled out of the word:
/// `x`/`y` register indices, `kk` an immediate byte, `nnn` a 12 bit address
/// and `n` a 4 bit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipEqByte(u8, u8),
    /// 4xkk
    SkipNeByte(u8, u8),
    /// 5xy0
    SkipEqReg(u8, u8),
    /// 9xy0
    SkipNeReg(u8, u8),
    /// 6xkk
    LoadByte(u8, u8),
    /// 7xkk, no carry
    AddByte(u8, u8),

    /// 8xy0
    Move(u8, u8),
    /// 8xy1
    Or(u8, u8),
    /// 8xy2
    And(u8, u8),
    /// 8xy3
    Xor(u8, u8),
    /// 8xy4, VF = carry
    Add(u8, u8),
    /// 8xy5, Vx - Vy, VF = not borrow
    Sub(u8, u8),
    /// 8xy6, VF = lsb
    ShiftRight(u8),
    /// 8xy7, Vy - Vx, VF = not borrow
    SubReverse(u8, u8),
    /// 8xyE, VF = msb
    ShiftLeft(u8),

    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxkk
    Random(u8, u8),
    /// Dxyn: XOR an n row sprite from I onto the screen at (Vx, Vy);
    /// VF set if anything was erased
    Draw(u8, u8, u8),

    /// Ex9E
    SkipKeyDown(u8),
    /// ExA1
    SkipKeyUp(u8),

    /// Fx07
    ReadDelay(u8),
    /// Fx0A
    WaitKey(u8),
    /// Fx15
    SetDelay(u8),
    /// Fx18
    SetSound(u8),
    /// Fx1E
    AddIndex(u8),
    /// Fx29
    Glyph(u8),
    /// Fx33
    Bcd(u8),
    /// Fx55
    StoreRegs(u8),
    /// Fx65
    LoadRegs(u8),
}

impl Instruction {
    /// Split the word into nibbles and pick the instruction. Never touches
    /// machine state; words that don't encode anything are reported back so
    /// the caller can decide what to do about them.
    pub fn decode(word: u16) -> Result<Self, Fault> {
        let [hi, lo] = word.to_be_bytes();
        let (op, x, y, n) = (hi >> 4, hi & 0x0F, lo >> 4, lo & 0x0F);
        let kk = lo;
        let nnn = word & 0x0FFF;

        let ins = match op {
            0x0 => match word {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::Return,
                // 0nnn machine code routines don't exist here
                _ => return Err(Fault::UnknownInstruction { word }),
            },
            0x1 => Self::Jump(nnn),
            0x2 => Self::Call(nnn),
            0x3 => Self::SkipEqByte(x, kk),
            0x4 => Self::SkipNeByte(x, kk),
            0x5 if n == 0 => Self::SkipEqReg(x, y),
            0x6 => Self::LoadByte(x, kk),
            0x7 => Self::AddByte(x, kk),
            0x8 => match n {
                0x0 => Self::Move(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::Xor(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::Sub(x, y),
                0x6 => Self::ShiftRight(x),
                0x7 => Self::SubReverse(x, y),
                0xE => Self::ShiftLeft(x),
                _ => return Err(Fault::UnknownInstruction { word }),
            },
            0x9 if n == 0 => Self::SkipNeReg(x, y),
            0xA => Self::LoadIndex(nnn),
            0xB => Self::JumpOffset(nnn),
            0xC => Self::Random(x, kk),
            0xD => Self::Draw(x, y, n),
            0xE => match kk {
                0x9E => Self::SkipKeyDown(x),
                0xA1 => Self::SkipKeyUp(x),
                _ => return Err(Fault::UnknownInstruction { word }),
            },
            0xF => match kk {
                0x07 => Self::ReadDelay(x),
                0x0A => Self::WaitKey(x),
                0x15 => Self::SetDelay(x),
                0x18 => Self::SetSound(x),
                0x1E => Self::AddIndex(x),
                0x29 => Self::Glyph(x),
                0x33 => Self::Bcd(x),
                0x55 => Self::StoreRegs(x),
                0x65 => Self::LoadRegs(x),
                _ => return Err(Fault::UnknownInstruction { word }),
            },
            _ => return Err(Fault::UnknownInstruction { word }),
        };
        Ok(ins)
    }
}

/// conventional assembler mnemonics, for tracing
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:#05x}", nnn),
            Call(nnn) => write!(f, "CALL {:#05x}", nnn),
            SkipEqByte(x, kk) => write!(f, "SE V{:X}, {:#04x}", x, kk),
            SkipNeByte(x, kk) => write!(f, "SNE V{:X}, {:#04x}", x, kk),
            SkipEqReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            SkipNeReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadByte(x, kk) => write!(f, "LD V{:X}, {:#04x}", x, kk),
            AddByte(x, kk) => write!(f, "ADD V{:X}, {:#04x}", x, kk),
            Move(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x) => write!(f, "SHR V{:X}", x),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x) => write!(f, "SHL V{:X}", x),
            LoadIndex(nnn) => write!(f, "LD I, {:#05x}", nnn),
            JumpOffset(nnn) => write!(f, "JP V0, {:#05x}", nnn),
            Random(x, kk) => write!(f, "RND V{:X}, {:#04x}", x, kk),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyDown(x) => write!(f, "SKP V{:X}", x),
            SkipKeyUp(x) => write!(f, "SKNP V{:X}", x),
            ReadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            Glyph(x) => write!(f, "LD F, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(word: u16) -> Result<Instruction, Fault> {
        Err(Fault::UnknownInstruction { word })
    }

    #[test]
    fn test_operand_fields() {
        assert_eq!(Instruction::decode(0x1abc), Ok(Instruction::Jump(0xabc)));
        assert_eq!(Instruction::decode(0x2f00), Ok(Instruction::Call(0xf00)));
        assert_eq!(
            Instruction::decode(0x3c4e),
            Ok(Instruction::SkipEqByte(0xc, 0x4e))
        );
        assert_eq!(
            Instruction::decode(0xd12f),
            Ok(Instruction::Draw(0x1, 0x2, 0xf))
        );
        assert_eq!(
            Instruction::decode(0xc7a5),
            Ok(Instruction::Random(0x7, 0xa5))
        );
    }

    #[test]
    fn test_family_zero() {
        assert_eq!(Instruction::decode(0x00e0), Ok(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Ok(Instruction::Return));
        assert_eq!(Instruction::decode(0x0000), unknown(0x0000));
        assert_eq!(Instruction::decode(0x0123), unknown(0x0123));
    }

    #[test]
    fn test_alu_dispatch() {
        let expected = [
            (0x8ab0, Instruction::Move(0xa, 0xb)),
            (0x8ab1, Instruction::Or(0xa, 0xb)),
            (0x8ab2, Instruction::And(0xa, 0xb)),
            (0x8ab3, Instruction::Xor(0xa, 0xb)),
            (0x8ab4, Instruction::Add(0xa, 0xb)),
            (0x8ab5, Instruction::Sub(0xa, 0xb)),
            (0x8ab6, Instruction::ShiftRight(0xa)),
            (0x8ab7, Instruction::SubReverse(0xa, 0xb)),
            (0x8abe, Instruction::ShiftLeft(0xa)),
        ];
        for (word, ins) in expected {
            assert_eq!(Instruction::decode(word), Ok(ins), "{:#06x}", word);
        }
        for word in [0x8ab8, 0x8ab9, 0x8abc, 0x8abd, 0x8abf] {
            assert_eq!(Instruction::decode(word), unknown(word));
        }
    }

    #[test]
    fn test_register_compares_need_zero_low_nibble() {
        assert_eq!(
            Instruction::decode(0x5120),
            Ok(Instruction::SkipEqReg(1, 2))
        );
        assert_eq!(Instruction::decode(0x5121), unknown(0x5121));
        assert_eq!(
            Instruction::decode(0x9120),
            Ok(Instruction::SkipNeReg(1, 2))
        );
        assert_eq!(Instruction::decode(0x912f), unknown(0x912f));
    }

    #[test]
    fn test_key_and_misc_dispatch() {
        assert_eq!(Instruction::decode(0xe59e), Ok(Instruction::SkipKeyDown(5)));
        assert_eq!(Instruction::decode(0xe5a1), Ok(Instruction::SkipKeyUp(5)));
        assert_eq!(Instruction::decode(0xe5a2), unknown(0xe5a2));
        assert_eq!(Instruction::decode(0xf30a), Ok(Instruction::WaitKey(3)));
        assert_eq!(Instruction::decode(0xf333), Ok(Instruction::Bcd(3)));
        assert_eq!(Instruction::decode(0xfe55), Ok(Instruction::StoreRegs(0xe)));
        assert_eq!(Instruction::decode(0xfe65), Ok(Instruction::LoadRegs(0xe)));
        assert_eq!(Instruction::decode(0xf375), unknown(0xf375));
    }

    #[test]
    fn test_mnemonics() {
        let cases = [
            (0x00e0, "CLS"),
            (0x1228, "JP 0x228"),
            (0x632a, "LD V3, 0x2a"),
            (0x8ab7, "SUBN VA, VB"),
            (0xb300, "JP V0, 0x300"),
            (0xd015, "DRW V0, V1, 5"),
            (0xf10a, "LD V1, K"),
            (0xf865, "LD V8, [I]"),
        ];
        for (word, text) in cases {
            assert_eq!(Instruction::decode(word).unwrap().to_string(), text);
        }
    }
}
