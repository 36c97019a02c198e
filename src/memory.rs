use std::io;

use crate::error::{Error, Fault};
use crate::font;

// NB. the chip-8 talks in u16 addresses, but `I` plus an offset can run past
//     0xffff, so everything in here is usize and checked against RAM size

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// the largest program image that fits between PROGRAM_ADDR and top of RAM
pub const MAX_PROGRAM_BYTES: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

/// Represents the VM's view of memory. Every access is bounds checked; a
/// program touching memory it shouldn't is a fault, not a panic.
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: usize, len: usize) -> Result<&[u8], Fault>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Result<&mut [u8], Fault>;

    fn read_byte(&self, addr: usize) -> Result<u8, Fault> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn write_byte(&mut self, addr: usize, val: u8) -> Result<(), Fault> {
        self.get_rw_slice(addr, 1)?[0] = val;
        Ok(())
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: usize) -> Result<u16, Fault> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: usize) -> Result<(), Fault> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }
}

/// Defines the CHIP-8 memory map as this interpreter lays it out:
///   0x0000-0x004f  unused, reserved
///   0x0050-0x009f  hex digit font
///   0x00a0-0x01ff  unused, reserved
///   0x0200-0x0fff  program
///
/// stack, registers and display are kept outside of addressable memory.
/// programs may read anywhere but only write from PROGRAM_ADDR upwards.
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_ro_slice(&self, addr: usize, len: usize) -> Result<&[u8], Fault> {
        check_range(addr, len)?;
        Ok(&self.bytes[addr..addr + len])
    }

    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Result<&mut [u8], Fault> {
        check_range(addr, len)?;
        if addr < PROGRAM_ADDR as usize && len > 0 {
            return Err(Fault::ReservedWrite { addr });
        }
        Ok(&mut self.bytes[addr..addr + len])
    }
}

fn check_range(addr: usize, len: usize) -> Result<(), Fault> {
    match addr.checked_add(len) {
        Some(end) if end <= RAM_SIZE_BYTES => Ok(()),
        // report the first byte that doesn't exist
        _ => Err(Fault::AddressOutOfRange {
            addr: addr.max(RAM_SIZE_BYTES),
        }),
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; RAM_SIZE_BYTES].into_boxed_slice();
        font::install(&mut bytes);
        Chip8MemoryMap { bytes }
    }

    /// build memory for a program read from `reader`; if the program can't
    /// be read or doesn't fit there is no memory image and so no VM
    pub fn with_program(reader: &mut impl io::Read) -> Result<Self, Error> {
        let mut mm = Chip8MemoryMap::new();
        mm.load_program(reader)?;
        Ok(mm)
    }

    /// load a CHIP-8 program at 0x200, returning its length
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Error> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        if len > MAX_PROGRAM_BYTES {
            return Err(Error::ProgramTooLarge {
                size: len,
                max: MAX_PROGRAM_BYTES,
            });
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + len].copy_from_slice(&buf);
        log::info!("loaded {} byte program at {:#05x}", len, start);
        Ok(len)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Chip8MemoryMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
    }

    #[test]
    fn test_font_present() -> Result<(), Fault> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0x50, 5)?, &font::FONT[..5]);
        assert_eq!(m.get_ro_slice(0x50, 80)?, &font::FONT[..]);
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), Fault> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308)?;
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), Fault> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200)?;
        assert_eq!(m.get_word(0x204)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_past_end_faults() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_word(0xfff), Err(Fault::AddressOutOfRange { addr: 0x1000 }));
        assert_eq!(
            m.get_ro_slice(0x1234, 1),
            Err(Fault::AddressOutOfRange { addr: 0x1234 })
        );
        assert!(m.get_ro_slice(0xff0, 16).is_ok());
    }

    #[test]
    fn test_write_too_much_faults() {
        let mut dst = Chip8MemoryMap::new();
        assert_eq!(
            dst.write(&[0; 8], 4089),
            Err(Fault::AddressOutOfRange { addr: 0x1000 })
        );
        // nothing was written
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_write_into_font_faults() {
        let mut dst = Chip8MemoryMap::new();
        assert_eq!(
            dst.write_byte(0x52, 0xff),
            Err(Fault::ReservedWrite { addr: 0x52 })
        );
        assert_eq!(
            dst.write(&[1, 2, 3], 0x1ff),
            Err(Fault::ReservedWrite { addr: 0x1ff })
        );
        assert_eq!(dst.bytes[0x52], 0x90);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2).unwrap(), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_largest_program_fits() -> Result<(), Error> {
        let prog = vec![0xaa; MAX_PROGRAM_BYTES];
        let m = Chip8MemoryMap::with_program(&mut prog.as_slice())?;
        assert_eq!(MAX_PROGRAM_BYTES, 3584);
        assert_eq!(m.read_byte(0xfff).unwrap(), 0xaa);
        Ok(())
    }

    #[test]
    fn test_oversized_program_rejected() {
        let prog = vec![0xaa; MAX_PROGRAM_BYTES + 1];
        match Chip8MemoryMap::with_program(&mut prog.as_slice()) {
            Err(Error::ProgramTooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            Err(e) => panic!("wrong error: {}", e),
            Ok(_) => panic!("3585 byte program should not load"),
        }
    }

    #[test]
    fn test_unreadable_program_rejected() {
        struct Broken;
        impl io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        assert!(matches!(
            Chip8MemoryMap::with_program(&mut Broken),
            Err(Error::Io(_))
        ));
    }
}
