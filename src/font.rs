/// where the hex digit glyphs live; anywhere below the program works as
/// long as `Fx29` agrees
pub const FONT_ADDR: u16 = 0x050;

/// every glyph is 4 pixels wide (high nibble) and 5 rows tall
pub const GLYPH_BYTES: u16 = 5;

pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// copy the glyphs into a freshly zeroed memory image
pub fn install(ram: &mut [u8]) {
    let base = FONT_ADDR as usize;
    ram[base..base + FONT.len()].copy_from_slice(&FONT);
}

/// address of the glyph for `digit`
pub fn glyph_addr(digit: u8) -> u16 {
    FONT_ADDR + digit as u16 * GLYPH_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_only_touches_font_area() {
        let mut ram = [0u8; 0x200];
        install(&mut ram);
        assert_eq!(ram[..0x50], [0; 0x50]);
        assert_eq!(ram[0x50..0x55], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(ram[0x9b..0xa0], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert_eq!(ram[0xa0..], [0; 0x160]);
    }

    #[test]
    fn test_glyph_addr() {
        assert_eq!(glyph_addr(0), 0x050);
        assert_eq!(glyph_addr(0xA), 0x082);
        assert_eq!(glyph_addr(0xF), 0x09b);
    }
}
