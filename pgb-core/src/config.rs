use pgb_proc_macros::{EnumAll, EnumDisplay, EnumFromStr, StrSerde};
use std::fmt::Formatter;

// 0/0/0 = black and 255/255/255 = white, so linearly map [0,3] to [255,0]
const GRAYSCALE: [[u8; 3]; 4] = [[255, 255, 255], [170, 170, 170], [85, 85, 85], [0, 0, 0]];

const GREEN_TINT: [[u8; 3]; 4] = [
    [0xAE, 0xD2, 0x8D],
    [0x75, 0x9C, 0x68],
    [0x40, 0x5E, 0x2D],
    [0x0C, 0x1E, 0x09],
];

const LIME_GREEN: [[u8; 3]; 4] = [
    [0x80, 0xA6, 0x08],
    [0x5D, 0x7F, 0x07],
    [0x25, 0x5C, 0x1A],
    [0x00, 0x32, 0x00],
];

const VIOLET: [[u8; 3]; 4] = [
    [0xDE, 0xC6, 0x9C],
    [0xA5, 0x5A, 0xFF],
    [0x94, 0x29, 0x94],
    [0x00, 0x39, 0x73],
];

/// How presentation consumers should turn 2-bit shades into RGB.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumDisplay, EnumFromStr, EnumAll, StrSerde,
)]
pub enum ColorScheme {
    #[default]
    GreenTint,
    Grayscale,
    LimeGreen,
    Violet,
}

impl ColorScheme {
    /// Map a shade (0 = lightest, 3 = darkest) to an RGB triple. Only the low 2 bits are used.
    pub fn rgb(self, shade: u8) -> [u8; 3] {
        let table = match self {
            Self::GreenTint => &GREEN_TINT,
            Self::Grayscale => &GRAYSCALE,
            Self::LimeGreen => &LIME_GREEN,
            Self::Violet => &VIOLET,
        };
        table[usize::from(shade & 0x03)]
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    /// Boot ROM image to overlay at $0000 until the program unmaps it. When absent, the system
    /// starts in the state the boot ROM would have left it in.
    pub boot_rom: Option<Vec<u8>>,
    pub color_scheme: ColorScheme,
}

impl std::fmt::Display for CoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.boot_rom {
            Some(boot_rom) => writeln!(f, "boot_rom: {} bytes", boot_rom.len())?,
            None => writeln!(f, "boot_rom: <None>")?,
        }
        writeln!(f, "color_scheme: {}", self.color_scheme)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_scheme_strings() {
        for color_scheme in ColorScheme::ALL {
            assert_eq!(Ok(color_scheme), color_scheme.to_string().parse());
        }

        assert_eq!(Ok(ColorScheme::GreenTint), "green-tint".parse());
        assert_eq!(Ok(ColorScheme::LimeGreen), "LIME_GREEN".parse());
        assert_eq!(Ok(ColorScheme::Violet), "violet".parse());
        assert!("sepia".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn shades_to_rgb() {
        assert_eq!([255, 255, 255], ColorScheme::Grayscale.rgb(0));
        assert_eq!([0, 0, 0], ColorScheme::Grayscale.rgb(3));
        assert_eq!([0x0C, 0x1E, 0x09], ColorScheme::default().rgb(3));
        assert_eq!([0xA5, 0x5A, 0xFF], ColorScheme::Violet.rgb(1));
        assert_eq!([0x00, 0x39, 0x73], ColorScheme::Violet.rgb(0x07));
    }
}
