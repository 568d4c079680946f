//! Plain-text PPM (P3) output.

use std::io::{self, Write};

use crate::Rgb;

/// Write `pixels` (row-major, top row first) as an ASCII P3 image.
pub fn write_ppm<W: Write>(mut out: W, width: u32, height: u32, pixels: &[Rgb]) -> io::Result<()> {
    writeln!(out, "P3\n{width} {height}\n255")?;
    for [r, g, b] in pixels {
        writeln!(out, "{r} {g} {b}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_layout() {
        let mut bytes = Vec::new();
        write_ppm(&mut bytes, 1, 2, &[[1, 2, 3], [40, 50, 255]]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "P3\n1 2\n255\n1 2 3\n40 50 255\n"
        );
    }
}
