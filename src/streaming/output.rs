//! Buffered row output.
//!
//! Integers go through itoa. Fixed one-decimal values take a fast path when
//! they are exact multiples of 0.5, which is every value the coverage stage
//! can produce.

use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;

pub struct RowWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> RowWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    #[inline]
    pub fn write_tab(&mut self) -> Result<()> {
        self.write_bytes(b"\t")
    }

    #[inline]
    pub fn write_newline(&mut self) -> Result<()> {
        self.write_bytes(b"\n")
    }

    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<()> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())?;
        Ok(())
    }

    /// Write a float with exactly one decimal place (`%.1f`).
    #[inline]
    pub fn write_fixed1(&mut self, f: f64) -> Result<()> {
        let twice = f * 2.0;
        if f >= 0.0 && twice.fract() == 0.0 && twice < (u64::MAX / 2) as f64 {
            let halves = twice as u64;
            self.write_int(halves / 2)?;
            return self.write_bytes(if halves % 2 == 0 { b".0" } else { b".5" });
        }
        write!(self.writer, "{:.1}", f)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut RowWriter<&mut Vec<u8>>)) -> String {
        let mut output = Vec::new();
        {
            let mut writer = RowWriter::new(&mut output);
            f(&mut writer);
            writer.flush().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_write_fixed1_half_steps() {
        let out = render(|w| {
            for v in [0.0, 0.5, 1.0, 217.5, 3.5] {
                w.write_fixed1(v).unwrap();
                w.write_tab().unwrap();
            }
        });
        assert_eq!(out, "0.0\t0.5\t1.0\t217.5\t3.5\t");
    }

    #[test]
    fn test_write_fixed1_general_values() {
        let out = render(|w| {
            w.write_fixed1(0.25 + 0.01).unwrap();
            w.write_tab().unwrap();
            w.write_fixed1(-1.5).unwrap();
        });
        assert_eq!(out, "0.3\t-1.5");
    }

    #[test]
    fn test_write_int_row() {
        let out = render(|w| {
            w.write_int(34u64).unwrap();
            w.write_bytes(b" ").unwrap();
            w.write_int(2u64).unwrap();
            w.write_newline().unwrap();
        });
        assert_eq!(out, "34 2\n");
    }
}
