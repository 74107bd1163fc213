//! RGB frames and the binary PPM (P6) format they are saved in.
//!
//! Layout: row-major, 3 bytes per pixel, no padding.
//! PPM header: `P6 <width> <height> 255` separated by whitespace, `#` comments
//! allowed between fields, exactly one whitespace byte before the pixels.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

pub type Rgb = [u8; 3];

pub const GREEN: Rgb = [0, 255, 0];

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// A frame filled with one colour.
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            pixels.extend_from_slice(&fill);
        }
        Self { width, height, pixels }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height * 3 {
            return Err(AgentError::Frame(format!(
                "{}x{} frame needs {} bytes, got {}",
                width,
                height,
                width * height * 3,
                pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at (x, y). Panics if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Set a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 3;
            self.pixels[i..i + 3].copy_from_slice(&color);
        }
    }

    /// Fill a rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        for yy in y..(y + h).min(self.height) {
            for xx in x..(x + w).min(self.width) {
                self.set(xx, yy, color);
            }
        }
    }

    /// Copy `other` onto this frame with its top-left corner at (x, y).
    pub fn blit(&mut self, other: &Frame, x: usize, y: usize) {
        for yy in 0..other.height {
            for xx in 0..other.width {
                self.set(x + xx, y + yy, other.get(xx, yy));
            }
        }
    }

    /// Sub-image covering `region`. The region must lie inside the frame.
    pub fn crop(&self, region: Region) -> Result<Frame> {
        if region.x + region.width > self.width || region.y + region.height > self.height {
            return Err(AgentError::Frame(format!(
                "region {:?} exceeds {}x{} frame",
                region, self.width, self.height
            )));
        }
        let mut pixels = Vec::with_capacity(region.width * region.height * 3);
        for y in region.y..region.y + region.height {
            let start = (y * self.width + region.x) * 3;
            pixels.extend_from_slice(&self.pixels[start..start + region.width * 3]);
        }
        Ok(Frame {
            width: region.width,
            height: region.height,
            pixels,
        })
    }

    /// Outline a rectangle whose outer edge spans (x, y) to (x + w, y + h).
    /// Thickness grows inward. Parts outside the frame are clipped.
    pub fn draw_rectangle(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb, thickness: usize) {
        let t = thickness.min(w.div_ceil(2)).min(h.div_ceil(2));
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, (y + h).saturating_sub(t), w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect((x + w).saturating_sub(t), y, t, h, color);
    }

    pub fn write_ppm<W: Write>(&self, w: &mut W) -> Result<()> {
        write!(w, "P6\n{} {}\n255\n", self.width, self.height)?;
        w.write_all(&self.pixels)?;
        Ok(())
    }

    pub fn read_ppm<R: Read>(r: &mut R) -> Result<Frame> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        let mut header = PpmHeader { bytes: &bytes, pos: 0 };

        if header.token()? != "P6" {
            return Err(AgentError::Frame("not a binary PPM (expected P6)".into()));
        }
        let width = header.number()?;
        let height = header.number()?;
        let max = header.number()?;
        if max != 255 {
            return Err(AgentError::Frame(format!("unsupported max value {}", max)));
        }
        // Single whitespace byte ends the header
        let start = header.pos + 1;
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| AgentError::Frame(format!("image size {}x{} is too large", width, height)))?;
        let end = start.checked_add(len).filter(|&end| end <= bytes.len()).ok_or_else(|| {
            AgentError::Frame(format!(
                "truncated pixel data: need {} bytes, have {}",
                len,
                bytes.len().saturating_sub(start)
            ))
        })?;
        Frame::from_pixels(width, height, bytes[start..end].to_vec())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Frame> {
        let mut r = BufReader::new(File::open(path)?);
        Frame::read_ppm(&mut r)
    }
}

/// Cursor over the ASCII part of a PPM file.
struct PpmHeader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl PpmHeader<'_> {
    fn token(&mut self) -> Result<String> {
        loop {
            match self.bytes.get(self.pos) {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'#') => {
                    while self.bytes.get(self.pos).is_some_and(|&b| b != b'\n') {
                        self.pos += 1;
                    }
                }
                Some(_) => break,
                None => return Err(AgentError::Frame("unexpected end of header".into())),
            }
        }
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|b| !b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn number(&mut self) -> Result<usize> {
        let tok = self.token()?;
        tok.parse()
            .map_err(|_| AgentError::Frame(format!("bad header field {:?}", tok)))
    }
}
