//! Renders a layout to an RGBA image so it can be eyeballed.

use std::io::Write;

use binpack::Rect;

use crate::layout::Layout;

const STRIDE: usize = 4;

const BACKGROUND: Pixel = Pixel::new(32, 32, 32, 255);

/// Previews of larger bins are scaled down until their longest side fits.
const MAX_SIDE: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Picks a bright color for the `index`th rectangle. Neighbouring indices
    /// get clearly different hues.
    fn for_index(index: usize) -> Self {
        // Golden ratio steps spread hues evenly around the wheel.
        let hue = (index as f64 * 0.618_033_988_75).fract() * 6.0;
        let sector = hue.floor() as u32;
        let rising = (hue.fract() * 200.0) as u8 + 55;
        let falling = 255 - (hue.fract() * 200.0) as u8;

        match sector {
            0 => Pixel::new(255, rising, 55, 255),
            1 => Pixel::new(falling, 255, 55, 255),
            2 => Pixel::new(55, 255, rising, 255),
            3 => Pixel::new(55, falling, 255, 255),
            4 => Pixel::new(rising, 55, 255, 255),
            _ => Pixel::new(255, 55, falling, 255),
        }
    }

    fn darken(self) -> Self {
        Pixel::new(self.r / 2, self.g / 2, self.b / 2, self.a)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Image {
    size: (u32, u32),
    data: Vec<u8>,
}

impl Image {
    pub fn new_filled(size: (u32, u32), pixel: Pixel) -> Self {
        let pixels = size.0 as usize * size.1 as usize;
        let mut data = Vec::with_capacity(pixels * STRIDE);

        for _ in 0..pixels {
            data.extend_from_slice(&[pixel.r, pixel.g, pixel.b, pixel.a]);
        }

        Self { size, data }
    }

    /// Draws every placed rectangle of `layout` as a filled box with a darker
    /// outline. Bins with a side longer than `MAX_SIDE` are drawn scaled down.
    pub fn render(layout: &Layout) -> Self {
        let scale = div_ceil(layout.width.max(layout.height), MAX_SIDE).max(1);
        let size = (div_ceil(layout.width, scale), div_ceil(layout.height, scale));

        if scale > 1 {
            log::info!(
                "Drawing the {}x{} preview at 1/{} scale",
                layout.width,
                layout.height,
                scale
            );
        }

        let mut image = Self::new_filled(size, BACKGROUND);

        for (index, placed) in layout.rects.iter().enumerate() {
            let fill = Pixel::for_index(index);
            let rect = scale_rect(placed.rect(), scale);
            image.fill_rect(rect, fill.darken());

            if rect.width > 2 && rect.height > 2 {
                let inner = Rect::new(rect.x + 1, rect.y + 1, rect.width - 2, rect.height - 2);
                image.fill_rect(inner, fill);
            }
        }

        image
    }

    pub fn encode_png<W: Write>(&self, output: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(output, self.size.0, self.size.1);
        encoder.set_color(png::ColorType::RGBA);
        encoder.set_depth(png::BitDepth::Eight);

        let mut output_writer = encoder.write_header()?;
        output_writer.write_image_data(&self.data)?;

        // On drop, output_writer will write the last chunk of the PNG file.
        Ok(())
    }

    /// Fills the part of `rect` that lies inside the image.
    pub fn fill_rect(&mut self, rect: Rect, pixel: Pixel) {
        let right = rect.right().min(self.size.0);
        let bottom = rect.bottom().min(self.size.1);

        for y in rect.y..bottom {
            for x in rect.x..right {
                self.set_pixel((x, y), pixel);
            }
        }
    }

    #[cfg(test)]
    pub fn get_pixel(&self, pos: (u32, u32)) -> Pixel {
        let start = self.offset(pos);

        Pixel {
            r: self.data[start],
            g: self.data[start + 1],
            b: self.data[start + 2],
            a: self.data[start + 3],
        }
    }

    pub fn set_pixel(&mut self, pos: (u32, u32), pixel: Pixel) {
        let start = self.offset(pos);

        self.data[start] = pixel.r;
        self.data[start + 1] = pixel.g;
        self.data[start + 2] = pixel.b;
        self.data[start + 3] = pixel.a;
    }

    fn offset(&self, pos: (u32, u32)) -> usize {
        assert!(pos.0 < self.size.0);
        assert!(pos.1 < self.size.1);

        STRIDE * (pos.0 as usize + pos.1 as usize * self.size.0 as usize)
    }
}

fn div_ceil(value: u32, divisor: u32) -> u32 {
    ((u64::from(value) + u64::from(divisor) - 1) / u64::from(divisor)) as u32
}

/// Shrinks `rect` by `scale`, keeping at least one pixel of it.
fn scale_rect(rect: Rect, scale: u32) -> Rect {
    let (x, y) = (rect.x / scale, rect.y / scale);
    let right = div_ceil(rect.right(), scale);
    let bottom = div_ceil(rect.bottom(), scale);

    Rect::new(x, y, right - x, bottom - y)
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::layout::PlacedRect;

    #[test]
    fn set_pixel() {
        let mut image = Image::new_filled((3, 3), Pixel::new(0, 0, 0, 0));

        image.set_pixel((0, 0), Pixel::new(1, 2, 3, 4));
        assert_eq!(image.get_pixel((0, 0)), Pixel::new(1, 2, 3, 4));

        image.set_pixel((2, 2), Pixel::new(5, 6, 7, 8));
        assert_eq!(image.get_pixel((2, 2)), Pixel::new(5, 6, 7, 8));

        assert_eq!(&image.data[0..4], &[1, 2, 3, 4]);
        assert_eq!(&image.data[(image.data.len() - 4)..], &[5, 6, 7, 8]);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut image = Image::new_filled((4, 4), BACKGROUND);
        let red = Pixel::new(255, 0, 0, 255);

        image.fill_rect(Rect::new(2, 2, 10, 10), red);

        assert_eq!(image.get_pixel((1, 1)), BACKGROUND);
        assert_eq!(image.get_pixel((2, 2)), red);
        assert_eq!(image.get_pixel((3, 3)), red);
    }

    #[test]
    fn render_layout() {
        let layout = Layout {
            width: 8,
            height: 4,
            algorithm: "shelf".to_owned(),
            occupancy: 0.5,
            rects: vec![PlacedRect {
                name: "box".to_owned(),
                x: 0,
                y: 0,
                width: 4,
                height: 4,
                rotated: false,
            }],
            unplaced: Vec::new(),
        };

        let image = Image::render(&layout);
        let fill = Pixel::for_index(0);

        assert_eq!(image.size, (8, 4));
        assert_eq!(image.get_pixel((0, 0)), fill.darken());
        assert_eq!(image.get_pixel((1, 1)), fill);
        assert_eq!(image.get_pixel((5, 1)), BACKGROUND);
    }

    #[test]
    fn huge_layouts_are_scaled_down() {
        let layout = Layout {
            width: 524_288,
            height: 524_288,
            algorithm: "shelf".to_owned(),
            occupancy: 0.0,
            rects: vec![PlacedRect {
                name: "strip".to_owned(),
                x: 0,
                y: 0,
                width: 300_000,
                height: 1,
                rotated: false,
            }],
            unplaced: Vec::new(),
        };

        let image = Image::render(&layout);
        let outline = Pixel::for_index(0).darken();

        assert_eq!(image.size, (4096, 4096));
        assert_eq!(image.get_pixel((0, 0)), outline);
        assert_eq!(image.get_pixel((2343, 0)), outline);
        assert_eq!(image.get_pixel((2344, 0)), BACKGROUND);
        assert_eq!(image.get_pixel((0, 1)), BACKGROUND);
    }

    #[test]
    fn scaled_rects_keep_a_pixel() {
        assert_eq!(scale_rect(Rect::new(5, 5, 1, 1), 4), Rect::new(1, 1, 1, 1));
        assert_eq!(scale_rect(Rect::new(0, 8, 8, 4), 4), Rect::new(0, 2, 2, 1));
        assert_eq!(scale_rect(Rect::new(3, 3, 4, 4), 1), Rect::new(3, 3, 4, 4));
    }

    #[test]
    fn distinct_neighbour_colors() {
        for index in 0..32 {
            assert_ne!(Pixel::for_index(index), Pixel::for_index(index + 1));
        }
    }

    #[test]
    fn encodes_png() {
        let image = Image::new_filled((2, 2), BACKGROUND);

        let mut output = Vec::new();
        image.encode_png(&mut output).unwrap();

        assert_eq!(&output[..8], b"\x89PNG\r\n\x1a\n");
    }
}
