use std::{fs::File, path::Path, str::FromStr};

use anyhow::{bail, ensure, Context, Result};
use image::{codecs::png::PngEncoder, ImageEncoder};
use libplanar::{codec, export, BitMapStore};
use tracing::{debug, info, instrument};

/// A palette of 12-bit `0x0RGB` colors, given as comma separated hex values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(pub Vec<u16>);

impl FromStr for Palette {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let colors = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| {
                let digits = c
                    .strip_prefix("0x")
                    .or_else(|| c.strip_prefix("0X"))
                    .unwrap_or(c);
                let color = u16::from_str_radix(digits, 16)
                    .with_context(|| format!("invalid color {c}"))?;
                ensure!(color <= 0xFFF, "color {c} has more than 12 bits");
                Ok(color)
            })
            .collect::<Result<Vec<_>>>()?;
        if colors.is_empty() {
            bail!("palette is empty");
        }
        Ok(Self(colors))
    }
}

impl Palette {
    /// Evenly spaced greys from black to white, one per color index of `depth`
    #[must_use]
    pub fn grey_ramp(depth: u8) -> Self {
        let count = 1u32 << depth;
        let colors = (0..count)
            .map(|i| {
                let level = if count == 1 { 0 } else { (i * 15 / (count - 1)) as u16 };
                (level << 8) | (level << 4) | level
            })
            .collect();
        Self(colors)
    }
}

#[instrument]
pub fn bm_info(bm_file: &Path) -> Result<String> {
    let mut store = BitMapStore::new();
    let bitmap = store.load(bm_file)?;
    let header = codec::header_of(&bitmap);
    let dump = store.dump(&bitmap);
    let out = format!(
        "{}x{}@{}BPP, version: {}, flags: {}, layout: {}\n{dump}",
        header.width,
        header.height,
        header.depth,
        header.version,
        header.flags,
        bitmap.layout()
    );
    store.destroy(bitmap);
    Ok(out)
}

#[instrument]
pub fn bm_to_bmp(bm_file: &Path, palette: Option<Palette>, output_name: &Path) -> Result<()> {
    let mut store = BitMapStore::new();
    let bitmap = store.load(bm_file)?;
    debug!("Read bitmap from file");
    let palette = palette.unwrap_or_else(|| Palette::grey_ramp(bitmap.depth()));

    info!("Writing bmp image to {}", output_name.display());
    export::save_bmp(&bitmap, &palette.0, output_name)?;
    store.destroy(bitmap);
    info!("Successfully wrote bmp image to {}", output_name.display());
    Ok(())
}

#[instrument]
pub fn bm_to_png(bm_file: &Path, palette: Option<Palette>, output_name: &Path) -> Result<()> {
    let mut store = BitMapStore::new();
    let bitmap = store.load(bm_file)?;
    debug!("Read bitmap from file");
    let palette = palette.unwrap_or_else(|| Palette::grey_ramp(bitmap.depth()));
    let rgb = export::to_rgb_image(&bitmap, &palette.0)?;
    store.destroy(bitmap);
    debug!("Length of RGB data: {}", rgb.len());

    let output = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output_name)?;

    info!("Writing applied palette image to {}", output_name.display());
    let encoder = PngEncoder::new(output);
    encoder.write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    info!(
        "Successfully wrote palette image to {}",
        output_name.display()
    );
    Ok(())
}

#[instrument]
pub fn overlay(base_file: &Path, top_file: &Path, x: u16, y: u16, output_name: &Path) -> Result<()> {
    let mut store = BitMapStore::new();
    let mut bitmap = store.load(base_file)?;
    codec::load_into(&mut bitmap, top_file, x, y)
        .with_context(|| format!("overlay {} at {x},{y}", top_file.display()))?;
    codec::save(&bitmap, output_name)?;
    store.destroy(bitmap);
    info!("Successfully wrote {}", output_name.display());
    Ok(())
}
