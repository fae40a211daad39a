/// Demonstrates how to draw into a [`BitMap`], store it as a `.bm` file and export
/// it as a BMP image
///
use libplanar::{codec, export, planar::write_pixel, BitMap, BitMapStore, CreateOptions};

fn stripes(bitmap: &mut BitMap) {
    let colors = 1u16 << bitmap.depth();
    for y in 0..bitmap.rows() {
        for x in 0..bitmap.width() {
            let index = (x / 8 + y / 8) % colors;
            write_pixel(bitmap, x, y, index as u8);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    let options = CreateOptions::builder().interleaved(true).clear(true).build();
    let mut bitmap = store.create(320, 256, 4, options)?;
    stripes(&mut bitmap);

    codec::save(&bitmap, "stripes.bm")?;
    let loaded = store.load("stripes.bm")?;

    let palette: Vec<u16> = (0..16).map(|c| c * 0x111).collect();
    export::save_bmp(&loaded, &palette, "stripes.bmp")?;

    store.destroy(loaded);
    store.destroy(bitmap);
    std::fs::remove_file("stripes.bm")?;
    std::fs::remove_file("stripes.bmp")?;
    Ok(())
}
