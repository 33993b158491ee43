//! tftimg cli sample app
//!
//! Decodes a 24-bit BMP or a PNG the way the panel would receive it and
//! writes either the raw big-endian RGB565 frame or a preview image.

use std::{
    env,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::exit,
};
use tftimg::{IoSource, PixelBuffer, Rotation, color::Rgb};

/// Extension of raw frame dumps.
const RAW_EXT: &str = "rgb565";

enum Format {
    Bmp,
    Png,
}

fn main() {
    let mut args = env::args();
    let _ = args.next().unwrap();

    let input = match args.next() {
        Some(v) => PathBuf::from(v),
        None => usage(),
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension(RAW_EXT));

    let ext = input.extension().expect("unknown file extention");
    let format = match ext.to_ascii_lowercase().to_str() {
        Some("bmp") => Format::Bmp,
        Some("png") => Format::Png,
        _ => {
            eprintln!("unknown file extention: {}", input.display());
            exit(1);
        }
    };

    let file = File::open(&input).expect("cannot read input");
    let source = IoSource(BufReader::new(file));
    let decoded = match format {
        Format::Bmp => tftimg::decode_bmp(source),
        Format::Png => tftimg::decode_png(source).and_then(|image| image.rotated(Rotation::Deg90)),
    };
    let image = match decoded {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{}: {}", input.display(), err);
            exit(1);
        }
    };
    eprintln!("decoded {}x{}", image.width(), image.height());

    if output.extension().is_some_and(|ext| ext == RAW_EXT) {
        std::fs::write(&output, image.as_bytes()).expect("cannot write output");
    } else {
        preview(&image)
            .save(&output)
            .expect("cannot write output");
    }
}

/// Widens the RGB565 frame back to 8 bits per channel.
fn preview(image: &PixelBuffer) -> image::RgbImage {
    let raw_image = image
        .pixels()
        .flat_map(|packed| {
            let rgb = Rgb::from(packed);
            [rgb.r, rgb.g, rgb.b]
        })
        .collect();
    image::RgbImage::from_raw(image.width(), image.height(), raw_image).unwrap()
}

fn usage() -> ! {
    let mut args = env::args_os();
    let arg = args.next().unwrap();
    let path = Path::new(&arg);
    let lpc = path.file_name().unwrap();
    eprintln!("usage: {} INFILE [OUTFILE]", lpc.to_str().unwrap());
    exit(1);
}
