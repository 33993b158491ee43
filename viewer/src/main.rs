//! tftimg sample app for embedded-graphics

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, Window};
use std::{env, path::Path, process::exit};
use tftimg::{DrawTargetBlit, ShowOptions};

/// Panel resolution of the target board.
const PANEL: Size = Size::new(128, 160);

fn main() {
    let mut args = env::args();
    let _ = args.next().unwrap();

    let arg = args.next().expect("file name not given");
    let path = Path::new(&arg);
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    let mut display = SimulatorDisplay::<Rgb565>::new(PANEL);
    display.clear(Rgb565::WHITE).unwrap();

    let options = ShowOptions::default();
    let mut target = DrawTargetBlit(&mut display);
    let result = if is_png {
        tftimg::show_png_file(path, 0, 0, &mut target, &options)
    } else {
        tftimg::show_bmp_file(path, 0, 0, &mut target, &options)
    };
    match result {
        Ok(info) => eprintln!("shown {}x{}", info.width(), info.height()),
        Err(err) => {
            eprintln!("{}: {}", arg, err);
            exit(1);
        }
    }

    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    Window::new("Image Viewer", &output_settings).show_static(&display);
}
