mod backend_x11;
mod config;
mod driver;
mod event;
mod geom;
mod logger;
mod pacer;
mod provision;
mod timing;
mod touch;

use std::process;

pub use backend_x11::{X11Platform, X11Provisioner, translate};
pub use config::*;
pub use driver::{Driver, LoopState};
pub use event::{Applied, EventRecord, apply_events};
pub use geom::{DEFAULT_PIXELS_PER_PT, Geometry, Point, Pt};
pub use pacer::{FrameAction, IDLE_SLEEP, fps_report, frame_action, should_poll};
pub use provision::{Platform, ProvisionError, Provisioner};
pub use timing::{Clock, SystemClock, TimingSample};
pub use touch::{Callbacks, Touch, TouchAdapter, TouchKind};

/// receives everything the loop has to say. coordinates are in window pixels.
pub trait Handler {
    fn on_resize(&mut self, width: i32, height: i32);
    fn on_draw(&mut self);
    fn on_touch_start(&mut self, x: f32, y: f32);
    fn on_touch_end(&mut self, x: f32, y: f32);
    fn on_touch_move(&mut self, x: f32, y: f32);
}

/// opens an x11 window with a current gles2 context and runs the loop until the window is closed.
///
/// exits the process: with 0 after a close request, with 1 if anything went wrong.
pub fn run<H: Handler>(config: LoopConfig, mut handler: H) -> ! {
    logger::init(config.log_level());

    let driver = Driver::new(config, X11Provisioner, SystemClock);
    match driver.run(&mut handler) {
        Ok(()) => {
            log::info!("window closed");
            process::exit(0);
        }
        Err(err) => {
            log::error!("{err:#}");
            process::exit(1);
        }
    }
}
