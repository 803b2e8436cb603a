use app::{Callbacks, Geometry, LoopConfig, Touch, TouchAdapter, TouchKind};

#[derive(Default)]
struct Hello {
    frames: u64,
    pressed: bool,
}

impl Callbacks for Hello {
    fn start(&mut self, geometry: &Geometry) {
        log::info!(
            "hello! {:.2}x{:.2}pt",
            geometry.width.0,
            geometry.height.0
        );
    }

    fn touch(&mut self, touch: Touch, _geometry: &Geometry) {
        match touch.kind {
            TouchKind::Start => self.pressed = true,
            TouchKind::End => self.pressed = false,
            TouchKind::Move if !self.pressed => return,
            TouchKind::Move => {}
        }
        log::info!(
            "{:?} at {:.2},{:.2}pt",
            touch.kind,
            touch.loc.x.0,
            touch.loc.y.0
        );
    }

    fn draw(&mut self, _geometry: &Geometry) {
        self.frames += 1;
    }
}

fn main() {
    let config = LoopConfig::default().with_title(c"hello");
    app::run(config, TouchAdapter::new(Hello::default()));
}
