//! a higher level handler: touches arrive in points (not pixels) and are delivered right before
//! drawing, batched per frame.

use crate::Handler;
use crate::geom::{DEFAULT_PIXELS_PER_PT, Geometry, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub kind: TouchKind,
    pub loc: Point,
}

/// all methods are optional. the gl viewport already matches the window when these run.
pub trait Callbacks {
    /// called once, right before the very first draw.
    fn start(&mut self, geometry: &Geometry) {
        _ = geometry;
    }

    fn touch(&mut self, touch: Touch, geometry: &Geometry) {
        _ = (touch, geometry);
    }

    fn draw(&mut self, geometry: &Geometry) {
        _ = geometry;
    }
}

pub struct TouchAdapter<C: Callbacks> {
    callbacks: C,
    geometry: Geometry,
    pending: Vec<Touch>,
    started: bool,
}

impl<C: Callbacks> TouchAdapter<C> {
    pub fn new(callbacks: C) -> Self {
        Self {
            callbacks,
            geometry: Geometry::default(),
            pending: Vec::new(),
            started: false,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn into_callbacks(self) -> C {
        self.callbacks
    }

    fn push_touch(&mut self, kind: TouchKind, x: f32, y: f32) {
        let loc = self.geometry.point_from_px(x, y);
        self.pending.push(Touch { kind, loc });
    }
}

impl<C: Callbacks> Handler for TouchAdapter<C> {
    fn on_resize(&mut self, width: i32, height: i32) {
        self.geometry = Geometry::from_px(width, height, DEFAULT_PIXELS_PER_PT);
    }

    fn on_draw(&mut self) {
        if !self.started {
            self.callbacks.start(&self.geometry);
            self.started = true;
        }

        for touch in self.pending.drain(..) {
            self.callbacks.touch(touch, &self.geometry);
        }

        self.callbacks.draw(&self.geometry);
    }

    fn on_touch_start(&mut self, x: f32, y: f32) {
        self.push_touch(TouchKind::Start, x, y);
    }

    fn on_touch_end(&mut self, x: f32, y: f32) {
        self.push_touch(TouchKind::End, x, y);
    }

    fn on_touch_move(&mut self, x: f32, y: f32) {
        self.push_touch(TouchKind::Move, x, y);
    }
}
