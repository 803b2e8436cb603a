use crate::Handler;

/// one native occurrence, already translated. produced by the platform, applied by the driver
/// right away and never kept around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRecord {
    Press { x: f32, y: f32 },
    Release { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Resize { width: i32, height: i32 },
    /// redraws are driven by the frame timer, not by exposure.
    Expose,
    CloseRequested,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Continue,
    CloseRequested,
}

/// applies events to the handler in arrival order. stops at the first close request, nothing
/// after it reaches the handler.
pub fn apply_events<H, I>(handler: &mut H, events: I) -> Applied
where
    H: Handler + ?Sized,
    I: IntoIterator<Item = EventRecord>,
{
    for event in events {
        match event {
            EventRecord::Press { x, y } => handler.on_touch_start(x, y),
            EventRecord::Release { x, y } => handler.on_touch_end(x, y),
            EventRecord::Move { x, y } => handler.on_touch_move(x, y),
            EventRecord::Resize { width, height } => handler.on_resize(width, height),
            EventRecord::Expose | EventRecord::Other => {}
            EventRecord::CloseRequested => return Applied::CloseRequested,
        }
    }
    Applied::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Resize(i32, i32),
        Draw,
        Start(f32, f32),
        End(f32, f32),
        Move(f32, f32),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl Handler for Recorder {
        fn on_resize(&mut self, width: i32, height: i32) {
            self.0.push(Call::Resize(width, height));
        }

        fn on_draw(&mut self) {
            self.0.push(Call::Draw);
        }

        fn on_touch_start(&mut self, x: f32, y: f32) {
            self.0.push(Call::Start(x, y));
        }

        fn on_touch_end(&mut self, x: f32, y: f32) {
            self.0.push(Call::End(x, y));
        }

        fn on_touch_move(&mut self, x: f32, y: f32) {
            self.0.push(Call::Move(x, y));
        }
    }

    #[test]
    fn applies_in_arrival_order() {
        let mut recorder = Recorder::default();
        let applied = apply_events(
            &mut recorder,
            [
                EventRecord::Press { x: 1.0, y: 2.0 },
                EventRecord::Move { x: 3.0, y: 4.0 },
                EventRecord::Resize {
                    width: 640,
                    height: 480,
                },
                EventRecord::Release { x: 5.0, y: 6.0 },
            ],
        );
        assert_eq!(applied, Applied::Continue);
        assert_eq!(
            recorder.0,
            [
                Call::Start(1.0, 2.0),
                Call::Move(3.0, 4.0),
                Call::Resize(640, 480),
                Call::End(5.0, 6.0),
            ]
        );
    }

    #[test]
    fn close_suppresses_the_rest_of_the_batch() {
        let mut recorder = Recorder::default();
        let applied = apply_events(
            &mut recorder,
            [
                EventRecord::Press { x: 1.0, y: 1.0 },
                EventRecord::CloseRequested,
                EventRecord::Move { x: 2.0, y: 2.0 },
                EventRecord::Resize {
                    width: 1,
                    height: 1,
                },
            ],
        );
        assert_eq!(applied, Applied::CloseRequested);
        assert_eq!(recorder.0, [Call::Start(1.0, 1.0)]);
    }

    #[test]
    fn expose_and_other_are_ignored() {
        let mut recorder = Recorder::default();
        let applied = apply_events(
            &mut recorder,
            [EventRecord::Expose, EventRecord::Other, EventRecord::Expose],
        );
        assert_eq!(applied, Applied::Continue);
        assert!(recorder.0.is_empty());
    }

    #[test]
    fn empty_batch() {
        let mut recorder = Recorder::default();
        assert_eq!(apply_events(&mut recorder, []), Applied::Continue);
        assert!(recorder.0.is_empty());
    }
}
