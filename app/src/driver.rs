use std::ops::ControlFlow;

use anyhow::Context as _;

use crate::Handler;
use crate::config::LoopConfig;
use crate::event::{self, Applied, EventRecord};
use crate::pacer::{self, FrameAction};
use crate::provision::{Platform, ProvisionError, Provisioner};
use crate::timing::{Clock, TimingSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Provisioning,
    Running,
    Terminating,
    Terminated,
}

/// owns the platform and the timing state and sequences provisioning, the loop and teardown.
pub struct Driver<P: Provisioner, C: Clock> {
    config: LoopConfig,
    provisioner: P,
    clock: C,

    state: LoopState,
    platform: Option<P::Platform>,
    timing: Option<TimingSample>,
    // NOTE: reused across polls so that draining does not allocate every time.
    events: Vec<EventRecord>,
}

impl<P: Provisioner, C: Clock> Driver<P, C> {
    pub fn new(config: LoopConfig, provisioner: P, clock: C) -> Self {
        Self {
            config,
            provisioner,
            clock,

            state: LoopState::Uninitialized,
            platform: None,
            timing: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn timing(&self) -> Option<&TimingSample> {
        self.timing.as_ref()
    }

    /// provisions the platform and initializes downstream geometry with the initial size.
    pub fn start<H: Handler + ?Sized>(&mut self, handler: &mut H) -> Result<(), ProvisionError> {
        assert_eq!(self.state, LoopState::Uninitialized);

        self.state = LoopState::Provisioning;
        let platform = match self.provisioner.provision(&self.config) {
            Ok(platform) => platform,
            Err(err) => {
                // NOTE: nothing is owned yet, there's nothing to tear down.
                self.state = LoopState::Terminated;
                return Err(err);
            }
        };
        self.platform = Some(platform);

        let (width, height) = self.config.window_size();
        handler.on_resize(width as i32, height as i32);

        self.timing = Some(TimingSample::starting_at(self.clock.now()));
        self.state = LoopState::Running;
        log::info!("running ({width}x{height})");
        Ok(())
    }

    /// a single pass over the pacer's decision. breaks once the loop is terminated.
    ///
    /// any error is fatal: the platform is torn down before the error is returned.
    pub fn iterate<H: Handler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> anyhow::Result<ControlFlow<()>> {
        assert_eq!(self.state, LoopState::Running);

        match self.step(handler) {
            Ok(ControlFlow::Continue(())) => Ok(ControlFlow::Continue(())),
            Ok(ControlFlow::Break(())) => {
                log::info!("close requested");
                self.terminate();
                Ok(ControlFlow::Break(()))
            }
            Err(err) => {
                self.terminate();
                Err(err)
            }
        }
    }

    fn step<H: Handler + ?Sized>(&mut self, handler: &mut H) -> anyhow::Result<ControlFlow<()>> {
        let (Some(platform), Some(timing)) = (self.platform.as_mut(), self.timing.as_mut()) else {
            unreachable!("running without a platform");
        };

        let now = self.clock.now();
        if pacer::should_poll(&self.config, timing, now) {
            self.events.clear();
            platform
                .drain_pending(&mut self.events)
                .context("could not drain events")?;
            timing.last_poll = now;

            #[cfg(feature = "debug")]
            {
                log::debug!("drained {} events", self.events.len());
            }

            if event::apply_events(handler, self.events.drain(..)) == Applied::CloseRequested {
                return Ok(ControlFlow::Break(()));
            }
        }

        let now = self.clock.now();
        match pacer::frame_action(&self.config, timing, now) {
            FrameAction::Idle => self.clock.sleep(pacer::IDLE_SLEEP),
            FrameAction::RenderAndPresent { fps } => {
                timing.last_present = now;
                timing.fps = fps;
                handler.on_draw();
                platform.present().context("could not present")?;
            }
        }

        if let Some(fps) = pacer::fps_report(&self.config, timing, now) {
            log::info!("fps: {fps:.2}");
            timing.last_fps_report = now;
        }

        Ok(ControlFlow::Continue(()))
    }

    fn terminate(&mut self) {
        self.state = LoopState::Terminating;
        if let Some(platform) = self.platform.take() {
            platform.shutdown();
        }
        self.events.clear();
        self.state = LoopState::Terminated;
    }

    /// returns ok once the window was closed. errors are fatal, the caller is expected to report
    /// them and exit with a non-zero status.
    pub fn run<H: Handler + ?Sized>(mut self, handler: &mut H) -> anyhow::Result<()> {
        self.start(handler).context("could not provision")?;
        while self.iterate(handler)?.is_continue() {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    use anyhow::anyhow;

    use super::*;
    use crate::timing::ManualClock;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Resize(i32, i32),
        Draw,
        TouchStart(f32, f32),
        TouchEnd(f32, f32),
        TouchMove(f32, f32),
        Drain,
        Present,
        Shutdown,
    }

    type Calls = Rc<RefCell<Vec<Call>>>;

    struct Recorder(Calls);

    impl Handler for Recorder {
        fn on_resize(&mut self, width: i32, height: i32) {
            self.0.borrow_mut().push(Call::Resize(width, height));
        }

        fn on_draw(&mut self) {
            self.0.borrow_mut().push(Call::Draw);
        }

        fn on_touch_start(&mut self, x: f32, y: f32) {
            self.0.borrow_mut().push(Call::TouchStart(x, y));
        }

        fn on_touch_end(&mut self, x: f32, y: f32) {
            self.0.borrow_mut().push(Call::TouchEnd(x, y));
        }

        fn on_touch_move(&mut self, x: f32, y: f32) {
            self.0.borrow_mut().push(Call::TouchMove(x, y));
        }
    }

    struct FakePlatform {
        calls: Calls,
        batches: VecDeque<Vec<EventRecord>>,
        fail_present: bool,
    }

    impl Platform for FakePlatform {
        fn drain_pending(&mut self, events: &mut Vec<EventRecord>) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(Call::Drain);
            events.extend(self.batches.pop_front().unwrap_or_default());
            Ok(())
        }

        fn present(&mut self) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(Call::Present);
            if self.fail_present {
                return Err(anyhow!("lost the surface"));
            }
            Ok(())
        }

        fn shutdown(self) {
            self.calls.borrow_mut().push(Call::Shutdown);
        }
    }

    enum FakeProvisioner {
        Ok(Option<FakePlatform>),
        Err(Option<ProvisionError>),
    }

    impl Provisioner for FakeProvisioner {
        type Platform = FakePlatform;

        fn provision(&mut self, _config: &LoopConfig) -> Result<FakePlatform, ProvisionError> {
            match self {
                Self::Ok(platform) => Ok(platform.take().expect("provisioned twice")),
                Self::Err(err) => Err(err.take().expect("provisioned twice")),
            }
        }
    }

    struct Harness {
        calls: Calls,
        clock: Rc<ManualClock>,
        handler: Recorder,
        driver: Driver<FakeProvisioner, Rc<ManualClock>>,
    }

    fn harness(config: LoopConfig, batches: Vec<Vec<EventRecord>>, fail_present: bool) -> Harness {
        let calls = Calls::default();
        let clock = Rc::new(ManualClock::new());
        let platform = FakePlatform {
            calls: calls.clone(),
            batches: batches.into(),
            fail_present,
        };
        Harness {
            calls: calls.clone(),
            clock: clock.clone(),
            handler: Recorder(calls),
            driver: Driver::new(config, FakeProvisioner::Ok(Some(platform)), clock),
        }
    }

    impl Harness {
        fn start(&mut self) {
            self.driver.start(&mut self.handler).expect("provisioned");
        }

        fn iterate(&mut self) -> ControlFlow<()> {
            self.driver.iterate(&mut self.handler).expect("iterated")
        }

        fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.borrow_mut())
        }
    }

    #[test]
    fn resize_fires_once_before_first_draw() {
        let mut h = harness(LoopConfig::default(), vec![], false);
        assert_eq!(h.driver.state(), LoopState::Uninitialized);

        h.start();
        assert_eq!(h.driver.state(), LoopState::Running);
        assert_eq!(h.take_calls(), [Call::Resize(480, 800)]);

        // nothing is due yet
        assert!(h.iterate().is_continue());
        assert!(h.take_calls().is_empty());
        assert_eq!(h.clock.times_slept(), 1);

        h.clock.advance(Duration::from_millis(13));
        assert!(h.iterate().is_continue());
        assert_eq!(h.take_calls(), [Call::Draw, Call::Present]);
    }

    #[test]
    fn renders_at_sixty_hz_when_capped_at_eighty() {
        let mut h = harness(LoopConfig::default(), vec![], false);
        h.start();
        h.take_calls();

        h.clock.advance(Duration::from_secs_f64(1.0 / 60.0));
        h.iterate();
        assert_eq!(h.take_calls(), [Call::Draw, Call::Present]);

        let timing = h.driver.timing().expect("running");
        assert_eq!(timing.last_present, h.clock.now());
        assert!((timing.fps - 60.0).abs() < 0.01, "fps = {}", timing.fps);
    }

    #[test]
    fn does_not_render_before_frame_interval() {
        let mut h = harness(LoopConfig::default(), vec![], false);
        h.start();
        h.take_calls();

        h.clock.advance(Duration::from_micros(12_000));
        h.iterate();
        assert!(h.take_calls().is_empty());
        // the idle sleep pushes the clock past 12.5ms
        h.clock.advance(Duration::from_micros(500));
        h.iterate();
        assert_eq!(h.take_calls(), [Call::Draw, Call::Present]);
    }

    #[test]
    fn empty_poll_advances_poll_checkpoint() {
        let mut h = harness(LoopConfig::default(), vec![], false);
        h.start();
        h.take_calls();
        let before = h.driver.timing().expect("running").last_poll;

        h.clock.advance(Duration::from_millis(34));
        let polled_at = h.clock.now();
        h.iterate();
        // render is due as well, both happen within one iteration
        assert_eq!(h.take_calls(), [Call::Drain, Call::Draw, Call::Present]);

        let after = h.driver.timing().expect("running").last_poll;
        assert!(after > before);
        assert_eq!(after, polled_at);
    }

    #[test]
    fn resize_event_is_forwarded_before_the_next_draw() {
        let batch = vec![EventRecord::Resize {
            width: 640,
            height: 480,
        }];
        let mut h = harness(LoopConfig::default(), vec![batch], false);
        h.start();
        h.take_calls();

        h.clock.advance(Duration::from_millis(34));
        h.iterate();
        assert_eq!(
            h.take_calls(),
            [Call::Drain, Call::Resize(640, 480), Call::Draw, Call::Present]
        );
    }

    #[test]
    fn expose_never_triggers_draw() {
        let batch = vec![EventRecord::Expose; 8];
        // frame cap way below poll cap so that polls happen without frames being due
        let config = LoopConfig::default()
            .with_poll_rate_cap(1000)
            .with_frame_rate_cap(1);
        let mut h = harness(config, vec![batch.clone(), batch], false);
        h.start();
        h.take_calls();

        for _ in 0..2 {
            h.clock.advance(Duration::from_millis(2));
            h.iterate();
        }
        assert_eq!(h.take_calls(), [Call::Drain, Call::Drain]);
    }

    #[test]
    fn close_tears_down_and_suppresses_the_rest() {
        let batch = vec![
            EventRecord::Press { x: 1.0, y: 2.0 },
            EventRecord::CloseRequested,
            EventRecord::Move { x: 3.0, y: 4.0 },
        ];
        let mut h = harness(LoopConfig::default(), vec![batch], false);
        h.start();
        h.take_calls();

        h.clock.advance(Duration::from_millis(34));
        assert!(h.iterate().is_break());
        // a frame was due, but nothing fires once terminating
        assert_eq!(
            h.take_calls(),
            [Call::Drain, Call::TouchStart(1.0, 2.0), Call::Shutdown]
        );
        assert_eq!(h.driver.state(), LoopState::Terminated);
    }

    #[test]
    fn touches_reach_the_handler() {
        let batch = vec![
            EventRecord::Press { x: 10.0, y: 20.0 },
            EventRecord::Move { x: 11.0, y: 21.0 },
            EventRecord::Release { x: 12.0, y: 22.0 },
            EventRecord::Other,
        ];
        let config = LoopConfig::default().with_frame_rate_cap(1);
        let mut h = harness(config, vec![batch], false);
        h.start();
        h.take_calls();

        h.clock.advance(Duration::from_millis(34));
        h.iterate();
        assert_eq!(
            h.take_calls(),
            [
                Call::Drain,
                Call::TouchStart(10.0, 20.0),
                Call::TouchMove(11.0, 21.0),
                Call::TouchEnd(12.0, 22.0),
            ]
        );
    }

    #[test]
    fn fps_report_checkpoint_moves_only_when_reported() {
        let config = LoopConfig::default().with_fps_report(Some(Duration::from_secs(1)));
        let mut h = harness(config, vec![], false);
        h.start();
        let origin = h.clock.origin();

        h.clock.advance(Duration::from_millis(500));
        h.iterate();
        let timing = *h.driver.timing().expect("running");
        assert_eq!(timing.last_fps_report, origin);
        assert_eq!(timing.fps, 2.0);

        h.clock.advance(Duration::from_millis(500));
        h.iterate();
        let reported_at = h.clock.now();
        let timing = *h.driver.timing().expect("running");
        assert_eq!(reported_at, origin + Duration::from_secs(1));
        assert_eq!(timing.last_fps_report, reported_at);
        // the value reported is the one computed by this iteration's present
        assert_eq!(timing.last_present, reported_at);
        assert_eq!(timing.fps, 2.0);

        h.clock.advance(Duration::from_millis(100));
        h.iterate();
        let timing = *h.driver.timing().expect("running");
        assert_eq!(timing.last_fps_report, reported_at);
        assert_eq!(timing.fps, 10.0);
        assert_eq!(
            h.take_calls()
                .iter()
                .filter(|c| **c == Call::Present)
                .count(),
            3
        );
    }

    #[test]
    fn provisioning_failure_terminates_without_callbacks() {
        let calls = Calls::default();
        let mut handler = Recorder(calls.clone());
        let mut driver = Driver::new(
            LoopConfig::default(),
            FakeProvisioner::Err(Some(ProvisionError::DisplayUnavailable)),
            Rc::new(ManualClock::new()),
        );

        let err = driver.start(&mut handler).err().expect("provisioning fails");
        assert!(matches!(err, ProvisionError::DisplayUnavailable));
        assert_eq!(driver.state(), LoopState::Terminated);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn present_failure_is_fatal() {
        let mut h = harness(LoopConfig::default(), vec![], true);
        h.start();
        h.take_calls();

        h.clock.advance(Duration::from_millis(13));
        let err = h
            .driver
            .iterate(&mut h.handler)
            .err()
            .expect("present fails");
        assert!(format!("{err:#}").contains("lost the surface"));
        assert_eq!(h.take_calls(), [Call::Draw, Call::Present, Call::Shutdown]);
        assert_eq!(h.driver.state(), LoopState::Terminated);
    }

    #[test]
    fn run_returns_ok_on_close() {
        let h = harness(
            LoopConfig::default(),
            vec![vec![], vec![EventRecord::CloseRequested]],
            false,
        );
        let Harness {
            calls,
            mut handler,
            driver,
            ..
        } = h;

        driver.run(&mut handler).expect("closed gracefully");

        let calls = calls.borrow();
        assert_eq!(calls.first(), Some(&Call::Resize(480, 800)));
        assert_eq!(calls.iter().filter(|c| **c == Call::Drain).count(), 2);
        assert_eq!(calls.last(), Some(&Call::Shutdown));
        // the idle sleep is the only thing that moves the clock here, frames must have been paced
        assert!(calls.iter().any(|c| *c == Call::Draw));
    }
}
