use std::ffi::{CStr, c_int, c_long, c_uint, c_void};
use std::mem;
use std::ptr::{NonNull, null, null_mut};

use anyhow::Context as _;
use raw_window_handle::{self as rwh, HasDisplayHandle as _, HasWindowHandle as _};

use crate::config::LoopConfig;
use crate::event::EventRecord;
use crate::provision::{Platform, ProvisionError, Provisioner};

const EVENT_MASK: c_long = xlib::StructureNotifyMask
    | xlib::ExposureMask
    | xlib::ButtonPressMask
    | xlib::ButtonReleaseMask
    | xlib::ButtonMotionMask;

/// maps a native event onto the loop's vocabulary.
///
/// a delete-window message that targets some other window than ours is not a close request.
pub fn translate(
    event: &xlib::XEvent,
    window: xlib::Window,
    wm_delete_window: xlib::Atom,
) -> EventRecord {
    match event.kind() {
        xlib::ButtonPress => {
            let ev = unsafe { event.button };
            EventRecord::Press {
                x: ev.x as f32,
                y: ev.y as f32,
            }
        }
        xlib::ButtonRelease => {
            let ev = unsafe { event.button };
            EventRecord::Release {
                x: ev.x as f32,
                y: ev.y as f32,
            }
        }
        xlib::MotionNotify => {
            let ev = unsafe { event.motion };
            EventRecord::Move {
                x: ev.x as f32,
                y: ev.y as f32,
            }
        }
        xlib::Expose => EventRecord::Expose,
        xlib::ConfigureNotify => {
            let ev = unsafe { event.configure };
            EventRecord::Resize {
                width: ev.width,
                height: ev.height,
            }
        }
        xlib::ClientMessage => {
            let ev = unsafe { event.client_message };
            let atom = unsafe { ev.data.l[0] } as xlib::Atom;
            if wm_delete_window == 0 || atom != wm_delete_window {
                EventRecord::Other
            } else if ev.window != window {
                log::warn!(
                    "ignoring delete request for foreign window {:#x} (ours is {window:#x})",
                    ev.window
                );
                EventRecord::Other
            } else {
                EventRecord::CloseRequested
            }
        }
        _ => EventRecord::Other,
    }
}

fn surface_config_attrs() -> egl::wrap::AttribList {
    let mut attrs = egl::wrap::AttribList::default();
    attrs
        .push(egl::EGL_RENDERABLE_TYPE, egl::EGL_OPENGL_ES2_BIT)
        .push(egl::EGL_SURFACE_TYPE, egl::EGL_WINDOW_BIT)
        .push(egl::EGL_BLUE_SIZE, 8)
        .push(egl::EGL_GREEN_SIZE, 8)
        .push(egl::EGL_RED_SIZE, 8)
        .push(egl::EGL_DEPTH_SIZE, 16)
        .push(egl::EGL_CONFIG_CAVEAT, egl::EGL_NONE);
    attrs
}

fn context_attrs() -> egl::wrap::AttribList {
    let mut attrs = egl::wrap::AttribList::default();
    attrs.push(egl::EGL_CONTEXT_CLIENT_VERSION, 2);
    attrs
}

// ----
// window

struct XWindow {
    lib: xlib::Lib,
    display: NonNull<xlib::Display>,
    screen: c_int,

    // NOTE: zero until created.
    colormap: xlib::Colormap,
    window: xlib::Window,
    visual_id: xlib::VisualID,
    wm_delete_window: xlib::Atom,
}

impl Drop for XWindow {
    fn drop(&mut self) {
        let dpy = self.display.as_ptr();
        unsafe {
            if self.window != 0 {
                (self.lib.XDestroyWindow)(dpy, self.window);
            }
            if self.colormap != 0 {
                (self.lib.XFreeColormap)(dpy, self.colormap);
            }
            (self.lib.XCloseDisplay)(dpy);
        }
    }
}

impl rwh::HasDisplayHandle for XWindow {
    fn display_handle(&self) -> Result<rwh::DisplayHandle<'_>, rwh::HandleError> {
        let raw = rwh::XlibDisplayHandle::new(Some(self.display.cast()), self.screen);
        Ok(unsafe { rwh::DisplayHandle::borrow_raw(raw.into()) })
    }
}

impl rwh::HasWindowHandle for XWindow {
    fn window_handle(&self) -> Result<rwh::WindowHandle<'_>, rwh::HandleError> {
        if self.window == 0 {
            return Err(rwh::HandleError::Unavailable);
        }
        let mut raw = rwh::XlibWindowHandle::new(self.window);
        raw.visual_id = self.visual_id;
        Ok(unsafe { rwh::WindowHandle::borrow_raw(raw.into()) })
    }
}

impl XWindow {
    fn open() -> Result<Self, ProvisionError> {
        let lib = xlib::Lib::load().map_err(ProvisionError::LibraryUnavailable)?;

        let display = NonNull::new(unsafe { (lib.XOpenDisplay)(null()) })
            .ok_or(ProvisionError::DisplayUnavailable)?;
        let screen = unsafe { (lib.XDefaultScreen)(display.as_ptr()) };

        Ok(Self {
            lib,
            display,
            screen,

            colormap: 0,
            window: 0,
            visual_id: 0,
            wm_delete_window: 0,
        })
    }

    fn create(
        &mut self,
        visual_id: xlib::VisualID,
        (width, height): (u32, u32),
        title: &CStr,
    ) -> Result<(), ProvisionError> {
        assert!(self.window == 0);
        let dpy = self.display.as_ptr();

        let visual_info = unsafe {
            let mut template: xlib::XVisualInfo = mem::zeroed();
            template.visualid = visual_id;
            let mut num_visuals = 0;
            let info =
                (self.lib.XGetVisualInfo)(dpy, xlib::VisualIDMask, &mut template, &mut num_visuals);
            if info.is_null() {
                return Err(ProvisionError::VisualLookupFailed);
            }
            // NOTE: the visual pointer is owned by the display, not by the info list.
            let visual_info = *info;
            (self.lib.XFree)(info.cast());
            if num_visuals < 1 {
                return Err(ProvisionError::VisualLookupFailed);
            }
            visual_info
        };

        let root = unsafe { (self.lib.XRootWindow)(dpy, self.screen) };

        self.colormap =
            unsafe { (self.lib.XCreateColormap)(dpy, root, visual_info.visual, xlib::AllocNone) };
        if self.colormap == 0 {
            return Err(ProvisionError::ColormapCreationFailed);
        }

        let mut attrs: xlib::XSetWindowAttributes = unsafe { mem::zeroed() };
        attrs.colormap = self.colormap;
        attrs.event_mask = EVENT_MASK;
        self.window = unsafe {
            (self.lib.XCreateWindow)(
                dpy,
                root,
                0,
                0,
                width as c_uint,
                height as c_uint,
                0,
                visual_info.depth,
                xlib::InputOutput,
                visual_info.visual,
                xlib::CWEventMask | xlib::CWColormap,
                &mut attrs,
            )
        };
        if self.window == 0 {
            return Err(ProvisionError::WindowCreationFailed);
        }
        self.visual_id = visual_id;

        let mut size_hints: xlib::XSizeHints = unsafe { mem::zeroed() };
        size_hints.width = width as c_int;
        size_hints.height = height as c_int;
        size_hints.flags = xlib::USSize;
        unsafe {
            (self.lib.XSetNormalHints)(dpy, self.window, &mut size_hints);
            (self.lib.XSetStandardProperties)(
                dpy,
                self.window,
                title.as_ptr(),
                title.as_ptr(),
                0,
                null_mut(),
                0,
                &mut size_hints,
            );
        }

        log::info!("created x11 window {:#x} ({width}x{height})", self.window);
        Ok(())
    }

    /// asks the window manager to deliver close requests as client messages instead of killing
    /// the connection.
    fn register_delete_protocol(&mut self) {
        let dpy = self.display.as_ptr();

        let atom = unsafe { (self.lib.XInternAtom)(dpy, c"WM_DELETE_WINDOW".as_ptr(), xlib::True) };
        if atom == 0 {
            log::warn!("WM_DELETE_WINDOW does not exist, close requests will not be delivered");
            return;
        }

        let mut protocols = [atom];
        if unsafe { (self.lib.XSetWMProtocols)(dpy, self.window, protocols.as_mut_ptr(), 1) } == 0 {
            log::warn!("could not register WM_DELETE_WINDOW protocol");
            return;
        }
        self.wm_delete_window = atom;
    }

    fn map(&self) {
        unsafe { (self.lib.XMapWindow)(self.display.as_ptr(), self.window) };
    }
}

// ----
// graphics

type GlViewportFn = unsafe extern "C" fn(x: c_int, y: c_int, width: c_int, height: c_int);

/// keeps the gl viewport in sync with the window size before handlers hear about it.
struct Viewport(GlViewportFn);

impl Viewport {
    fn load(connection: &egl::wrap::Connection) -> Option<Self> {
        let ptr = connection.get_proc_address(c"glViewport");
        unsafe { Self::from_ptr(ptr) }
    }

    /// safety: ptr must be null or point to glViewport of the current context's api.
    unsafe fn from_ptr(ptr: *const c_void) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        Some(Self(unsafe {
            mem::transmute::<*const c_void, GlViewportFn>(ptr)
        }))
    }

    fn resize(&self, width: i32, height: i32) {
        unsafe { (self.0)(0, 0, width, height) };
    }

    fn follow(&self, record: &EventRecord) {
        if let EventRecord::Resize { width, height } = *record {
            self.resize(width, height);
        }
    }
}

struct GraphicsContext {
    // NOTE: the connection destroys the context and the surface when dropped.
    connection: egl::wrap::Connection,
    context: egl::wrap::Context,
    surface: egl::wrap::Surface,
    viewport: Option<Viewport>,
}

fn connect_egl(
    display_handle: rwh::DisplayHandle,
) -> Result<egl::wrap::Connection, ProvisionError> {
    use egl::wrap::CreateConnectionError;

    let native_display = match display_handle.as_raw() {
        rwh::RawDisplayHandle::Xlib(rdh) => rdh.display,
        other => {
            log::error!("unsupported display: {other:?}");
            None
        }
    }
    .ok_or(ProvisionError::GraphicsDisplayUnavailable)?;

    egl::wrap::Connection::from_native_display(native_display.as_ptr()).map_err(|err| match err {
        CreateConnectionError::CouldNotLoadEgl(err) => ProvisionError::LibraryUnavailable(err),
        CreateConnectionError::CouldNotGetDisplay => ProvisionError::GraphicsDisplayUnavailable,
        CreateConnectionError::CouldNotInitializeDisplay(err) => {
            ProvisionError::GraphicsInitFailed(err)
        }
    })
}

fn create_window_surface(
    connection: &mut egl::wrap::Connection,
    config: egl::EGLConfig,
    window_handle: rwh::WindowHandle,
) -> Result<egl::wrap::Surface, ProvisionError> {
    let native_window = match window_handle.as_raw() {
        rwh::RawWindowHandle::Xlib(handle) => handle.window,
        other => {
            log::error!("unsupported window: {other:?}");
            return Err(ProvisionError::SurfaceCreationFailed(egl::wrap::Error(
                egl::EGL_BAD_NATIVE_WINDOW,
            )));
        }
    };
    connection
        .create_window_surface(config, native_window)
        .map_err(ProvisionError::SurfaceCreationFailed)
}

// ----
// provisioner

#[derive(Debug, Default, Clone, Copy)]
pub struct X11Provisioner;

impl Provisioner for X11Provisioner {
    type Platform = X11Platform;

    fn provision(&mut self, config: &LoopConfig) -> Result<X11Platform, ProvisionError> {
        let mut window = XWindow::open()?;

        let display_handle = window
            .display_handle()
            .map_err(|_| ProvisionError::GraphicsDisplayUnavailable)?;
        let mut connection = connect_egl(display_handle)?;
        let (major, minor) = connection.version();
        log::info!("initialized egl {major}.{minor}");
        if let Some(vendor) = connection.query_string(egl::EGL_VENDOR) {
            log::info!("egl vendor: {}", vendor.to_string_lossy());
        }

        // NOTE: a failure here surfaces as a context creation failure.
        if let Err(err) = connection.bind_api(egl::EGL_OPENGL_ES_API) {
            log::warn!("could not bind opengl es api: {err}");
        }

        let egl_config = connection
            .choose_first_config(&surface_config_attrs())
            .map_err(|err| ProvisionError::NoMatchingConfig(Some(err)))?
            .ok_or(ProvisionError::NoMatchingConfig(None))?;

        let visual_id = connection
            .config_attrib(egl_config, egl::EGL_NATIVE_VISUAL_ID)
            .map_err(|err| {
                log::error!("could not get native visual id: {err}");
                ProvisionError::VisualLookupFailed
            })?;
        window.create(
            visual_id as xlib::VisualID,
            config.window_size(),
            config.title(),
        )?;

        let context = connection
            .create_context(egl_config, None, &context_attrs())
            .map_err(ProvisionError::ContextCreationFailed)?;

        let window_handle = window
            .window_handle()
            .map_err(|_| ProvisionError::WindowCreationFailed)?;
        let surface = create_window_surface(&mut connection, egl_config, window_handle)?;

        window.register_delete_protocol();

        window.map();
        connection
            .make_current(&surface, &context)
            .map_err(ProvisionError::MakeCurrentFailed)?;

        // NOTE: drivers may ignore this (mesa's software fallback does), the frame rate cap
        // covers for it.
        if let Err(err) = connection.swap_interval(1) {
            log::warn!("could not enable vsync: {err}");
        }

        let viewport = Viewport::load(&connection);
        match viewport {
            Some(ref viewport) => {
                let (width, height) = config.window_size();
                viewport.resize(width as i32, height as i32);
            }
            None => {
                log::warn!("could not resolve glViewport, the viewport will not follow resizes");
            }
        }

        Ok(X11Platform {
            graphics: Some(GraphicsContext {
                connection,
                context,
                surface,
                viewport,
            }),
            window,
        })
    }
}

// ----
// platform

pub struct X11Platform {
    // NOTE: option so that egl can be torn down before the x display goes away.
    graphics: Option<GraphicsContext>,
    window: XWindow,
}

impl Drop for X11Platform {
    fn drop(&mut self) {
        drop(self.graphics.take());
    }
}

impl Platform for X11Platform {
    fn drain_pending(&mut self, events: &mut Vec<EventRecord>) -> anyhow::Result<()> {
        let window = &self.window;
        let dpy = window.display.as_ptr();
        let viewport = self.graphics.as_ref().and_then(|g| g.viewport.as_ref());

        // NOTE: XNextEvent blocks when the queue is empty, only take what is there right now.
        let count = unsafe { (window.lib.XPending)(dpy) };
        for _ in 0..count.max(0) {
            let mut event = xlib::XEvent::zeroed();
            unsafe { (window.lib.XNextEvent)(dpy, &mut event) };

            let record = translate(&event, window.window, window.wm_delete_window);
            #[cfg(feature = "debug")]
            {
                log::debug!("x11 event {}: {record:?}", event.kind());
            }
            if let Some(viewport) = viewport {
                viewport.follow(&record);
            }
            events.push(record);
        }
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let graphics = self
            .graphics
            .as_ref()
            .context("graphics context is gone")?;
        graphics
            .connection
            .swap_buffers(&graphics.surface)
            .context("could not swap buffers")
    }

    fn shutdown(self) {
        log::info!("destroying window {:#x}", self.window.window);
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: xlib::Window = 0x1200007;
    const WM_DELETE_WINDOW: xlib::Atom = 314;

    fn event(init: impl FnOnce(&mut xlib::XEvent)) -> xlib::XEvent {
        let mut event = xlib::XEvent::zeroed();
        init(&mut event);
        event
    }

    fn client_message(window: xlib::Window, atom: xlib::Atom) -> xlib::XEvent {
        event(|ev| unsafe {
            ev.client_message.type_ = xlib::ClientMessage;
            ev.client_message.window = window;
            ev.client_message.format = 32;
            ev.client_message.data.l[0] = atom as c_long;
        })
    }

    #[test]
    fn translates_pointer_events() {
        let press = event(|ev| unsafe {
            ev.button.type_ = xlib::ButtonPress;
            ev.button.x = 12;
            ev.button.y = 34;
        });
        assert_eq!(
            translate(&press, WINDOW, WM_DELETE_WINDOW),
            EventRecord::Press { x: 12.0, y: 34.0 }
        );

        let release = event(|ev| unsafe {
            ev.button.type_ = xlib::ButtonRelease;
            ev.button.x = 5;
            ev.button.y = 6;
        });
        assert_eq!(
            translate(&release, WINDOW, WM_DELETE_WINDOW),
            EventRecord::Release { x: 5.0, y: 6.0 }
        );

        let motion = event(|ev| unsafe {
            ev.motion.type_ = xlib::MotionNotify;
            ev.motion.x = -3;
            ev.motion.y = 900;
        });
        assert_eq!(
            translate(&motion, WINDOW, WM_DELETE_WINDOW),
            EventRecord::Move { x: -3.0, y: 900.0 }
        );
    }

    #[test]
    fn translates_window_events() {
        let configure = event(|ev| unsafe {
            ev.configure.type_ = xlib::ConfigureNotify;
            ev.configure.width = 640;
            ev.configure.height = 480;
        });
        assert_eq!(
            translate(&configure, WINDOW, WM_DELETE_WINDOW),
            EventRecord::Resize {
                width: 640,
                height: 480
            }
        );

        let expose = event(|ev| unsafe { ev.type_ = xlib::Expose });
        assert_eq!(
            translate(&expose, WINDOW, WM_DELETE_WINDOW),
            EventRecord::Expose
        );

        // KeyPress is not selected but would map to nothing anyway
        let other = event(|ev| unsafe { ev.type_ = 2 });
        assert_eq!(
            translate(&other, WINDOW, WM_DELETE_WINDOW),
            EventRecord::Other
        );
    }

    #[test]
    fn only_our_delete_message_is_a_close_request() {
        assert_eq!(
            translate(
                &client_message(WINDOW, WM_DELETE_WINDOW),
                WINDOW,
                WM_DELETE_WINDOW
            ),
            EventRecord::CloseRequested
        );
        assert_eq!(
            translate(&client_message(WINDOW, 42), WINDOW, WM_DELETE_WINDOW),
            EventRecord::Other
        );
        assert_eq!(
            translate(
                &client_message(WINDOW + 1, WM_DELETE_WINDOW),
                WINDOW,
                WM_DELETE_WINDOW
            ),
            EventRecord::Other
        );
        // protocol was never registered
        assert_eq!(
            translate(&client_message(WINDOW, 0), WINDOW, 0),
            EventRecord::Other
        );
    }

    thread_local! {
        static VIEWPORTS: std::cell::RefCell<Vec<(c_int, c_int, c_int, c_int)>> =
            const { std::cell::RefCell::new(Vec::new()) };
    }

    unsafe extern "C" fn record_viewport(x: c_int, y: c_int, width: c_int, height: c_int) {
        VIEWPORTS.with_borrow_mut(|v| v.push((x, y, width, height)));
    }

    #[test]
    fn viewport_follows_resizes_only() {
        assert!(unsafe { Viewport::from_ptr(null()) }.is_none());

        let ptr = record_viewport as GlViewportFn as *const c_void;
        let viewport = unsafe { Viewport::from_ptr(ptr) }.expect("non-null");

        viewport.follow(&EventRecord::Press { x: 1.0, y: 2.0 });
        viewport.follow(&EventRecord::Expose);
        viewport.follow(&EventRecord::Resize {
            width: 640,
            height: 480,
        });
        viewport.resize(480, 800);

        assert_eq!(
            VIEWPORTS.with_borrow(|v| v.clone()),
            [(0, 0, 640, 480), (0, 0, 480, 800)]
        );
    }

    #[test]
    fn surface_config_requires_es2_window_rgb888_depth16() {
        let attrs = surface_config_attrs();
        assert_eq!(
            attrs.get(egl::EGL_RENDERABLE_TYPE),
            Some(egl::EGL_OPENGL_ES2_BIT)
        );
        assert_eq!(attrs.get(egl::EGL_SURFACE_TYPE), Some(egl::EGL_WINDOW_BIT));
        assert_eq!(attrs.get(egl::EGL_RED_SIZE), Some(8));
        assert_eq!(attrs.get(egl::EGL_GREEN_SIZE), Some(8));
        assert_eq!(attrs.get(egl::EGL_BLUE_SIZE), Some(8));
        assert_eq!(attrs.get(egl::EGL_DEPTH_SIZE), Some(16));
        assert_eq!(attrs.get(egl::EGL_CONFIG_CAVEAT), Some(egl::EGL_NONE));
        assert_eq!(attrs.as_slice().last(), Some(&egl::EGL_NONE));

        assert_eq!(context_attrs().get(egl::EGL_CONTEXT_CLIENT_VERSION), Some(2));
    }
}
