#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

use std::ffi::{c_char, c_int, c_long, c_uint, c_ulong, c_void};

use dynlib::{DynLib, opaque_struct};

// https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/X.h

pub type XID = c_ulong;
pub type Atom = c_ulong;
pub type VisualID = c_ulong;
pub type Time = c_ulong;
pub type Window = XID;
pub type Pixmap = XID;
pub type Cursor = XID;
pub type Colormap = XID;
pub type Bool = c_int;
pub type Status = c_int;

pub const True: Bool = 1;

// event masks

pub const ButtonPressMask: c_long = 1 << 2;
pub const ButtonReleaseMask: c_long = 1 << 3;
pub const ButtonMotionMask: c_long = 1 << 13;
pub const ExposureMask: c_long = 1 << 15;
pub const StructureNotifyMask: c_long = 1 << 17;

// event types

pub const ButtonPress: c_int = 4;
pub const ButtonRelease: c_int = 5;
pub const MotionNotify: c_int = 6;
pub const Expose: c_int = 12;
pub const ConfigureNotify: c_int = 22;
pub const ClientMessage: c_int = 33;

// window classes

pub const InputOutput: c_uint = 1;

// window attributes value mask

pub const CWEventMask: c_ulong = 1 << 11;
pub const CWColormap: c_ulong = 1 << 13;

// colormap allocation

pub const AllocNone: c_int = 0;

// https://gitlab.freedesktop.org/xorg/lib/libx11/-/blob/master/include/X11/Xutil.h

pub const USSize: c_long = 1 << 1;

pub const VisualIDMask: c_long = 0x1;

// https://gitlab.freedesktop.org/xorg/lib/libx11/-/blob/master/include/X11/Xlib.h

opaque_struct!(Display);
opaque_struct!(Visual);

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XVisualInfo {
    pub visual: *mut Visual,
    pub visualid: VisualID,
    pub screen: c_int,
    pub depth: c_int,
    pub class: c_int,
    pub red_mask: c_ulong,
    pub green_mask: c_ulong,
    pub blue_mask: c_ulong,
    pub colormap_size: c_int,
    pub bits_per_rgb: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XSetWindowAttributes {
    pub background_pixmap: Pixmap,
    pub background_pixel: c_ulong,
    pub border_pixmap: Pixmap,
    pub border_pixel: c_ulong,
    pub bit_gravity: c_int,
    pub win_gravity: c_int,
    pub backing_store: c_int,
    pub backing_planes: c_ulong,
    pub backing_pixel: c_ulong,
    pub save_under: Bool,
    pub event_mask: c_long,
    pub do_not_propagate_mask: c_long,
    pub override_redirect: Bool,
    pub colormap: Colormap,
    pub cursor: Cursor,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AspectRatio {
    pub x: c_int,
    pub y: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XSizeHints {
    pub flags: c_long,
    pub x: c_int,
    pub y: c_int,
    pub width: c_int,
    pub height: c_int,
    pub min_width: c_int,
    pub min_height: c_int,
    pub max_width: c_int,
    pub max_height: c_int,
    pub width_inc: c_int,
    pub height_inc: c_int,
    pub min_aspect: AspectRatio,
    pub max_aspect: AspectRatio,
    pub base_width: c_int,
    pub base_height: c_int,
    pub win_gravity: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XButtonEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
    pub root: Window,
    pub subwindow: Window,
    pub time: Time,
    pub x: c_int,
    pub y: c_int,
    pub x_root: c_int,
    pub y_root: c_int,
    pub state: c_uint,
    pub button: c_uint,
    pub same_screen: Bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XMotionEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
    pub root: Window,
    pub subwindow: Window,
    pub time: Time,
    pub x: c_int,
    pub y: c_int,
    pub x_root: c_int,
    pub y_root: c_int,
    pub state: c_uint,
    pub is_hint: c_char,
    pub same_screen: Bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XConfigureEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub event: Window,
    pub window: Window,
    pub x: c_int,
    pub y: c_int,
    pub width: c_int,
    pub height: c_int,
    pub border_width: c_int,
    pub above: Window,
    pub override_redirect: Bool,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union ClientMessageData {
    pub b: [c_char; 20],
    pub s: [i16; 10],
    pub l: [c_long; 5],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XClientMessageEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
    pub message_type: Atom,
    pub format: c_int,
    pub data: ClientMessageData,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union XEvent {
    pub type_: c_int,
    pub button: XButtonEvent,
    pub motion: XMotionEvent,
    pub configure: XConfigureEvent,
    pub client_message: XClientMessageEvent,
    pub pad: [c_long; 24],
}

impl XEvent {
    pub fn zeroed() -> Self {
        Self { pad: [0; 24] }
    }

    pub fn kind(&self) -> c_int {
        unsafe { self.type_ }
    }
}

#[test]
fn test_xevent_size() {
    assert_eq!(std::mem::size_of::<XEvent>(), 24 * std::mem::size_of::<c_long>());
}

pub struct Lib {
    pub XOpenDisplay: unsafe extern "C" fn(display_name: *const c_char) -> *mut Display,
    pub XCloseDisplay: unsafe extern "C" fn(display: *mut Display) -> c_int,
    pub XDefaultScreen: unsafe extern "C" fn(display: *mut Display) -> c_int,
    pub XRootWindow: unsafe extern "C" fn(display: *mut Display, screen_number: c_int) -> Window,

    pub XGetVisualInfo: unsafe extern "C" fn(
        display: *mut Display,
        vinfo_mask: c_long,
        vinfo_template: *mut XVisualInfo,
        nitems_return: *mut c_int,
    ) -> *mut XVisualInfo,
    pub XFree: unsafe extern "C" fn(data: *mut c_void) -> c_int,

    pub XCreateColormap: unsafe extern "C" fn(
        display: *mut Display,
        w: Window,
        visual: *mut Visual,
        alloc: c_int,
    ) -> Colormap,
    pub XFreeColormap: unsafe extern "C" fn(display: *mut Display, colormap: Colormap) -> c_int,

    pub XCreateWindow: unsafe extern "C" fn(
        display: *mut Display,
        parent: Window,
        x: c_int,
        y: c_int,
        width: c_uint,
        height: c_uint,
        border_width: c_uint,
        depth: c_int,
        class: c_uint,
        visual: *mut Visual,
        valuemask: c_ulong,
        attributes: *mut XSetWindowAttributes,
    ) -> Window,
    pub XDestroyWindow: unsafe extern "C" fn(display: *mut Display, w: Window) -> c_int,
    pub XMapWindow: unsafe extern "C" fn(display: *mut Display, w: Window) -> c_int,
    pub XSetNormalHints:
        unsafe extern "C" fn(display: *mut Display, w: Window, hints: *mut XSizeHints) -> c_int,
    pub XSetStandardProperties: unsafe extern "C" fn(
        display: *mut Display,
        w: Window,
        window_name: *const c_char,
        icon_name: *const c_char,
        icon_pixmap: Pixmap,
        argv: *mut *mut c_char,
        argc: c_int,
        hints: *mut XSizeHints,
    ) -> c_int,

    pub XInternAtom: unsafe extern "C" fn(
        display: *mut Display,
        atom_name: *const c_char,
        only_if_exists: Bool,
    ) -> Atom,
    pub XSetWMProtocols: unsafe extern "C" fn(
        display: *mut Display,
        w: Window,
        protocols: *mut Atom,
        count: c_int,
    ) -> Status,

    pub XPending: unsafe extern "C" fn(display: *mut Display) -> c_int,
    pub XNextEvent: unsafe extern "C" fn(display: *mut Display, event_return: *mut XEvent) -> c_int,

    _dl: DynLib,
}

impl Lib {
    pub fn load() -> Result<Self, dynlib::Error> {
        let dl = DynLib::open_any(&[c"libX11.so.6", c"libX11.so"])?;

        Ok(Self {
            XOpenDisplay: dl.lookup(c"XOpenDisplay")?,
            XCloseDisplay: dl.lookup(c"XCloseDisplay")?,
            XDefaultScreen: dl.lookup(c"XDefaultScreen")?,
            XRootWindow: dl.lookup(c"XRootWindow")?,

            XGetVisualInfo: dl.lookup(c"XGetVisualInfo")?,
            XFree: dl.lookup(c"XFree")?,

            XCreateColormap: dl.lookup(c"XCreateColormap")?,
            XFreeColormap: dl.lookup(c"XFreeColormap")?,

            XCreateWindow: dl.lookup(c"XCreateWindow")?,
            XDestroyWindow: dl.lookup(c"XDestroyWindow")?,
            XMapWindow: dl.lookup(c"XMapWindow")?,
            XSetNormalHints: dl.lookup(c"XSetNormalHints")?,
            XSetStandardProperties: dl.lookup(c"XSetStandardProperties")?,

            XInternAtom: dl.lookup(c"XInternAtom")?,
            XSetWMProtocols: dl.lookup(c"XSetWMProtocols")?,

            XPending: dl.lookup(c"XPending")?,
            XNextEvent: dl.lookup(c"XNextEvent")?,

            _dl: dl,
        })
    }
}
