use std::ffi::{CStr, c_void};
use std::ptr::{null, null_mut};
use std::{error, fmt};

use crate::libegl::*;

// NOTE: Connection hands out handles to the resources it creates and destroys all of them when
// dropped; the loop keeps one context and one surface for its whole lifetime.

// ----
// error

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error(pub EGLint);

impl Error {
    fn last(lib: &Lib) -> Self {
        Self(unsafe { (lib.eglGetError)() })
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            EGL_SUCCESS => "EGL_SUCCESS",
            EGL_NOT_INITIALIZED => "EGL_NOT_INITIALIZED",
            EGL_BAD_ACCESS => "EGL_BAD_ACCESS",
            EGL_BAD_ALLOC => "EGL_BAD_ALLOC",
            EGL_BAD_ATTRIBUTE => "EGL_BAD_ATTRIBUTE",
            EGL_BAD_CONFIG => "EGL_BAD_CONFIG",
            EGL_BAD_CONTEXT => "EGL_BAD_CONTEXT",
            EGL_BAD_CURRENT_SURFACE => "EGL_BAD_CURRENT_SURFACE",
            EGL_BAD_DISPLAY => "EGL_BAD_DISPLAY",
            EGL_BAD_MATCH => "EGL_BAD_MATCH",
            EGL_BAD_NATIVE_PIXMAP => "EGL_BAD_NATIVE_PIXMAP",
            EGL_BAD_NATIVE_WINDOW => "EGL_BAD_NATIVE_WINDOW",
            EGL_BAD_PARAMETER => "EGL_BAD_PARAMETER",
            EGL_BAD_SURFACE => "EGL_BAD_SURFACE",
            EGL_CONTEXT_LOST => "EGL_CONTEXT_LOST",
            _ => "unknown egl error",
        }
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{} ({:#x})", self.name(), self.0))
    }
}

#[test]
fn test_error_display() {
    assert_eq!(Error(EGL_BAD_MATCH).to_string(), "EGL_BAD_MATCH (0x3009)");
    assert_eq!(Error(0x1234).to_string(), "unknown egl error (0x1234)");
}

// ----
// attrib list

/// EGL_NONE-terminated list of key/value attribute pairs.
#[derive(Debug, Clone)]
pub struct AttribList {
    // 64 seems enough?
    attrs: [EGLint; 64],
    len: usize,
}

impl Default for AttribList {
    fn default() -> Self {
        Self {
            attrs: [EGL_NONE; 64],
            len: 0,
        }
    }
}

impl AttribList {
    pub fn push(&mut self, attr: EGLint, value: EGLint) -> &mut Self {
        // NOTE: the last slot is reserved for the terminator.
        assert!(self.len + 2 < self.attrs.len(), "exhausted attrib list capacity");
        self.attrs[self.len] = attr;
        self.attrs[self.len + 1] = value;
        self.len += 2;
        self
    }

    pub fn get(&self, attr: EGLint) -> Option<EGLint> {
        self.attrs[..self.len]
            .chunks_exact(2)
            .find(|pair| pair[0] == attr)
            .map(|pair| pair[1])
    }

    pub fn as_slice(&self) -> &[EGLint] {
        &self.attrs[..self.len + 1]
    }

    pub fn as_ptr(&self) -> *const EGLint {
        self.attrs.as_ptr()
    }
}

#[test]
fn test_attrib_list() {
    let mut attrs = AttribList::default();
    assert_eq!(attrs.as_slice(), &[EGL_NONE]);

    attrs.push(EGL_RED_SIZE, 8).push(EGL_DEPTH_SIZE, 16);
    assert_eq!(
        attrs.as_slice(),
        &[EGL_RED_SIZE, 8, EGL_DEPTH_SIZE, 16, EGL_NONE]
    );
    assert_eq!(attrs.get(EGL_DEPTH_SIZE), Some(16));
    assert_eq!(attrs.get(EGL_BLUE_SIZE), None);
}

// ----
// context and surface handles

pub struct Context {
    pub context: EGLContext,
    pub config: EGLConfig,
}

pub struct Surface {
    pub surface: EGLSurface,
    pub config: EGLConfig,
}

// ----
// connection

#[derive(Debug)]
pub enum CreateConnectionError {
    CouldNotLoadEgl(dynlib::Error),
    CouldNotGetDisplay,
    CouldNotInitializeDisplay(Error),
}

impl error::Error for CreateConnectionError {}

impl fmt::Display for CreateConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CouldNotLoadEgl(err) => f.write_fmt(format_args!("could not load egl: {err}")),
            Self::CouldNotGetDisplay => f.write_str("could not get display"),
            Self::CouldNotInitializeDisplay(err) => {
                f.write_fmt(format_args!("could not initialize display: {err}"))
            }
        }
    }
}

pub struct Connection {
    pub lib: Lib,
    pub display: EGLDisplay,
    version: (EGLint, EGLint),

    contexts: Vec<EGLContext>,
    surfaces: Vec<EGLSurface>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        unsafe {
            (self.lib.eglMakeCurrent)(self.display, EGL_NO_SURFACE, EGL_NO_SURFACE, EGL_NO_CONTEXT)
        };

        for surface in self.surfaces.drain(..) {
            unsafe { (self.lib.eglDestroySurface)(self.display, surface) };
        }
        for context in self.contexts.drain(..) {
            unsafe { (self.lib.eglDestroyContext)(self.display, context) };
        }

        unsafe { (self.lib.eglTerminate)(self.display) };
    }
}

impl Connection {
    /// loads libEGL, resolves the display that belongs to the native (xlib) display and
    /// initializes it.
    pub fn from_native_display(
        native_display: EGLNativeDisplayType,
    ) -> Result<Self, CreateConnectionError> {
        let lib = Lib::load().map_err(CreateConnectionError::CouldNotLoadEgl)?;

        let display = unsafe { (lib.eglGetDisplay)(native_display) };
        if display == EGL_NO_DISPLAY {
            return Err(CreateConnectionError::CouldNotGetDisplay);
        }

        let mut version = (0, 0);
        if unsafe { (lib.eglInitialize)(display, &mut version.0, &mut version.1) } == EGL_FALSE {
            return Err(CreateConnectionError::CouldNotInitializeDisplay(
                Error::last(&lib),
            ));
        }

        Ok(Self {
            lib,
            display,
            version,
            contexts: Vec::new(),
            surfaces: Vec::new(),
        })
    }

    pub fn version(&self) -> (EGLint, EGLint) {
        self.version
    }

    pub fn query_string(&self, name: EGLint) -> Option<&CStr> {
        let ptr = unsafe { (self.lib.eglQueryString)(self.display, name) };
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) })
        }
    }

    pub fn bind_api(&self, api: EGLenum) -> Result<(), Error> {
        if unsafe { (self.lib.eglBindAPI)(api) } == EGL_FALSE {
            return Err(Error::last(&self.lib));
        }
        Ok(())
    }

    /// returns the best match according to egl's own sorting rules, or none if nothing matches.
    pub fn choose_first_config(&self, attrs: &AttribList) -> Result<Option<EGLConfig>, Error> {
        let mut config: EGLConfig = null_mut();
        let mut num_configs = 0;
        if unsafe {
            (self.lib.eglChooseConfig)(
                self.display,
                attrs.as_ptr(),
                &mut config,
                1,
                &mut num_configs,
            )
        } == EGL_FALSE
        {
            return Err(Error::last(&self.lib));
        }
        Ok((num_configs > 0).then_some(config))
    }

    pub fn config_attrib(&self, config: EGLConfig, attribute: EGLint) -> Result<EGLint, Error> {
        let mut value = 0;
        if unsafe { (self.lib.eglGetConfigAttrib)(self.display, config, attribute, &mut value) }
            == EGL_FALSE
        {
            return Err(Error::last(&self.lib));
        }
        Ok(value)
    }

    pub fn create_context(
        &mut self,
        config: EGLConfig,
        share_context: Option<&Context>,
        attrs: &AttribList,
    ) -> Result<Context, Error> {
        let context = unsafe {
            (self.lib.eglCreateContext)(
                self.display,
                config,
                share_context.map_or(EGL_NO_CONTEXT, |c| c.context),
                attrs.as_ptr(),
            )
        };
        if context == EGL_NO_CONTEXT {
            return Err(Error::last(&self.lib));
        }

        self.contexts.push(context);
        Ok(Context { context, config })
    }

    pub fn create_window_surface(
        &mut self,
        config: EGLConfig,
        native_window: EGLNativeWindowType,
    ) -> Result<Surface, Error> {
        let surface =
            unsafe { (self.lib.eglCreateWindowSurface)(self.display, config, native_window, null()) };
        if surface == EGL_NO_SURFACE {
            return Err(Error::last(&self.lib));
        }

        self.surfaces.push(surface);
        Ok(Surface { surface, config })
    }

    pub fn make_current(&self, surface: &Surface, context: &Context) -> Result<(), Error> {
        if unsafe {
            (self.lib.eglMakeCurrent)(
                self.display,
                surface.surface,
                surface.surface,
                context.context,
            )
        } == EGL_FALSE
        {
            return Err(Error::last(&self.lib));
        }
        Ok(())
    }

    /// NOTE: applies to the surface bound to the current context on the calling thread. drivers
    /// are free to ignore this (mesa's software fallback does, for example).
    pub fn swap_interval(&self, interval: EGLint) -> Result<(), Error> {
        if unsafe { (self.lib.eglSwapInterval)(self.display, interval) } == EGL_FALSE {
            return Err(Error::last(&self.lib));
        }
        Ok(())
    }

    pub fn swap_buffers(&self, surface: &Surface) -> Result<(), Error> {
        if unsafe { (self.lib.eglSwapBuffers)(self.display, surface.surface) } == EGL_FALSE {
            return Err(Error::last(&self.lib));
        }
        Ok(())
    }

    /// null if the function is unknown. core gl functions resolve too on implementations with
    /// EGL_KHR_get_all_proc_addresses (mesa, nvidia).
    pub fn get_proc_address(&self, procname: &CStr) -> *const c_void {
        match unsafe { (self.lib.eglGetProcAddress)(procname.as_ptr()) } {
            Some(f) => f as *const c_void,
            None => null(),
        }
    }
}
