#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{c_char, c_uint, c_ulong, c_void};
use std::ptr::null_mut;

use dynlib::DynLib;

pub type khronos_int32_t = i32;

// https://registry.khronos.org/EGL/api/EGL/eglplatform.h
//
// NOTE: these are the xlib flavour of native types, window is an XID and not a pointer.

pub type EGLNativeDisplayType = *mut c_void;
pub type EGLNativePixmapType = c_ulong;
pub type EGLNativeWindowType = c_ulong;

pub type EGLint = khronos_int32_t;

// https://registry.khronos.org/EGL/api/EGL/egl.h

// 1.0

pub type EGLBoolean = c_uint;
pub type EGLDisplay = *mut c_void;
pub type EGLConfig = *mut c_void;
pub type EGLSurface = *mut c_void;
pub type EGLContext = *mut c_void;
pub type __eglMustCastToProperFunctionPointerType = Option<unsafe extern "C" fn()>;

pub const EGL_ALPHA_SIZE: EGLint = 0x3021;
pub const EGL_BAD_ACCESS: EGLint = 0x3002;
pub const EGL_BAD_ALLOC: EGLint = 0x3003;
pub const EGL_BAD_ATTRIBUTE: EGLint = 0x3004;
pub const EGL_BAD_CONFIG: EGLint = 0x3005;
pub const EGL_BAD_CONTEXT: EGLint = 0x3006;
pub const EGL_BAD_CURRENT_SURFACE: EGLint = 0x3007;
pub const EGL_BAD_DISPLAY: EGLint = 0x3008;
pub const EGL_BAD_MATCH: EGLint = 0x3009;
pub const EGL_BAD_NATIVE_PIXMAP: EGLint = 0x300A;
pub const EGL_BAD_NATIVE_WINDOW: EGLint = 0x300B;
pub const EGL_BAD_PARAMETER: EGLint = 0x300C;
pub const EGL_BAD_SURFACE: EGLint = 0x300D;
pub const EGL_BLUE_SIZE: EGLint = 0x3022;
pub const EGL_CONFIG_CAVEAT: EGLint = 0x3027;
pub const EGL_DEPTH_SIZE: EGLint = 0x3025;
pub const EGL_EXTENSIONS: EGLint = 0x3055;
pub const EGL_FALSE: EGLBoolean = 0;
pub const EGL_GREEN_SIZE: EGLint = 0x3023;
pub const EGL_NATIVE_VISUAL_ID: EGLint = 0x302E;
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_NOT_INITIALIZED: EGLint = 0x3001;
pub const EGL_NO_CONTEXT: EGLContext = null_mut();
pub const EGL_NO_DISPLAY: EGLDisplay = null_mut();
pub const EGL_NO_SURFACE: EGLSurface = null_mut();
pub const EGL_RED_SIZE: EGLint = 0x3024;
pub const EGL_SUCCESS: EGLint = 0x3000;
pub const EGL_SURFACE_TYPE: EGLint = 0x3033;
pub const EGL_TRUE: EGLBoolean = 1;
pub const EGL_VENDOR: EGLint = 0x3053;
pub const EGL_VERSION: EGLint = 0x3054;
pub const EGL_WINDOW_BIT: EGLint = 0x0004;

// 1.1

pub const EGL_CONTEXT_LOST: EGLint = 0x300E;

// 1.2

pub type EGLenum = c_uint;

pub const EGL_CLIENT_APIS: EGLint = 0x308D;
pub const EGL_OPENGL_ES_API: EGLenum = 0x30A0;
pub const EGL_RENDERABLE_TYPE: EGLint = 0x3040;

// 1.3

pub const EGL_CONTEXT_CLIENT_VERSION: EGLint = 0x3098;
pub const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;

pub struct Lib {
    pub eglBindAPI: unsafe extern "C" fn(api: EGLenum) -> EGLBoolean,
    pub eglChooseConfig: unsafe extern "C" fn(
        dpy: EGLDisplay,
        attrib_list: *const EGLint,
        configs: *mut EGLConfig,
        config_size: EGLint,
        num_config: *mut EGLint,
    ) -> EGLBoolean,
    pub eglCreateContext: unsafe extern "C" fn(
        dpy: EGLDisplay,
        config: EGLConfig,
        share_context: EGLContext,
        attrib_list: *const EGLint,
    ) -> EGLContext,
    pub eglCreateWindowSurface: unsafe extern "C" fn(
        dpy: EGLDisplay,
        config: EGLConfig,
        win: EGLNativeWindowType,
        attrib_list: *const EGLint,
    ) -> EGLSurface,
    pub eglDestroyContext: unsafe extern "C" fn(dpy: EGLDisplay, ctx: EGLContext) -> EGLBoolean,
    pub eglDestroySurface: unsafe extern "C" fn(dpy: EGLDisplay, surface: EGLSurface) -> EGLBoolean,
    pub eglGetConfigAttrib: unsafe extern "C" fn(
        dpy: EGLDisplay,
        config: EGLConfig,
        attribute: EGLint,
        value: *mut EGLint,
    ) -> EGLBoolean,
    pub eglGetDisplay: unsafe extern "C" fn(display_id: EGLNativeDisplayType) -> EGLDisplay,
    pub eglGetError: unsafe extern "C" fn() -> EGLint,
    pub eglGetProcAddress:
        unsafe extern "C" fn(procname: *const c_char) -> __eglMustCastToProperFunctionPointerType,
    pub eglInitialize:
        unsafe extern "C" fn(dpy: EGLDisplay, major: *mut EGLint, minor: *mut EGLint) -> EGLBoolean,
    pub eglMakeCurrent: unsafe extern "C" fn(
        dpy: EGLDisplay,
        draw: EGLSurface,
        read: EGLSurface,
        ctx: EGLContext,
    ) -> EGLBoolean,
    pub eglQueryString: unsafe extern "C" fn(dpy: EGLDisplay, name: EGLint) -> *const c_char,
    pub eglSwapBuffers: unsafe extern "C" fn(dpy: EGLDisplay, surface: EGLSurface) -> EGLBoolean,
    pub eglSwapInterval: unsafe extern "C" fn(dpy: EGLDisplay, interval: EGLint) -> EGLBoolean,
    pub eglTerminate: unsafe extern "C" fn(dpy: EGLDisplay) -> EGLBoolean,

    _dl: DynLib,
}

impl Lib {
    pub fn load() -> Result<Self, dynlib::Error> {
        let dl = DynLib::open_any(&[c"libEGL.so.1", c"libEGL.so"])?;

        Ok(Self {
            eglBindAPI: dl.lookup(c"eglBindAPI")?,
            eglChooseConfig: dl.lookup(c"eglChooseConfig")?,
            eglCreateContext: dl.lookup(c"eglCreateContext")?,
            eglCreateWindowSurface: dl.lookup(c"eglCreateWindowSurface")?,
            eglDestroyContext: dl.lookup(c"eglDestroyContext")?,
            eglDestroySurface: dl.lookup(c"eglDestroySurface")?,
            eglGetConfigAttrib: dl.lookup(c"eglGetConfigAttrib")?,
            eglGetDisplay: dl.lookup(c"eglGetDisplay")?,
            eglGetError: dl.lookup(c"eglGetError")?,
            eglGetProcAddress: dl.lookup(c"eglGetProcAddress")?,
            eglInitialize: dl.lookup(c"eglInitialize")?,
            eglMakeCurrent: dl.lookup(c"eglMakeCurrent")?,
            eglQueryString: dl.lookup(c"eglQueryString")?,
            eglSwapBuffers: dl.lookup(c"eglSwapBuffers")?,
            eglSwapInterval: dl.lookup(c"eglSwapInterval")?,
            eglTerminate: dl.lookup(c"eglTerminate")?,

            _dl: dl,
        })
    }
}
