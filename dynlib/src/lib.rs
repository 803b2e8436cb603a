use std::ffi::{CStr, c_void};
use std::mem::{size_of, transmute_copy};
use std::ptr::NonNull;
use std::{error, fmt};

use libc::{dlclose, dlerror, dlopen, dlsym};

#[derive(Debug)]
pub enum Error {
    CouldNotOpen { filename: String, reason: String },
    CouldNotLookup { name: String, reason: String },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CouldNotOpen { filename, reason } => {
                f.write_fmt(format_args!("could not open {filename}: {reason}"))
            }
            Self::CouldNotLookup { name, reason } => {
                f.write_fmt(format_args!("could not lookup {name}: {reason}"))
            }
        }
    }
}

/// NOTE: the string returned by dlerror is owned by libc; it must be copied out and never freed.
fn take_dlerror() -> Option<String> {
    let err = unsafe { dlerror() };
    if err.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned())
    }
}

pub struct DynLib(NonNull<c_void>);

impl DynLib {
    pub fn open(filename: &CStr) -> Result<Self, Error> {
        let handle = unsafe { dlopen(filename.as_ptr(), libc::RTLD_LAZY) };
        NonNull::new(handle).map(Self).ok_or_else(|| Error::CouldNotOpen {
            filename: filename.to_string_lossy().into_owned(),
            reason: take_dlerror().unwrap_or_else(|| "unknown dlerror".to_string()),
        })
    }

    /// tries each filename in order, returns the error of the last one if none of them could be
    /// opened.
    pub fn open_any(filenames: &[&CStr]) -> Result<Self, Error> {
        assert!(!filenames.is_empty());

        let mut last_err = None;
        for filename in filenames {
            match Self::open(filename) {
                Ok(this) => return Ok(this),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| unreachable!()))
    }

    /// F must be a function pointer type (or anything else pointer-sized).
    pub fn lookup<F: Copy>(&self, name: &CStr) -> Result<F, Error> {
        assert_eq!(size_of::<F>(), size_of::<*mut c_void>());

        // NOTE: clear any stale error; a null symbol is not necessarily an error.
        _ = take_dlerror();

        let addr = unsafe { dlsym(self.0.as_ptr(), name.as_ptr()) };
        match take_dlerror() {
            Some(reason) => Err(Error::CouldNotLookup {
                name: name.to_string_lossy().into_owned(),
                reason,
            }),
            None if addr.is_null() => Err(Error::CouldNotLookup {
                name: name.to_string_lossy().into_owned(),
                reason: "symbol resolved to null".to_string(),
            }),
            None => Ok(unsafe { transmute_copy(&addr) }),
        }
    }
}

impl Drop for DynLib {
    fn drop(&mut self) {
        unsafe {
            dlclose(self.0.as_ptr());
        }
    }
}

#[macro_export]
macro_rules! opaque_struct {
    ($name:ident) => {
        #[repr(C)]
        pub struct $name {
            _data: [u8; 0],
            _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
        }
    };
}

#[test]
fn test_open_missing_library() {
    let err = DynLib::open(c"libdefinitely-not-there.so.42")
        .err()
        .expect("open must fail");
    assert!(matches!(err, Error::CouldNotOpen { .. }));
    assert!(err.to_string().contains("libdefinitely-not-there.so.42"));
}

#[test]
fn test_open_any_reports_last_failure() {
    let err = DynLib::open_any(&[c"libnope-a.so", c"libnope-b.so"])
        .err()
        .expect("open must fail");
    match err {
        Error::CouldNotOpen { filename, .. } => assert_eq!(filename, "libnope-b.so"),
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_lookup() {
    let libc = DynLib::open_any(&[c"libc.so.6", c"libc.so"]).expect("libc is always around");

    let strlen = libc
        .lookup::<unsafe extern "C" fn(*const std::ffi::c_char) -> usize>(c"strlen")
        .expect("strlen is always around");
    assert_eq!(unsafe { strlen(c"four".as_ptr()) }, 4);

    let err = libc
        .lookup::<unsafe extern "C" fn()>(c"definitely_not_a_symbol")
        .err()
        .expect("lookup must fail");
    assert!(matches!(err, Error::CouldNotLookup { .. }));
}
