use std::{error, fmt};

use crate::config::LoopConfig;
use crate::event::EventRecord;

/// every variant names the setup step that failed. none of them are recoverable, there is no
/// degraded rendering mode to fall back to.
#[derive(Debug)]
pub enum ProvisionError {
    LibraryUnavailable(dynlib::Error),
    DisplayUnavailable,
    GraphicsDisplayUnavailable,
    GraphicsInitFailed(egl::wrap::Error),
    NoMatchingConfig(Option<egl::wrap::Error>),
    VisualLookupFailed,
    ColormapCreationFailed,
    WindowCreationFailed,
    ContextCreationFailed(egl::wrap::Error),
    SurfaceCreationFailed(egl::wrap::Error),
    MakeCurrentFailed(egl::wrap::Error),
}

impl error::Error for ProvisionError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::LibraryUnavailable(err) => Some(err),
            Self::GraphicsInitFailed(err)
            | Self::NoMatchingConfig(Some(err))
            | Self::ContextCreationFailed(err)
            | Self::SurfaceCreationFailed(err)
            | Self::MakeCurrentFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryUnavailable(err) => {
                f.write_fmt(format_args!("could not load system library: {err}"))
            }
            Self::DisplayUnavailable => f.write_str("could not open x display"),
            Self::GraphicsDisplayUnavailable => f.write_str("could not get egl display"),
            Self::GraphicsInitFailed(err) => {
                f.write_fmt(format_args!("could not initialize egl: {err}"))
            }
            Self::NoMatchingConfig(None) => f.write_str("no matching egl config"),
            Self::NoMatchingConfig(Some(err)) => {
                f.write_fmt(format_args!("could not choose egl config: {err}"))
            }
            Self::VisualLookupFailed => f.write_str("could not look up native visual"),
            Self::ColormapCreationFailed => f.write_str("could not create colormap"),
            Self::WindowCreationFailed => f.write_str("could not create window"),
            Self::ContextCreationFailed(err) => {
                f.write_fmt(format_args!("could not create egl context: {err}"))
            }
            Self::SurfaceCreationFailed(err) => {
                f.write_fmt(format_args!("could not create egl surface: {err}"))
            }
            Self::MakeCurrentFailed(err) => {
                f.write_fmt(format_args!("could not make egl context current: {err}"))
            }
        }
    }
}

/// window + graphics context pair that the loop drives once provisioning succeeded.
pub trait Platform {
    /// appends every event that is queued right now, never waits for more.
    fn drain_pending(&mut self, events: &mut Vec<EventRecord>) -> anyhow::Result<()>;
    fn present(&mut self) -> anyhow::Result<()>;
    /// destroys the surface and the window and closes the connection.
    fn shutdown(self);
}

pub trait Provisioner {
    type Platform: Platform;

    /// runs the whole setup sequence up to (and including) the vsync request. the window is
    /// mapped and the context is current on the calling thread when this returns.
    fn provision(&mut self, config: &LoopConfig) -> Result<Self::Platform, ProvisionError>;
}

#[test]
fn test_provision_error_names_the_step() {
    let err = ProvisionError::MakeCurrentFailed(egl::wrap::Error(egl::EGL_BAD_MATCH));
    assert_eq!(
        err.to_string(),
        "could not make egl context current: EGL_BAD_MATCH (0x3009)"
    );
    assert!(error::Error::source(&err).is_some());

    assert_eq!(
        ProvisionError::NoMatchingConfig(None).to_string(),
        "no matching egl config"
    );
    assert!(error::Error::source(&ProvisionError::DisplayUnavailable).is_none());
}
