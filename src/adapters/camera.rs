//! Photo capture from a video input device.
//!
//! A [`CaptureSession`] holds the device stream exclusively for as long as
//! the capture view is open. The stream is stopped when the session is
//! confirmed, cancelled, or dropped, whichever comes first, and exactly once.
//! The session never writes to the store; the confirmed image is returned to
//! the caller to attach to a report draft.

use std::future::Future;

use crate::model::ImageRef;

/// Which camera to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera; what a citizen photographing a pothole wants.
    #[default]
    Environment,
    User,
}

/// Errors reported while acquiring or reading a camera.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// No camera API on this platform.
    #[error("camera capture is not supported on this platform")]
    Unsupported,

    /// The user or platform refused camera access.
    #[error("camera access was denied")]
    PermissionDenied,

    /// The device exists but could not be opened or read.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The stream has no frame to grab yet.
    #[error("no frame available")]
    NoFrame,
}

/// A live video stream from an opened device.
pub trait MediaStream: Send {
    /// Encode the current frame as an image reference (e.g. a JPEG data URL).
    fn grab_frame(&mut self) -> Result<ImageRef, CaptureError>;

    /// Stop every track and release the device.
    fn stop(&mut self);
}

/// A platform camera that can be opened into a [`MediaStream`].
pub trait CameraDevice: Send + Sync {
    type Stream: MediaStream;

    /// Acquire the device. Suspends while the platform asks the user.
    fn open(&self, facing: FacingMode) -> impl Future<Output = Result<Self::Stream, CaptureError>> + Send;
}

/// One visit to the capture view: zero or one image comes out of it.
pub struct CaptureSession<S: MediaStream> {
    stream: Option<S>,
    pending: Option<ImageRef>,
}

impl<S: MediaStream> CaptureSession<S> {
    /// Open the rear camera and start a session.
    ///
    /// # Errors
    ///
    /// Returns the device's [`CaptureError`] if it cannot be acquired.
    pub async fn start<C>(camera: &C) -> Result<Self, CaptureError>
    where
        C: CameraDevice<Stream = S>,
    {
        Self::start_facing(camera, FacingMode::Environment).await
    }

    /// Open a specific camera and start a session.
    ///
    /// # Errors
    ///
    /// Returns the device's [`CaptureError`] if it cannot be acquired.
    pub async fn start_facing<C>(camera: &C, facing: FacingMode) -> Result<Self, CaptureError>
    where
        C: CameraDevice<Stream = S>,
    {
        match camera.open(facing).await {
            Ok(stream) => Ok(Self {
                stream: Some(stream),
                pending: None,
            }),
            Err(e) => {
                tracing::warn!(error = %e, ?facing, "unable to access camera");
                Err(e)
            }
        }
    }

    /// Grab the current frame as the pending photo, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoFrame`] (or the stream's own error) if no
    /// frame can be read; the previous pending photo is kept in that case.
    pub fn capture(&mut self) -> Result<&ImageRef, CaptureError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::NoFrame)?;
        let frame = stream.grab_frame()?;
        Ok(self.pending.insert(frame))
    }

    /// The photo awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&ImageRef> {
        self.pending.as_ref()
    }

    /// Discard the pending photo. The stream stays open for another shot.
    pub fn retake(&mut self) {
        self.pending = None;
    }

    /// Accept the pending photo, release the device and return the photo.
    ///
    /// # Errors
    ///
    /// Hands the session back unchanged if nothing has been captured yet.
    pub fn confirm(mut self) -> Result<ImageRef, Self> {
        match self.pending.take() {
            Some(image) => {
                self.release();
                Ok(image)
            }
            None => Err(self),
        }
    }

    /// Close the view without a photo, releasing the device.
    pub fn cancel(mut self) {
        self.pending = None;
        self.release();
    }

    /// Whether the device is still held.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("camera stream released");
        }
    }
}

impl<S: MediaStream> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}
