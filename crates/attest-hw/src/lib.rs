//! attest-hw — Camera hardware abstraction for the liveness loop.
//!
//! V4L2 capture with pixel-format negotiation (YUYV/GREY/Y16 to 8-bit
//! grayscale) and JPEG encoding of captured frames.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use frame::{Frame, FrameError};
