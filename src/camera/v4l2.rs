use crate::camera::{Frame, FrameSource};
use crate::common::config::CameraConfig;
use crate::common::{VjError, Result};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, RgbImage};
use std::fs;

const STREAM_BUFFERS: u32 = 4;

/// Pixel layouts we know how to turn into an RGB frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Mjpeg,
    Yuyv,
    Grey,
}

impl PixelFormat {
    pub fn from_fourcc(fourcc: &FourCC) -> Option<Self> {
        match &fourcc.repr {
            b"MJPG" => Some(Self::Mjpeg),
            b"YUYV" => Some(Self::Yuyv),
            b"GREY" => Some(Self::Grey),
            _ => None,
        }
    }

    pub fn decode(self, data: &[u8], width: u32, height: u32) -> Result<Frame> {
        match self {
            Self::Mjpeg => mjpeg_to_rgb(data),
            Self::Yuyv => yuyv_to_rgb(data, width, height),
            Self::Grey => grey_to_rgb(data, width, height),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: u32,
    pub card: String,
    pub formats: Vec<String>,
    pub can_capture: bool,
}

pub struct Camera {
    index: u32,
    device: Option<Device>,
    stream: Option<Stream<'static>>,
    format: PixelFormat,
    width: u32,
    height: u32,
}

impl Camera {
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let index = config.device_index;
        let unavailable = |reason: String| VjError::DeviceUnavailable { index, reason };

        tracing::info!("Opening camera device {}...", index);
        let device = Device::new(index as usize)
            .map_err(|e| unavailable(format!("failed to open /dev/video{}: {}", index, e)))?;

        let caps = device.query_caps()
            .map_err(|e| unavailable(format!("failed to query capabilities: {}", e)))?;
        tracing::debug!("Device {} is '{}' with capabilities {:?}", index, caps.card, caps.capabilities);

        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            tracing::warn!("Device {} may not support standard video capture", index);
        }

        let mut fmt = device.format()
            .map_err(|e| unavailable(format!("failed to get format: {}", e)))?;
        fmt.width = config.width;
        fmt.height = config.height;
        fmt.fourcc = FourCC::new(b"MJPG");

        if let Err(e) = device.set_format(&fmt) {
            tracing::warn!("Could not set {}x{} MJPG: {}. Using device defaults.", config.width, config.height, e);
        }

        let actual = device.format()
            .map_err(|e| unavailable(format!("failed to get final format: {}", e)))?;
        let format = PixelFormat::from_fourcc(&actual.fourcc).ok_or_else(|| {
            unavailable(format!("unsupported pixel format {}", actual.fourcc))
        })?;

        if actual.width != config.width || actual.height != config.height {
            tracing::warn!(
                "Camera resolution {}x{} differs from requested {}x{}",
                actual.width, actual.height, config.width, config.height
            );
        }
        tracing::info!("Capturing {}x{} {:?}", actual.width, actual.height, format);

        let mut stream = Stream::with_buffers(&device, Type::VideoCapture, STREAM_BUFFERS)
            .map_err(|e| unavailable(format!("failed to create stream: {}", e)))?;

        for i in 0..config.warmup_frames {
            stream.next()
                .map_err(|e| unavailable(format!("failed to capture warmup frame {}: {}", i, e)))?;
        }

        Ok(Self {
            index,
            device: Some(device),
            stream: Some(stream),
            format,
            width: actual.width,
            height: actual.height,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// List every `/dev/video*` node that answers a capability query.
    pub fn list_devices() -> Result<Vec<DeviceInfo>> {
        let mut devices = Vec::new();

        for entry in fs::read_dir("/dev")? {
            let entry = entry?;
            let name = entry.file_name();
            let index = match name.to_str()
                .and_then(|n| n.strip_prefix("video"))
                .and_then(|n| n.parse::<u32>().ok())
            {
                Some(index) => index,
                None => continue,
            };

            let Ok(device) = Device::new(index as usize) else { continue };
            let Ok(caps) = device.query_caps() else { continue };

            let formats = device.enum_formats()
                .unwrap_or_default()
                .iter()
                .map(|f| f.fourcc.to_string())
                .collect();

            devices.push(DeviceInfo {
                index,
                card: caps.card.clone(),
                formats,
                can_capture: caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE),
            });
        }

        devices.sort_by_key(|d| d.index);
        Ok(devices)
    }
}

impl FrameSource for Camera {
    fn read_frame(&mut self) -> Result<Frame> {
        let stream = self.stream.as_mut()
            .ok_or_else(|| VjError::CaptureFailure("camera already released".into()))?;

        let (buf, meta) = stream.next()
            .map_err(|e| VjError::CaptureFailure(e.to_string()))?;

        let used = meta.bytesused as usize;
        let data = if used > 0 && used <= buf.len() { &buf[..used] } else { buf };

        self.format.decode(data, self.width, self.height)
    }

    fn release(&mut self) {
        let had_stream = self.stream.take().is_some();
        let had_device = self.device.take().is_some();
        if had_stream || had_device {
            tracing::info!("Released camera device {}", self.index);
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.release();
    }
}

fn mjpeg_to_rgb(data: &[u8]) -> Result<Frame> {
    image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .map(|img| img.to_rgb8())
        .map_err(|e| VjError::CaptureFailure(format!("failed to decode MJPG frame: {}", e)))
}

fn grey_to_rgb(data: &[u8], width: u32, height: u32) -> Result<Frame> {
    let needed = (width * height) as usize;
    if data.len() < needed {
        return Err(VjError::CaptureFailure(format!(
            "short GREY frame: {} bytes, expected {}", data.len(), needed
        )));
    }

    let buffer = ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data[..needed].to_vec())
        .ok_or_else(|| VjError::CaptureFailure("failed to create grayscale image buffer".into()))?;

    Ok(DynamicImage::ImageLuma8(buffer).to_rgb8())
}

fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Result<Frame> {
    let needed = (width * height * 2) as usize;
    if width % 2 != 0 || data.len() < needed {
        return Err(VjError::CaptureFailure(format!(
            "bad YUYV frame: {} bytes for {}x{}", data.len(), width, height
        )));
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    // Each 4-byte group carries two pixels sharing one chroma pair (BT.601).
    for chunk in data[..needed].chunks_exact(4) {
        let (u, v) = (chunk[1] as i32 - 128, chunk[3] as i32 - 128);
        for y in [chunk[0], chunk[2]] {
            let c = 298 * (y as i32 - 16);
            rgb.push(clamp_channel((c + 409 * v + 128) >> 8));
            rgb.push(clamp_channel((c - 100 * u - 208 * v + 128) >> 8));
            rgb.push(clamp_channel((c + 516 * u + 128) >> 8));
        }
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| VjError::CaptureFailure("failed to create RGB image buffer".into()))
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
