use crate::capture::domain::frame_source::{FrameAcquisitionError, FrameSource};
use crate::shared::frame::Frame;

/// Pulls frames from any ffmpeg-readable input (file, stream URL, device
/// path) and scales them to a fixed RGB size.
///
/// End of stream and decode failures surface as transient read errors.
pub struct FfmpegCaptureSource {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    video_stream_index: usize,
    width: u32,
    height: u32,
    next_index: usize,
    eof_sent: bool,
}

// Safety: FfmpegCaptureSource is owned and driven by a single session thread.
// The raw pointers inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegCaptureSource {}

impl FfmpegCaptureSource {
    pub fn open(input: &str, width: u32, height: u32) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(input)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let video_stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "Opened capture {input} ({}x{} -> {width}x{height})",
            decoder.width(),
            decoder.height()
        );

        Ok(Self {
            input_ctx: Some(ictx),
            decoder: Some(decoder),
            scaler: Some(scaler),
            video_stream_index,
            width,
            height,
            next_index: 0,
            eof_sent: false,
        })
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, FrameAcquisitionError> {
        let (Some(decoder), Some(scaler)) = (self.decoder.as_mut(), self.scaler.as_mut()) else {
            return Err(FrameAcquisitionError::Closed);
        };
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler
            .run(&decoded, &mut rgb_frame)
            .map_err(|e| FrameAcquisitionError::Decode(e.to_string()))?;

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }
}

impl FrameSource for FfmpegCaptureSource {
    fn read(&mut self) -> Result<Frame, FrameAcquisitionError> {
        if let Some(frame) = self.try_receive()? {
            return Ok(frame);
        }
        if self.eof_sent {
            return Err(FrameAcquisitionError::EndOfStream);
        }

        loop {
            let (Some(ictx), Some(decoder)) = (self.input_ctx.as_mut(), self.decoder.as_mut())
            else {
                return Err(FrameAcquisitionError::Closed);
            };

            let next = ictx
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            let Some((stream_index, packet)) = next else {
                let _ = decoder.send_eof();
                self.eof_sent = true;
                return self
                    .try_receive()?
                    .ok_or(FrameAcquisitionError::EndOfStream);
            };
            if stream_index != self.video_stream_index {
                continue;
            }
            decoder
                .send_packet(&packet)
                .map_err(|e| FrameAcquisitionError::Decode(e.to_string()))?;

            if let Some(frame) = self.try_receive()? {
                return Ok(frame);
            }
        }
    }

    fn close(&mut self) {
        self.scaler = None;
        self.decoder = None;
        self.input_ctx = None;
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping the per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_input_fails() {
        assert!(FfmpegCaptureSource::open("/nonexistent/capture.mp4", 64, 48).is_err());
    }
}
