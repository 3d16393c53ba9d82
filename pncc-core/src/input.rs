//! Audio file decoding (WAV, FLAC, ... via `symphonia`) to mono f32.
//!
//! Multi-channel audio is down-mixed by averaging channels.

use std::fs::File;
use std::path::Path;

use log::debug;
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("invalid-data: {0}")]
    InvalidData(String),
}

#[derive(Clone, Debug)]
pub struct DecodedAudio {
    /// Mono samples in [-1, 1].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source before down-mixing.
    pub channels: u16,
    pub bits_per_sample: Option<u32>,
}

impl DecodedAudio {
    pub fn duration_s(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f32 / self.sample_rate as f32
        }
    }
}

pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedAudio, InputError> {
    let file = File::open(&path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.as_ref().extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| InputError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| InputError::InvalidData("No default audio track".into()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| InputError::Unsupported(e.to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| InputError::InvalidData("Missing sample rate".into()))?;
    let bits_per_sample = track
        .codec_params
        .bits_per_coded_sample
        .or(track.codec_params.bits_per_sample);
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(1);

    let mut samples = Vec::<f32>::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::ResetRequired) => {
                return Err(InputError::Decode(
                    "Decoder requires a reset (unsupported midstream change)".into(),
                ));
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(InputError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| InputError::Decode(e.to_string()))?;
        let spec = *decoded.spec();
        let ch = spec.channels.count();
        let mut sbuf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sbuf.copy_interleaved_ref(decoded);
        push_interleaved_as_mono(sbuf.samples(), ch, &mut samples);
    }

    debug!(
        "decoded {} samples @ {} Hz from {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );
    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
        bits_per_sample,
    })
}

fn push_interleaved_as_mono(samples: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(samples);
        return;
    }
    let inv = 1.0 / channels as f32;
    out.extend(
        samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * inv),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels() {
        let mut out = Vec::new();
        push_interleaved_as_mono(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn mono_passes_through() {
        let mut out = vec![0.25];
        push_interleaved_as_mono(&[0.1, 0.2], 1, &mut out);
        assert_eq!(out, vec![0.25, 0.1, 0.2]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode_file("does/not/exist.wav").unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }
}
