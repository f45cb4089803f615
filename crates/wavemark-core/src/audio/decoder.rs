//! Decoders for the supported container formats

use super::{resample_to_target, AudioFormat};
use crate::error::FingerprintError;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio in canonical form: mono f32 at the requested sample rate
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_ms: u32,
}

impl AudioData {
    pub fn duration_s(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Raw decoder output before canonicalization
struct RawAudio {
    /// Interleaved samples
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl RawAudio {
    /// Downmix to mono by averaging channels
    fn to_mono(self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples;
        }
        let channels = self.channels as usize;
        self.samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }
}

/// Decode an audio file to mono samples at `target_sample_rate`.
///
/// Unknown extensions are rejected before any decode attempt; decoder
/// failures surface as [`FingerprintError::Decode`].
pub fn decode_audio(path: &Path, target_sample_rate: u32) -> Result<AudioData, FingerprintError> {
    let format = AudioFormat::from_path(path);
    if format == AudioFormat::Unknown {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)");
        return Err(FingerprintError::UnsupportedFormat(ext.to_string()));
    }

    if !path.exists() {
        return Err(FingerprintError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("audio file not found: {}", path.display()),
        )));
    }

    let raw = match format {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_mp3(path)?,
        AudioFormat::Flac => decode_flac(path)?,
        AudioFormat::Ogg => decode_ogg(path)?,
        AudioFormat::M4a => decode_m4a(path)?,
        AudioFormat::Unknown => unreachable!("rejected above"),
    };

    let source_rate = raw.sample_rate;
    if source_rate == 0 {
        return Err(FingerprintError::decode(path, "no decodable audio frames"));
    }

    let mono = raw.to_mono();
    let samples = if source_rate == target_sample_rate {
        mono
    } else {
        resample_to_target(&mono, source_rate, target_sample_rate)
    };

    let duration_ms = (samples.len() as f64 / target_sample_rate as f64 * 1000.0) as u32;

    Ok(AudioData {
        samples,
        sample_rate: target_sample_rate,
        duration_ms,
    })
}

fn decode_wav(path: &Path) -> Result<RawAudio, FingerprintError> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| FingerprintError::decode(path, e))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FingerprintError::decode(path, e))?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| FingerprintError::decode(path, e))?
        }
    };

    Ok(RawAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

fn decode_mp3(path: &Path) -> Result<RawAudio, FingerprintError> {
    let data = std::fs::read(path)?;
    let mut decoder = minimp3::Decoder::new(&data[..]);

    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                samples.extend(frame.data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(FingerprintError::decode(path, e)),
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

fn decode_flac(path: &Path) -> Result<RawAudio, FingerprintError> {
    let mut reader =
        claxon::FlacReader::open(path).map_err(|e| FingerprintError::decode(path, e))?;

    let info = reader.streaminfo();
    let max_val = (1i64 << (info.bits_per_sample - 1)) as f32;

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / max_val))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FingerprintError::decode(path, e))?;

    Ok(RawAudio {
        samples,
        sample_rate: info.sample_rate,
        channels: info.channels as u16,
    })
}

fn decode_ogg(path: &Path) -> Result<RawAudio, FingerprintError> {
    let file = std::fs::File::open(path)?;
    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)
        .map_err(|e| FingerprintError::decode(path, e))?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    loop {
        match reader.read_dec_packet_itl() {
            Ok(Some(packet)) => samples.extend(packet.iter().map(|&s| s as f32 / 32768.0)),
            Ok(None) => break,
            Err(e) => return Err(FingerprintError::decode(path, e)),
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode M4A/AAC via Symphonia
fn decode_m4a(path: &Path) -> Result<RawAudio, FingerprintError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| FingerprintError::decode(path, e))?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| FingerprintError::decode(path, "no audio track"))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2) as u16;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| FingerprintError::decode(path, e))?;

    let mut samples = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(FingerprintError::decode(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        // Skip corrupted packets, keep what decodes
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(_) => continue,
        };

        append_interleaved(&decoded, &mut samples)
            .map_err(|reason| FingerprintError::decode(path, reason))?;
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Interleave a Symphonia buffer into f32 samples
fn append_interleaved(buf: &AudioBufferRef<'_>, out: &mut Vec<f32>) -> Result<(), &'static str> {
    macro_rules! interleave {
        ($b:expr, $convert:expr) => {{
            let channels = $b.spec().channels.count();
            for frame in 0..$b.frames() {
                for ch in 0..channels {
                    out.push($convert($b.chan(ch)[frame]));
                }
            }
        }};
    }

    match buf {
        AudioBufferRef::F32(b) => interleave!(b, |v: f32| v),
        AudioBufferRef::F64(b) => interleave!(b, |v: f64| v as f32),
        AudioBufferRef::S32(b) => interleave!(b, |v: i32| v as f32 / i32::MAX as f32),
        AudioBufferRef::S16(b) => interleave!(b, |v: i16| v as f32 / i16::MAX as f32),
        AudioBufferRef::U8(b) => interleave!(b, |v: u8| (v as f32 - 128.0) / 128.0),
        _ => return Err("unsupported sample format"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_downmix_averages_channels() {
        let raw = RawAudio {
            samples: vec![1.0, -1.0, 0.5, 0.5],
            sample_rate: 22050,
            channels: 2,
        };
        let mono = raw.to_mono();
        assert_eq!(mono, vec![0.0, 0.5]);
    }

    #[test]
    fn test_mono_passthrough() {
        let raw = RawAudio {
            samples: vec![0.1, 0.2, 0.3],
            sample_rate: 22050,
            channels: 1,
        };
        assert_eq!(raw.to_mono(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_unknown_extension_rejected_before_decode() {
        let err = decode_audio(Path::new("/nonexistent/file.txt"), 22050).unwrap_err();
        assert!(matches!(err, FingerprintError::UnsupportedFormat(_)));
    }
}
