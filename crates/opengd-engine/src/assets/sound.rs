use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;

use super::{AssetError, AssetLoader};

/// Fully decoded audio clip.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundData {
    pub path: PathBuf,
    /// Interleaved samples in `[-1, 1]`.
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
    /// Tempo from the file's BPM tag, if it has one.
    pub bpm: Option<u32>,
}

impl SoundData {
    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.channels) / f64::from(self.sample_rate)
    }
}

/// Decodes any container/codec symphonia knows into [`SoundData`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SoundLoader;

impl AssetLoader<SoundData> for SoundLoader {
    fn load(&mut self, path: &Path) -> Result<SoundData, AssetError> {
        let audio_err = |message: String| AssetError::Audio {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| audio_err(e.to_string()))?;

        // Tags can live before the container (ID3) or inside it.
        let mut bpm = probed.metadata.get().and_then(|m| m.current().and_then(bpm_tag));
        let mut format = probed.format;
        if bpm.is_none() {
            bpm = format.metadata().current().and_then(bpm_tag);
        }

        let track = format
            .default_track()
            .ok_or_else(|| audio_err("no default audio track".to_string()))?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| audio_err("unknown sample rate".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .ok_or_else(|| audio_err("unknown channel layout".to_string()))?
            .count() as u16;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| audio_err(e.to_string()))?;

        let mut samples = Vec::<f32>::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(audio_err(e.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("skipping corrupt packet in {}: {e}", path.display());
                }
                Err(e) => return Err(audio_err(e.to_string())),
            }
        }

        Ok(SoundData {
            path: path.to_path_buf(),
            samples,
            channels,
            sample_rate,
            bpm,
        })
    }
}

fn bpm_tag(revision: &MetadataRevision) -> Option<u32> {
    revision
        .tags()
        .iter()
        .find(|t| t.std_key == Some(StandardTagKey::Bpm))
        .and_then(|t| parse_bpm(&t.value.to_string()))
}

fn parse_bpm(raw: &str) -> Option<u32> {
    let v: f64 = raw.trim().parse().ok()?;
    (v.is_finite() && v > 0.0).then(|| v.round() as u32)
}
