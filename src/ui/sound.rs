/// Sound engine: procedural sound effects via rodio.
///
/// Every effect is synthesised into an in-memory WAV buffer at start-up,
/// standing in for the `jump` asset and friends. Playback is
/// fire-and-forget through a detached rodio Sink.
///
/// Without the "sound" feature the stub SoundEngine does nothing.

use crate::sim::event::GameEvent;

/// Which effect, if any, an event triggers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Jump,
    Carrot,
    GameOver,
}

impl Sfx {
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::CarrotCollected { .. } => Some(Sfx::Carrot),
            GameEvent::GameOver { .. } => Some(Sfx::GameOver),
            _ => None,
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = 2.0 * std::f32::consts::PI;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_carrot: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, running silent: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_carrot: Arc::new(make_wav(&gen_carrot())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Jump => &self.sfx_jump,
                Sfx::Carrot => &self.sfx_carrot,
                Sfx::GameOver => &self.sfx_game_over,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Jump: quick upward sweep with a soft square edge.
    fn gen_jump() -> Vec<f32> {
        let duration = 0.16;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 220.0 + t * t * 660.0; // 220Hz → 880Hz
                phase += freq / SAMPLE_RATE as f32;
                let wave = (phase * TAU).sin() * 0.75 + (phase * 3.0 * TAU).sin() * 0.25;
                let env = (1.0 - t).powf(0.7);
                wave * env * 0.25
            })
            .collect()
    }

    /// Carrot: two bright notes, E6 then A6.
    fn gen_carrot() -> Vec<f32> {
        let notes = [(1319.0_f32, 0.05), (1760.0, 0.09)];
        let mut samples = Vec::new();
        for &(freq, dur) in &notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                samples.push((t * freq * TAU).sin() * env * 0.25);
            }
        }
        samples
    }

    /// Game over: falling three-note phrase with a tail fade.
    fn gen_game_over() -> Vec<f32> {
        let notes = [392.0_f32, 330.0, 262.0]; // G4 → E4 → C4
        let note_dur = 0.16;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                samples.push((t * freq * TAU).sin() * env * 0.3);
            }
        }
        let total = samples.len();
        let fade_len = total / 3;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM in a RIFF/WAVE container
    // ════════════════════════════════════════════════════════════

    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    const FORMAT_PCM: u16 = 1;

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        chunk_header(&mut buf, b"RIFF", 36 + data_len);
        buf.extend_from_slice(b"WAVE");

        chunk_header(&mut buf, b"fmt ", 16);
        for field in [FORMAT_PCM, CHANNELS] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        for field in [SAMPLE_RATE, SAMPLE_RATE * block_align as u32] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        for field in [block_align, BITS_PER_SAMPLE] {
            buf.extend_from_slice(&field.to_le_bytes());
        }

        chunk_header(&mut buf, b"data", data_len);
        buf.extend(
            samples
                .iter()
                .flat_map(|&s| ((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes()),
        );
        buf
    }

    fn chunk_header(buf: &mut Vec<u8>, id: &[u8; 4], len: u32) {
        buf.extend_from_slice(id);
        buf.extend_from_slice(&len.to_le_bytes());
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
