use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use rodio::{source::SineWave, Decoder, OutputStream, Sink, Source};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Short UI sounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Cue {
    Select,
    Error,
    Sparkle,
}

impl Cue {
    fn tone(self) -> (f32, u64) {
        match self {
            Cue::Select => (880.0, 40),
            Cue::Error => (196.0, 140),
            Cue::Sparkle => (1568.0, 120),
        }
    }
}

pub fn play_cue(cue: Cue) {
    std::thread::spawn(move || {
        let Ok((stream, handle)) = OutputStream::try_default() else {
            return;
        };
        let Ok(sink) = Sink::try_new(&handle) else {
            return;
        };
        let (freq, millis) = cue.tone();
        let source = SineWave::new(freq)
            .take_duration(Duration::from_millis(millis))
            .amplify(0.15);
        sink.append(source);
        sink.sleep_until_end();
        drop(stream);
    });
}

/// Play `<assets>/cries/<id>.ogg` if it exists
pub fn play_cry(path: PathBuf) {
    std::thread::spawn(move || {
        let Ok(file) = File::open(&path) else {
            return;
        };
        let Ok(source) = Decoder::new(BufReader::new(file)) else {
            return;
        };
        let Ok((stream, handle)) = OutputStream::try_default() else {
            return;
        };
        let Ok(sink) = Sink::try_new(&handle) else {
            return;
        };
        sink.append(source);
        sink.sleep_until_end();
        drop(stream);
    });
}
