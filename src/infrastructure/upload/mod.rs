mod staged_audio;

pub use staged_audio::StagedAudio;
