/// One audio stream built from per-segment synthesis output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledAudio {
    pub bytes: Vec<u8>,
    pub byte_length: usize,
}

/// Concatenate synthesized segment buffers in the order given.
///
/// No re-encoding happens here: every buffer must come from the same
/// synthesizer configuration (codec and bitrate) for the result to play back
/// as one MP3 stream.
pub fn assemble<I>(buffers: I) -> AssembledAudio
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut bytes = Vec::new();
    for buffer in buffers {
        bytes.extend_from_slice(&buffer);
    }

    let byte_length = bytes.len();
    AssembledAudio { bytes, byte_length }
}
