use rex_core::derive_substream_seed;

/// Derives the deterministic stream seed for a specific replica.
pub fn replica_seed(master_seed: u64, replica_index: usize) -> u64 {
    derive_substream_seed(master_seed, replica_index as u64)
}

/// Derives the per-epoch seed consumed by the integrator's internal stream.
pub fn epoch_seed(stream_seed: u64, stream_epoch: u64) -> u64 {
    derive_substream_seed(stream_seed, stream_epoch)
}

/// Deterministic seed for the acceptance draw of one exchange attempt.
///
/// Keyed by round and the lower rung of the pair, so the draw sequence is
/// independent of pairing scheme and of how attempts interleave with other
/// work, which reproducible replay requires.
pub fn exchange_seed(master_seed: u64, round: usize, pair_index: usize) -> u64 {
    derive_substream_seed(
        master_seed ^ 0xA5A5_A5A5_A5A5_A5A5,
        (round as u64) << 16 | pair_index as u64,
    )
}
