/// Minimum denominator used when dividing by medium-time power.
pub const MIN_DENOMINATOR: f32 = 1e-4;

/// Initial running-mean seed of the mean-power normalizer.
pub const RUNNING_MEAN_SEED: f64 = 1e-4;

/// Frame 0 of a floor tracker is this fraction of its input.
pub const FLOOR_SEED_SCALE: f32 = 0.9;

// Slaney mel scale: linear below 1 kHz, logarithmic above.
const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
// ln(6.4) / 27
const LOGSTEP: f32 = 0.068_751_78;

#[inline]
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / LOGSTEP
    } else {
        hz / F_SP
    }
}

#[inline]
pub fn mel_to_hz(mel: f32) -> f32 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (LOGSTEP * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mel_scale_is_linear_below_1khz() {
        assert!((hz_to_mel(200.0) - 3.0).abs() < 1e-5);
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-4);
        assert!((mel_to_hz(3.0) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn mel_scale_inverts_above_1khz() {
        for hz in [1000.0f32, 2500.0, 8000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((back - hz).abs() / hz < 1e-4, "{hz} -> {back}");
        }
    }
}
