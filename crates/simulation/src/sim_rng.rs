//! Simulation RNG resource.
//!
//! Every stochastic decision in the kernel (walk direction flips, category
//! draws, tenant churn, walk-ins, bus drop-offs, tourist arrivals) draws from
//! `ResMut<SimRng>` rather than `rand::thread_rng()`. The game seeds it from
//! entropy; tests seed it explicitly so a scenario replays identically.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 7;

/// Full ChaCha8 state so the stream resumes exactly after a restore.
#[derive(Encode, Decode)]
struct RngState {
    seed: [u8; 32],
    word_pos: u128,
    stream: u64,
}

#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Bernoulli trial. Probabilities outside `[0, 1]` are clamped.
    pub fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.0.gen_bool(probability)
    }

    /// Uniform `f64` in `[0, 1)`.
    pub fn roll(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    /// Uniform index into a collection of `len` items, `None` when empty.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.0.gen_range(0..len))
        }
    }

    /// Uniform draw from `[lo, hi)`; `lo` when the range is empty.
    pub fn between(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo {
            self.0.gen_range(lo..hi)
        } else {
            lo
        }
    }

    /// `f32` flavour of [`SimRng::between`].
    pub fn between_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.0.gen_range(lo..hi)
        } else {
            lo
        }
    }

    /// `-1.0` or `+1.0` with equal probability.
    pub fn direction(&mut self) -> f32 {
        if self.0.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }
}

impl crate::Saveable for SimRng {
    const SAVE_KEY: &'static str = "sim_rng";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        let state = RngState {
            seed: self.0.get_seed(),
            word_pos: self.0.get_word_pos(),
            stream: self.0.get_stream(),
        };
        Some(bitcode::encode(&state))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        match bitcode::decode::<RngState>(bytes) {
            Ok(state) => {
                let mut rng = ChaCha8Rng::from_seed(state.seed);
                rng.set_stream(state.stream);
                rng.set_word_pos(state.word_pos);
                Self(rng)
            }
            Err(e) => {
                warn!("SimRng: failed to decode saved state, reseeding: {}", e);
                Self::default()
            }
        }
    }
}

pub struct SimRngPlugin;

impl Plugin for SimRngPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimRng>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<SimRng>();
    }
}
