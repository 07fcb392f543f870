//! Local Work Simulator
//!
//! A deterministic CPU loop standing in for real node-local computation. Cost grows
//! with payload length plus a fixed number of mixing rounds.

use std::time::Instant;

const MULTIPLIER: u64 = 1_315_423_911;
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;
pub const MIXING_ROUNDS: usize = 1000;

/// Output of one local work run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalWork {
    pub elapsed_ms: u64,
    /// `node=<name>;acc=0x<16 hex digits>;`
    pub data: Vec<u8>,
}

pub fn do_local_work(payload: &[u8], node_name: &str) -> LocalWork {
    let started = Instant::now();

    let mut acc = payload.iter().fold(0u64, |acc, &byte| {
        acc.wrapping_mul(MULTIPLIER).wrapping_add(byte as u64) ^ GOLDEN
    });

    for _ in 0..MIXING_ROUNDS {
        acc ^= acc << 13;
        acc ^= acc >> 7;
        acc ^= acc << 17;
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;

    LocalWork {
        elapsed_ms,
        data: format!("node={};acc=0x{:016x};", node_name, acc).into_bytes(),
    }
}
