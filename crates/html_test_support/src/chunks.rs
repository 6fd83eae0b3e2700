//! Deterministic and seeded chunk plans for streaming-equivalence tests.
//!
//! Plans split a byte string at fixed sizes, at markup-sensitive positions
//! (around `<`, `>`, quotes and `</`), and at seeded random positions so a CI
//! failure can be replayed from its label.

#[derive(Clone, Debug)]
pub struct ChunkPlan {
    pub label: String,
    /// Strictly increasing split offsets in `1..len`.
    pub boundaries: Vec<usize>,
}

impl ChunkPlan {
    pub fn split<'a>(&self, input: &'a [u8]) -> Vec<&'a [u8]> {
        let mut chunks = Vec::with_capacity(self.boundaries.len() + 1);
        let mut start = 0;
        for &end in &self.boundaries {
            chunks.push(&input[start..end]);
            start = end;
        }
        chunks.push(&input[start..]);
        chunks
    }
}

/// Build fixed-size, markup-boundary and `fuzz_runs` seeded plans for `input`.
///
/// Boundaries are byte offsets and may fall inside a UTF-8 sequence.
pub fn chunk_plans(input: &[u8], fuzz_runs: usize, seed: u64) -> Vec<ChunkPlan> {
    let len = input.len();
    let mut plans = Vec::new();
    for size in [1usize, 2, 3, 4, 7, 16, 64] {
        plans.push(ChunkPlan {
            label: format!("fixed size={size}"),
            boundaries: (1..len).filter(|i| i % size == 0).collect(),
        });
    }

    let markup = markup_boundaries(input);
    if !markup.is_empty() {
        plans.push(ChunkPlan {
            label: format!("markup boundaries count={}", markup.len()),
            boundaries: markup.clone(),
        });
    }

    let candidates: Vec<usize> = (1..len).collect();
    for run in 0..fuzz_runs {
        let run_seed = seed.wrapping_add(run as u64);
        let mut rng = Lcg::new(run_seed);
        let mut picks = candidates.clone();
        rng.shuffle(&mut picks);
        let count = 1 + rng.below(candidates.len().clamp(1, 32));
        picks.truncate(count);
        picks.sort_unstable();
        picks.dedup();
        plans.push(ChunkPlan {
            label: format!("seeded seed=0x{run_seed:016x}"),
            boundaries: picks,
        });
    }
    plans
}

fn markup_boundaries(input: &[u8]) -> Vec<usize> {
    let len = input.len();
    let mut out = Vec::new();
    for (i, &b) in input.iter().enumerate() {
        if matches!(b, b'<' | b'>' | b'"' | b'\'' | b'/' | b'=') {
            for at in [i, i + 1] {
                if at > 0 && at < len {
                    out.push(at);
                }
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.state
    }

    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() >> 33) as usize % upper
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
