/// Xoroshiro256**, for spreading report delays.
#[derive(Copy, Clone, Debug, Hash)]
pub(crate) struct Xoroshiro256 {
    state: [u64; 4],
}

impl Xoroshiro256 {
    /// Expand a seed into a full state.
    ///
    /// The state must not be all zero, so it is filled from a splitmix64 sequence.
    pub(crate) fn new(seed: u64) -> Self {
        let mut mix = seed;
        let mut state = [0; 4];
        for word in state.iter_mut() {
            mix = mix.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = mix;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            *word = z ^ (z >> 31);
        }

        Xoroshiro256 { state }
    }

    pub(crate) fn next(&mut self) -> u64 {
        let s = &mut self.state;
        let result_starstar = s[1]
            .wrapping_mul(5)
            .rotate_left(7)
            .wrapping_mul(9);

        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;

        s[3] = s[3].rotate_left(45);

        result_starstar
    }

    /// A value in `0..bound`, zero for an empty range.
    pub(crate) fn below(&mut self, bound: u64) -> u64 {
        match bound {
            0 => 0,
            bound => self.next() % bound,
        }
    }
}
