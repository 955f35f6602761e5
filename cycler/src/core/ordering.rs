//! Randomized visiting order for a freshly built queue.

use rand::Rng;

/// How a freshly discovered target list is ordered before visiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Keep discovery order.
    Natural,
    /// Visit in reverse discovery order.
    Reverse,
    /// Uniform random permutation.
    Shuffle,
}

impl OrderPolicy {
    pub const ALL: [OrderPolicy; 3] = [
        OrderPolicy::Natural,
        OrderPolicy::Reverse,
        OrderPolicy::Shuffle,
    ];

    /// Pick one of the three policies uniformly.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> OrderPolicy {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn apply<T, R: Rng + ?Sized>(self, items: &mut [T], rng: &mut R) {
        match self {
            OrderPolicy::Natural => {}
            OrderPolicy::Reverse => items.reverse(),
            OrderPolicy::Shuffle => shuffle(items, rng),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderPolicy::Natural => "natural",
            OrderPolicy::Reverse => "reverse",
            OrderPolicy::Shuffle => "shuffle",
        }
    }
}

/// Fisher-Yates: swap each element `i` with a uniform pick from `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in 1..items.len() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
