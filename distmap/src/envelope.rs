//! Lower envelope of parabolas (Felzenszwalb & Huttenlocher)
//!
//! For one row of seed values `f(q)`, q in `0..n`, the envelope evaluates
//!
//! ```text
//! g(x) = min_q [ s² (x - q)² + f(q) ]
//! ```
//!
//! for every x in O(n), where `s` is the voxel spacing along the row. Seeds
//! are 0 for voxels of the seed set and +∞ elsewhere on the first pass; later
//! passes feed back the squared distances of the previous pass.
//!
//! Reference: Felzenszwalb & Huttenlocher, "Distance Transforms of Sampled
//! Functions", Theory of Computing (2012).

/// One parabola of the envelope
#[derive(Debug, Clone, Copy, PartialEq)]
struct Parabola {
    /// Row index of the apex (`y[k]`)
    apex: usize,
    /// Value at the apex (`f[k]`)
    height: f64,
    /// Left boundary of the interval where this parabola is minimal (`z[k]`)
    start: f64,
}

/// Reusable envelope scratch for a single row
///
/// The parabola stack keeps its allocation between rows, so a worker that
/// owns one `Envelope` sweeps any number of rows without allocating. All
/// row state is replaced by [`Envelope::build`].
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    parabolas: Vec<Parabola>,
    len: usize,
    spacing_sq: f64,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch pre-sized for rows of up to `len` samples
    pub fn with_capacity(len: usize) -> Self {
        Self {
            parabolas: Vec::with_capacity(len),
            len: 0,
            spacing_sq: 1.0,
        }
    }

    /// Length of the row last passed to [`Envelope::build`]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of parabolas on the envelope after the last build
    pub fn active(&self) -> usize {
        self.parabolas.len()
    }

    /// True if the last row had at least one finite seed
    pub fn has_seed(&self) -> bool {
        !self.parabolas.is_empty()
    }

    /// Horizontal position where the parabola with apex `(q, fq)` meets `p`
    fn intersection(&self, p: &Parabola, q: usize, fq: f64) -> f64 {
        let qf = q as f64;
        let pf = p.apex as f64;
        ((fq + self.spacing_sq * qf * qf) - (p.height + self.spacing_sq * pf * pf))
            / (2.0 * self.spacing_sq * (qf - pf))
    }

    /// Build the lower envelope of the seeds of one row
    ///
    /// Seeds that are +∞ (or NaN) can never be the minimum and are skipped.
    /// A row without any finite seed yields an empty envelope that samples
    /// to +∞ everywhere; such a row has no defined distance.
    pub fn build<I>(&mut self, seeds: I, spacing: f64)
    where
        I: IntoIterator<Item = f64>,
    {
        self.parabolas.clear();
        self.len = 0;
        self.spacing_sq = spacing * spacing;

        for (q, fq) in seeds.into_iter().enumerate() {
            self.len = q + 1;
            if fq.is_nan() || fq == f64::INFINITY {
                continue;
            }

            // The bottom parabola starts at -inf, so it is never popped and
            // q always differs from the apex it is compared against.
            let mut start = f64::NEG_INFINITY;
            while let Some(top) = self.parabolas.last() {
                let s = self.intersection(top, q, fq);
                if s <= top.start {
                    self.parabolas.pop();
                } else {
                    start = s;
                    break;
                }
            }

            self.parabolas.push(Parabola {
                apex: q,
                height: fq,
                start,
            });
        }
    }

    /// Evaluate the envelope at every index of the row, in order
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            envelope: self,
            x: 0,
            k: 0,
        }
    }
}

/// Iterator over `g(x)` for `x` in `0..len`
pub struct Samples<'a> {
    envelope: &'a Envelope,
    x: usize,
    k: usize,
}

impl Iterator for Samples<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.x >= self.envelope.len {
            return None;
        }
        let x = self.x;
        self.x += 1;

        let parabolas = &self.envelope.parabolas;
        if parabolas.is_empty() {
            return Some(f64::INFINITY);
        }

        let xf = x as f64;
        while self.k + 1 < parabolas.len() && parabolas[self.k + 1].start < xf {
            self.k += 1;
        }
        let p = &parabolas[self.k];
        let d = xf - p.apex as f64;
        Some(self.envelope.spacing_sq * d * d + p.height)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.envelope.len.saturating_sub(self.x);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples<'_> {}

/// Paired envelopes for the signed transform
///
/// Signed rows hold `+d²` for outside voxels and `-d²` for inside voxels.
/// The positive branch is built from `max(f, 0)` and measures distance to
/// the inside set; the negative branch is built from `min(f, 0)` with the
/// sign flipped and measures distance to the outside set.
#[derive(Debug, Clone, Default)]
pub struct SignedEnvelope {
    positive: Envelope,
    negative: Envelope,
}

impl SignedEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(len: usize) -> Self {
        Self {
            positive: Envelope::with_capacity(len),
            negative: Envelope::with_capacity(len),
        }
    }

    /// Build both branches from one row of signed seeds
    pub fn build<I>(&mut self, seeds: I, spacing: f64)
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        let seeds = seeds.into_iter();
        self.positive
            .build(seeds.clone().map(|f| f.max(0.0)), spacing);
        self.negative.build(seeds.map(|f| -f.min(0.0)), spacing);
    }

    /// Evaluate the row, choosing the branch by each voxel's original class
    ///
    /// `inside` yields one flag per row index; inside voxels take the
    /// negated negative branch, outside voxels the positive branch.
    pub fn samples<'a, C>(&'a self, inside: C) -> impl Iterator<Item = f64> + 'a
    where
        C: IntoIterator<Item = bool>,
        C::IntoIter: 'a,
    {
        self.positive
            .samples()
            .zip(self.negative.samples())
            .zip(inside)
            .map(|((pos, neg), inside)| if inside { -neg } else { pos })
    }

    pub fn positive(&self) -> &Envelope {
        &self.positive
    }

    pub fn negative(&self) -> &Envelope {
        &self.negative
    }
}
