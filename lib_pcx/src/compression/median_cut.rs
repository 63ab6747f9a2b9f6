use std::collections::{BTreeMap, BTreeSet};

use log::{debug, error};
use thiserror::Error;

use crate::color::{Rgb, Rgba};

/// Luma weights applied to each channel's range when picking the split axis.
const RED_WEIGHT: f64 = 0.299;
const GREEN_WEIGHT: f64 = 0.587;
const BLUE_WEIGHT: f64 = 0.114;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuantizeError {
    #[error("Target palette size must be at least 2, got {0}")]
    TargetTooSmall(usize),
    #[error("Cannot quantize an empty color population")]
    EmptyInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn of(self, color: &Rgba) -> u8 {
        match self {
            Channel::Red => color.red,
            Channel::Green => color.green,
            Channel::Blue => color.blue,
        }
    }
}

/// Reduced palette plus the mapping every input color collapses to.
#[derive(Debug, Clone)]
pub struct Quantization {
    /// One entry per bucket, in bucket order.
    pub palette: Vec<Rgb>,
    /// Distinct input color -> representative color of its bucket.
    pub relation: BTreeMap<Rgba, Rgba>,
}

impl Quantization {
    /// Palette index for `color` after it has been mapped through the relation.
    pub fn index_of(&self, color: &Rgba) -> Option<usize> {
        let representative = self.relation.get(color)?.rgb();
        self.palette.iter().position(|entry| *entry == representative)
    }
}

/// Median-cut quantization of `colors` down to at most `target` colors.
///
/// `colors` is the full population (one entry per pixel); repeated colors
/// weigh the bucket averages but are only split once.
pub fn median_cut(colors: &[Rgba], target: usize) -> Result<Quantization, QuantizeError> {
    if target < 2 {
        error!("Median cut target of {} colors is below the minimum of 2", target);
        return Err(QuantizeError::TargetTooSmall(target));
    }
    if colors.is_empty() {
        error!("Median cut called without any colors");
        return Err(QuantizeError::EmptyInput);
    }

    let buckets = split_buckets(colors, target);
    let frequencies = color_frequencies(colors);
    debug!(
        "Median cut: {} pixels, {} distinct colors, {} buckets (target {})",
        colors.len(),
        frequencies.len(),
        buckets.len(),
        target
    );

    let mut palette = Vec::with_capacity(buckets.len());
    let mut relation = BTreeMap::new();
    for bucket in &buckets {
        let representative = bucket_average(bucket, &frequencies);
        palette.push(representative.rgb());
        for &color in bucket {
            relation.insert(color, representative);
        }
    }
    debug!("Median cut palette: {:?}", palette);

    Ok(Quantization { palette, relation })
}

fn split_buckets(colors: &[Rgba], target: usize) -> Vec<Vec<Rgba>> {
    let distinct: Vec<Rgba> = colors.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let distinct_count = distinct.len();

    let mut buckets = vec![distinct];
    // Buckets produced so far; one split adds exactly one.
    let mut produced = 1usize;

    while buckets.len() < target && buckets.len() != distinct_count {
        let mut next = Vec::with_capacity(buckets.len() * 2);
        for mut bucket in buckets {
            if bucket.len() > 1 && produced < target {
                let channel = widest_channel(&bucket);
                bucket.sort_by_key(|color| channel.of(color));
                let upper = bucket.split_off(bucket.len() / 2);
                next.push(bucket);
                next.push(upper);
                produced += 1;
            } else {
                next.push(bucket);
            }
        }
        buckets = next;
    }

    buckets
}

/// Channel with the largest luma-weighted range; ties go red, green, blue.
fn widest_channel(bucket: &[Rgba]) -> Channel {
    let range = |channel: Channel| {
        let (min, max) = bucket.iter().map(|c| channel.of(c)).fold((u8::MAX, u8::MIN), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        f64::from(max.saturating_sub(min))
    };

    let red = RED_WEIGHT * range(Channel::Red);
    let green = GREEN_WEIGHT * range(Channel::Green);
    let blue = BLUE_WEIGHT * range(Channel::Blue);

    if red >= green && red >= blue {
        Channel::Red
    } else if green >= blue {
        Channel::Green
    } else {
        Channel::Blue
    }
}

fn color_frequencies(colors: &[Rgba]) -> BTreeMap<Rgba, u64> {
    let mut frequencies = BTreeMap::new();
    for &color in colors {
        *frequencies.entry(color).or_insert(0u64) += 1;
    }
    frequencies
}

/// Frequency-weighted mean of the bucket, each channel rounded half-up.
fn bucket_average(bucket: &[Rgba], frequencies: &BTreeMap<Rgba, u64>) -> Rgba {
    let mut total = 0u64;
    let mut sums = [0u64; 4];
    for color in bucket {
        let weight = frequencies.get(color).copied().unwrap_or(1);
        total += weight;
        for (sum, channel) in sums.iter_mut().zip(<[u8; 4]>::from(*color)) {
            *sum += u64::from(channel) * weight;
        }
    }

    // (2s + t) / 2t == floor(s / t + 0.5) for non-negative s.
    let mean = |sum: u64| ((2 * sum + total) / (2 * total)) as u8;
    Rgba::new(mean(sums[0]), mean(sums[1]), mean(sums[2]), mean(sums[3]))
}
