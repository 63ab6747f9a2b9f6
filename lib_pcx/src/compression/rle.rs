use thiserror::Error;

use crate::constants::{RLE_COUNT_MASK, RLE_FLAG, RLE_MAX_RUN};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RleDecompressionError {
    #[error("RLE data ended after {produced} of {expected} bytes")]
    Truncated { expected: usize, produced: usize },
    #[error("RLE control byte at position {position} has no value byte")]
    DanglingControlByte { position: usize },
    #[error("RLE run at position {position} overruns the expected {expected} bytes")]
    Overrun { position: usize, expected: usize },
}

/// Result of decoding: the bytes and how much input they took.
#[derive(Debug)]
pub struct RleDecoded {
    pub data: Vec<u8>,
    pub consumed: usize,
}

fn is_control(byte: u8) -> bool {
    byte & RLE_FLAG == RLE_FLAG
}

/// PCX run-length encoding.
///
/// Runs of up to 63 identical bytes become `0xC0 | count, value`. A single
/// byte is written as-is unless its two top bits are set, in which case it
/// needs a run of one so the decoder doesn't mistake it for a count.
pub fn rle_compression(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len());
    let mut position = 0;

    while position < data.len() {
        let value = data[position];
        let run = data[position..]
            .iter()
            .take(RLE_MAX_RUN)
            .take_while(|&&byte| byte == value)
            .count();

        if run == 1 && !is_control(value) {
            encoded.push(value);
        } else {
            encoded.push(RLE_FLAG | run as u8);
            encoded.push(value);
        }
        position += run;
    }

    encoded
}

/// Decodes PCX run-length data until exactly `expected` bytes are produced.
///
/// Trailing input past that point (e.g. an appended palette) is ignored.
/// The buffer never reserves more than `data` can expand to.
pub fn rle_decompression(data: &[u8], expected: usize) -> Result<RleDecoded, RleDecompressionError> {
    let mut decoded = Vec::with_capacity(expected.min(data.len().saturating_mul(RLE_MAX_RUN)));
    let mut position = 0;

    while decoded.len() < expected {
        let Some(&byte) = data.get(position) else {
            return Err(RleDecompressionError::Truncated {
                expected,
                produced: decoded.len(),
            });
        };

        if is_control(byte) {
            let count = usize::from(byte & RLE_COUNT_MASK);
            let value = *data
                .get(position + 1)
                .ok_or(RleDecompressionError::DanglingControlByte { position })?;
            if decoded.len() + count > expected {
                return Err(RleDecompressionError::Overrun { position, expected });
            }
            decoded.resize(decoded.len() + count, value);
            position += 2;
        } else {
            decoded.push(byte);
            position += 1;
        }
    }

    Ok(RleDecoded {
        data: decoded,
        consumed: position,
    })
}
