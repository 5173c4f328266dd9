const SIGN_BIT: u8 = 0x80;

const MODE_00: u8 = 0x00;
const MODE_01: u8 = 0x20;
const MODE_10: u8 = 0x40;
const MODE_11: u8 = 0x60;
const MODE_MASK: u8 = MODE_11;

/// Largest encoded size of an integer, in bytes
pub const MAX_INTEGER_LEN: usize = 9;

/// Append the encoding of `v` to `buf`, always in the smallest mode that fits.
pub fn encode_integer(buf: &mut Vec<u8>, v: i64) {
    // negative values store -(v + 1), which is !v in two's complement
    let (sign, mut m) = if v < 0 { (SIGN_BIT, !v as u64) } else { (0, v as u64) };

    if m < 0x20 {
        buf.push(sign | MODE_00 | m as u8);
        return;
    }
    if m < 0x2000 {
        buf.extend_from_slice(&[sign | MODE_01 | (m >> 8) as u8, m as u8]);
        return;
    }
    if m < 0x200000 {
        buf.extend_from_slice(&[sign | MODE_10 | (m >> 16) as u8, (m >> 8) as u8, m as u8]);
        return;
    }

    // mode 11: peel off low bytes until the rest fits in the 2 bits of byte 0
    let mut tmp = [0u8; MAX_INTEGER_LEN];
    let mut count = 0;
    while m > 3 {
        count += 1;
        tmp[MAX_INTEGER_LEN - count] = m as u8;
        m >>= 8;
    }
    let start = MAX_INTEGER_LEN - 1 - count;
    tmp[start] = sign | MODE_11 | ((count as u8 - 1) << 2) | m as u8;
    buf.extend_from_slice(&tmp[start..]);
}

/// Return the number of bytes [encode_integer] writes for `v`.
#[inline]
pub fn integer_len(v: i64) -> usize {
    let m = if v < 0 { !v as u64 } else { v as u64 };
    match m {
        0..0x20 => 1,
        0x20..0x2000 => 2,
        0x2000..0x200000 => 3,
        _ => 1 + (64 - m.leading_zeros() as usize - 2).div_ceil(8),
    }
}

/// Decode an integer from the front of `buf`.
///
/// Returns the value and the bytes following it. Any mode is accepted, including
/// non-minimal encodings. Returns `None` when `buf` is empty, too short for the mode
/// in the first byte, or when an 8-byte mode-11 value does not fit in 63 bits.
pub fn decode_integer(buf: &[u8]) -> Option<(i64, &[u8])> {
    let (&b0, rest) = buf.split_first()?;
    let (m, rest) = decode_magnitude(b0, rest)?;
    // m is at most 63 bits wide here
    let v = if b0 & SIGN_BIT != 0 { !(m as i64) } else { m as i64 };
    Some((v, rest))
}

fn decode_magnitude(b0: u8, rest: &[u8]) -> Option<(u64, &[u8])> {
    let low = (b0 & 0x1f) as u64;
    match b0 & MODE_MASK {
        MODE_00 => Some((low, rest)),
        MODE_01 => {
            let (&b1, rest) = rest.split_first()?;
            Some((low << 8 | b1 as u64, rest))
        }
        MODE_10 => {
            let (head, rest) = rest.split_at_checked(2)?;
            Some((low << 16 | (head[0] as u64) << 8 | head[1] as u64, rest))
        }
        _ => {
            let size = ((b0 & 0x1c) >> 2) as usize + 1;
            let (head, rest) = rest.split_at_checked(size)?;
            let top = (b0 & 0x03) as u64;
            if size == 8 && (top != 0 || head[0] & 0x80 != 0) {
                return None;
            }
            let m = head.iter().fold(top, |acc, &b| acc << 8 | b as u64);
            Some((m, rest))
        }
    }
}
