//! Integer vesting arithmetic.
//!
//! All values are raw asset units (`u128`) and whole seconds (`u64`). Every
//! division truncates toward zero.

use vestlock_types::Timestamp;

/// `floor(a * b / c)`, or `None` on a zero divisor or a quotient wider than
/// `u128`.
///
/// The product is formed in 256 bits, so an intermediate `a * b` beyond
/// `u128::MAX` is fine as long as the quotient fits.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Some(lo / c);
    }
    if hi >= c {
        return None;
    }
    // Restoring division of hi:lo by c, one bit of lo at a time. The
    // remainder stays below c; `carry` holds the bit shifted out of it.
    let mut rem = hi;
    let mut quot = 0u128;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= c {
            rem = rem.wrapping_sub(c);
            quot |= 1;
        }
    }
    Some(quot)
}

/// Full 256-bit product of `a * b` as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a1, a0) = (a >> 64, a & MASK);
    let (b1, b0) = (b >> 64, b & MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> 64) + (p01 & MASK) + (p10 & MASK);
    let lo = (p00 & MASK) | ((mid & MASK) << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// Portion of `amount` unlocked after `elapsed` of a linear `duration`.
///
/// Returns `amount` once `elapsed >= duration`. Never overflows: with
/// `elapsed < duration <= u64::MAX` both partial products fit in `u128`.
pub fn vested_amount(amount: u128, elapsed: u64, duration: u64) -> u128 {
    if elapsed >= duration {
        return amount;
    }
    let (e, d) = (u128::from(elapsed), u128::from(duration));
    (amount / d) * e + (amount % d) * e / d
}

/// Vesting origin after adding `amount` to a position holding `balance`.
///
/// `origin + floor(amount * elapsed / (balance + amount)) + 1`, the
/// value-weighted average of the old origin and `now`. The trailing `+1` is
/// applied even when the division is exact, so the result can be `now + 1`.
pub fn merged_origin(
    origin: Timestamp,
    balance: u128,
    amount: u128,
    now: Timestamp,
) -> Option<Timestamp> {
    let new_balance = balance.checked_add(amount)?;
    let elapsed = origin.elapsed_since(now);
    let offset = mul_div_floor(amount, u128::from(elapsed), new_balance)?;
    let offset = u64::try_from(offset).ok()?.checked_add(1)?;
    origin.checked_add_secs(offset)
}
