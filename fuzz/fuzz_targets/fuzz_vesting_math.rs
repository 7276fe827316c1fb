#![no_main]

use libfuzzer_sys::fuzz_target;

use vestlock_types::Timestamp;
use vestlock_vesting::math::{merged_origin, mul_div_floor, vested_amount};
use vestlock_vesting::StakePosition;

fn u64_at(data: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(buf)
}

fn u128_at(data: &[u8], at: usize) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&data[at..at + 16]);
    u128::from_le_bytes(buf)
}

// Vesting arithmetic must never panic and never vest more than was deposited.
fuzz_target!(|data: &[u8]| {
    if data.len() < 56 {
        return;
    }

    let amount = u128_at(data, 0);
    let extra = u128_at(data, 16);
    let duration = u64_at(data, 32).max(1);
    let origin = Timestamp::new(u64_at(data, 40));
    let now = Timestamp::new(u64_at(data, 48));

    let vested = vested_amount(amount, origin.elapsed_since(now), duration);
    assert!(vested <= amount);

    let _ = mul_div_floor(amount, extra, u128::from(duration));

    if let Some(merged) = merged_origin(origin, amount, extra, now) {
        assert!(merged >= origin);
    }

    let mut position = StakePosition::new(amount, duration, origin);
    assert!(position.available(now) <= position.balance);
    if let Ok(next) = position.merged(extra, now) {
        position = next;
        assert!(position.available(now) <= position.balance);
    }
});
