#![no_main]

use libfuzzer_sys::fuzz_target;

use vestlock_types::Timestamp;
use vestlock_vesting::AccountLedger;

// Decoding a stored ledger from arbitrary bytes must never panic, and any
// decoded ledger must answer queries without panicking.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let mut now = [0u8; 8];
    now.copy_from_slice(&data[..8]);
    let now = Timestamp::new(u64::from_le_bytes(now));

    if let Ok(ledger) = bincode::deserialize::<AccountLedger>(&data[8..]) {
        let available = ledger.available(now);
        let _ = ledger.balance();
        let _ = ledger.plan_withdrawal(available, now);
    }
});
