use proptest::prelude::*;

use fanout_types::{AccountRecord, Address, Batch, Lamports, LAMPORTS_PER_SOL};

proptest! {
    /// Whole-token conversion is exact for any amount expressible in lamports
    /// below 2^48.
    #[test]
    fn lamports_sol_roundtrip(raw in 0u64..(1u64 << 48)) {
        let amount = Lamports::new(raw);
        prop_assert_eq!(Lamports::from_sol(amount.to_sol()), Some(amount));
    }

    /// Whole tokens convert to exactly LAMPORTS_PER_SOL units each.
    #[test]
    fn whole_tokens_scale_exactly(sol in 0u64..1_000_000) {
        prop_assert_eq!(
            Lamports::from_sol(sol as f64),
            Some(Lamports::new(sol * LAMPORTS_PER_SOL))
        );
    }

    /// An observed balance never downgrades a successful record, whatever its value.
    #[test]
    fn reconciliation_is_monotonic(confirmed in 1u64..u64::MAX, observed in 0u64..u64::MAX) {
        let mut record = AccountRecord::new(1, Address::new("a"), "s".into());
        record.mark_transferred(Lamports::new(confirmed), "sig");
        record.apply_observed_balance(Lamports::new(observed));
        prop_assert!(record.transfer_success);
        prop_assert_eq!(record.amount, Lamports::new(confirmed));
    }

    /// Serializing the same batch twice produces identical bytes.
    #[test]
    fn batch_serialization_is_deterministic(amounts in prop::collection::vec(0u64..10_000_000_000, 1..20)) {
        let mut batch = Batch::new();
        for (i, amount) in amounts.iter().enumerate() {
            let mut record = AccountRecord::new(i as u32 + 1, Address::new(format!("a{i}")), format!("s{i}"));
            if *amount > 0 {
                record.mark_transferred(Lamports::new(*amount), format!("sig{i}"));
            }
            batch.push(record);
        }
        let first = serde_json::to_vec_pretty(&batch).unwrap();
        let second = serde_json::to_vec_pretty(&batch).unwrap();
        prop_assert_eq!(first, second);
    }
}
