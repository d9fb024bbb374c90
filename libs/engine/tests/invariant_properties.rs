//! Property coverage: guarantees that must survive arbitrary operation
//! sequences, not just hand-picked scenarios.

use ethers_core::types::{Address, U256};
use orbital_engine::{EngineConfig, Pool};
use orbital_math::geometry::LinearRadiusCurve;
use orbital_math::{abs_diff, scale, squared_norm};
use orbital_types::TickStatus;
use proptest::prelude::*;

fn fp(v: u64) -> U256 {
    U256::from(v) * scale()
}

fn addr(byte: u8) -> Address {
    Address::from([byte; 20])
}

fn pool_with(n: usize, fee_bps: u32) -> Pool {
    let tokens = (0..n).map(|i| addr(i as u8 + 1)).collect();
    let config = EngineConfig {
        fee_bps,
        ..Default::default()
    };
    Pool::new(tokens, config, Box::new(LinearRadiusCurve::default())).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Add { p: u64, amounts: [u64; 3] },
    Swap { amount: u64, token_in: usize },
    RemoveHalf { p: u64 },
}

fn arb_op() -> impl Strategy<Value = Op> {
    let tick_key = || prop_oneof![Just(20_000u64), Just(50_000u64)];
    prop_oneof![
        (tick_key(), proptest::array::uniform3(1u64..=5_000))
            .prop_map(|(p, amounts)| Op::Add { p, amounts }),
        (1u64..=300, 0usize..3).prop_map(|(amount, token_in)| Op::Swap { amount, token_in }),
        tick_key().prop_map(|p| Op::RemoveHalf { p }),
    ]
}

/// Stored `k` tracks `Σ x_i²`, components stay inside `[0, r]`, and the
/// single provider's balance accounts for every outstanding share.
fn assert_pool_invariants(pool: &Pool, provider: Address) {
    for tick in pool.ticks() {
        let recomputed = squared_norm(&tick.reserves).unwrap();
        let drift = abs_diff(tick.invariant, recomputed);
        assert!(
            drift <= U256::exp10(12),
            "tick {}: k drift {drift}",
            tick.p
        );
        for (i, &x) in tick.reserves.iter().enumerate() {
            assert!(x <= tick.radius, "tick {} component {i} out of range", tick.p);
        }
        assert_eq!(
            pool.lp_balance(tick.p, provider),
            tick.total_lp_shares,
            "tick {} share supply mismatch",
            tick.p
        );
        if tick.total_lp_shares.is_zero() {
            assert_eq!(tick.status, TickStatus::Inactive, "tick {}", tick.p);
        } else {
            assert_ne!(tick.status, TickStatus::Inactive, "tick {}", tick.p);
        }
    }
}

proptest! {
    #[test]
    fn invariants_survive_arbitrary_operation_sequences(ops in prop::collection::vec(arb_op(), 1..12)) {
        let provider = addr(10);
        let trader = addr(11);
        let mut pool = pool_with(3, 30);

        for op in ops {
            match op {
                Op::Add { p, amounts } => {
                    let amounts: Vec<U256> = amounts.iter().map(|&a| fp(a)).collect();
                    let _ = pool.add_liquidity(provider, fp(p), &amounts);
                }
                Op::Swap { amount, token_in } => {
                    let token_out = (token_in + 1) % 3;
                    let _ = pool.swap(trader, fp(amount), token_in, token_out, U256::zero());
                }
                Op::RemoveHalf { p } => {
                    let balance = pool.lp_balance(fp(p), provider);
                    if !balance.is_zero() {
                        let _ = pool.remove_liquidity(provider, fp(p), balance / 2);
                    }
                }
            }
            assert_pool_invariants(&pool, provider);
        }
    }

    #[test]
    fn swap_output_is_monotone_in_input(small in 1u64..=200, extra in 1u64..=200) {
        let large = small + extra;
        let mut out = [U256::zero(); 2];
        for (slot, amount) in out.iter_mut().zip([small, large]) {
            let mut pool = pool_with(3, 30);
            pool.add_liquidity(addr(10), fp(50_000), &vec![fp(1000); 3]).unwrap();
            *slot = pool.swap(addr(11), fp(amount), 0, 1, U256::zero()).unwrap();
        }
        prop_assert!(out[1] >= out[0], "out({}) = {} < out({}) = {}", large, out[1], small, out[0]);
    }

    #[test]
    fn fresh_tick_round_trip_is_exact(a in 1u64..=1000, b in 1u64..=1000, c in 1u64..=1000) {
        let provider = addr(10);
        let mut pool = pool_with(3, 30);
        let amounts = vec![fp(a), fp(b), fp(c)];

        let minted = pool.add_liquidity(provider, fp(50_000), &amounts).unwrap();
        let withdrawn = pool.remove_liquidity(provider, fp(50_000), minted).unwrap();

        prop_assert_eq!(withdrawn, amounts);
        let totals = pool.total_reserves().unwrap();
        prop_assert!(totals.iter().all(|t| t.is_zero()));
        prop_assert_eq!(pool.tick_info(fp(50_000)).unwrap().status, TickStatus::Inactive);
    }

    #[test]
    fn partial_withdrawals_never_exceed_deposits(
        a in 1u64..=1000,
        b in 1u64..=1000,
        tenths in 1u64..=9,
    ) {
        let provider = addr(10);
        let mut pool = pool_with(2, 30);
        let amounts = vec![fp(a), fp(b)];

        let minted = pool.add_liquidity(provider, fp(50_000), &amounts).unwrap();
        let burn = minted * tenths / 10;
        let withdrawn = pool.remove_liquidity(provider, fp(50_000), burn).unwrap();

        for (taken, deposited) in withdrawn.iter().zip(&amounts) {
            prop_assert!(taken <= deposited, "withdrew {taken} of {deposited}");
        }
        let totals = pool.total_reserves().unwrap();
        for ((total, taken), deposited) in totals.iter().zip(&withdrawn).zip(&amounts) {
            prop_assert_eq!(*total + *taken, *deposited);
        }
    }

    #[test]
    fn status_classification_is_stable_under_requery(amount in 1u64..=4_999) {
        let mut pool = pool_with(2, 30);
        pool.add_liquidity(addr(10), fp(5000), &[fp(amount), fp(amount)]).unwrap();
        let first = pool.tick_info(fp(5000)).unwrap().status;
        let second = pool.tick_info(fp(5000)).unwrap().status;
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, TickStatus::Interior);
    }
}
