//! Timing Properties
//!
//! Sweeps request sizes and starting phases and checks the guarantees
//! every timeout must keep, on boards with different tick lengths.

use sim_clock::{Sam0Board, SimConfig};
use sys_clock::{TimerConfig, TICK_THRESHOLD};
use tests_timing::{
    boot_periodic, boot_tickless, expected_tickless_announce, TicklessBoard, TinyConfig,
};

/// Requests `ticks` after `offset` idle cycles and waits for the announce
///
/// Returns the announced value and the cycles waited.
fn tickless_wait<C: TimerConfig>(board: &TicklessBoard<C>, offset: u64, ticks: i32) -> (u32, u64) {
    board.kernel().clear_announces();
    board.advance(offset);

    let since_mark = board
        .rtc()
        .current_count()
        .wrapping_sub(board.status().last_mark);
    let expected = expected_tickless_announce::<C>(ticks as u32, since_mark);

    board.set_timeout(ticks, false);
    let waited = board
        .run_until_announce(u64::from(u32::MAX))
        .unwrap_or_else(|| panic!("no announce for a {}-tick wait", ticks));

    let announces = board.kernel().announces();
    assert_eq!(announces.len(), 1, "one announce per timeout");
    assert_eq!(announces[0], expected, "ticks={} since_mark={}", ticks, since_mark);
    (announces[0], waited)
}

fn check_tickless_sweep<C: TimerConfig>() {
    let board = boot_tickless::<C>().unwrap();
    let cycles_per_tick = u64::from(C::CYCLES_PER_TICK);

    for ticks in 1..=40 {
        for offset in [0, 1, cycles_per_tick / 2, cycles_per_tick - 1, 3 * cycles_per_tick + 1] {
            let (_, waited) = tickless_wait(&board, offset, ticks);

            // Never early, and at most one extra tick for the partial one
            assert_eq!(waited % cycles_per_tick, 0);
            assert!(waited >= ticks as u64 * cycles_per_tick);
            assert!(waited <= (ticks as u64 + 1) * cycles_per_tick);
        }
    }
    assert!(board.rtc().violations().is_empty());
}

#[test]
fn test_tickless_sweep_short_ticks() {
    check_tickless_sweep::<SimConfig>();
}

#[test]
fn test_tickless_sweep_crystal_ticks() {
    check_tickless_sweep::<Sam0Board>();
}

#[test]
fn test_tickless_long_waits() {
    let board = boot_tickless::<Sam0Board>().unwrap();

    for ticks in [1_000, 65_536, 1_000_000] {
        let (announced, waited) = tickless_wait(&board, 100, ticks);
        assert!(announced >= ticks as u32);
        assert_eq!(waited, u64::from(ticks as u32 + 1) * 327);
    }
}

#[test]
fn test_tickless_forever_still_lands_on_a_tick() {
    let board = boot_tickless::<SimConfig>().unwrap();
    let max = <SimConfig as TimerConfig>::MAX_TICKS;

    board.set_timeout(-1, false);
    let waited = board.run_until_announce(1 << 33).unwrap();

    assert_eq!(waited, u64::from(max) * 10);
    assert_eq!(board.kernel().announces(), vec![max]);
}

#[test]
fn test_tickless_oversized_request_is_clamped() {
    let board = boot_tickless::<Sam0Board>().unwrap();
    let max = <Sam0Board as TimerConfig>::MAX_TICKS;

    board.set_timeout(i32::MAX, false);
    let waited = board.run_until_announce(1 << 33).unwrap();

    assert_eq!(waited, u64::from(max) * 327);
    assert_eq!(board.kernel().announces(), vec![max]);
}

#[test]
fn test_periodic_sweep() {
    let board = boot_periodic::<SimConfig>().unwrap();

    for ticks in 1..=40u32 {
        for idle_ticks in [0u32, 1, 7] {
            board.kernel().clear_announces();
            board.advance_ticks(u64::from(idle_ticks));

            board.set_timeout(ticks as i32, false);
            board.advance_ticks(u64::from(ticks) - 1);
            assert!(board.kernel().announces().is_empty());

            board.advance_ticks(1);
            assert_eq!(board.kernel().announces(), vec![idle_ticks + ticks]);
        }
    }
    assert!(board.rtc().violations().is_empty());
}

#[test]
fn test_periodic_retarget_before_expiry() {
    let board = boot_periodic::<SimConfig>().unwrap();

    board.set_timeout(10, false);
    board.advance_ticks(4);
    board.set_timeout(2, false);
    board.advance_ticks(2);

    assert_eq!(board.kernel().announces(), vec![6]);

    board.advance_ticks(10);
    assert_eq!(board.kernel().announces(), vec![6]);
}

#[test]
fn test_query_elapsed_is_stable_between_interrupts() {
    let board = boot_tickless::<SimConfig>().unwrap();
    board.advance(37);

    let first = board.query_elapsed();
    let second = board.query_elapsed();
    assert_eq!(first, 3);
    assert_eq!(first, second);

    board.advance(2);
    assert_eq!(board.query_elapsed(), 3);
    board.advance(1);
    assert_eq!(board.query_elapsed(), 4);

    let periodic = boot_periodic::<SimConfig>().unwrap();
    periodic.advance(37);
    assert_eq!(periodic.query_elapsed(), 3);
    assert_eq!(periodic.query_elapsed(), 3);
}

#[test]
fn test_zero_timeout_at_tick_boundary_announces_zero() {
    let board = boot_tickless::<SimConfig>().unwrap();
    board.set_timeout(2, false);
    board.run_until_announce(1_000).unwrap();
    board.kernel().clear_announces();

    let interrupts = board.interrupts_taken();
    board.set_timeout(0, false);

    assert_eq!(board.interrupts_taken(), interrupts + 1);
    assert_eq!(board.kernel().announces(), vec![0]);
}

#[test]
fn test_wait_inside_lead_time_is_forced() {
    assert!(TinyConfig::CYCLES_PER_TICK * 2 < TICK_THRESHOLD);

    let board = boot_tickless::<TinyConfig>().unwrap();
    let comparator = board.rtc().comparator();

    board.set_timeout(1, false);

    // Completed through the forced interrupt, the comparator untouched
    assert_eq!(board.interrupts_taken(), 1);
    assert_eq!(board.rtc().comparator(), comparator);
    assert_eq!(board.kernel().announces(), vec![0]);

    // Past the lead time the comparator is used again
    board.set_timeout(4, false);
    assert_eq!(board.rtc().comparator(), 8);
}

#[test]
fn test_tickless_comparator_armed_across_wrap() {
    let board = boot_tickless::<SimConfig>().unwrap();

    // Park the mark 25 cycles short of the wrap
    board.rtc().set_count(u32::MAX - 44);
    board.set_timeout(1, false);
    board.run_until_announce(1_000).unwrap();
    assert_eq!(board.status().last_mark, u32::MAX - 24);
    board.kernel().clear_announces();

    board.set_timeout(5, false);
    assert_eq!(board.rtc().comparator(), 25);

    board.advance(30);
    assert_eq!(board.rtc().current_count(), 5);
    assert_eq!(board.query_elapsed(), 3);
    assert!(board.kernel().announces().is_empty());

    assert_eq!(board.run_until_announce(1_000), Some(20));
    assert_eq!(board.kernel().announces(), vec![5]);
    assert_eq!(board.status().last_mark, 25);
    assert!(board.rtc().violations().is_empty());
}
