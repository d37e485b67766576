//! Bring-Up and Protocol Tests
//!
//! Validates initialization on the simulated board and that a full run of
//! timer traffic never breaks the counter's synchronization protocol.

use hal::{ControlFlags, InterruptFlags};
use hal_sam0::{FakeRtc, NvicOp, RegAccess};
use sim_clock::{Sam0Board, SimBoard, SimConfig};
use sys_clock::{PeriodicCore, TicklessCore, TimerConfig, TimerError, TimerMode};
use tests_timing::{boot_periodic, boot_tickless};

const IRQ: u16 = <Sam0Board as TimerConfig>::RTC_IRQ;

/// Test: tickless bring-up leaves the counter free-running
///
/// This validates that:
/// 1. The counter runs in plain 32-bit mode
/// 2. Only the compare interrupt is enabled
/// 3. The NVIC line is connected at the configured priority and enabled
#[test]
fn test_tickless_bring_up() {
    let board = boot_tickless::<Sam0Board>().unwrap();

    assert_eq!(board.rtc().ctrl(), ControlFlags::ENABLE);
    assert_eq!(board.rtc().enabled_interrupts(), InterruptFlags::CMP0);
    assert!(board.nvic().is_enabled(IRQ));
    assert_eq!(
        board.nvic().priority(IRQ),
        Some(<Sam0Board as TimerConfig>::RTC_IRQ_PRIORITY)
    );
    assert_eq!(board.timer().clocks().generator(), Some(2));
    assert!(board.rtc().violations().is_empty());
}

#[test]
fn test_periodic_bring_up() {
    let board = boot_periodic::<Sam0Board>().unwrap();

    assert_eq!(
        board.rtc().ctrl(),
        ControlFlags::MATCHCLR | ControlFlags::ENABLE
    );
    assert_eq!(board.rtc().comparator(), 327);
    assert_eq!(board.rtc().enabled_interrupts(), InterruptFlags::OVF);
    assert!(board.rtc().violations().is_empty());
}

/// Test: interrupt line setup follows clear, connect, enable
#[test]
fn test_interrupt_line_order() {
    let board = boot_tickless::<Sam0Board>().unwrap();
    assert_eq!(
        board.nvic().ops(),
        vec![
            NvicOp::ClearPending(IRQ),
            NvicOp::Connect(IRQ, 0),
            NvicOp::Enable(IRQ),
        ]
    );
}

/// Test: the counter is reset before it is reconfigured
#[test]
fn test_reset_precedes_configuration() {
    let board = boot_periodic::<SimConfig>().unwrap();
    let accesses = board.rtc().accesses();

    let position = |wanted: RegAccess| {
        accesses
            .iter()
            .position(|access| *access == wanted)
            .unwrap_or_else(|| panic!("{:?} never happened", wanted))
    };

    let disable = position(RegAccess::DisableInterrupts(InterruptFlags::all()));
    let reset = position(RegAccess::WriteCtrl(ControlFlags::SWRST));
    let configure = position(RegAccess::WriteCtrl(ControlFlags::MATCHCLR));
    let comparator = position(RegAccess::WriteComp0(10));
    let enable = position(RegAccess::WriteCtrl(
        ControlFlags::MATCHCLR | ControlFlags::ENABLE,
    ));

    assert!(disable < reset);
    assert!(reset < configure);
    assert!(configure < comparator);
    assert!(comparator < enable);
}

#[test]
fn test_second_init_is_rejected() {
    let board = boot_tickless::<SimConfig>().unwrap();
    assert_eq!(board.timer().init(), Err(TimerError::AlreadyInitialized));
    assert!(board.rtc().running());
}

#[test]
fn test_stuck_reset_fails_init() {
    let board: SimBoard<TicklessCore<SimConfig>> =
        SimBoard::with_rtc(FakeRtc::with_stuck_reset());

    assert_eq!(board.timer().init(), Err(TimerError::ResetTimeout));
    assert!(!board.timer().is_initialized());
    assert!(!board.rtc().running());
}

#[test]
fn test_slow_sync_still_initializes() {
    let board: SimBoard<PeriodicCore<SimConfig>> = SimBoard::with_rtc(FakeRtc::with_sync_polls(500));
    board.timer().init().unwrap();

    board.set_timeout(2, false);
    board.advance_ticks(2);
    assert_eq!(board.kernel().announces(), vec![2]);
    assert!(board.rtc().violations().is_empty());
}

/// Test: a long mixed workload keeps the register protocol intact
#[test]
fn test_workload_is_protocol_clean() {
    let board = boot_tickless::<Sam0Board>().unwrap();

    for round in 0..200u64 {
        let ticks = (round % 17) as i32;
        board.set_timeout(ticks, round % 2 == 0);
        board.query_elapsed();
        board.advance(round * 131);
        board.idle_exit_notify();
    }
    board.status();

    assert!(board.rtc().violations().is_empty());
    assert!(board.kernel().announce_count() > 0);
}

#[test]
fn test_status_reports_each_mode() {
    let tickless = boot_tickless::<SimConfig>().unwrap();
    tickless.advance(45);
    let status = tickless.status();
    assert_eq!(status.mode, TimerMode::Tickless);
    assert_eq!(status.elapsed_ticks, 4);
    assert_eq!(status.tick_counter, None);
    assert_eq!(status.pending_target, None);

    let periodic = boot_periodic::<SimConfig>().unwrap();
    periodic.set_timeout(-1, false);
    periodic.advance_ticks(6);
    let status = periodic.status();
    assert_eq!(status.mode, TimerMode::Periodic);
    assert_eq!(status.tick_counter, Some(6));
    assert_eq!(status.pending_target, Some(0));
    assert_eq!(status.elapsed_ticks, 6);

    let json = serde_json::to_string(&status).unwrap();
    let decoded: sys_clock::TimerStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, status);
}
