use crate::window::FlashFlags;

/// **VALUE**: Verifies the combined flash flags match the `FLASHWINFO` values
/// (`FLASHW_ALL | FLASHW_TIMERNOFG`).
///
/// **BUG THIS CATCHES**: Would catch a wrong constant, which the OS would
/// silently accept and flash the wrong way.
#[test]
fn given_all_and_timer_no_foreground_when_combined_then_bits_match_win32() {
    // WHEN: Combining the fallback flags
    let flags = FlashFlags::ALL | FlashFlags::TIMER_NO_FOREGROUND;

    // THEN: Bits equal FLASHW_ALL (0x3) | FLASHW_TIMERNOFG (0xC)
    assert_eq!(flags.bits(), 0xF);
    assert!(flags.contains(FlashFlags::CAPTION));
    assert!(flags.contains(FlashFlags::TRAY));
    assert!(flags.contains(FlashFlags::TIMER));
}
