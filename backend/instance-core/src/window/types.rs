use std::ops::BitOr;

/// Opaque native window handle.
///
/// Never cached across activations; the toolkit may recreate its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandleRef(pub isize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    /// Un-minimize to the previous placement.
    Restore,
    /// Show and activate at the normal placement.
    ShowNormal,
}

/// Taskbar flash flags, bit-compatible with `FLASHWINFO::dwFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashFlags(u32);

impl FlashFlags {
    pub const CAPTION: FlashFlags = FlashFlags(0x1);
    pub const TRAY: FlashFlags = FlashFlags(0x2);
    pub const ALL: FlashFlags = FlashFlags(0x3);
    pub const TIMER: FlashFlags = FlashFlags(0x4);
    pub const TIMER_NO_FOREGROUND: FlashFlags = FlashFlags(0xC);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: FlashFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FlashFlags {
    type Output = FlashFlags;

    fn bitor(self, rhs: FlashFlags) -> FlashFlags {
        FlashFlags(self.0 | rhs.0)
    }
}
