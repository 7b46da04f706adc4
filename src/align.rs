/// Where unconsumed free space goes along a flow parent's main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MainAlign {
    #[default]
    Start,
    Center,
    End,
}

impl MainAlign {
    /// Offset of the first child given the space nobody claimed.
    pub(crate) fn offset(self, free_space: f64) -> f64 {
        let free_space = free_space.max(0.0);
        match self {
            MainAlign::Start => 0.0,
            MainAlign::Center => free_space / 2.0,
            MainAlign::End => free_space,
        }
    }
}

/// How flow children are sized and placed across the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CrossAlign {
    /// Auto-sized children fill the parent's cross extent.
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

impl CrossAlign {
    pub(crate) fn offset(self, available: f64, size: f64) -> f64 {
        match self {
            CrossAlign::Stretch | CrossAlign::Start => 0.0,
            CrossAlign::Center => (available - size) / 2.0,
            CrossAlign::End => available - size,
        }
    }
}
