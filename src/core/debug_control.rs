//! Component-scoped debug and assert control
//!
//! A single [`ComponentControlBlock`] tells every component whether its debug
//! messages and assertions are live. The block is populated once by the host
//! before components run and is then read from any thread. Reconfiguration
//! swaps in a whole new snapshot through [`ControlSlot`]; readers keep the
//! snapshot they already hold, so no reader ever sees a half-written block.

use super::error::{LoggerError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::Arc;

/// Upper bound on the number of components a control block can address.
pub const MAX_COMPONENT_COUNT: usize = 20;

/// Layout version stamped into every control block.
pub const CONTROL_BLOCK_VERSION: u32 = 1;

/// In-memory size stamped into every control block.
pub const CONTROL_BLOCK_SIZE: u32 = std::mem::size_of::<ComponentControlBlock>() as u32;

/// Logical subsystems that own a debug level and an assert enable bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum Component {
    Common = 0,
    Gmm = 1,
    Kmd = 2,
    D3d = 3,
    Ogl = 4,
    Ocl = 5,
    Media = 6,
    Cm = 7,
    Display = 8,
    Ddi = 9,
}

impl Component {
    pub const COUNT: usize = 10;

    pub const ALL: [Component; Component::COUNT] = [
        Component::Common,
        Component::Gmm,
        Component::Kmd,
        Component::D3d,
        Component::Ogl,
        Component::Ocl,
        Component::Media,
        Component::Cm,
        Component::Display,
        Component::Ddi,
    ];

    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit for this component in the enable masks
    #[inline]
    pub const fn mask(self) -> u32 {
        1 << (self as u32)
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Component::Common => "COMMON",
            Component::Gmm => "GMM",
            Component::Kmd => "KMD",
            Component::D3d => "D3D",
            Component::Ogl => "OGL",
            Component::Ocl => "OCL",
            Component::Media => "MEDIA",
            Component::Cm => "CM",
            Component::Display => "DISPLAY",
            Component::Ddi => "DDI",
        }
    }

    /// Prefix written in front of every debug message of this component
    pub fn prefix(self) -> &'static str {
        match self {
            Component::Common => "COMMON: ",
            Component::Gmm => "GMM: ",
            Component::Kmd => "KMD: ",
            Component::D3d => "D3D: ",
            Component::Ogl => "OGL: ",
            Component::Ocl => "OCL: ",
            Component::Media => "MEDIA: ",
            Component::Cm => "CM: ",
            Component::Display => "DISPLAY: ",
            Component::Ddi => "DDI: ",
        }
    }
}

const _: () = assert!(Component::COUNT <= MAX_COMPONENT_COUNT);
const _: () = assert!(MAX_COMPONENT_COUNT <= u32::BITS as usize);

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Debug message level flags.
///
/// Unlike [`LogLevel`](super::LogLevel) these are bits: a configured level
/// may hold any combination, and a message level is escalated before it is
/// tested so that one AND answers the question for every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugLevel(u32);

impl DebugLevel {
    pub const NONE: DebugLevel = DebugLevel(0);
    pub const VERBOSE: DebugLevel = DebugLevel(0x1);
    pub const NORMAL: DebugLevel = DebugLevel(0x2);
    pub const CRITICAL: DebugLevel = DebugLevel(0x4);
    pub const ALL: DebugLevel = DebugLevel(0x7);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        DebugLevel(bits)
    }

    #[inline]
    pub const fn contains(self, other: DebugLevel) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: DebugLevel) -> bool {
        self.0 & other.0 != 0
    }

    /// Add the implied lower bits: Critical implies Normal and Verbose,
    /// Normal implies Verbose.
    #[inline]
    pub const fn escalate(self) -> Self {
        if self.contains(DebugLevel::CRITICAL) {
            DebugLevel(self.0 | DebugLevel::NORMAL.0 | DebugLevel::VERBOSE.0)
        } else if self.contains(DebugLevel::NORMAL) {
            DebugLevel(self.0 | DebugLevel::VERBOSE.0)
        } else {
            self
        }
    }
}

impl BitOr for DebugLevel {
    type Output = DebugLevel;

    fn bitor(self, rhs: DebugLevel) -> DebugLevel {
        DebugLevel(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugLevel {
    fn bitor_assign(&mut self, rhs: DebugLevel) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DebugLevel {
    type Output = DebugLevel;

    fn bitand(self, rhs: DebugLevel) -> DebugLevel {
        DebugLevel(self.0 & rhs.0)
    }
}

/// Shared debug and assert control state for all components.
///
/// # Examples
///
/// ```
/// use gfx_diagnostics::{Component, ComponentControlBlock, DebugLevel};
///
/// let block = ComponentControlBlock::new()
///     .with_debug_level(Component::Gmm, DebugLevel::NORMAL)
///     .with_asserts(Component::Gmm);
///
/// assert!(block.message_enabled(Component::Gmm, DebugLevel::CRITICAL));
/// assert!(!block.message_enabled(Component::Gmm, DebugLevel::VERBOSE));
/// assert!(!block.message_enabled(Component::Kmd, DebugLevel::CRITICAL));
/// ```
#[repr(C)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentControlBlock {
    pub version: u32,
    pub size: u32,
    pub assert_enable_mask: u32,
    /// Consumed only by the kernel file-dump path
    pub enable_debug_file_dump: bool,
    pub debug_enable_mask: u32,
    /// Consumed only by the kernel ring-buffer path
    pub ring_buf_debug_mask: u32,
    pub report_assert_enable: bool,
    pub assert_break_disable: bool,
    pub debug_level: [DebugLevel; MAX_COMPONENT_COUNT],
}

impl Default for ComponentControlBlock {
    fn default() -> Self {
        Self {
            version: CONTROL_BLOCK_VERSION,
            size: CONTROL_BLOCK_SIZE,
            assert_enable_mask: 0,
            enable_debug_file_dump: false,
            debug_enable_mask: 0,
            ring_buf_debug_mask: 0,
            report_assert_enable: false,
            assert_break_disable: false,
            debug_level: [DebugLevel::NONE; MAX_COMPONENT_COUNT],
        }
    }
}

impl ComponentControlBlock {
    /// A tagged block with every component silenced
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A tagged block with all messages, reporting and breaking enabled
    #[must_use]
    pub fn fully_enabled() -> Self {
        Self {
            assert_enable_mask: u32::MAX,
            debug_enable_mask: u32::MAX,
            report_assert_enable: true,
            assert_break_disable: false,
            debug_level: [DebugLevel::ALL; MAX_COMPONENT_COUNT],
            ..Self::default()
        }
    }

    /// Enable debug messages for `component` at the given configured level
    #[must_use = "builder methods return a new value"]
    pub fn with_debug_level(mut self, component: Component, level: DebugLevel) -> Self {
        self.debug_enable_mask |= component.mask();
        self.debug_level[component.index()] = level;
        self
    }

    /// Enable assertions for `component`
    #[must_use = "builder methods return a new value"]
    pub fn with_asserts(mut self, component: Component) -> Self {
        self.assert_enable_mask |= component.mask();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_report_asserts(mut self, enabled: bool) -> Self {
        self.report_assert_enable = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_assert_break_disabled(mut self, disabled: bool) -> Self {
        self.assert_break_disable = disabled;
        self
    }

    /// Configured level for `component`
    #[inline]
    pub fn debug_level(&self, component: Component) -> DebugLevel {
        self.debug_level[component.index()]
    }

    /// Whether a message tagged `level` from `component` passes this block
    #[inline]
    pub fn message_enabled(&self, component: Component, level: DebugLevel) -> bool {
        self.debug_enable_mask & component.mask() != 0
            && level.escalate().intersects(self.debug_level(component))
    }

    /// Whether any bit of `component_mask` has assertions enabled
    #[inline]
    pub fn asserts_enabled(&self, component_mask: u32) -> bool {
        component_mask & self.assert_enable_mask != 0
    }

    /// Check the ABI tags against this build's layout
    pub fn validate(&self) -> Result<()> {
        if self.version != CONTROL_BLOCK_VERSION {
            return Err(LoggerError::control_block_mismatch(
                "version",
                CONTROL_BLOCK_VERSION,
                self.version,
            ));
        }
        if self.size != CONTROL_BLOCK_SIZE {
            return Err(LoggerError::control_block_mismatch(
                "size",
                CONTROL_BLOCK_SIZE,
                self.size,
            ));
        }
        Ok(())
    }

    /// Parse a block from JSON, filling unspecified fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let block: Self = serde_json::from_str(json)?;
        block.validate()?;
        Ok(block)
    }
}

/// Message decision including the unconfigured fallback: without a control
/// block every message is emitted.
#[inline]
pub fn message_enabled(
    control: Option<&ComponentControlBlock>,
    component: Component,
    level: DebugLevel,
) -> bool {
    control.map_or(true, |block| block.message_enabled(component, level))
}

/// Holder for the current control block snapshot.
///
/// An empty slot is the "not yet configured" state.
#[derive(Debug, Default)]
pub struct ControlSlot {
    current: RwLock<Option<Arc<ComponentControlBlock>>>,
}

impl ControlSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(block: ComponentControlBlock) -> Result<Self> {
        let slot = Self::new();
        slot.install(block)?;
        Ok(slot)
    }

    /// Current snapshot, if any
    #[inline]
    pub fn snapshot(&self) -> Option<Arc<ComponentControlBlock>> {
        self.current.read().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.current.read().is_some()
    }

    /// Replace the snapshot after validating its tags; returns the previous one
    pub fn install(&self, block: ComponentControlBlock) -> Result<Option<Arc<ComponentControlBlock>>> {
        self.install_shared(Arc::new(block))
    }

    pub fn install_shared(
        &self,
        block: Arc<ComponentControlBlock>,
    ) -> Result<Option<Arc<ComponentControlBlock>>> {
        block.validate()?;
        Ok(self.current.write().replace(block))
    }

    /// Return to the unconfigured state
    pub fn clear(&self) -> Option<Arc<ComponentControlBlock>> {
        self.current.write().take()
    }
}
