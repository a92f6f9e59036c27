//! Component-scoped debug messages and assertions
//!
//! A [`Diagnostics`] instance carries the control block snapshot, the assert
//! hooks, and the sink for component debug messages. Tests and hosts build
//! their own; instrumented code without one uses [`diagnostics()`], which
//! starts unconfigured (every message emitted, every failed assert trapping).

use super::{
    appender::Appender,
    assert_gate::{evaluate, AssertAction, AssertHooks, AssertSite, BuildFlavor},
    debug_control::{self, Component, ComponentControlBlock, ControlSlot, DebugLevel},
    error::Result,
    log_entry::LogEntry,
    log_level::LogLevel,
    logger::write_guarded,
    metrics::LoggerMetrics,
    render::{render_bounded, MAX_DEBUG_MESSAGE_LEN},
};
use crate::appenders::DebugOutputAppender;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::{Arc, OnceLock};

pub struct Diagnostics {
    control: ControlSlot,
    hooks: RwLock<AssertHooks>,
    messages: Mutex<Box<dyn Appender>>,
    metrics: LoggerMetrics,
}

impl Diagnostics {
    /// Unconfigured, writing debug messages to the debug channel
    pub fn new() -> Self {
        Self::with_appender(Box::new(DebugOutputAppender::new()))
    }

    pub fn with_appender(appender: Box<dyn Appender>) -> Self {
        Self {
            control: ControlSlot::new(),
            hooks: RwLock::new(AssertHooks::default()),
            messages: Mutex::new(appender),
            metrics: LoggerMetrics::new(),
        }
    }

    /// # Errors
    ///
    /// `ControlBlockMismatch` if the block's tags do not match this build
    pub fn with_control_block(self, block: ComponentControlBlock) -> Result<Self> {
        self.control.install(block)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_hooks(self, hooks: AssertHooks) -> Self {
        *self.hooks.write() = hooks;
        self
    }

    pub fn control(&self) -> &ControlSlot {
        &self.control
    }

    /// Swap in a new control block snapshot; returns the previous one
    pub fn install_control_block(
        &self,
        block: ComponentControlBlock,
    ) -> Result<Option<Arc<ComponentControlBlock>>> {
        self.control.install(block)
    }

    pub fn clear_control_block(&self) -> Option<Arc<ComponentControlBlock>> {
        self.control.clear()
    }

    pub fn hooks(&self) -> AssertHooks {
        *self.hooks.read()
    }

    pub fn set_hooks(&self, hooks: AssertHooks) {
        *self.hooks.write() = hooks;
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn message_enabled(&self, component: Component, level: DebugLevel) -> bool {
        debug_control::message_enabled(self.control.snapshot().as_deref(), component, level)
    }

    /// Render and write one component debug message
    pub fn debug_message(&self, component: Component, level: DebugLevel, args: fmt::Arguments<'_>) {
        if !self.message_enabled(component, level) {
            self.metrics.record_filtered();
            return;
        }

        match render_bounded(args, MAX_DEBUG_MESSAGE_LEN) {
            Ok(message) => {
                let entry = LogEntry::new(record_level(level), message).with_component(component);
                if write_guarded(&self.messages, &entry, &self.metrics) {
                    self.metrics.record_emitted();
                }
            }
            Err(e) => {
                self.metrics.record_format_failure();
                eprintln!("[LOGGER ERROR] Dropped {} debug message: {}", component.name(), e);
            }
        }
    }

    /// Check one assertion site and run the hooks its outcome calls for.
    ///
    /// Release-internal builds skip the decision and hand failures to the
    /// trace hook only.
    #[inline]
    pub fn check_assert(
        &self,
        site: &'static AssertSite,
        component: Component,
        passed: bool,
    ) -> AssertAction {
        self.check_assert_as(BuildFlavor::CURRENT, site, component, passed)
    }

    /// [`check_assert`](Self::check_assert) as it behaves under `flavor`
    pub fn check_assert_as(
        &self,
        flavor: BuildFlavor,
        site: &'static AssertSite,
        component: Component,
        passed: bool,
    ) -> AssertAction {
        match flavor {
            BuildFlavor::Release => AssertAction::Silent,
            BuildFlavor::ReleaseInternal => {
                if !passed {
                    (self.hooks().trace)(&site.report(component));
                }
                AssertAction::Silent
            }
            BuildFlavor::Debug => {
                site.register();
                let snapshot = self.control.snapshot();
                let action = evaluate(
                    snapshot.as_deref(),
                    component.mask(),
                    passed,
                    Some(site.is_enabled()),
                );
                self.run_hooks(action, site, component);
                action
            }
        }
    }

    /// Assertion kept in every build: traps on a false expression when the
    /// component has assertions enabled, or when no block is configured.
    /// Never reports. Returns whether it trapped.
    pub fn release_assert(&self, site: &AssertSite, component: Component, passed: bool) -> bool {
        if passed {
            return false;
        }
        let live = self
            .control
            .snapshot()
            .map_or(true, |block| block.asserts_enabled(component.mask()));
        if live {
            (self.hooks().trap)(&site.report(component));
        }
        live
    }

    fn run_hooks(&self, action: AssertAction, site: &AssertSite, component: Component) {
        if action == AssertAction::Silent {
            return;
        }
        let hooks = self.hooks();
        let report = site.report(component);
        if action.reports() {
            (hooks.report)(&report);
        }
        if action.traps() {
            (hooks.trap)(&report);
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.messages.lock().flush()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("control", &self.control)
            .field("hooks", &*self.hooks.read())
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Log level recorded for a debug message: the highest flag it carries
fn record_level(level: DebugLevel) -> LogLevel {
    if level.contains(DebugLevel::CRITICAL) {
        LogLevel::Error
    } else if level.contains(DebugLevel::NORMAL) {
        LogLevel::Info
    } else {
        LogLevel::Trace
    }
}

/// Process-wide diagnostics, unconfigured until a host installs a block
pub fn diagnostics() -> &'static Diagnostics {
    static DIAGNOSTICS: OnceLock<Diagnostics> = OnceLock::new();
    DIAGNOSTICS.get_or_init(Diagnostics::new)
}
