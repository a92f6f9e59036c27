//! Assertion gating
//!
//! Whether a failed assertion reports, traps, both, or stays silent depends
//! on the control block, the call site's runtime toggle, and the build
//! flavor. The decision itself is [`evaluate`]; the side effects run through
//! replaceable [`AssertHooks`].

use super::debug_control::{Component, ComponentControlBlock};
use super::logger::{in_sink_write, logger};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Compile-time build flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildFlavor {
    /// Full logging and assertion checking
    Debug,
    /// Logging on; assertions only forward to the trace hook
    ReleaseInternal,
    /// Logging and assertions compiled out
    Release,
}

impl BuildFlavor {
    pub const CURRENT: BuildFlavor = if cfg!(debug_assertions) {
        BuildFlavor::Debug
    } else if cfg!(feature = "release-internal") {
        BuildFlavor::ReleaseInternal
    } else {
        BuildFlavor::Release
    };

    #[inline]
    pub const fn logging_enabled(self) -> bool {
        !matches!(self, BuildFlavor::Release)
    }

    /// Whether assertion macros evaluate anything at all
    #[inline]
    pub const fn asserts_compiled(self) -> bool {
        !matches!(self, BuildFlavor::Release)
    }
}

/// Outcome of an assertion check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertAction {
    Silent,
    Report,
    Trap,
    ReportAndTrap,
}

impl AssertAction {
    #[inline]
    pub const fn reports(self) -> bool {
        matches!(self, AssertAction::Report | AssertAction::ReportAndTrap)
    }

    #[inline]
    pub const fn traps(self) -> bool {
        matches!(self, AssertAction::Trap | AssertAction::ReportAndTrap)
    }
}

/// Decide what a checked assertion does.
///
/// A site toggle that is present and off silences the site entirely. With
/// no control block, a false expression reports and traps. Otherwise the
/// assertion is live only when `component_mask` intersects the block's
/// assert-enable mask; a live failure reports when reporting is enabled and
/// traps unless breaking is disabled.
///
/// # Example
///
/// ```
/// use gfx_diagnostics::{evaluate, AssertAction, Component, ComponentControlBlock};
///
/// assert_eq!(evaluate(None, Component::Gmm.mask(), false, None), AssertAction::ReportAndTrap);
/// assert_eq!(evaluate(None, Component::Gmm.mask(), false, Some(false)), AssertAction::Silent);
///
/// let block = ComponentControlBlock::new().with_asserts(Component::Gmm).with_report_asserts(true);
/// assert_eq!(evaluate(Some(&block), Component::Kmd.mask(), false, None), AssertAction::Silent);
/// assert_eq!(evaluate(Some(&block), Component::Gmm.mask(), false, None), AssertAction::ReportAndTrap);
/// ```
pub fn evaluate(
    control: Option<&ComponentControlBlock>,
    component_mask: u32,
    passed: bool,
    site_enabled: Option<bool>,
) -> AssertAction {
    if site_enabled == Some(false) || passed {
        return AssertAction::Silent;
    }

    let Some(block) = control else {
        return AssertAction::ReportAndTrap;
    };
    if !block.asserts_enabled(component_mask) {
        return AssertAction::Silent;
    }

    match (block.report_assert_enable, !block.assert_break_disable) {
        (true, true) => AssertAction::ReportAndTrap,
        (true, false) => AssertAction::Report,
        (false, true) => AssertAction::Trap,
        (false, false) => AssertAction::Silent,
    }
}

static SITE_REGISTRY: Mutex<Vec<&'static AssertSite>> = parking_lot::const_mutex(Vec::new());

/// One assertion call site, declared as a `static` by the assertion macros
#[derive(Debug)]
pub struct AssertSite {
    file: &'static str,
    line: u32,
    expression: &'static str,
    enabled: AtomicBool,
    registered: AtomicBool,
}

impl AssertSite {
    pub const fn new(file: &'static str, line: u32, expression: &'static str) -> Self {
        Self {
            file,
            line,
            expression,
            enabled: AtomicBool::new(true),
            registered: AtomicBool::new(false),
        }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn expression(&self) -> &'static str {
        self.expression
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Add this site to the process-wide registry; later calls are no-ops
    pub fn register(&'static self) {
        if self.registered.load(Ordering::Acquire) {
            return;
        }
        let mut sites = SITE_REGISTRY.lock();
        if !self.registered.swap(true, Ordering::AcqRel) {
            sites.push(self);
        }
    }

    pub fn report(&self, component: Component) -> AssertReport {
        AssertReport {
            component,
            expression: self.expression,
            file: self.file,
            line: self.line,
        }
    }
}

fn set_site_enabled(file: &str, line: u32, enabled: bool) -> usize {
    let sites = SITE_REGISTRY.lock();
    let mut matched = 0;
    for site in sites.iter().filter(|s| s.line == line && s.file.ends_with(file)) {
        site.set_enabled(enabled);
        matched += 1;
    }
    matched
}

/// Silence the registered site at `file:line`; returns the number of sites
/// matched. `file` may be a path suffix. Sites register on first evaluation.
pub fn disable_assert_site(file: &str, line: u32) -> usize {
    set_site_enabled(file, line, false)
}

pub fn enable_assert_site(file: &str, line: u32) -> usize {
    set_site_enabled(file, line, true)
}

/// Every site evaluated so far in this process
pub fn registered_assert_sites() -> Vec<&'static AssertSite> {
    SITE_REGISTRY.lock().clone()
}

/// A failed assertion, as handed to the hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertReport {
    pub component: Component,
    pub expression: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl fmt::Display for AssertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}ASSERT '{}' failed at {}:{}",
            self.component.prefix(),
            self.expression,
            self.file,
            self.line
        )
    }
}

pub type AssertHook = fn(&AssertReport);

/// Side effects of a failed assertion
///
/// The defaults log through the global [`logger()`]. When called from inside
/// an appender they write to stderr only, since that logger's sink lock is
/// not reentrant. Custom hooks that log should check
/// [`in_sink_write`] the same way.
#[derive(Clone, Copy)]
pub struct AssertHooks {
    pub report: AssertHook,
    pub trap: AssertHook,
    /// Used instead of the others in release-internal builds
    pub trace: AssertHook,
}

impl Default for AssertHooks {
    fn default() -> Self {
        Self {
            report: default_report,
            trap: default_trap,
            trace: default_trace,
        }
    }
}

impl fmt::Debug for AssertHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertHooks").finish_non_exhaustive()
    }
}

// Inside an appender the global logger's sink may already be locked on this
// thread, so the defaults fall back to stderr there.
fn default_report(report: &AssertReport) {
    eprintln!("[ASSERT] {}", report);
    if !in_sink_write() {
        logger().error(report.to_string());
    }
}

fn default_trap(report: &AssertReport) {
    panic!("{}", report);
}

fn default_trace(report: &AssertReport) {
    if in_sink_write() {
        eprintln!("[ASSERT] {}", report);
    } else {
        logger().trace(report.to_string());
    }
}
