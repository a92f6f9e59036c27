//! Driver diagnostics example
//!
//! Demonstrates a file-backed logger with rotation, component debug messages
//! gated by a control block, and assertion hooks.
//!
//! Run with: cargo run --example driver_diagnostics

use gfx_diagnostics::prelude::*;
use gfx_diagnostics::{error_if, gfx_assert, gfx_debug_message, info, AssertReport};

fn log_assert(report: &AssertReport) {
    println!("   hook saw: {}", report);
}

fn main() -> Result<()> {
    println!("=== gfx_diagnostics - Driver Diagnostics Example ===\n");

    let dir = std::env::temp_dir().join("gfx_diagnostics_demo");
    let config = LoggerConfig::file(dir.join("gmm_log"))
        .with_level(LogLevel::Info)
        .with_max_file_size(4 * 1024)
        .with_max_backups(2);

    println!("1. Logging to {}:", config.resolved_file_path().display());
    let logger = Logger::from_config(config);
    for frame in 0..200 {
        info!(logger, "frame {} submitted", frame);
        error_if!(logger, frame % 50 == 49, "frame {} missed its deadline", frame);
    }
    println!("   logger state: {:?}", logger.state());
    println!("   records written: {}", logger.metrics().emitted());

    println!("\n2. Component debug messages:");
    let diag = Diagnostics::new()
        .with_control_block(
            ComponentControlBlock::new()
                .with_debug_level(Component::Gmm, DebugLevel::NORMAL)
                .with_asserts(Component::Gmm)
                .with_report_asserts(true)
                .with_assert_break_disabled(true),
        )?
        .with_hooks(AssertHooks {
            report: log_assert,
            ..AssertHooks::default()
        });

    gfx_debug_message!(diag, Component::Gmm, DebugLevel::CRITICAL, "tile mode {} unsupported", 3);
    gfx_debug_message!(diag, Component::Gmm, DebugLevel::VERBOSE, "hidden by the control block");
    gfx_debug_message!(diag, Component::Kmd, DebugLevel::CRITICAL, "hidden: KMD is not enabled");

    println!("\n3. Assertions (reporting on, breaking off):");
    let pitch = 100;
    gfx_assert!(diag, Component::Gmm, pitch % 64 == 0);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
