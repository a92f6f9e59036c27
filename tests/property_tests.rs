//! Property-based tests for gfx_diagnostics using proptest

use gfx_diagnostics::prelude::*;
use gfx_diagnostics::{evaluate, render_bounded, should_emit};
use proptest::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Off),
        Just(LogLevel::Trace),
        Just(LogLevel::Info),
        Just(LogLevel::Error),
    ]
}

fn any_component() -> impl Strategy<Value = Component> {
    (0..Component::COUNT as u32).prop_map(|id| Component::from_id(id).unwrap())
}

fn any_flag() -> impl Strategy<Value = DebugLevel> {
    prop_oneof![
        Just(DebugLevel::VERBOSE),
        Just(DebugLevel::NORMAL),
        Just(DebugLevel::CRITICAL),
    ]
}

// ============================================================================
// Severity Tests
// ============================================================================

proptest! {
    /// A message passes exactly when it is at or above a non-Off threshold
    #[test]
    fn test_ordinal_law(requested in any_level(), threshold in any_level()) {
        let expected = threshold != LogLevel::Off
            && requested != LogLevel::Off
            && (requested as u8) >= (threshold as u8);
        prop_assert_eq!(should_emit(requested, threshold), expected);
    }

    #[test]
    fn test_off_threshold_silences_everything(requested in any_level()) {
        prop_assert!(!should_emit(requested, LogLevel::Off));
    }

    #[test]
    fn test_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        prop_assert_eq!(LogLevel::from_ordinal(level as u32), Some(level));
    }
}

// ============================================================================
// Escalation Tests
// ============================================================================

proptest! {
    /// A message is seen by a listener iff the listener holds a flag at or
    /// below the message's flag
    #[test]
    fn test_escalation_law(
        component in any_component(),
        message in any_flag(),
        listener in 0u32..8,
    ) {
        let listener = DebugLevel::from_bits(listener);
        let block = ComponentControlBlock::new().with_debug_level(component, listener);
        let expected = (message.bits() * 2 - 1) & listener.bits() != 0;
        prop_assert_eq!(block.message_enabled(component, message), expected);
    }

    #[test]
    fn test_disabled_component_sees_nothing(
        component in any_component(),
        message in any_flag(),
    ) {
        let mut block = ComponentControlBlock::new().with_debug_level(component, DebugLevel::ALL);
        block.debug_enable_mask &= !component.mask();
        prop_assert!(!block.message_enabled(component, message));
    }

    #[test]
    fn test_null_block_emits_and_traps(
        component in any_component(),
        message in any_flag(),
    ) {
        prop_assert!(gfx_diagnostics::core::debug_control::message_enabled(None, component, message));
        let action = evaluate(None, component.mask(), false, None);
        prop_assert!(action.reports() && action.traps());
    }

    #[test]
    fn test_disabled_site_always_silent(
        component in any_component(),
        passed in any::<bool>(),
        report in any::<bool>(),
        break_disabled in any::<bool>(),
    ) {
        let block = ComponentControlBlock::new()
            .with_asserts(component)
            .with_report_asserts(report)
            .with_assert_break_disabled(break_disabled);
        prop_assert_eq!(
            evaluate(Some(&block), component.mask(), passed, Some(false)),
            AssertAction::Silent
        );
    }
}

// ============================================================================
// Rendering Tests
// ============================================================================

proptest! {
    /// Rendering either yields the full text or rejects it; never a prefix
    #[test]
    fn test_render_never_truncates(text in "[a-z ]{0,64}", limit in 0usize..64) {
        match render_bounded(format_args!("{}", text), limit) {
            Ok(rendered) => {
                prop_assert!(text.len() <= limit);
                prop_assert_eq!(rendered, text);
            }
            Err(LoggerError::FormatOverflow { limit: reported }) => {
                prop_assert!(text.len() > limit);
                prop_assert_eq!(reported, limit);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
