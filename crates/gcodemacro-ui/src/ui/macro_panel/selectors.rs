//! Derived state for the macro panel
//!
//! Pure functions of a store snapshot, recomputed on every store change.

use gcodemacro_core::{MachineState, StoreState, WorkflowState};
use serde::Serialize;

/// Flags gating the per-macro actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroFlags {
    /// Load is enabled
    pub can_load_macro: bool,
    /// Run is enabled
    pub can_run_macro: bool,
}

/// Connected, not running a program, and the machine is in a state that accepts commands
pub fn is_actionable(state: &StoreState) -> bool {
    if !state.connection.state.is_connected() {
        return false;
    }

    if state.controller.workflow.state.is_running() {
        return false;
    }

    matches!(
        state.controller.reformed_machine_state,
        // None: firmware reports no machine state (e.g. Marlin)
        MachineState::None | MachineState::Idle | MachineState::Run
    )
}

/// Actionable and the workflow is idle
pub fn can_load_macro(state: &StoreState) -> bool {
    is_actionable(state) && matches!(state.controller.workflow.state, WorkflowState::Idle)
}

/// Actionable and the workflow is idle or paused
pub fn can_run_macro(state: &StoreState) -> bool {
    is_actionable(state)
        && matches!(
            state.controller.workflow.state,
            WorkflowState::Idle | WorkflowState::Paused
        )
}

/// Both flags at once
pub fn select_macro_flags(state: &StoreState) -> MacroFlags {
    MacroFlags {
        can_load_macro: can_load_macro(state),
        can_run_macro: can_run_macro(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodemacro_core::ConnectionState;
    use proptest::prelude::*;

    fn state(connection: &str, workflow: &str, machine: &str) -> StoreState {
        StoreState::new(
            ConnectionState::parse(connection),
            WorkflowState::parse(workflow),
            MachineState::parse(machine),
        )
    }

    fn any_connection() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("disconnected".to_string()),
            Just("connecting".to_string()),
            Just("connected".to_string()),
            Just("disconnecting".to_string()),
            "[a-z]{0,8}",
        ]
    }

    fn any_workflow() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("idle".to_string()),
            Just("paused".to_string()),
            Just("running".to_string()),
            "[a-z]{0,8}",
        ]
    }

    fn any_machine() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("idle".to_string()),
            Just("run".to_string()),
            Just("hold".to_string()),
            Just("alarm".to_string()),
            Just("jog".to_string()),
            "[a-z]{0,8}",
        ]
    }

    #[test]
    fn test_connected_idle_machine_idle() {
        let flags = select_macro_flags(&state("connected", "idle", "idle"));
        assert!(flags.can_load_macro);
        assert!(flags.can_run_macro);
    }

    #[test]
    fn test_paused_allows_run_only() {
        let flags = select_macro_flags(&state("connected", "paused", "run"));
        assert!(!flags.can_load_macro);
        assert!(flags.can_run_macro);
    }

    #[test]
    fn test_no_machine_state_is_actionable() {
        assert!(is_actionable(&state("connected", "idle", "")));
    }

    #[test]
    fn test_alarm_blocks_everything() {
        let flags = select_macro_flags(&state("connected", "idle", "alarm"));
        assert_eq!(flags, MacroFlags::default());
    }

    #[test]
    fn test_default_store_is_not_actionable() {
        assert!(!is_actionable(&StoreState::default()));
    }

    proptest! {
        #[test]
        fn prop_disconnected_never_actionable(
            workflow in any_workflow(),
            machine in any_machine(),
            connection in any_connection(),
        ) {
            prop_assume!(connection != "connected");
            let s = state(&connection, &workflow, &machine);
            prop_assert!(!is_actionable(&s));
            prop_assert!(!can_load_macro(&s));
            prop_assert!(!can_run_macro(&s));
        }

        #[test]
        fn prop_running_never_actionable(
            connection in any_connection(),
            machine in any_machine(),
        ) {
            let s = state(&connection, "running", &machine);
            prop_assert!(!is_actionable(&s));
            prop_assert_eq!(select_macro_flags(&s), MacroFlags::default());
        }

        #[test]
        fn prop_flags_follow_definition(
            connection in any_connection(),
            workflow in any_workflow(),
            machine in any_machine(),
        ) {
            let s = state(&connection, &workflow, &machine);
            let actionable = is_actionable(&s);
            prop_assert_eq!(can_load_macro(&s), actionable && workflow == "idle");
            prop_assert_eq!(
                can_run_macro(&s),
                actionable && (workflow == "idle" || workflow == "paused")
            );
            // Load implies run
            prop_assert!(!can_load_macro(&s) || can_run_macro(&s));
        }
    }
}
