// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow reconciliation.
//!
//! [`reconcile`] folds one [`ShadowEvent`] into the current [`DeviceState`]
//! and decides what the controller has to do next. It touches neither
//! hardware nor the network, so every rule below is checked directly by the
//! tests in this module.
//!
//! | Event          | Merge | Apply relay | Publish `reported`     |
//! |----------------|-------|-------------|------------------------|
//! | `Connected`    | no    | no          | pre-event state        |
//! | `GetAccepted`  | yes   | yes         | no                     |
//! | `UpdateDelta`  | yes   | yes         | merged state           |
//! | anything else  | no    | no          | no                     |
//!
//! The merge takes `reported.on` first and `desired.on` last, so a pending
//! desired value always overrides the last acknowledged one.

use crate::event::ShadowEvent;
use crate::protocol::ShadowUpdate;
use crate::state::{DeviceState, ShadowDocument};

/// Outcome of reconciling one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The state after the merge.
    pub state: DeviceState,
    /// Whether the merge changed the state.
    pub changed: bool,
    /// Whether `state.on()` must be written to the relay.
    pub apply_hardware: bool,
    /// Update to publish once the relay has been written.
    pub publish: Option<ShadowUpdate>,
}

impl Reconciliation {
    fn unchanged(state: &DeviceState) -> Self {
        Self {
            state: *state,
            changed: false,
            apply_hardware: false,
            publish: None,
        }
    }
}

/// Merges `reported` then `desired` into `state`.
///
/// Returns `true` if the state changed.
pub fn merge(
    state: &mut DeviceState,
    reported: Option<&ShadowDocument>,
    desired: Option<&ShadowDocument>,
) -> bool {
    let mut changed = false;
    for document in [reported, desired].into_iter().flatten() {
        if state.merge(document) {
            changed = true;
        }
    }
    changed
}

/// Decides how `event` changes `state` and what has to follow.
#[must_use]
pub fn reconcile(event: &ShadowEvent, state: &DeviceState) -> Reconciliation {
    match event {
        ShadowEvent::Connected => Reconciliation {
            state: *state,
            changed: false,
            apply_hardware: false,
            publish: Some(ShadowUpdate::Reported(*state)),
        },
        ShadowEvent::GetAccepted { reported, desired } => {
            let mut next = *state;
            let changed = merge(&mut next, reported.as_ref(), desired.as_ref());
            Reconciliation {
                state: next,
                changed,
                apply_hardware: true,
                publish: None,
            }
        }
        ShadowEvent::UpdateDelta { reported, desired } => {
            let mut next = *state;
            let changed = merge(&mut next, reported.as_ref(), desired.as_ref());
            Reconciliation {
                state: next,
                changed,
                apply_hardware: true,
                publish: Some(ShadowUpdate::Reported(next)),
            }
        }
        ShadowEvent::Other(_) => Reconciliation::unchanged(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ShadowEventKind;
    use crate::types::Temperature;

    fn state(on: bool) -> DeviceState {
        DeviceState::sampled(on, Temperature::Celsius(20.0))
    }

    fn doc(on: bool) -> Option<ShadowDocument> {
        Some(ShadowDocument::with_on(on))
    }

    #[test]
    fn merge_without_fields_is_idempotent() {
        for on in [false, true] {
            for (reported, desired) in [
                (None, None),
                (Some(ShadowDocument::new()), None),
                (None, Some(ShadowDocument::new())),
                (Some(ShadowDocument::new()), Some(ShadowDocument::new())),
            ] {
                let mut s = state(on);
                assert!(!merge(&mut s, reported.as_ref(), desired.as_ref()));
                assert_eq!(s, state(on));
            }
        }
    }

    #[test]
    fn desired_wins_over_reported() {
        for initial in [false, true] {
            for a in [false, true] {
                for b in [false, true] {
                    let mut s = state(initial);
                    merge(&mut s, doc(a).as_ref(), doc(b).as_ref());
                    assert_eq!(s.on(), b, "initial={initial} reported={a} desired={b}");
                }
            }
        }
    }

    #[test]
    fn reported_alone_is_taken() {
        let mut s = state(false);
        merge(&mut s, doc(true).as_ref(), None);
        assert!(s.on());
    }

    #[test]
    fn connected_publishes_pre_event_state() {
        let before = state(true);
        let outcome = reconcile(&ShadowEvent::Connected, &before);

        assert_eq!(outcome.state, before);
        assert!(!outcome.changed);
        assert!(!outcome.apply_hardware);
        assert_eq!(outcome.publish, Some(ShadowUpdate::Reported(before)));
    }

    #[test]
    fn get_accepted_applies_without_publishing() {
        let event = ShadowEvent::GetAccepted {
            reported: doc(false),
            desired: doc(true),
        };
        let outcome = reconcile(&event, &state(false));

        assert!(outcome.state.on());
        assert!(outcome.changed);
        assert!(outcome.apply_hardware);
        assert_eq!(outcome.publish, None);
    }

    #[test]
    fn update_delta_publishes_merged_state() {
        let event = ShadowEvent::UpdateDelta {
            reported: None,
            desired: doc(true),
        };
        let outcome = reconcile(&event, &state(false));

        assert!(outcome.state.on());
        assert!(outcome.apply_hardware);
        assert_eq!(outcome.publish, Some(ShadowUpdate::Reported(outcome.state)));
    }

    #[test]
    fn empty_documents_still_apply() {
        let event = ShadowEvent::GetAccepted {
            reported: None,
            desired: None,
        };
        let outcome = reconcile(&event, &state(true));

        assert_eq!(outcome.state, state(true));
        assert!(!outcome.changed);
        assert!(outcome.apply_hardware);
    }

    #[test]
    fn other_events_do_nothing() {
        for kind in [
            ShadowEventKind::GetRejected,
            ShadowEventKind::UpdateAccepted,
            ShadowEventKind::UpdateRejected,
        ] {
            let outcome = reconcile(&ShadowEvent::Other(kind), &state(true));
            assert_eq!(outcome, Reconciliation::unchanged(&state(true)));
        }
    }

    #[test]
    fn delta_matching_state_is_unchanged_but_reported() {
        let event = ShadowEvent::UpdateDelta {
            reported: None,
            desired: doc(true),
        };
        let outcome = reconcile(&event, &state(true));

        assert!(!outcome.changed);
        assert!(outcome.apply_hardware);
        assert_eq!(outcome.publish, Some(ShadowUpdate::Reported(state(true))));
    }

    #[test]
    fn temperature_survives_reconciliation() {
        let before = DeviceState::sampled(false, Temperature::Unavailable);
        let event = ShadowEvent::UpdateDelta {
            reported: None,
            desired: doc(true),
        };
        let outcome = reconcile(&event, &before);
        assert!(outcome.state.temperature().is_unavailable());
    }
}
