use spyglass_core::ConnectionId;
use std::time::Instant;

/// Permission handshake for one room.
///
/// Only `Idle` and `Requested` are stored: a response resolves the request
/// immediately, with a grant recorded as the room's active sharer rather
/// than as a machine state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HandshakeState {
    #[default]
    Idle,
    Requested {
        requester: ConnectionId,
        target: ConnectionId,
        since: Instant,
    },
}

/// Request displaced by a newer one. The displaced requester is owed an
/// implicit denial.
#[derive(Debug, Clone, Copy)]
pub struct SupersededRequest {
    pub requester: ConnectionId,
    pub since: Instant,
}

/// What became of a pending request when a member left the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CancelOutcome {
    NotPending,
    RequesterLeft,
    /// The target left; the still-present requester is owed an implicit
    /// denial.
    TargetLeft { requester: ConnectionId },
}

impl HandshakeState {
    /// Install a new request. The latest request always wins; the one it
    /// displaces, if any, is returned.
    pub fn begin(
        &mut self,
        requester: ConnectionId,
        target: ConnectionId,
    ) -> Option<SupersededRequest> {
        let superseded = match *self {
            HandshakeState::Requested {
                requester, since, ..
            } => Some(SupersededRequest { requester, since }),
            HandshakeState::Idle => None,
        };

        *self = HandshakeState::Requested {
            requester,
            target,
            since: Instant::now(),
        };

        superseded
    }

    /// Consume the pending request if `responder` is its designated target.
    /// Returns the requester awaiting the result.
    pub fn respond(&mut self, responder: ConnectionId) -> Option<ConnectionId> {
        match *self {
            HandshakeState::Requested {
                requester, target, ..
            } if target == responder => {
                *self = HandshakeState::Idle;
                Some(requester)
            }
            _ => None,
        }
    }

    /// Cancel the pending request when `leaver` exits the room.
    pub fn cancel_for(&mut self, leaver: ConnectionId) -> CancelOutcome {
        match *self {
            HandshakeState::Requested { requester, .. } if requester == leaver => {
                *self = HandshakeState::Idle;
                CancelOutcome::RequesterLeft
            }
            HandshakeState::Requested {
                requester, target, ..
            } if target == leaver => {
                *self = HandshakeState::Idle;
                CancelOutcome::TargetLeft { requester }
            }
            _ => CancelOutcome::NotPending,
        }
    }
}
