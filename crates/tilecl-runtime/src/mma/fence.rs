use alloc::collections::VecDeque;

/// Handle of one issued instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MmaToken(u64);

/// Progress of an issued instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MmaState {
    /// Issued, not yet committed to a group.
    Issued,
    /// Committed and executing.
    InFlight,
    /// Results are visible in the destination.
    Complete,
}

#[derive(Debug, Default)]
struct FenceState {
    next: u64,
    committed: u64,
    completed: u64,
    // Exclusive upper token of every committed group still in flight, oldest first.
    groups: VecDeque<u64>,
}

/// Synchronization point of the asynchronous matrix-multiply-accumulate unit.
///
/// Instructions are issued, committed by groups, then awaited by waiting until at most a given
/// number of groups remain in flight, oldest groups completing first.
#[derive(Debug, Default)]
pub struct MmaFence {
    state: spin::Mutex<FenceState>,
}

impl MmaFence {
    /// A fence with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new instruction.
    pub fn issue(&self) -> MmaToken {
        let mut state = self.state.lock();
        let token = MmaToken(state.next);
        state.next += 1;
        token
    }

    /// Commit every issued instruction as a new group, which starts executing.
    pub fn commit_group(&self) {
        let mut state = self.state.lock();
        let end = state.next;
        state.groups.push_back(end);
        state.committed = end;
    }

    /// Block until at most `pending` committed groups are still in flight.
    pub fn wait(&self, pending: usize) {
        let mut state = self.state.lock();
        while state.groups.len() > pending {
            if let Some(end) = state.groups.pop_front() {
                state.completed = end;
            }
        }
    }

    /// Current state of an instruction.
    pub fn state(&self, token: MmaToken) -> MmaState {
        let state = self.state.lock();
        if token.0 >= state.committed {
            MmaState::Issued
        } else if token.0 >= state.completed {
            MmaState::InFlight
        } else {
            MmaState::Complete
        }
    }

    /// Committed groups still in flight.
    pub fn pending_groups(&self) -> usize {
        self.state.lock().groups.len()
    }
}
