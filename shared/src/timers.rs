//! Bookkeeping for outstanding shell timers.
//!
//! Every scheduled delay gets a fresh `TimerToken`, and the registry remembers
//! what the token was for. A token that is no longer registered, because it was
//! cancelled or superseded, is simply ignored when its `TimerElapsed` arrives.

use std::collections::BTreeMap;

use crate::dispatch::RESPONDERS;
use crate::event::{ActivationId, DispatchVisitId, TimerToken};
use crate::navigation::{ViewId, LOADING_CLEAR_DELAY_MS, SWAP_DELAY_MS};
use crate::{COUNTDOWN_TICK_MS, SIGN_IN_DELAY_MS, SIGN_OUT_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    NavigationSwap { target: ViewId },
    LoadingClear,
    CountdownTick { activation: ActivationId },
    ServiceConnect {
        activation: ActivationId,
        visit: DispatchVisitId,
        index: usize,
    },
    SignIn,
    Register,
    SignOut,
}

impl TimerPurpose {
    #[must_use]
    pub fn delay_ms(self) -> u64 {
        match self {
            Self::NavigationSwap { .. } => SWAP_DELAY_MS,
            Self::LoadingClear => LOADING_CLEAR_DELAY_MS,
            Self::CountdownTick { .. } => COUNTDOWN_TICK_MS,
            Self::ServiceConnect { index, .. } => RESPONDERS
                .get(index)
                .map_or(0, |responder| responder.delay_ms),
            Self::SignIn | Self::Register => SIGN_IN_DELAY_MS,
            Self::SignOut => SIGN_OUT_DELAY_MS,
        }
    }

    #[must_use]
    pub const fn is_dispatch(self) -> bool {
        matches!(self, Self::ServiceConnect { .. })
    }

    #[must_use]
    pub const fn is_countdown(self) -> bool {
        matches!(self, Self::CountdownTick { .. })
    }
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    next: u64,
    live: BTreeMap<TimerToken, TimerPurpose>,
}

impl TimerRegistry {
    pub fn register(&mut self, purpose: TimerPurpose) -> TimerToken {
        self.next += 1;
        let token = TimerToken(self.next);
        self.live.insert(token, purpose);
        token
    }

    /// Consumes a fired token. `None` means it was cancelled or never issued.
    pub fn take(&mut self, token: TimerToken) -> Option<TimerPurpose> {
        self.live.remove(&token)
    }

    /// Forgets a single token; returns whether it was still live.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        self.live.remove(&token).is_some()
    }

    /// Removes every live token matching `predicate` and returns them in issue
    /// order so the caller can cancel them with the shell.
    pub fn drain_where(&mut self, predicate: impl Fn(TimerPurpose) -> bool) -> Vec<TimerToken> {
        let doomed: Vec<TimerToken> = self
            .live
            .iter()
            .filter(|(_, purpose)| predicate(**purpose))
            .map(|(token, _)| *token)
            .collect();
        for token in &doomed {
            self.live.remove(token);
        }
        doomed
    }

    /// Removes everything, used on sign-out.
    pub fn drain(&mut self) -> Vec<TimerToken> {
        std::mem::take(&mut self.live).into_keys().collect()
    }

    #[must_use]
    pub fn contains(&self, token: TimerToken) -> bool {
        self.live.contains_key(&token)
    }

    #[must_use]
    pub fn count_where(&self, predicate: impl Fn(TimerPurpose) -> bool) -> usize {
        self.live.values().filter(|purpose| predicate(**purpose)).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
