//! Session registry: the authoritative last-known state of every participant.
//!
//! A passive store. It holds no history and never gates broadcasts; it only
//! exists so that a newly accepted connection can be caught up.

use super::{
    entity::Participant,
    value_object::{ParticipantId, ParticipantState},
};

/// In-memory table of registered participants, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    participants: Vec<Participant>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `participant.id`.
    ///
    /// Last join wins; a replaced entry keeps its original position.
    /// Returns `true` if an existing entry was replaced.
    pub fn upsert_on_join(&mut self, participant: Participant) -> bool {
        match self.position(&participant.id) {
            Some(index) => {
                self.participants[index] = participant;
                true
            }
            None => {
                self.participants.push(participant);
                false
            }
        }
    }

    /// Replace the state of an existing entry; the username is untouched.
    ///
    /// Returns `false` (and changes nothing) when `id` is not registered.
    pub fn update_state(&mut self, id: &ParticipantId, state: ParticipantState) -> bool {
        match self.participants.iter_mut().find(|p| &p.id == id) {
            Some(participant) => {
                participant.state = state;
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `id`, if any.
    pub fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        self.position(id).map(|index| self.participants.remove(index))
    }

    /// Every registered participant, in insertion order.
    pub fn snapshot(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.iter()
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| &p.id == id)
    }
}
