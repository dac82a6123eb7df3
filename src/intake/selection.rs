//! Specialist selection and lead appointment
//!
//! Invariants, restored after every change:
//! - `lead` is always a selected member
//! - an empty selection has no lead
//! - a single selected member is the lead

use serde::Serialize;

use crate::types::{Specialist, SpecialistId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("specialist '{0}' is not selected and cannot lead")]
    LeadNotSelected(SpecialistId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowSelection {
    selected: Vec<SpecialistId>,
    lead: Option<SpecialistId>,
}

/// A selection proven non-empty with a lead among its members.
///
/// Only `WorkflowSelection::confirm` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedWorkflow {
    members: Vec<SpecialistId>,
    lead: SpecialistId,
}

impl ConfirmedWorkflow {
    pub fn members(&self) -> &[SpecialistId] {
        &self.members
    }

    pub fn lead(&self) -> &SpecialistId {
        &self.lead
    }

    pub fn into_parts(self) -> (Vec<SpecialistId>, SpecialistId) {
        (self.members, self.lead)
    }
}

impl WorkflowSelection {
    /// Directory default: everyone selected, `preferred_lead` leads when
    /// listed, otherwise the first entry. Repeated ids keep their first
    /// position only.
    pub fn from_directory(specialists: &[Specialist], preferred_lead: Option<&SpecialistId>) -> Self {
        let mut selected: Vec<SpecialistId> = Vec::with_capacity(specialists.len());
        for s in specialists {
            if !selected.contains(&s.id) {
                selected.push(s.id.clone());
            }
        }
        let lead = preferred_lead
            .filter(|id| selected.contains(*id))
            .or_else(|| selected.first())
            .cloned();
        Self { selected, lead }
    }

    pub fn selected(&self) -> &[SpecialistId] {
        &self.selected
    }

    pub fn lead(&self) -> Option<&SpecialistId> {
        self.lead.as_ref()
    }

    pub fn is_selected(&self, id: &SpecialistId) -> bool {
        self.selected.contains(id)
    }

    /// Add or remove `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &SpecialistId) -> bool {
        let now_selected = if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id.clone());
            true
        };
        self.normalize();
        now_selected
    }

    pub fn set_lead(&mut self, id: &SpecialistId) -> Result<(), SelectionError> {
        if !self.is_selected(id) {
            return Err(SelectionError::LeadNotSelected(id.clone()));
        }
        self.lead = Some(id.clone());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.lead = None;
    }

    pub fn confirm(&self) -> Option<ConfirmedWorkflow> {
        let lead = self.lead.clone()?;
        if self.selected.is_empty() {
            return None;
        }
        Some(ConfirmedWorkflow { members: self.selected.clone(), lead })
    }

    fn normalize(&mut self) {
        match self.selected.as_slice() {
            [] => self.lead = None,
            [only] => self.lead = Some(only.clone()),
            many => {
                if self.lead.as_ref().is_some_and(|l| !many.contains(l)) {
                    self.lead = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specialist(id: &str) -> Specialist {
        Specialist { id: id.into(), name: id.to_uppercase(), role: "analyst".into() }
    }

    #[test]
    fn single_selection_becomes_lead_and_deselect_clears() {
        let mut selection = WorkflowSelection::default();
        let s1 = SpecialistId::from("s1");
        assert!(selection.toggle(&s1));
        assert_eq!(selection.lead(), Some(&s1));

        assert!(!selection.toggle(&s1));
        assert_eq!(selection.lead(), None);
        assert!(selection.confirm().is_none());
    }

    #[test]
    fn directory_default_prefers_conventional_lead() {
        let list = vec![specialist("hydraulics"), specialist("drilling_engineer")];
        let preferred = SpecialistId::from("drilling_engineer");
        let selection = WorkflowSelection::from_directory(&list, Some(&preferred));
        assert_eq!(selection.selected().len(), 2);
        assert_eq!(selection.lead(), Some(&preferred));
    }

    #[test]
    fn directory_default_falls_back_to_first() {
        let list = vec![specialist("hydraulics"), specialist("geomechanics")];
        let preferred = SpecialistId::from("drilling_engineer");
        let selection = WorkflowSelection::from_directory(&list, Some(&preferred));
        assert_eq!(selection.lead().map(SpecialistId::as_str), Some("hydraulics"));

        let empty = WorkflowSelection::from_directory(&[], Some(&preferred));
        assert_eq!(empty.lead(), None);
    }

    #[test]
    fn removing_lead_among_many_clears_it() {
        let list = vec![specialist("a"), specialist("b"), specialist("c")];
        let mut selection = WorkflowSelection::from_directory(&list, None);
        assert_eq!(selection.lead().map(SpecialistId::as_str), Some("a"));
        selection.toggle(&"a".into());
        assert_eq!(selection.lead(), None);

        selection.toggle(&"b".into());
        // Only "c" left, which now leads
        assert_eq!(selection.lead().map(SpecialistId::as_str), Some("c"));
    }

    #[test]
    fn repeated_directory_ids_are_selected_once() {
        let list = vec![specialist("a"), specialist("a"), specialist("b")];
        let mut selection = WorkflowSelection::from_directory(&list, None);
        assert_eq!(selection.selected(), [SpecialistId::from("a"), SpecialistId::from("b")]);

        assert!(!selection.toggle(&"a".into()));
        assert!(!selection.is_selected(&"a".into()));
        assert_eq!(selection.lead().map(SpecialistId::as_str), Some("b"));
        let (members, _) = selection.confirm().unwrap().into_parts();
        assert_eq!(members, vec![SpecialistId::from("b")]);
    }

    #[test]
    fn lead_must_be_selected() {
        let list = vec![specialist("a"), specialist("b")];
        let mut selection = WorkflowSelection::from_directory(&list, None);
        selection.toggle(&"b".into());
        assert_eq!(
            selection.set_lead(&"b".into()),
            Err(SelectionError::LeadNotSelected("b".into()))
        );
    }

    #[test]
    fn confirm_carries_members_and_lead() {
        let list = vec![specialist("a"), specialist("b")];
        let mut selection = WorkflowSelection::from_directory(&list, None);
        selection.set_lead(&"b".into()).unwrap();
        let (members, lead) = selection.confirm().unwrap().into_parts();
        assert_eq!(members.len(), 2);
        assert_eq!(lead.as_str(), "b");
    }
}
