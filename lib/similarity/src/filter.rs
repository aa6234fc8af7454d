//! Hostel type gate
//!
//! Applied to the scored pool before ranking. A request for Gents or Ladies
//! admits candidates of that type plus Mixed ones; a Mixed request admits
//! everyone, including candidates whose type label was not recognized.

use crate::error::RequestError;
use hostelrank_core::{Candidate, HostelType};

pub trait Filter {
    fn matches(&self, candidate: &Candidate) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeFilter {
    requested: Option<HostelType>,
}

impl TypeFilter {
    pub fn new(requested: Option<HostelType>) -> Self {
        Self { requested }
    }

    /// Parse a request value; blank input means "no filter"
    pub fn parse(value: Option<&str>) -> Result<Self, RequestError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(Self::default()),
            Some(v) => v
                .parse::<HostelType>()
                .map(|t| Self::new(Some(t)))
                .map_err(RequestError::InvalidCategory),
        }
    }

    pub fn requested(&self) -> Option<HostelType> {
        self.requested
    }

    pub fn admits(&self, candidate_type: Option<HostelType>) -> bool {
        match self.requested {
            None | Some(HostelType::Mixed) => true,
            Some(wanted) => matches!(candidate_type, Some(t) if t == wanted || t == HostelType::Mixed),
        }
    }

    /// Indices of the admitted candidates, in table order
    pub fn apply(&self, candidates: &[Candidate]) -> Vec<usize> {
        candidates
            .iter()
            .filter(|c| self.matches(c))
            .map(|c| c.index)
            .collect()
    }
}

impl Filter for TypeFilter {
    fn matches(&self, candidate: &Candidate) -> bool {
        self.admits(candidate.hostel_type)
    }
}
