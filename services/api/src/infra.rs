use crate::leads::{Lead, LeadRepository, RepositoryError};
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local lead store; leads are lost on restart.
#[derive(Default, Clone)]
pub struct InMemoryLeadRepository {
    leads: Arc<Mutex<Vec<Lead>>>,
}

impl InMemoryLeadRepository {
    fn guard(&self) -> Result<MutexGuard<'_, Vec<Lead>>, RepositoryError> {
        self.leads
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead store lock poisoned".to_string()))
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        self.guard()?.push(lead.clone());
        Ok(lead)
    }

    fn list(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        Ok(self.guard()?.iter().take(limit).cloned().collect())
    }
}
