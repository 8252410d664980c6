use std::collections::HashMap;
use std::sync::Arc;

use super::AdmissionGate;
use crate::{Domain, Result};

/// Read-only table mapping each known domain to its [`AdmissionGate`].
///
/// The table is filled once before probing starts. Afterwards it is only
/// ever read, so probe tasks can share gates through cheap [`Arc`] clones
/// without any further synchronisation.
#[derive(Debug, Default)]
pub struct AdmissionGates {
    gates: HashMap<Domain, Arc<AdmissionGate>>,
}

impl AdmissionGates {
    /// Build one gate of the given capacity for every distinct domain.
    ///
    /// Duplicate domains share a single gate.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorKind::InvalidCapacity`] if `capacity` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_lib::{AdmissionGates, Domain};
    ///
    /// let domains = ["a.test", "b.test", "a.test"].map(Domain::from);
    /// let gates = AdmissionGates::new(domains, 10).unwrap();
    /// assert_eq!(gates.len(), 2);
    /// ```
    pub fn new<I>(domains: I, capacity: usize) -> Result<Self>
    where
        I: IntoIterator<Item = Domain>,
    {
        let mut gates = HashMap::new();
        for domain in domains {
            if gates.contains_key(&domain) {
                continue;
            }
            let gate = AdmissionGate::new(domain.clone(), capacity)?;
            gates.insert(domain, Arc::new(gate));
        }
        Ok(Self { gates })
    }

    /// Get the gate for `domain`, if the domain is known
    #[must_use]
    pub fn get(&self, domain: &Domain) -> Option<&Arc<AdmissionGate>> {
        self.gates.get(domain)
    }

    /// Number of distinct domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns `true` if no domain is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Iterate over all domains and their gates
    pub fn iter(&self) -> impl Iterator<Item = (&Domain, &Arc<AdmissionGate>)> {
        self.gates.iter()
    }
}
