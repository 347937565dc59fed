//! A fixed population of people to generate records about.

use std::collections::HashSet;

use rand_chacha::ChaCha8Rng;

use crate::person::Person;

/// Tracks every CHI and ANOCHI issued so far, so no two people in a cohort
/// can share an identifier. Passed `&mut` into [`Person::new`], which
/// redraws until it finds unissued values.
#[derive(Debug, Clone, Default)]
pub struct IdentifierPool {
    chis: HashSet<String>,
    anochis: HashSet<String>,
}

impl IdentifierPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a CHI; returns false when it was already issued.
    pub fn register_chi(&mut self, chi: &str) -> bool {
        self.chis.insert(chi.to_string())
    }

    /// Registers an ANOCHI; returns false when it was already issued.
    pub fn register_anochi(&mut self, anochi: &str) -> bool {
        self.anochis.insert(anochi.to_string())
    }
}

/// All the people generated for a run. Built once up front, then shared
/// immutably with every dataset generator so each person's records agree
/// about who they are.
#[derive(Debug, Clone, Default)]
pub struct PersonCollection {
    people: Vec<Person>,
    ids: IdentifierPool,
}

impl PersonCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wipes the collection and generates `count` new people, each with a
    /// CHI and ANOCHI unique within the collection.
    pub fn generate_people(&mut self, count: usize, rng: &mut ChaCha8Rng) {
        self.people.clear();
        self.ids = IdentifierPool::new();
        self.people.reserve(count);
        for _ in 0..count {
            self.people.push(Person::new(rng, &mut self.ids));
        }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
