//! Script API modules
//!
//! A module is a name plus the registration callbacks that populate it,
//! run in order at load time.

use asbridge_scripting::{DocsGenerator, Engine, Registrar, Result};
use tracing::info;

/// Registration callback of a module
pub type Registration<C> = fn(&mut Registrar<'_, C>) -> Result<()>;

pub struct Module<C> {
    name: String,
    registrations: Vec<Registration<C>>,
}

impl<C: 'static> Module<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registrations: Vec::new(),
        }
    }

    /// Append a registration callback
    pub fn with(mut self, registration: Registration<C>) -> Self {
        self.registrations.push(registration);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run every registration against `engine`, returning the module docs
    ///
    /// Registrations run against a staged copy; `engine` only changes when
    /// all of them succeed.
    pub fn register(&self, engine: &mut Engine<C>) -> Result<DocsGenerator> {
        let mut staged = engine.clone();
        let mut docs = DocsGenerator::new(self.name.clone());
        let mut registrar = Registrar::new(&mut staged, &mut docs);
        for registration in &self.registrations {
            registration(&mut registrar)?;
        }
        *engine = staged;
        info!(
            "Registered module {} ({} symbols)",
            self.name,
            docs.symbol_count()
        );
        Ok(docs)
    }
}
