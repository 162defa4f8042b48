//! Documentation generator
//!
//! Collects one [`RegistrationRecord`] per installed symbol and renders them
//! as an AngelScript declaration file, one per module.

use crate::registry::RegistrationRecord;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const PAD: &str = "    ";

/// Documentation model of one module
#[derive(Debug, Clone, Default)]
pub struct DocsGenerator {
    module: String,
    records: Vec<RegistrationRecord>,
}

impl DocsGenerator {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            records: Vec::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub(crate) fn push(&mut self, record: RegistrationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RegistrationRecord] {
        &self.records
    }

    /// Number of engine symbols described by the records
    pub fn symbol_count(&self) -> usize {
        self.records.iter().map(RegistrationRecord::symbol_count).sum()
    }

    /// Name of the generated file
    pub fn file_name(&self) -> String {
        format!("{}Docs.as", self.module)
    }

    /// Render the declaration file
    ///
    /// Output depends on the records only, so repeated calls yield identical text.
    pub fn generate(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Generated documentation for module {}", self.module);
        let _ = writeln!(out);
        let _ = writeln!(out, "namespace {}", self.module);
        out.push_str("{\n");

        section(&mut out, "Funcdefs");
        for record in &self.records {
            if let RegistrationRecord::FuncDef {
                declaration,
                description,
            } = record
            {
                out.push('\n');
                comment(&mut out, 1, description);
                let _ = writeln!(out, "{}funcdef {};", PAD, declaration);
            }
        }
        out.push('\n');

        section(&mut out, "Enums");
        for record in &self.records {
            if let RegistrationRecord::EnumType { name, description } = record {
                out.push('\n');
                comment(&mut out, 1, description);
                let _ = writeln!(out, "{}enum {}", PAD, name);
                let _ = writeln!(out, "{}{{", PAD);
                for value in &self.records {
                    if let RegistrationRecord::EnumValue {
                        owner,
                        name: value_name,
                        value,
                    } = value
                    {
                        if owner == name {
                            let _ = writeln!(out, "{}{}{} = {},", PAD, PAD, value_name, value);
                        }
                    }
                }
                let _ = writeln!(out, "{}}};", PAD);
            }
        }
        out.push('\n');

        section(&mut out, "Global variables");
        for record in &self.records {
            if let RegistrationRecord::GlobalProperty {
                declaration,
                description,
            } = record
            {
                out.push('\n');
                comment(&mut out, 1, description);
                let _ = writeln!(out, "{}{};", PAD, declaration);
            }
        }
        out.push('\n');

        section(&mut out, "Functions");
        for record in &self.records {
            if let RegistrationRecord::GlobalFunction {
                declaration,
                description,
            } = record
            {
                out.push('\n');
                comment(&mut out, 1, description);
                let _ = writeln!(out, "{}{};", PAD, declaration);
            }
        }
        out.push('\n');

        section(&mut out, "Events");
        for record in &self.records {
            if let RegistrationRecord::EventDeclaration {
                funcdef,
                declaration,
                description,
            } = record
            {
                out.push('\n');
                comment(&mut out, 1, description);
                let _ = writeln!(out, "{}funcdef {};", PAD, funcdef);
                let _ = writeln!(out, "{}{};", PAD, declaration);
            }
        }
        out.push('\n');

        section(&mut out, "Objects");
        for record in &self.records {
            if let RegistrationRecord::ObjectType { name, description } = record {
                out.push('\n');
                comment(&mut out, 1, description);
                self.write_class(&mut out, name);
            }
        }

        out.push_str("}\n");
        out
    }

    fn write_class(&self, out: &mut String, name: &str) {
        let _ = writeln!(out, "{}class {}", PAD, name);
        let _ = writeln!(out, "{}{{", PAD);
        let members = self
            .records
            .iter()
            .filter(|record| record.owner() == Some(name));

        for record in members.clone() {
            if let RegistrationRecord::ObjectProperty { declaration, .. } = record {
                let _ = writeln!(out, "{}{}{};", PAD, PAD, declaration);
            }
        }
        out.push('\n');
        for record in members.clone() {
            if let RegistrationRecord::ObjectConstructor { params, .. } = record {
                let _ = writeln!(out, "{}{}{}({});", PAD, PAD, name, params);
            }
        }
        for record in members {
            if let RegistrationRecord::ObjectMethod { declaration, .. } = record {
                let _ = writeln!(out, "{}{}{};", PAD, PAD, declaration);
            }
        }
        let _ = writeln!(out, "{}}};", PAD);
    }

    /// Write the declaration file into `dir`, returning its path
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        std::fs::write(&path, self.generate())?;
        tracing::info!("Generated documentation {}", path.display());
        Ok(path)
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}// ********** {} **********", PAD, title);
}

fn comment(out: &mut String, depth: usize, text: &str) {
    if !text.is_empty() {
        let _ = writeln!(out, "{}// {}", PAD.repeat(depth), text);
    }
}
