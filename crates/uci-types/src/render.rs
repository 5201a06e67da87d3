//! Native UCI text rendering.

use std::fmt::Write;

use crate::package::Package;
use crate::section::Section;
use crate::tree::Tree;
use crate::value::OptionValue;

impl Section {
    /// Render as a `config` block followed by a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.anonymous {
            let _ = writeln!(out, "config '{}'", self.kind);
        } else {
            let _ = writeln!(out, "config '{}' '{}'", self.kind, self.identifier);
        }
        for (key, value) in &self.options {
            match value {
                OptionValue::Scalar(v) => {
                    let _ = writeln!(out, "\toption '{key}' '{v}'");
                }
                OptionValue::List(items) => {
                    for item in items {
                        let _ = writeln!(out, "\tlist '{key}' '{item}'");
                    }
                }
            }
        }
        out.push('\n');
        out
    }
}

impl Package {
    /// Render the `package` header and every section.
    pub fn render(&self) -> String {
        let mut out = format!("package '{}'\n\n", self.name);
        for section in self.sections.values() {
            out.push_str(&section.render());
        }
        out
    }
}

impl Tree {
    /// Render every package in name order.
    pub fn render(&self) -> String {
        self.packages.values().map(Package::render).collect()
    }
}
