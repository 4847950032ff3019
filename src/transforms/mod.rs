use std::collections::BTreeSet;

pub mod alias_injected_helpers;
pub mod remove_injected_helpers;
pub mod remove_marked_lines;
pub mod unwrap_class_declarations;

/// Helpers CoffeeScript declares once per file.
pub const INJECTED_HELPERS: [&str; 5] = ["__hasProp", "__extends", "__slice", "__bind", "__indexOf"];

/// Columns per indentation level in CoffeeScript output.
pub const INDENT: u32 = 2;

pub fn is_injected_helper(name: &str) -> bool {
    INJECTED_HELPERS.contains(&name)
}

/// Source lines scheduled for deletion. Only ever grows.
#[derive(Clone, Debug, Default)]
pub struct LinesToRemove(BTreeSet<u32>);

impl LinesToRemove {
    pub fn mark(&mut self, line: u32) {
        if line > 0 {
            self.0.insert(line);
        }
    }

    pub fn mark_range(&mut self, lines: std::ops::RangeInclusive<u32>) {
        for line in lines {
            self.mark(line);
        }
    }

    pub fn contains(&self, line: u32) -> bool {
        self.0.contains(&line)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
