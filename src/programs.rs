use crate::types::{InductionError, InstructionTable};

use tracing::warn;

// Embedded instruction tables
const PROGRAM_TEXTS: [(&str, &str); 4] = [
    ("fill-until-one", include_str!("../programs/fill-until-one.tm")),
    ("oscillator", include_str!("../programs/oscillator.tm")),
    ("copy-four", include_str!("../programs/copy-four.tm")),
    ("seek-one", include_str!("../programs/seek-one.tm")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = load();
}

/// A named, hand-written instruction table.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    /// The leading comment lines of the program text.
    pub description: String,
    pub table: InstructionTable,
}

fn load() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, text)| match crate::parser::parse(text) {
            Ok(table) => Some(Program {
                name: name.to_string(),
                description: description(text),
                table,
            }),
            Err(e) => {
                warn!(program = name, error = %e, "Failed to parse embedded program");
                None
            }
        })
        .collect()
}

fn description(text: &str) -> String {
    text.lines()
        .map_while(|line| line.trim().strip_prefix('#'))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ProgramCatalog;

impl ProgramCatalog {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_by_index(index: usize) -> Result<Program, InductionError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            InductionError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_by_name(name: &str) -> Result<Program, InductionError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| InductionError::ValidationError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get information about a program by its index
    pub fn info(index: usize) -> Result<ProgramInfo, InductionError> {
        let program = Self::get_by_index(index)?;

        Ok(ProgramInfo {
            index,
            state_count: program.table.state_count(),
            rule_count: program.table.len(),
            name: program.name,
            description: program.description,
        })
    }

    /// Get the source text of a program by its index
    pub fn text(index: usize) -> Result<&'static str, InductionError> {
        PROGRAM_TEXTS
            .get(index)
            .map(|&(_, text)| text)
            .ok_or_else(|| {
                InductionError::ValidationError(format!(
                    "Program text index {} out of range",
                    index
                ))
            })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub state_count: i64,
    pub rule_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Step, TuringMachine};
    use num_bigint::BigUint;

    fn run(name: &str, input: u32) -> TuringMachine {
        let program = ProgramCatalog::get_by_name(name).unwrap();
        TuringMachine::new(program.table, &BigUint::from(input)).run()
    }

    #[test]
    fn test_all_programs_load() {
        assert_eq!(ProgramCatalog::count(), PROGRAM_TEXTS.len());
        assert_eq!(
            ProgramCatalog::names(),
            vec!["fill-until-one", "oscillator", "copy-four", "seek-one"]
        );
    }

    #[test]
    fn test_program_info() {
        let info = ProgramCatalog::info(2).unwrap();

        assert_eq!(info.name, "copy-four");
        assert_eq!(info.state_count, 4);
        assert_eq!(info.rule_count, 8);
        assert!(info.description.starts_with("Walks over the four lowest cells"));

        assert!(ProgramCatalog::info(999).is_err());
        assert!(ProgramCatalog::get_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_program_text() {
        let text = ProgramCatalog::text(0).unwrap();
        assert!(text.contains("0, 1 -> halt"));
        assert!(ProgramCatalog::text(999).is_err());
    }

    #[test]
    fn test_programs_behave_as_described() {
        assert_eq!(
            run("fill-until-one", 16).decoded_result(),
            Some(BigUint::from(15u32))
        );
        assert_eq!(run("oscillator", 5).outcome(), Step::Looping);
        assert_eq!(
            run("copy-four", 45).decoded_result(),
            Some(BigUint::from(13u32))
        );
        assert_eq!(run("seek-one", 8).outcome(), Step::Halted);
        assert_eq!(run("seek-one", 0).outcome(), Step::Running);
    }
}
