//! This module provides the parser for textual instruction tables, utilizing the `pest`
//! crate. The format is the one produced by `InstructionTable`'s `Display` implementation.

use crate::types::{
    Direction, InductionError, Instruction, InstructionTable, Selector, MAX_TABLE_SIZE,
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::BTreeMap;

/// Derives a `PestParser` for the instruction table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

/// Parses the given input string into an `InstructionTable`.
///
/// Each rule maps a selector to an instruction, e.g. `0, 0 -> 1, 1, R` or `0, 1 -> halt`.
/// Rules are separated by newlines or `;`, and `#` starts a comment. Partial tables are
/// accepted; use [`crate::analyzer::analyze_complete`] to require completeness.
///
/// # Returns
///
/// * `Ok(InstructionTable)` if the input is successfully parsed and validated.
/// * `Err(InductionError::ParseError)` if there are syntax errors or duplicate selectors.
/// * `Err(InductionError::ValidationError)` if the input is too large.
pub fn parse(input: &str) -> Result<InstructionTable, InductionError> {
    if input.len() > MAX_TABLE_SIZE {
        return Err(InductionError::ValidationError(format!(
            "Table text is {} bytes, the limit is {}",
            input.len(),
            MAX_TABLE_SIZE
        )));
    }

    let root = TableParser::parse(Rule::table, input.trim())
        .map_err(|e| InductionError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| InductionError::ValidationError("Empty parse tree".to_string()))?;

    parse_table(root)
}

/// Collects the rules of a `Pair<Rule::table>`, rejecting repeated selectors.
fn parse_table(pair: Pair<Rule>) -> Result<InstructionTable, InductionError> {
    let mut rules = BTreeMap::new();

    for entry in pair.into_inner() {
        if entry.as_rule() != Rule::entry {
            continue; // EOI
        }

        let span = entry.as_span();
        let (selector, instruction) = parse_entry(entry)?;
        if rules.insert(selector, instruction).is_some() {
            return Err(parse_error(
                &format!("Duplicate rule for selector ({selector})"),
                span,
            ));
        }
    }

    Ok(InstructionTable::new(rules))
}

/// Parses a single `selector -> instruction` rule.
fn parse_entry(pair: Pair<Rule>) -> Result<(Selector, Instruction), InductionError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    // Rule: entry > selector > [state, bit]
    let mut selector = next_pair(&mut pairs, span)?.into_inner();
    let state = parse_state(next_pair(&mut selector, span)?)?;
    let bit = parse_bit(next_pair(&mut selector, span)?);

    // Rule: entry > instruction > (halt | transition)
    let instruction = next_pair(&mut pairs, span)?;
    let instruction = parse_instruction(next_pair(&mut instruction.into_inner(), span)?)?;

    Ok((Selector::new(state, bit), instruction))
}

/// Parses a `Pair<Rule::halt>` or `Pair<Rule::transition>`.
fn parse_instruction(pair: Pair<Rule>) -> Result<Instruction, InductionError> {
    if pair.as_rule() == Rule::halt {
        return Ok(Instruction::HALT);
    }

    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let next_state = parse_state(next_pair(&mut pairs, span)?)?;
    let write = parse_bit(next_pair(&mut pairs, span)?);
    let direction = parse_direction(next_pair(&mut pairs, span)?)?;

    Ok(Instruction::new(next_state, write, direction))
}

fn parse_state(pair: Pair<Rule>) -> Result<i64, InductionError> {
    pair.as_str()
        .parse::<i64>()
        .map_err(|_| parse_error("State number is too large", pair.as_span()))
}

fn parse_bit(pair: Pair<Rule>) -> bool {
    pair.as_str() == "1"
}

fn parse_direction(pair: Pair<Rule>) -> Result<Direction, InductionError> {
    match pair.as_str() {
        "L" => Ok(Direction::Left),
        "R" => Ok(Direction::Right),
        other => Err(parse_error(
            &format!("Invalid direction: {other}"),
            pair.as_span(),
        )),
    }
}

/// Returns the next pair, or a parse error pointing at `span` if the grammar produced
/// fewer children than expected.
fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, InductionError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete rule", span))
}

/// Creates an `InductionError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> InductionError {
    InductionError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::InstructionTableEnumerator;

    #[test]
    fn test_parse_simple_table() {
        let input = r#"
# fill cells with 1 until a 1 is found
0, 0 -> 0, 1, R
0, 1 -> halt
"#;

        let table = parse(input).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&Selector::new(0, false)),
            Some(&Instruction::new(0, true, Direction::Right))
        );
        assert_eq!(table.get(&Selector::new(0, true)), Some(&Instruction::HALT));
    }

    #[test]
    fn test_parse_semicolon_separated() {
        let table = parse("0,0 -> 1,0,R; 0,1 -> 1,0,R; 1,0 -> 0,0,L; 1,1 -> 0,0,L").unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.state_count(), 2);
        assert_eq!(
            table.get(&Selector::new(1, true)),
            Some(&Instruction::new(0, false, Direction::Left))
        );
    }

    #[test]
    fn test_parse_empty_table() {
        let table = parse("# nothing here\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_trailing_comment() {
        let table = parse("0, 0 -> halt   # stop at once").unwrap();
        assert_eq!(table.get(&Selector::new(0, false)), Some(&Instruction::HALT));
    }

    #[test]
    fn test_parse_partial_table() {
        let table = parse("1, 1 -> 3, 0, L").unwrap();

        assert_eq!(table.len(), 1);
        assert!(crate::analyzer::analyze_complete(&table).is_err());
    }

    #[test]
    fn test_parse_negative_state() {
        assert!(matches!(
            parse("-1, 0 -> halt"),
            Err(InductionError::ParseError(_))
        ));
        assert!(matches!(
            parse("0, 0 -> -1, 0, L"),
            Err(InductionError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_duplicate_selector() {
        let result = parse("0, 0 -> halt\n0, 0 -> 0, 1, R");

        let error = result.unwrap_err();
        assert!(matches!(error, InductionError::ParseError(_)));
        assert!(error.to_string().contains("Duplicate rule for selector (0, 0)"));
    }

    #[test]
    fn test_parse_invalid_direction() {
        let result = parse("0, 0 -> 0, 1, S");
        assert!(matches!(result, Err(InductionError::ParseError(_))));
    }

    #[test]
    fn test_parse_invalid_bit() {
        let result = parse("0, 2 -> halt");
        assert!(matches!(result, Err(InductionError::ParseError(_))));
    }

    #[test]
    fn test_parse_too_large() {
        let input = "0, 0 -> halt\n".repeat(MAX_TABLE_SIZE);
        let result = parse(&input);
        assert!(matches!(result, Err(InductionError::ValidationError(_))));
    }

    #[test]
    fn test_displayed_table_parses_back() {
        let table = InstructionTableEnumerator::new().nth(4000).unwrap();
        let parsed = parse(&table.to_string()).unwrap();

        assert_eq!(parsed, table);
    }
}
