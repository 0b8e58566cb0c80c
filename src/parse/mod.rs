use std::ops::Range;

use logos::Logos;
use thiserror::Error;

use crate::cmd::execution_plan::{ExecutionPlan, RedirectMode, Redirection, SimpleCommand};

use self::token::{LexerError, Token};

pub mod token;
pub mod unescape;

#[derive(Debug, Error, PartialEq)]
pub enum CommandParseError {
    #[error("failed to tokenize command: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Lexer(Vec<LexerError>),
    #[error("pipes cannot be combined with redirection")]
    PipeWithRedirection,
    #[error("empty command in pipeline")]
    EmptyPipeStage,
    #[error("only one of >, >> or < may be used")]
    MultipleRedirections,
    #[error("missing file after redirection operator")]
    MissingRedirectTarget,
    #[error("& is only allowed at the end of a simple command")]
    MisplacedBackground,
    #[error("missing command")]
    MissingCommand,
}

type Spanned = (Token, Range<usize>);

/// Classifies one input line into exactly one plan shape.
pub fn parse_command(line: &str) -> Result<ExecutionPlan, CommandParseError> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (token, span) in Token::lexer(line).spanned() {
        match token {
            Ok(Token::Unterminated) => errors.push(LexerError::UnterminatedString),
            Ok(token) => tokens.push((token, span)),
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(CommandParseError::Lexer(errors));
    }

    if tokens.is_empty() {
        return Ok(ExecutionPlan::NoOp);
    }

    let has_pipe = tokens.iter().any(|(t, _)| *t == Token::Pipe);
    let redirections = tokens.iter().filter(|(t, _)| t.is_redirection()).count();
    let backgrounds = tokens
        .iter()
        .filter(|(t, _)| *t == Token::Background)
        .count();

    if has_pipe && redirections > 0 {
        return Err(CommandParseError::PipeWithRedirection);
    }

    if has_pipe {
        if backgrounds > 0 {
            return Err(CommandParseError::MisplacedBackground);
        }
        return plan_pipeline(tokens);
    }

    if redirections > 0 {
        if backgrounds > 0 {
            return Err(CommandParseError::MisplacedBackground);
        }
        if redirections > 1 {
            return Err(CommandParseError::MultipleRedirections);
        }
        return plan_redirection(line, tokens);
    }

    if backgrounds > 0 {
        let ends_with_background = matches!(tokens.last(), Some((Token::Background, _)));
        if backgrounds > 1 || !ends_with_background {
            return Err(CommandParseError::MisplacedBackground);
        }
        tokens.pop();
        let cmd = SimpleCommand::from_words(words(tokens)?).ok_or(CommandParseError::MissingCommand)?;
        return Ok(ExecutionPlan::Backgrounded(cmd));
    }

    let cmd = SimpleCommand::from_words(words(tokens)?).ok_or(CommandParseError::MissingCommand)?;
    Ok(ExecutionPlan::Simple(cmd))
}

fn plan_pipeline(tokens: Vec<Spanned>) -> Result<ExecutionPlan, CommandParseError> {
    let mut stages = Vec::new();
    let mut current = Vec::new();

    for (token, span) in tokens {
        if token == Token::Pipe {
            stages.push(std::mem::take(&mut current));
        } else {
            current.push((token, span));
        }
    }
    stages.push(current);

    let stages = stages
        .into_iter()
        .map(|stage| {
            SimpleCommand::from_words(words(stage)?).ok_or(CommandParseError::EmptyPipeStage)
        })
        .collect::<Result<Vec<_>, _>>()?;

    trace!(stages = stages.len(), "classified pipeline");

    Ok(ExecutionPlan::Piped(stages))
}

fn plan_redirection(line: &str, mut tokens: Vec<Spanned>) -> Result<ExecutionPlan, CommandParseError> {
    // `>>` lexes as a single token, so it can never be mistaken for `>`
    let op_idx = tokens
        .iter()
        .position(|(t, _)| t.is_redirection())
        .ok_or(CommandParseError::MissingRedirectTarget)?;

    tokens.truncate(op_idx + 1);
    let (op, op_span) = tokens.pop().ok_or(CommandParseError::MissingCommand)?;

    let mode = match op {
        Token::Append => RedirectMode::Append,
        Token::Write => RedirectMode::Truncate,
        _ => RedirectMode::ReadFrom,
    };

    let program_end = tokens
        .first()
        .map(|(_, span)| span.end)
        .ok_or(CommandParseError::MissingCommand)?;
    let text = line[program_end..op_span.start].trim().replace('"', "");

    let command = SimpleCommand::from_words(words(tokens)?).ok_or(CommandParseError::MissingCommand)?;

    // everything after the operator names one path, spaces included
    let target = line[op_span.end..].trim().replace('"', "");
    if target.is_empty() {
        return Err(CommandParseError::MissingRedirectTarget);
    }

    Ok(ExecutionPlan::Redirected(Redirection {
        command,
        text,
        mode,
        target,
    }))
}

fn words(tokens: Vec<Spanned>) -> Result<Vec<String>, CommandParseError> {
    tokens
        .into_iter()
        .map(|(token, _)| match token {
            Token::Word(word) => Ok(word),
            Token::Background => Err(CommandParseError::MisplacedBackground),
            _ => Err(CommandParseError::MultipleRedirections),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(program: &str, args: &[&str]) -> SimpleCommand {
        SimpleCommand::new(program, args.iter().copied())
    }

    #[test]
    fn blank_lines_are_noops() {
        assert_eq!(parse_command("").unwrap(), ExecutionPlan::NoOp);
        assert_eq!(parse_command("   \t ").unwrap(), ExecutionPlan::NoOp);
    }

    #[test]
    fn simple_command_strips_quotes() {
        assert_eq!(
            parse_command(r#"grep "hello world" notes.txt"#).unwrap(),
            ExecutionPlan::Simple(simple("grep", &["hello world", "notes.txt"]))
        );
    }

    #[test]
    fn pipeline_of_three() {
        assert_eq!(
            "cat f.txt | sort | uniq".parse::<ExecutionPlan>().unwrap(),
            ExecutionPlan::Piped(vec![
                simple("cat", &["f.txt"]),
                simple("sort", &[]),
                simple("uniq", &[]),
            ])
        );
    }

    #[test]
    fn quoted_pipe_is_literal() {
        assert_eq!(
            parse_command(r#"echo "a | b""#).unwrap(),
            ExecutionPlan::Simple(simple("echo", &["a | b"]))
        );
    }

    #[test]
    fn empty_stage_is_rejected() {
        assert_eq!(parse_command("ls |"), Err(CommandParseError::EmptyPipeStage));
        assert_eq!(parse_command("| wc"), Err(CommandParseError::EmptyPipeStage));
    }

    #[test]
    fn append_wins_over_truncate() {
        let ExecutionPlan::Redirected(redirect) = parse_command(r#"echo "hi  there" >> log.txt"#).unwrap() else {
            panic!("expected redirection");
        };
        assert_eq!(redirect.mode, RedirectMode::Append);
        assert_eq!(redirect.text, "hi  there");
        assert_eq!(redirect.target, "log.txt");
        assert_eq!(redirect.command.program, "echo");
    }

    #[test]
    fn truncate_and_read() {
        let ExecutionPlan::Redirected(redirect) = parse_command("echo hello>out.txt").unwrap() else {
            panic!("expected redirection");
        };
        assert_eq!(redirect.mode, RedirectMode::Truncate);
        assert_eq!(redirect.text, "hello");
        assert_eq!(redirect.target, "out.txt");

        let ExecutionPlan::Redirected(redirect) = parse_command("echo < in.txt").unwrap() else {
            panic!("expected redirection");
        };
        assert_eq!(redirect.mode, RedirectMode::ReadFrom);
        assert_eq!(redirect.text, "");
    }

    #[test]
    fn redirection_errors() {
        assert_eq!(
            parse_command("echo hi >"),
            Err(CommandParseError::MissingRedirectTarget)
        );
        assert_eq!(parse_command("> out.txt"), Err(CommandParseError::MissingCommand));
        assert_eq!(
            parse_command("echo hi > a > b"),
            Err(CommandParseError::MultipleRedirections)
        );
    }

    #[test]
    fn target_keeps_inner_spaces() {
        let ExecutionPlan::Redirected(redirect) = parse_command("echo hi > my file.txt").unwrap() else {
            panic!("expected redirection");
        };
        assert_eq!(redirect.target, "my file.txt");
        assert_eq!(redirect.text, "hi");

        let ExecutionPlan::Redirected(redirect) = parse_command(r#"echo hi >> "old  notes.txt" "#).unwrap() else {
            panic!("expected redirection");
        };
        assert_eq!(redirect.target, "old  notes.txt");
    }

    #[test]
    fn pipe_and_redirection_do_not_mix() {
        assert_eq!(
            parse_command("ls | grep txt > out.txt"),
            Err(CommandParseError::PipeWithRedirection)
        );
    }

    #[test]
    fn trailing_ampersand_backgrounds() {
        assert_eq!(
            parse_command("sleep 2 &").unwrap(),
            ExecutionPlan::Backgrounded(simple("sleep", &["2"]))
        );
        assert_eq!(
            parse_command("sleep 2&").unwrap(),
            ExecutionPlan::Backgrounded(simple("sleep", &["2"]))
        );
    }

    #[test]
    fn misplaced_ampersand() {
        assert_eq!(
            parse_command("sleep & 2"),
            Err(CommandParseError::MisplacedBackground)
        );
        assert_eq!(parse_command("&"), Err(CommandParseError::MissingCommand));
        assert_eq!(
            parse_command("ls | wc &"),
            Err(CommandParseError::MisplacedBackground)
        );
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(
            parse_command(r#"echo "hello"#),
            Err(CommandParseError::Lexer(vec![LexerError::UnterminatedString]))
        );
    }
}
