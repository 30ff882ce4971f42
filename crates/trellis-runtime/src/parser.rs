//! Expression parsing (character-level state machine)
//!
//! The parser drives a character-by-character finite-state machine over the
//! input and never builds a syntax tree: call frames are the AST. A frame is
//! pushed onto an explicit stack when a nested call begins inside a
//! parameter list and popped when its value is appended to the parent's
//! parameter list, so nesting depth costs heap frames, not native call
//! frames. Each time the machine recognizes the end of one invocation it
//! hands the completed frame to the executor and substitutes the result
//! back into the parse state (chain target after `.`, or argument of the
//! parent frame).

use std::sync::Arc;

use crate::error::CompileError;
use crate::value::{PatternValue, Value};

/// Parser state of one call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Skipping whitespace before an identifier
    Start,
    /// Accumulating identifier characters into the name buffer
    ReadingName,
    /// Name complete, expecting `(`
    AwaitParen,
    /// Expecting an argument, a nested call, or `)`
    ParamStart,
    /// Argument complete, expecting `,` or `)`
    ParamSeparatorOrEnd,
    /// Accumulating a quoted or bare literal
    ReadingLiteral,
    /// Invocation fires on the next character
    Invoking,
    /// Invocation fired, result pending, absorbing whitespace
    AfterInvoke,
}

/// One pending or completed invocation.
#[derive(Debug)]
pub(crate) struct Frame {
    state: State,
    /// Resolved value the call is invoked against; absent for free calls.
    pub target: Option<PatternValue>,
    /// Identifier text captured during parsing; stable once captured.
    pub method_name: String,
    /// Already-evaluated argument values, in positional order.
    pub params: Vec<Value>,
}

impl Frame {
    fn new() -> Self {
        Self {
            state: State::Start,
            target: None,
            method_name: String::new(),
            params: Vec::new(),
        }
    }

    fn with_target(target: PatternValue) -> Self {
        Self {
            target: Some(target),
            ..Self::new()
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn syntax_error(text: &str, message: String) -> CompileError {
    CompileError::Syntax {
        message,
        text: text.to_string(),
    }
}

/// A literal is converted at the point it is bound as an argument:
/// quote-delimited text keeps its characters verbatim (delimiters
/// stripped), a token that parses entirely as a signed decimal integer
/// becomes an integer, and anything else falls back to text. Overflowing
/// or otherwise unparsable digit runs silently stay text.
fn coerce_literal(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::Text(Arc::from(&raw[1..raw.len() - 1]));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    Value::Text(Arc::from(raw))
}

/// Outcome of dispatching one character against a freshly produced result.
enum Step {
    Done(PatternValue),
    Continue,
}

/// Shared transition set for `Invoking` (result just produced) and
/// `AfterInvoke` (result carried over across whitespace): `.` rebinds the
/// next frame's target, `,`/`)` pop the parent frame and append the result
/// to its parameters, end-of-input with an empty stack terminates.
fn settle(
    ch: Option<char>,
    value: PatternValue,
    frame: &mut Frame,
    stack: &mut Vec<Frame>,
    pending: &mut Option<PatternValue>,
    text: &str,
) -> Result<Step, CompileError> {
    match ch {
        None if stack.is_empty() => return Ok(Step::Done(value)),
        Some('.') => {
            *frame = Frame::with_target(value);
        }
        Some(c @ (',' | ')')) => match stack.pop() {
            Some(mut parent) => {
                parent.params.push(Value::Pattern(value));
                parent.state = if c == ')' {
                    State::Invoking
                } else {
                    State::ParamStart
                };
                *frame = parent;
            }
            None => {
                return Err(syntax_error(
                    text,
                    format!("'.' or <eof> expected after '{}' call", frame.method_name),
                ))
            }
        },
        Some(c) if c.is_whitespace() => {
            *pending = Some(value);
            frame.state = State::AfterInvoke;
        }
        _ => {
            let expected = if stack.is_empty() {
                "'.' or <eof>"
            } else {
                "'.', ')' or ','"
            };
            return Err(syntax_error(
                text,
                format!("{expected} expected after '{}' call", frame.method_name),
            ));
        }
    }
    Ok(Step::Continue)
}

/// Run the state machine over `text`, calling `invoke` for every completed
/// invocation in program order, and return the final chain value.
///
/// `max_depth` bounds the nesting stack; exceeding it is a syntax error.
pub(crate) fn parse_expression<F>(
    text: &str,
    max_depth: usize,
    mut invoke: F,
) -> Result<PatternValue, CompileError>
where
    F: FnMut(&Frame) -> Result<PatternValue, CompileError>,
{
    let mut stack: Vec<Frame> = Vec::new();
    let mut frame = Frame::new();
    // Result carried from Invoking across whitespace into AfterInvoke.
    let mut pending: Option<PatternValue> = None;
    let mut buf = String::new();

    // One trailing None marks end-of-input, mirroring the single-pass,
    // no-lookahead design: every state sees exactly one character.
    for ch in text.chars().map(Some).chain(std::iter::once(None)) {
        match frame.state {
            State::Start => match ch {
                Some(c) if c.is_whitespace() => {}
                Some(c) if is_ident_start(c) => {
                    buf.push(c);
                    frame.state = State::ReadingName;
                }
                _ => return Err(syntax_error(text, "method call expected".to_string())),
            },

            State::ReadingName => match ch {
                Some(c) if is_ident_part(c) => buf.push(c),
                Some('(') => {
                    frame.method_name = std::mem::take(&mut buf);
                    frame.state = State::ParamStart;
                }
                Some(c) if c.is_whitespace() => {
                    frame.method_name = std::mem::take(&mut buf);
                    frame.state = State::AwaitParen;
                }
                _ => {
                    return Err(syntax_error(text, format!("'(' expected after '{buf}'")));
                }
            },

            State::AwaitParen => match ch {
                Some('(') => frame.state = State::ParamStart,
                Some(c) if c.is_whitespace() => {}
                _ => {
                    return Err(syntax_error(
                        text,
                        format!("'(' expected after '{}'", frame.method_name),
                    ));
                }
            },

            State::ParamStart => match ch {
                Some(c) if c.is_whitespace() => {}
                Some(c) if c.is_ascii_digit() || c == '"' => {
                    buf.push(c);
                    frame.state = State::ReadingLiteral;
                }
                Some(')') => frame.state = State::Invoking,
                Some(c) if is_ident_start(c) => {
                    // Nested call: park the current frame and start fresh.
                    if stack.len() >= max_depth {
                        return Err(syntax_error(
                            text,
                            format!("expression nested deeper than {max_depth} calls"),
                        ));
                    }
                    buf.push(c);
                    stack.push(std::mem::replace(&mut frame, Frame::new()));
                    frame.state = State::ReadingName;
                }
                _ => {
                    return Err(syntax_error(
                        text,
                        format!("expression expected in '{}' call", frame.method_name),
                    ));
                }
            },

            State::ParamSeparatorOrEnd => match ch {
                Some(')') => frame.state = State::Invoking,
                Some(',') => frame.state = State::ParamStart,
                Some(c) if c.is_whitespace() => {}
                _ => {
                    return Err(syntax_error(
                        text,
                        format!("')' or ',' expected in '{}' call", frame.method_name),
                    ));
                }
            },

            State::ReadingLiteral => {
                if buf.starts_with('"') {
                    match ch {
                        Some('"') => {
                            buf.push('"');
                            frame.params.push(coerce_literal(&buf));
                            buf.clear();
                            frame.state = State::ParamSeparatorOrEnd;
                        }
                        Some(c) => buf.push(c),
                        None => {
                            return Err(syntax_error(
                                text,
                                format!("unterminated string in '{}' call", frame.method_name),
                            ));
                        }
                    }
                } else {
                    match ch {
                        Some(c) if c.is_whitespace() || c == ',' || c == ')' => {
                            frame.params.push(coerce_literal(&buf));
                            buf.clear();
                            frame.state = match c {
                                ')' => State::Invoking,
                                ',' => State::ParamStart,
                                _ => State::ParamSeparatorOrEnd,
                            };
                        }
                        Some(c) => buf.push(c),
                        None => {
                            return Err(syntax_error(
                                text,
                                format!("')' or ',' expected in '{}' call", frame.method_name),
                            ));
                        }
                    }
                }
            }

            State::Invoking => {
                let value = invoke(&frame)?;
                match settle(ch, value, &mut frame, &mut stack, &mut pending, text)? {
                    Step::Done(result) => return Ok(result),
                    Step::Continue => {}
                }
            }

            State::AfterInvoke => match ch {
                Some(c) if c.is_whitespace() => {}
                _ => {
                    let Some(value) = pending.take() else {
                        unreachable!("AfterInvoke without a pending result");
                    };
                    match settle(ch, value, &mut frame, &mut stack, &mut pending, text)? {
                        Step::Done(result) => return Ok(result),
                        Step::Continue => {}
                    }
                }
            },
        }
    }

    unreachable!("end-of-input sentinel always terminates the state machine");
}
