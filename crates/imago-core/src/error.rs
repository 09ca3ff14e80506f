use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// The fixed, ordered set of error kinds. The `Display` form of each kind
/// is the token that appears in printed errors and that scripts can match
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("error")]
    Error,
    #[error("not_a_canvas")]
    NotACanvas,
    #[error("not_a_class")]
    NotAClass,
    #[error("not_a_filename")]
    NotAFilename,
    #[error("not_a_lambda")]
    NotALambda,
    #[error("not_a_list")]
    NotAList,
    #[error("not_a_number")]
    NotANumber,
    #[error("not_a_pipe")]
    NotAPipe,
    #[error("not_a_sequence")]
    NotASequence,
    #[error("not_a_stream")]
    NotAStream,
    #[error("not_a_string")]
    NotAString,
    #[error("not_a_symbol")]
    NotASymbol,
    #[error("not_all_lists")]
    NotAllLists,
    #[error("not_all_nums")]
    NotAllNums,
    #[error("not_all_strings")]
    NotAllStrings,
    #[error("not_an_environment")]
    NotAnEnvironment,
    #[error("not_valid_index")]
    NotValidIndex,
    #[error("open_error")]
    OpenError,
    #[error("symbol_not_bound")]
    SymbolNotBound,
    #[error("wrong_num_of_args")]
    WrongNumOfArgs,
    #[error("wrong_types")]
    WrongTypes,
}

/// Payload of a language-level error: the kind token, a short operation
/// hint such as `(slice start end seq)`, the source location the
/// interpreter was reading when the error was raised, and the offending
/// form.
#[derive(Debug)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub hint: String,
    pub file: String,
    pub line: i64,
    pub form: Value,
}

/// A shared error record. Cloning is an `Rc` bump, so an error keeps its
/// identity while it propagates through `catch` and back out as a value.
#[derive(Debug, Clone)]
pub struct ImagoError(Rc<ErrorInfo>);

impl ImagoError {
    pub fn new(
        kind: ErrorKind,
        hint: impl Into<String>,
        file: impl Into<String>,
        line: i64,
        form: Value,
    ) -> Self {
        ImagoError(Rc::new(ErrorInfo {
            kind,
            hint: hint.into(),
            file: file.into(),
            line,
            form,
        }))
    }

    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    pub fn hint(&self) -> &str {
        &self.0.hint
    }

    pub fn file(&self) -> &str {
        &self.0.file
    }

    pub fn line(&self) -> i64 {
        self.0.line
    }

    pub fn form(&self) -> &Value {
        &self.0.form
    }

    /// Same underlying error record.
    pub fn ptr_eq(a: &ImagoError, b: &ImagoError) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Display for ImagoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error: {} {} at {}({}) -> {}",
            self.0.hint, self.0.kind, self.0.file, self.0.line, self.0.form
        )
    }
}

impl std::error::Error for ImagoError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tokens() {
        assert_eq!(ErrorKind::SymbolNotBound.to_string(), "symbol_not_bound");
        assert_eq!(ErrorKind::WrongNumOfArgs.to_string(), "wrong_num_of_args");
        assert_eq!(ErrorKind::NotValidIndex.to_string(), "not_valid_index");
    }

    #[test]
    fn error_display_carries_location() {
        let e = ImagoError::new(
            ErrorKind::NotAList,
            "(cond (tst body) ...)",
            "boot.inc",
            7,
            Value::int(42),
        );
        let s = e.to_string();
        assert!(s.contains("not_a_list"));
        assert!(s.contains("boot.inc(7)"));
        assert!(s.contains("(cond (tst body) ...)"));
    }

    #[test]
    fn clone_preserves_identity() {
        let e = ImagoError::new(ErrorKind::Error, "(throw str form)", "repl", 1, Value::nil());
        let e2 = e.clone();
        assert!(ImagoError::ptr_eq(&e, &e2));
    }
}
