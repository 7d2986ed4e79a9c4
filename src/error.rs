use std::fmt;
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// A variable-length integer's continuation bits never terminated within the
    /// byte budget for its magnitude, or the final byte carried bits beyond it.
    MalformedVarint { step: &'static str },
    /// A declared length exceeds the bytes remaining in the stream, or the
    /// stream ended in the middle of a field.
    TruncatedStream {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// A decoded length field reinterprets as a negative 32-bit value.
    NegativeLength { step: &'static str, value: u64 },
    /// The decoded score count was nonzero and different from the decoded
    /// match count, which would produce a broken parallel array.
    InconsistentArrayLengths { matches: usize, scores: usize },
    /// A boolean flag byte held something other than 0 or 1.
    BadFlag { step: &'static str, value: u8 },
    /// Length-prefixed text on the stream was not valid UTF-8.
    BadText { step: &'static str },
    /// Write failure from the caller-supplied sink while encoding.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::MalformedVarint { step } => {
                write!(f, "Varint did not terminate within its byte budget at [{}]", step)
            }
            Error::TruncatedStream {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected {} more bytes, but only {} remain at [{}]",
                expected, actual, step
            ),
            Error::NegativeLength { step, value } => write!(
                f,
                "Length {} reinterprets as negative at [{}]",
                value, step
            ),
            Error::InconsistentArrayLengths { matches, scores } => write!(
                f,
                "Scores length {} does not match {} match identifiers",
                scores, matches
            ),
            Error::BadFlag { step, value } => {
                write!(f, "Flag byte must be 0 or 1, was {} at [{}]", value, step)
            }
            Error::BadText { step } => write!(f, "Text wasn't valid UTF-8 at [{}]", step),
            Error::Io(ref err) => write!(f, "Stream write failure: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
