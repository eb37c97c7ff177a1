use purge_core::StorageError;
use std::io::Write;
use std::process::ExitCode;

/// Final outcome of an invocation, mapped once to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The storage service reported an error; its code was printed.
    StorageFailure,
    /// Anything else: a panic in the purge task or a runtime failure.
    Unexpected,
    /// Argument parsing stopped the run (usage error, `--help`).
    Parser(i32),
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::StorageFailure => 1,
            Self::Unexpected => 2,
            Self::Parser(code) => u8::try_from(code).unwrap_or(2),
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/// Print the short code of a storage failure to `out` and pick the status.
pub fn report(result: &anyhow::Result<()>, out: &mut impl Write) -> Status {
    let Err(err) = result else {
        return Status::Success;
    };

    match err.downcast_ref::<StorageError>() {
        Some(storage) => {
            tracing::debug!("Storage failure: {}", storage);
            if writeln!(out, "{}", storage.code()).is_err() {
                return Status::Unexpected;
            }
            Status::StorageFailure
        }
        None => {
            eprintln!("Error: {err:#}");
            Status::Unexpected
        }
    }
}
