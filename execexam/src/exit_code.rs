/// Exit statuses reported by pytest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PytestExitCode {
    Ok,
    TestsFailed,
    Interrupted,
    InternalError,
    UsageError,
    NoTestsCollected,
    Other(i32),
}

impl PytestExitCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PytestExitCode::Ok,
            1 => PytestExitCode::TestsFailed,
            2 => PytestExitCode::Interrupted,
            3 => PytestExitCode::InternalError,
            4 => PytestExitCode::UsageError,
            5 => PytestExitCode::NoTestsCollected,
            other => PytestExitCode::Other(other),
        }
    }
}

/// Return code of an examination run; unrecognized statuses count as success.
pub fn execexam_return_code(pytest_exit: PytestExitCode) -> i32 {
    match pytest_exit {
        PytestExitCode::TestsFailed => 1,
        PytestExitCode::Interrupted => 2,
        PytestExitCode::InternalError => 3,
        PytestExitCode::UsageError => 4,
        PytestExitCode::NoTestsCollected => 5,
        PytestExitCode::Ok | PytestExitCode::Other(_) => 0,
    }
}
