use super::ErrorCode;

pub fn all_codes() -> &'static [ErrorCode] {
    &[
        ErrorCode::ConfigInvalidJson,
        ErrorCode::ConfigInvalidToml,
        ErrorCode::ConfigInvalidValue,
        ErrorCode::ValidationMissingArgument,
        ErrorCode::ValidationInvalidArgument,
        ErrorCode::RuleInvalidPattern,
        ErrorCode::WalkFailed,
        ErrorCode::FileReadFailed,
        ErrorCode::FileBackupFailed,
        ErrorCode::FileWriteFailed,
        ErrorCode::InternalIoError,
        ErrorCode::InternalJsonError,
    ]
}
