//! Integration tests for error types

#[cfg(test)]
mod tests {
    use pkgd_errors::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = ToolchainError::RefreshFailed {
            message: "feed unreachable".into(),
        }
        .into();
        assert!(matches!(err, Error::Toolchain(_)));
        assert_eq!(err.code(), codes::TOOLCHAIN);
    }

    #[test]
    fn test_error_display() {
        let err = ToolchainError::PackageNotFound {
            package: "foo".into(),
        };
        assert_eq!(err.to_string(), "package not found: foo");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InProgress.code(), codes::IN_PROGRESS);
        assert_eq!(Error::NotConfigured.code(), codes::NOT_CONFIGURED);
        assert_eq!(Error::AlreadyConfigured.code(), codes::ALREADY_CONFIGURED);
        assert_eq!(Error::Unavailable.code(), codes::UNAVAILABLE);
        assert_eq!(
            Error::ObserverAlreadyRegistered.code(),
            codes::PROTOCOL_MISUSE
        );
        assert_eq!(
            Error::Toolchain(ToolchainError::Aborted).code(),
            codes::ABORTED
        );
        assert_ne!(Error::internal("boom").code(), codes::NONE);
    }

    #[test]
    fn test_code_names() {
        assert_eq!(codes::name(codes::NONE), "none");
        assert_eq!(codes::name(codes::IN_PROGRESS), "in_progress");
        assert_eq!(codes::name(9999), "unknown");
    }

    #[test]
    fn test_user_facing() {
        let err = Error::InProgress;
        assert!(err.is_retryable());
        assert!(err.is_admission());
        assert_eq!(err.user_code(), Some("packager.in_progress"));
        assert!(err.user_hint().is_some());

        let misuse = Error::ObserverNotRegistered;
        assert!(misuse.is_protocol_misuse());
        assert!(!misuse.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(ToolchainError::from(io_err));
        assert!(matches!(err, Error::Toolchain(ToolchainError::Io { .. })));
        assert!(err.is_retryable());
    }
}
