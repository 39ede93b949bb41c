//! Integration tests for events

#[cfg(test)]
mod tests {
    use pkgd_errors::ToolchainError;
    use pkgd_events::*;
    use pkgd_types::{InstallState, PackageDescriptor, RefreshMode};

    fn package() -> PackageDescriptor {
        PackageDescriptor::new("foo", "1.0", "arm")
    }

    #[tokio::test]
    async fn test_emit_through_sender() {
        let (tx, mut rx) = channel();
        tx.emit_warning("disk almost full");

        let message = rx.recv().await.unwrap();
        assert_eq!(message.meta.source, EventSource::GENERAL);
        assert_eq!(message.meta.level, EventLevel::Warn);
        assert!(matches!(
            message.event,
            AppEvent::General(GeneralEvent::Warning { .. })
        ));
    }

    #[tokio::test]
    async fn test_emit_for_activity_sets_correlation() {
        let (tx, mut rx) = channel();
        tx.emit_for_activity(
            7,
            AppEvent::Install(InstallEvent::StateChanged {
                activity_id: 7,
                package: package(),
                state: InstallState::Downloading,
                progress: 40,
            }),
        );

        let message = rx.recv().await.unwrap();
        assert_eq!(message.meta.correlation_id.as_deref(), Some("7"));
        assert_eq!(message.meta.source, EventSource::INSTALL);
        assert_eq!(message.meta.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_emit_without_receiver_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_error_with_details("nobody listening", "receiver dropped");
    }

    #[tokio::test]
    async fn test_warning_and_error_details() {
        let (tx, mut rx) = channel();
        tx.emit_warning_with_context("failed to wipe volatile cache", "permission denied");
        tx.emit_error_with_details("observer panicked in on_state_change", "boom");

        let warning = rx.recv().await.unwrap();
        match warning.event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                assert_eq!(message, "failed to wipe volatile cache");
                assert_eq!(context.as_deref(), Some("permission denied"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let error = rx.recv().await.unwrap();
        assert_eq!(error.meta.level, EventLevel::Error);
        assert!(matches!(
            error.event,
            AppEvent::General(GeneralEvent::Error { details: Some(ref d), .. }) if d == "boom"
        ));
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = ToolchainError::RefreshFailed {
            message: "feed unreachable".into(),
        };
        let failure = FailureContext::from_error(pkgd_errors::codes::TOOLCHAIN, &err);
        assert_eq!(failure.status, pkgd_errors::codes::TOOLCHAIN);
        assert!(failure.retryable);
        assert!(failure.message.contains("feed unreachable"));
    }

    #[test]
    fn test_log_levels_and_targets() {
        let failed = AppEvent::Repo(RepoEvent::SyncFailed {
            activity_id: 1,
            mode: RefreshMode::Forced,
            status: pkgd_errors::codes::TOOLCHAIN,
            failure: FailureContext::from_error(
                pkgd_errors::codes::TOOLCHAIN,
                &ToolchainError::Aborted,
            ),
        });
        assert_eq!(failed.log_level(), tracing::Level::ERROR);
        assert_eq!(failed.log_target(), "pkgd::events::repo");

        let admitted = AppEvent::Install(InstallEvent::Admitted {
            activity_id: 2,
            package: package(),
            download_only: false,
        });
        assert_eq!(admitted.log_level(), tracing::Level::INFO);
        assert_eq!(admitted.event_source(), EventSource::INSTALL);
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = AppEvent::Install(InstallEvent::Completed {
            activity_id: 3,
            package: package(),
            state: InstallState::Installed,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["domain"], "install");
        assert_eq!(value["event"]["type"], "Completed");
        assert_eq!(value["event"]["state"], "installed");
    }
}
